//! Generic soft-delete aware access to one entity table
//!
//! [`EntityRepository`] holds the reads every entity shares: lookup by id or
//! by a unique column, list, the filter pipeline and soft delete. The
//! per-entity repositories wrap it and add their own inserts and updates.

use std::marker::PhantomData;

use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{FilterPage, RepositoryResult};
use crate::domain::Entity;
use crate::query::{bind, build_filter_queries, CompilerOptions, FilterInput, FilterValue, QueryOptions};
use crate::transaction::{with_executor, TxContext};

/// Encode `values`, reporting failures against `operation`
pub(crate) fn arguments(
    operation: RepositoryOperation,
    values: &[FilterValue],
) -> RepositoryResult<PgArguments> {
    bind::to_arguments(values)
        .map_err(|e| RepositoryError::serialization_error(operation, e.to_string()))
}

/// Shared reads and soft delete for entity `E`
pub struct EntityRepository<E> {
    pool: PgPool,
    compiler: CompilerOptions,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            compiler: self.compiler,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    /// Repository over `pool` compiling filters with `compiler`
    pub fn new(pool: PgPool, compiler: CompilerOptions) -> Self {
        Self {
            pool,
            compiler,
            _entity: PhantomData,
        }
    }

    /// The pool used outside a unit of work
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Active compiler modes
    pub fn compiler(&self) -> &CompilerOptions {
        &self.compiler
    }

    /// Undeleted row with `id`
    pub async fn find_by_id(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<E> {
        self.find_one_by(tx, "id", id)
            .await
            .map_err(|e| e.with_operation(RepositoryOperation::FindById))
    }

    /// Undeleted row whose `column` equals `value`
    ///
    /// `column` must be one of the entity's own columns.
    pub async fn find_one_by(
        &self,
        tx: TxContext<'_>,
        column: &'static str,
        value: impl Into<FilterValue>,
    ) -> RepositoryResult<E> {
        let operation = RepositoryOperation::FindBySecondaryKey;
        let value = value.into();
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 AND deleted_at IS NULL LIMIT 1",
            E::TABLE,
            column
        );
        let args = arguments(operation, std::slice::from_ref(&value))?;
        let row = with_executor!(tx, &self.pool, |exec| {
            sqlx::query_as_with::<Postgres, E, _>(&sql, args)
                .fetch_optional(exec)
                .await
        })
        .map_err(|e| RepositoryError::from_sqlx(operation, e).with_entity(E::NAME, value.to_text()))?;

        row.ok_or_else(|| {
            RepositoryError::not_found(E::NAME, value.to_text()).with_operation(operation)
        })
    }

    /// Every undeleted row whose `column` equals `value`, oldest first
    pub async fn find_many_by(
        &self,
        tx: TxContext<'_>,
        column: &'static str,
        value: impl Into<FilterValue>,
    ) -> RepositoryResult<Vec<E>> {
        let operation = RepositoryOperation::FindAll;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 AND deleted_at IS NULL ORDER BY created_at",
            E::TABLE,
            column
        );
        let args = arguments(operation, &[value.into()])?;
        with_executor!(tx, &self.pool, |exec| {
            sqlx::query_as_with::<Postgres, E, _>(&sql, args)
                .fetch_all(exec)
                .await
        })
        .map_err(|e| RepositoryError::from_sqlx(operation, e))
    }

    /// Every undeleted row, oldest first
    pub async fn find_all(&self, tx: TxContext<'_>) -> RepositoryResult<Vec<E>> {
        let sql = format!(
            "SELECT * FROM {} WHERE deleted_at IS NULL ORDER BY created_at",
            E::TABLE
        );
        with_executor!(tx, &self.pool, |exec| {
            sqlx::query_as::<Postgres, E>(&sql).fetch_all(exec).await
        })
        .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::FindAll, e))
    }

    /// Run the COUNT and SELECT halves of a filter request
    pub async fn filter(
        &self,
        mut tx: TxContext<'_>,
        input: &FilterInput,
        options: &QueryOptions,
    ) -> RepositoryResult<FilterPage<E>> {
        let operation = RepositoryOperation::Filter;
        let queries = build_filter_queries(
            E::TABLE,
            E::TENANT_COLUMN,
            input,
            options,
            &self.compiler,
        );
        let count_args = arguments(operation, &queries.count.args)?;
        let select_args = arguments(operation, &queries.select.args)?;

        let total: i64 = with_executor!(tx.reborrow(), &self.pool, |exec| {
            sqlx::query_scalar_with::<Postgres, i64, _>(&queries.count.sql, count_args)
                .fetch_one(exec)
                .await
        })
        .map_err(|e| RepositoryError::from_sqlx(operation, e))?;

        let items = with_executor!(tx, &self.pool, |exec| {
            sqlx::query_as_with::<Postgres, E, _>(&queries.select.sql, select_args)
                .fetch_all(exec)
                .await
        })
        .map_err(|e| RepositoryError::from_sqlx(operation, e))?;

        tracing::debug!(
            table = E::TABLE,
            total,
            returned = items.len(),
            "filter executed"
        );
        Ok(FilterPage { items, total })
    }

    /// Mark the row deleted; deleting an already deleted row is a no-op
    pub async fn soft_delete(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<()> {
        let sql = format!(
            "UPDATE {} SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
            E::TABLE
        );
        let result = with_executor!(tx, &self.pool, |exec| {
            sqlx::query(&sql).bind(id).execute(exec).await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::SoftDelete, e)
                .with_entity(E::NAME, id.to_string())
        })?;

        tracing::debug!(
            table = E::TABLE,
            %id,
            rows = result.rows_affected(),
            "soft delete"
        );
        Ok(())
    }
}
