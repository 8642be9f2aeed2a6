//! `personnel` table access

use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::association::{self, Associations, Cardinality};
use super::entity::EntityRepository;
use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{FilterPage, Repository, RepositoryResult, SecondaryKeyLookup};
use crate::domain::{Entity, Personnel, User};
use crate::query::{CompilerOptions, FilterInput, QueryOptions};
use crate::transaction::{with_executor, TxContext};

/// Personnel repository
///
/// Create and update take a whole [`Personnel`]; merging a partial update
/// into the stored row happens in the service.
#[derive(Clone)]
pub struct PersonnelRepository {
    base: EntityRepository<Personnel>,
}

impl PersonnelRepository {
    /// Repository over `pool`
    pub fn new(pool: PgPool, compiler: CompilerOptions) -> Self {
        Self {
            base: EntityRepository::new(pool, compiler),
        }
    }

    /// Undeleted personnel record of `user_id`
    pub async fn find_by_user_id(
        &self,
        tx: TxContext<'_>,
        user_id: Uuid,
    ) -> RepositoryResult<Personnel> {
        self.base.find_one_by(tx, "user_id", user_id).await
    }

    /// Load the associations requested in `options` for `rows`
    ///
    /// `user` resolves through `personnel.user_id`, one user per record.
    pub async fn load_associations(
        &self,
        mut tx: TxContext<'_>,
        rows: &[Personnel],
        options: &QueryOptions,
    ) -> RepositoryResult<Associations> {
        let mut loaded = Associations::new();
        let user_ids: Vec<Uuid> = rows.iter().map(|p| p.user_id).collect();
        for requested in &options.associations {
            let values = match requested.name.as_str() {
                "user" => {
                    association::load::<User>(
                        self.base.pool(),
                        tx.reborrow(),
                        "id",
                        &requested.select_fields,
                        &user_ids,
                        Cardinality::One,
                    )
                    .await?
                }
                other => {
                    return Err(RepositoryError::validation_failed(
                        RepositoryOperation::LoadAssociation,
                        format!("{} has no association {}", Personnel::NAME, other),
                    ))
                }
            };
            loaded.insert(requested.name.clone(), values);
        }
        Ok(loaded)
    }
}

impl Repository<Personnel, Personnel, Personnel> for PersonnelRepository {
    async fn find_by_id(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<Personnel> {
        self.base.find_by_id(tx, id).await
    }

    async fn filter(
        &self,
        tx: TxContext<'_>,
        input: &FilterInput,
        options: &QueryOptions,
    ) -> RepositoryResult<FilterPage<Personnel>> {
        self.base.filter(tx, input, options).await
    }

    async fn create(&self, tx: TxContext<'_>, data: Personnel) -> RepositoryResult<Personnel> {
        with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, Personnel>(
                "INSERT INTO personnel (first_name, last_name, gender, email, mobile, address, \
                 role, avatar, user_id, activation_status, organization_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
            )
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.gender)
            .bind(&data.email)
            .bind(&data.mobile)
            .bind(Json(&data.address))
            .bind(&data.role)
            .bind(&data.avatar)
            .bind(data.user_id)
            .bind(&data.activation_status)
            .bind(data.organization_id)
            .fetch_one(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Create, e)
                .with_entity(Personnel::NAME, data.user_id.to_string())
        })
    }

    async fn update(
        &self,
        tx: TxContext<'_>,
        id: Uuid,
        data: Personnel,
    ) -> RepositoryResult<Personnel> {
        let row = with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, Personnel>(
                "UPDATE personnel SET first_name = $1, last_name = $2, gender = $3, email = $4, \
                 mobile = $5, address = $6, role = $7, avatar = $8, activation_status = $9, \
                 updated_at = NOW() WHERE id = $10 AND deleted_at IS NULL RETURNING *",
            )
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.gender)
            .bind(&data.email)
            .bind(&data.mobile)
            .bind(Json(&data.address))
            .bind(&data.role)
            .bind(&data.avatar)
            .bind(&data.activation_status)
            .bind(id)
            .fetch_optional(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Update, e)
                .with_entity(Personnel::NAME, id.to_string())
        })?;

        row.ok_or_else(|| {
            RepositoryError::not_found(Personnel::NAME, id.to_string())
                .with_operation(RepositoryOperation::Update)
        })
    }

    async fn delete(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<()> {
        self.base.soft_delete(tx, id).await
    }
}

impl SecondaryKeyLookup<Uuid, Personnel> for PersonnelRepository {
    async fn find_by_secondary_key(
        &self,
        tx: TxContext<'_>,
        user_id: &Uuid,
    ) -> RepositoryResult<Personnel> {
        self.find_by_user_id(tx, *user_id).await
    }
}
