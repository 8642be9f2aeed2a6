//! `users` table access

use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::association::{self, Associations, Cardinality};
use super::entity::EntityRepository;
use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{FilterPage, Repository, RepositoryResult, SecondaryKeyLookup};
use crate::domain::{Entity, NewUser, Personnel, User, UserChanges};
use crate::query::{CompilerOptions, FilterInput, QueryOptions};
use crate::transaction::{with_executor, TxContext};

/// Users repository
#[derive(Clone)]
pub struct UserRepository {
    base: EntityRepository<User>,
}

impl UserRepository {
    /// Repository over `pool`
    pub fn new(pool: PgPool, compiler: CompilerOptions) -> Self {
        Self {
            base: EntityRepository::new(pool, compiler),
        }
    }

    /// Undeleted user with `user_name`
    pub async fn find_by_user_name(
        &self,
        tx: TxContext<'_>,
        user_name: &str,
    ) -> RepositoryResult<User> {
        self.base.find_one_by(tx, "user_name", user_name).await
    }

    /// Load the associations requested in `options` for `rows`
    ///
    /// `personnel` resolves through `personnel.user_id`, one row per user.
    pub async fn load_associations(
        &self,
        mut tx: TxContext<'_>,
        rows: &[User],
        options: &QueryOptions,
    ) -> RepositoryResult<Associations> {
        let mut loaded = Associations::new();
        let ids: Vec<Uuid> = rows.iter().map(Entity::id).collect();
        for requested in &options.associations {
            let values = match requested.name.as_str() {
                "personnel" => {
                    association::load::<Personnel>(
                        self.base.pool(),
                        tx.reborrow(),
                        "user_id",
                        &requested.select_fields,
                        &ids,
                        Cardinality::One,
                    )
                    .await?
                }
                other => {
                    return Err(RepositoryError::validation_failed(
                        RepositoryOperation::LoadAssociation,
                        format!("{} has no association {}", User::NAME, other),
                    ))
                }
            };
            loaded.insert(requested.name.clone(), values);
        }
        Ok(loaded)
    }
}

impl Repository<User, NewUser, UserChanges> for UserRepository {
    async fn find_by_id(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<User> {
        self.base.find_by_id(tx, id).await
    }

    async fn filter(
        &self,
        tx: TxContext<'_>,
        input: &FilterInput,
        options: &QueryOptions,
    ) -> RepositoryResult<FilterPage<User>> {
        self.base.filter(tx, input, options).await
    }

    async fn create(&self, tx: TxContext<'_>, data: NewUser) -> RepositoryResult<User> {
        with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, User>(
                "INSERT INTO users (user_name, password, role, organization_id) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
            )
            .bind(&data.user_name)
            .bind(&data.password_hash)
            .bind(&data.role)
            .bind(data.organization_id)
            .fetch_one(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Create, e)
                .with_entity(User::NAME, data.user_name.clone())
        })
    }

    async fn update(
        &self,
        tx: TxContext<'_>,
        id: Uuid,
        data: UserChanges,
    ) -> RepositoryResult<User> {
        let row = with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, User>(
                "UPDATE users SET user_name = COALESCE($1, user_name), \
                 password = COALESCE($2, password), role = COALESCE($3, role), \
                 updated_at = NOW() WHERE id = $4 AND deleted_at IS NULL RETURNING *",
            )
            .bind(&data.user_name)
            .bind(&data.password_hash)
            .bind(&data.role)
            .bind(id)
            .fetch_optional(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Update, e)
                .with_entity(User::NAME, id.to_string())
        })?;

        row.ok_or_else(|| {
            RepositoryError::not_found(User::NAME, id.to_string())
                .with_operation(RepositoryOperation::Update)
        })
    }

    async fn delete(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<()> {
        self.base.soft_delete(tx, id).await
    }
}

impl SecondaryKeyLookup<str, User> for UserRepository {
    async fn find_by_secondary_key(
        &self,
        tx: TxContext<'_>,
        user_name: &str,
    ) -> RepositoryResult<User> {
        self.find_by_user_name(tx, user_name).await
    }
}
