//! `messages` and `message_statuses` table access

use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::association::{self, Associations, Cardinality};
use super::entity::EntityRepository;
use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{FilterPage, Repository, RepositoryResult};
use crate::domain::{
    CreateMessageInput, Entity, Message, MessageState, MessageStatus, UpdateMessageInput,
};
use crate::query::{CompilerOptions, FilterInput, QueryOptions};
use crate::transaction::{with_executor, TxContext};

/// Messages repository, including each message's status row
#[derive(Clone)]
pub struct MessageRepository {
    base: EntityRepository<Message>,
}

impl MessageRepository {
    /// Repository over `pool`
    pub fn new(pool: PgPool, compiler: CompilerOptions) -> Self {
        Self {
            base: EntityRepository::new(pool, compiler),
        }
    }

    /// Every undeleted message
    pub async fn find_all(&self, tx: TxContext<'_>) -> RepositoryResult<Vec<Message>> {
        self.base.find_all(tx).await
    }

    /// Messages sent by `sender_id`
    pub async fn find_by_sender_id(
        &self,
        tx: TxContext<'_>,
        sender_id: Uuid,
    ) -> RepositoryResult<Vec<Message>> {
        self.base.find_many_by(tx, "sender_id", sender_id).await
    }

    /// Messages received by `receiver_id`
    pub async fn find_by_receiver_id(
        &self,
        tx: TxContext<'_>,
        receiver_id: Uuid,
    ) -> RepositoryResult<Vec<Message>> {
        self.base.find_many_by(tx, "receiver_id", receiver_id).await
    }

    /// Insert the status row of `message_id`
    pub async fn create_status(
        &self,
        tx: TxContext<'_>,
        message_id: Uuid,
        state: MessageState,
    ) -> RepositoryResult<MessageStatus> {
        with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, MessageStatus>(
                "INSERT INTO message_statuses (message_id, status) VALUES ($1, $2) RETURNING *",
            )
            .bind(message_id)
            .bind(state.as_str())
            .fetch_one(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Create, e)
                .with_entity(MessageStatus::NAME, message_id.to_string())
        })
    }

    /// Move the status row of `message_id` to `state`
    pub async fn update_status(
        &self,
        tx: TxContext<'_>,
        message_id: Uuid,
        state: MessageState,
    ) -> RepositoryResult<MessageStatus> {
        let row = with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, MessageStatus>(
                "UPDATE message_statuses SET status = $1, updated_at = NOW() \
                 WHERE message_id = $2 AND deleted_at IS NULL RETURNING *",
            )
            .bind(state.as_str())
            .bind(message_id)
            .fetch_optional(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Update, e)
                .with_entity(MessageStatus::NAME, message_id.to_string())
        })?;

        row.ok_or_else(|| {
            RepositoryError::not_found(MessageStatus::NAME, message_id.to_string())
                .with_operation(RepositoryOperation::Update)
        })
    }

    /// Soft delete the status rows of `message_id`
    pub async fn delete_statuses(&self, tx: TxContext<'_>, message_id: Uuid) -> RepositoryResult<()> {
        with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query(
                "UPDATE message_statuses SET deleted_at = NOW(), updated_at = NOW() \
                 WHERE message_id = $1 AND deleted_at IS NULL",
            )
            .bind(message_id)
            .execute(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::SoftDelete, e)
                .with_entity(MessageStatus::NAME, message_id.to_string())
        })?;
        Ok(())
    }

    /// Load the associations requested in `options` for `rows`
    ///
    /// `statuses` resolves through `message_statuses.message_id`.
    pub async fn load_associations(
        &self,
        mut tx: TxContext<'_>,
        rows: &[Message],
        options: &QueryOptions,
    ) -> RepositoryResult<Associations> {
        let mut loaded = Associations::new();
        let ids: Vec<Uuid> = rows.iter().map(Entity::id).collect();
        for requested in &options.associations {
            let values = match requested.name.as_str() {
                "statuses" => {
                    association::load::<MessageStatus>(
                        self.base.pool(),
                        tx.reborrow(),
                        "message_id",
                        &requested.select_fields,
                        &ids,
                        Cardinality::Many,
                    )
                    .await?
                }
                other => {
                    return Err(RepositoryError::validation_failed(
                        RepositoryOperation::LoadAssociation,
                        format!("{} has no association {}", Message::NAME, other),
                    ))
                }
            };
            loaded.insert(requested.name.clone(), values);
        }
        Ok(loaded)
    }
}

impl Repository<Message, CreateMessageInput, UpdateMessageInput> for MessageRepository {
    async fn find_by_id(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<Message> {
        self.base.find_by_id(tx, id).await
    }

    async fn filter(
        &self,
        tx: TxContext<'_>,
        input: &FilterInput,
        options: &QueryOptions,
    ) -> RepositoryResult<FilterPage<Message>> {
        self.base.filter(tx, input, options).await
    }

    async fn create(
        &self,
        tx: TxContext<'_>,
        data: CreateMessageInput,
    ) -> RepositoryResult<Message> {
        with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, Message>(
                "INSERT INTO messages (sender_id, receiver_id, content) \
                 VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(data.sender_id)
            .bind(data.receiver_id)
            .bind(&data.content)
            .fetch_one(exec)
            .await
        })
        .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Create, e))
    }

    async fn update(
        &self,
        tx: TxContext<'_>,
        id: Uuid,
        data: UpdateMessageInput,
    ) -> RepositoryResult<Message> {
        let row = with_executor!(tx, self.base.pool(), |exec| {
            sqlx::query_as::<Postgres, Message>(
                "UPDATE messages SET content = $1, updated_at = NOW() \
                 WHERE id = $2 AND deleted_at IS NULL RETURNING *",
            )
            .bind(&data.content)
            .bind(id)
            .fetch_optional(exec)
            .await
        })
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Update, e)
                .with_entity(Message::NAME, id.to_string())
        })?;

        row.ok_or_else(|| {
            RepositoryError::not_found(Message::NAME, id.to_string())
                .with_operation(RepositoryOperation::Update)
        })
    }

    async fn delete(&self, tx: TxContext<'_>, id: Uuid) -> RepositoryResult<()> {
        self.base.soft_delete(tx, id).await
    }
}
