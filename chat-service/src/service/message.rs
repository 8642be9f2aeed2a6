//! Messages and their delivery status

use uuid::Uuid;

use super::{prepare_filter, Filtered};
use crate::domain::{
    CreateMessageInput, Message, MessageQuery, MessageState, MessageStatus, UpdateMessageInput,
    UpdateMessageStatusInput,
};
use crate::handlers::ApiError;
use crate::query::{CompilerOptions, FilterInput, QueryOptions};
use crate::repository::{MessageRepository, Repository};
use crate::transaction::{Transactioner, TxContext, UnitOfWork};

/// Messages between users
#[derive(Clone)]
pub struct MessageService {
    messages: MessageRepository,
    transactioner: Transactioner,
    compiler: CompilerOptions,
}

impl MessageService {
    /// Create the service
    pub fn new(
        messages: MessageRepository,
        transactioner: Transactioner,
        compiler: CompilerOptions,
    ) -> Self {
        Self {
            messages,
            transactioner,
            compiler,
        }
    }

    /// Messages matching `query`: by sender, else by receiver, else all
    pub async fn list(&self, query: &MessageQuery) -> Result<Vec<Message>, ApiError> {
        let rows = match (query.sender_id, query.receiver_id) {
            (Some(sender_id), _) => {
                self.messages
                    .find_by_sender_id(TxContext::NoTx, sender_id)
                    .await?
            }
            (None, Some(receiver_id)) => {
                self.messages
                    .find_by_receiver_id(TxContext::NoTx, receiver_id)
                    .await?
            }
            (None, None) => self.messages.find_all(TxContext::NoTx).await?,
        };
        Ok(rows)
    }

    /// Find a message by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Message, ApiError> {
        Ok(self.messages.find_by_id(TxContext::NoTx, id).await?)
    }

    /// Store a message and its initial `Sent` status in one unit of work
    #[tracing::instrument(skip(self, input), fields(sender_id = %input.sender_id))]
    pub async fn create(&self, input: CreateMessageInput) -> Result<Message, ApiError> {
        let mut uow = self.transactioner.begin().await?;
        let result = self.create_in(&mut uow, input).await;
        self.transactioner.finish(uow, result).await
    }

    async fn create_in(
        &self,
        uow: &mut UnitOfWork,
        input: CreateMessageInput,
    ) -> Result<Message, ApiError> {
        let message = self.messages.create(uow.context(), input).await?;
        self.messages
            .create_status(uow.context(), message.id, MessageState::Sent)
            .await?;
        Ok(message)
    }

    /// Replace the content of a message
    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateMessageInput) -> Result<Message, ApiError> {
        let mut uow = self.transactioner.begin().await?;
        let result = self.update_in(&mut uow, id, input).await;
        self.transactioner.finish(uow, result).await
    }

    async fn update_in(
        &self,
        uow: &mut UnitOfWork,
        id: Uuid,
        input: UpdateMessageInput,
    ) -> Result<Message, ApiError> {
        self.messages.find_by_id(uow.context(), id).await?;
        Ok(self.messages.update(uow.context(), id, input).await?)
    }

    /// Move a message to a new delivery state
    #[tracing::instrument(skip(self, input))]
    pub async fn update_status(
        &self,
        id: Uuid,
        input: UpdateMessageStatusInput,
    ) -> Result<MessageStatus, ApiError> {
        let state: MessageState = input.m_status.parse()?;
        Ok(self
            .messages
            .update_status(TxContext::NoTx, id, state)
            .await?)
    }

    /// Soft delete a message together with its status rows
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let mut uow = self.transactioner.begin().await?;
        let result = self.delete_in(&mut uow, id).await;
        self.transactioner.finish(uow, result).await
    }

    async fn delete_in(&self, uow: &mut UnitOfWork, id: Uuid) -> Result<(), ApiError> {
        self.messages.delete(uow.context(), id).await?;
        self.messages.delete_statuses(uow.context(), id).await?;
        Ok(())
    }

    /// Filter messages
    pub async fn filter(
        &self,
        tenant: Option<Uuid>,
        input: FilterInput,
        options: &QueryOptions,
    ) -> Result<Filtered<Message>, ApiError> {
        let input = prepare_filter::<Message>(input, options, &self.compiler, tenant)?;
        let page = self.messages.filter(TxContext::NoTx, &input, options).await?;
        let associations = self
            .messages
            .load_associations(TxContext::NoTx, &page.items, options)
            .await?;
        Ok(Filtered::new(page, associations))
    }
}
