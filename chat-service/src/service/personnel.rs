//! Personnel records

use uuid::Uuid;

use super::{prepare_filter, Filtered};
use crate::domain::{CreatePersonnelInput, Personnel, UpdatePersonnelInput};
use crate::handlers::ApiError;
use crate::query::{CompilerOptions, FilterInput, QueryOptions};
use crate::repository::{PersonnelRepository, Repository, SecondaryKeyLookup};
use crate::transaction::{Transactioner, TxContext, UnitOfWork};

/// Personnel records of the caller's organization
#[derive(Clone)]
pub struct PersonnelService {
    personnel: PersonnelRepository,
    transactioner: Transactioner,
    compiler: CompilerOptions,
}

impl PersonnelService {
    /// Create the service
    pub fn new(
        personnel: PersonnelRepository,
        transactioner: Transactioner,
        compiler: CompilerOptions,
    ) -> Self {
        Self {
            personnel,
            transactioner,
            compiler,
        }
    }

    /// Find a record by id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Personnel, ApiError> {
        Ok(self.personnel.find_by_id(TxContext::NoTx, id).await?)
    }

    /// Find the record of a user
    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Personnel, ApiError> {
        Ok(self
            .personnel
            .find_by_secondary_key(TxContext::NoTx, &user_id)
            .await?)
    }

    /// Create a record in `organization_id`
    #[tracing::instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create(
        &self,
        organization_id: Option<Uuid>,
        input: CreatePersonnelInput,
    ) -> Result<Personnel, ApiError> {
        let record = Personnel::from_input(input, organization_id);
        Ok(self.personnel.create(TxContext::NoTx, record).await?)
    }

    /// Merge the non-empty fields of `input` into the stored record
    #[tracing::instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePersonnelInput,
    ) -> Result<Personnel, ApiError> {
        let mut uow = self.transactioner.begin().await?;
        let result = self.update_in(&mut uow, id, input).await;
        self.transactioner.finish(uow, result).await
    }

    async fn update_in(
        &self,
        uow: &mut UnitOfWork,
        id: Uuid,
        input: UpdatePersonnelInput,
    ) -> Result<Personnel, ApiError> {
        let mut record = self.personnel.find_by_id(uow.context(), id).await?;
        record.apply(input);
        Ok(self.personnel.update(uow.context(), id, record).await?)
    }

    /// Soft delete a record
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        Ok(self.personnel.delete(TxContext::NoTx, id).await?)
    }

    /// Filter records of the caller's organization
    pub async fn filter(
        &self,
        tenant: Option<Uuid>,
        input: FilterInput,
        options: &QueryOptions,
    ) -> Result<Filtered<Personnel>, ApiError> {
        let input = prepare_filter::<Personnel>(input, options, &self.compiler, tenant)?;
        let page = self.personnel.filter(TxContext::NoTx, &input, options).await?;
        let associations = self
            .personnel
            .load_associations(TxContext::NoTx, &page.items, options)
            .await?;
        Ok(Filtered::new(page, associations))
    }
}
