//! Repository trait definitions
//!
//! Generic traits for entity access using RPITIT (Return Position Impl Trait
//! In Traits). Every operation takes an explicit [`TxContext`] so a caller
//! decides whether it runs on the pool or inside an open unit of work.
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_service::repository::{Repository, RepositoryResult};
//! use chat_service::transaction::TxContext;
//!
//! let user = users.find_by_id(TxContext::NoTx, id).await?;
//! let page = users.filter(TxContext::NoTx, &input, &options).await?;
//! println!("{} of {}", page.items.len(), page.total);
//! ```

use std::future::Future;

use uuid::Uuid;

use super::error::RepositoryError;
use crate::query::{FilterInput, QueryOptions};
use crate::transaction::TxContext;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// One page of a filter request plus the total number of matching rows
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPage<E> {
    /// Rows of the requested page
    pub items: Vec<E>,
    /// Matching rows ignoring limit and offset
    pub total: i64,
}

/// CRUD operations over one entity table
///
/// Reads never see soft-deleted rows. `find_by_id` on a missing or deleted
/// id is a `NotFound` error, and deleting an already deleted id succeeds.
///
/// # Type Parameters
///
/// - `Entity`: the row type returned from queries
/// - `Create`: the data needed to insert a row
/// - `Update`: the data needed to change a row
pub trait Repository<Entity, Create, Update>: Send + Sync {
    /// Find an undeleted row by id
    fn find_by_id(
        &self,
        tx: TxContext<'_>,
        id: Uuid,
    ) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Run a filter request: one COUNT and one SELECT with identical predicates
    ///
    /// Field names must already be validated against the entity's allow-list.
    fn filter(
        &self,
        tx: TxContext<'_>,
        input: &FilterInput,
        options: &QueryOptions,
    ) -> impl Future<Output = RepositoryResult<FilterPage<Entity>>> + Send;

    /// Insert a row; id and timestamps are assigned by the store
    fn create(
        &self,
        tx: TxContext<'_>,
        data: Create,
    ) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Change a row and refresh `updated_at`
    fn update(
        &self,
        tx: TxContext<'_>,
        id: Uuid,
        data: Update,
    ) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Soft delete by setting `deleted_at`
    fn delete(&self, tx: TxContext<'_>, id: Uuid)
        -> impl Future<Output = RepositoryResult<()>> + Send;
}

/// Lookup of a single row by a unique column other than the id
pub trait SecondaryKeyLookup<Key: ?Sized + Sync, Entity>: Send + Sync {
    /// Find the undeleted row whose secondary key equals `key`
    fn find_by_secondary_key(
        &self,
        tx: TxContext<'_>,
        key: &Key,
    ) -> impl Future<Output = RepositoryResult<Entity>> + Send;
}
