//! Entity repositories over PostgreSQL
//!
//! # Features
//!
//! - **Generic reads**: [`EntityRepository`] for lookup, list, filter and soft delete
//! - **Per-entity writes**: [`UserRepository`], [`PersonnelRepository`], [`MessageRepository`]
//! - **Associations**: one-hop loading through [`association::load`]
//! - **Typed errors**: [`RepositoryError`] classified from driver errors
//!
//! Every operation takes a [`TxContext`](crate::transaction::TxContext) and
//! never sees soft-deleted rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_service::repository::{Repository, UserRepository};
//! use chat_service::transaction::TxContext;
//!
//! let users = UserRepository::new(pool, CompilerOptions::default());
//! let page = users.filter(TxContext::NoTx, &input, &options).await?;
//! ```

pub mod association;
mod entity;
mod error;
mod message;
mod personnel;
mod traits;
mod user;

pub use association::{Associations, Cardinality};
pub use entity::EntityRepository;
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use message::MessageRepository;
pub use personnel::PersonnelRepository;
pub use traits::{FilterPage, Repository, RepositoryResult, SecondaryKeyLookup};
pub use user::UserRepository;
