//! Entities, request inputs and the table mapping used by the repositories
//!
//! Each entity implements [`Entity`], which names its table, its column
//! allow-list and the associations it can load. The allow-list is what the
//! filter endpoints validate client supplied field names against.

pub mod message;
pub mod personnel;
pub mod user;
pub mod validate;

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use uuid::Uuid;

use crate::query::AllowList;

pub use message::{
    CreateMessageInput, Message, MessageQuery, MessageState, MessageStatus, UpdateMessageInput,
    UpdateMessageStatusInput,
};
pub use personnel::{
    ActivationStatus, Address, CreatePersonnelInput, Gender, Personnel, UpdatePersonnelInput,
};
pub use user::{
    LoginInput, LoginOutput, NewUser, RegisterUserInput, UpdateUserInput, User, UserChanges,
    UserRole,
};
pub use validate::{Validate, ValidationError, Violations};

/// A soft-deletable row of one table
///
/// `COLUMNS` is the allow-list for filtering, sorting and projection. It
/// never names secret columns, so `*` projections in association loads
/// expand to it.
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    /// Name used in errors and logs
    const NAME: &'static str;
    /// Table name
    const TABLE: &'static str;
    /// Columns a client may reference
    const COLUMNS: &'static [&'static str];
    /// Columns of `COLUMNS` stored as TEXT
    const TEXT_COLUMNS: &'static [&'static str] = &[];
    /// Column restricting rows to the caller's organization
    const TENANT_COLUMN: Option<&'static str> = None;
    /// Loadable associations with the associated table's columns
    const ASSOCIATIONS: &'static [(&'static str, &'static [&'static str])] = &[];

    /// Primary key
    fn id(&self) -> Uuid;

    /// Allow-list for filter validation
    fn allow_list() -> AllowList {
        AllowList {
            columns: Self::COLUMNS,
            text_columns: Self::TEXT_COLUMNS,
            associations: Self::ASSOCIATIONS,
        }
    }
}
