//! Business operations over the repositories
//!
//! Services own the unit-of-work boundaries: composite writes open a
//! [`UnitOfWork`](crate::transaction::UnitOfWork), run every step on it and
//! settle it through [`Transactioner::finish`](crate::transaction::Transactioner::finish).
//! Errors are reported as [`ApiError`] so handlers can return them directly.

mod message;
mod personnel;
mod user;

pub use message::MessageService;
pub use personnel::PersonnelService;
pub use user::UserService;

use uuid::Uuid;

use crate::domain::Entity;
use crate::handlers::{ApiError, ApiOperation};
use crate::query::{self, CompilerOptions, FilterInput, QueryOptions};
use crate::repository::{Associations, FilterPage};

/// One page of a filter request with its loaded associations
#[derive(Debug, Clone)]
pub struct Filtered<E> {
    /// Rows of the page
    pub items: Vec<E>,
    /// Matching rows across all pages
    pub total: i64,
    /// Associations keyed by name
    pub associations: Associations,
}

impl<E> Filtered<E> {
    fn new(page: FilterPage<E>, associations: Associations) -> Self {
        Self {
            items: page.items,
            total: page.total,
            associations,
        }
    }
}

/// Check client supplied names against `E`'s allow-list and scope the filter to `tenant`
pub(crate) fn prepare_filter<E: Entity>(
    input: FilterInput,
    options: &QueryOptions,
    compiler: &CompilerOptions,
    tenant: Option<Uuid>,
) -> Result<FilterInput, ApiError> {
    let allow = E::allow_list();
    query::validate(&allow, &input, options, compiler)
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Filter))?;
    Ok(query::bind_text_columns(&allow, input).with_tenant(tenant))
}

/// Run CPU heavy work (password hashing) off the async workers
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(format!("blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::handlers::ApiErrorKind;
    use crate::query::{FieldPredicate, SortKey};

    #[test]
    fn test_prepare_filter_sets_tenant() {
        let tenant = Uuid::new_v4();
        let input = FilterInput::default().with_predicate(FieldPredicate::eq("role", "ADMIN"));
        let prepared = prepare_filter::<User>(
            input,
            &QueryOptions::default(),
            &CompilerOptions::default(),
            Some(tenant),
        )
        .unwrap();
        assert_eq!(prepared.tenant_id, Some(tenant));
    }

    #[test]
    fn test_prepare_filter_rejects_secret_columns() {
        let input = FilterInput::default()
            .with_predicate(FieldPredicate::eq("password", "x"))
            .with_sort(SortKey::asc("nope"));
        let err = prepare_filter::<User>(
            input,
            &QueryOptions::default(),
            &CompilerOptions::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ValidationFailed);
        assert_eq!(err.operation, ApiOperation::Filter);
        assert_eq!(err.fields.len(), 2);
    }

    #[tokio::test]
    async fn test_blocking_maps_errors() {
        let err = blocking::<(), _>(|| Err(crate::error::Error::Auth("boom".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InternalError);
    }
}
