//! HTTP-facing building blocks shared by the API routes
//!
//! # Features
//!
//! - **Query decoding**: [`PageQuery`] turns `page`, `size`, `fields` and
//!   `associations` into repository [`QueryOptions`](crate::query::QueryOptions)
//! - **Envelopes**: [`BaseResponse`], [`PaginationResponse`] and [`Created`]
//! - **Validated bodies**: [`ValidatedJson`] rejects invalid input with a field list
//! - **Error handling**: [`ApiError`] with automatic HTTP status code mapping
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{extract::{Query, State}, Json};
//! use chat_service::handlers::{ApiError, PageQuery, PaginationResponse, ValidatedJson};
//!
//! async fn filter_users(
//!     State(state): State<AppState>,
//!     Query(query): Query<PageQuery>,
//!     Json(input): Json<FilterInput>,
//! ) -> Result<PaginationResponse<User>, ApiError> {
//!     let page = state.users().filter(claims, input, query.to_options()).await?;
//!     Ok(PaginationResponse::new(page.items, page.total, &query))
//! }
//! ```

mod error;
mod extract;
mod query;
mod response;

pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use extract::ValidatedJson;
pub use query::{parse_associations, PageQuery, PAGE_MAX};
pub use response::{BaseResponse, Created, PaginationResponse};
