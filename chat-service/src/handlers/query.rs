//! Query string decoding for filter endpoints
//!
//! `page` is zero based and `size` is clamped to [`PAGE_MAX`]; values that do
//! not parse as integers count as absent. The row offset saturates at
//! `i64::MAX`, so an absurd page yields an empty page rather than page zero. `fields` is a comma separated
//! projection and `associations` lists `name:fields` pairs separated by `|`.
//!
//! # Example
//!
//! ```rust
//! use chat_service::handlers::PageQuery;
//!
//! let query = PageQuery {
//!     page: Some("2".to_string()),
//!     size: Some("25".to_string()),
//!     fields: Some("id,first_name".to_string()),
//!     associations: Some("user:id,user_name".to_string()),
//! };
//! let options = query.to_options();
//!
//! assert_eq!(options.limit, 25);
//! assert_eq!(options.offset, 50);
//! assert_eq!(options.associations[0].name, "user");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::query::{QueryAssociation, QueryOptions};

/// Maximum and default page size
pub const PAGE_MAX: i64 = 500;

/// Query parameters of the filter endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero based page number
    #[param(value_type = Option<i64>, example = 0)]
    pub page: Option<String>,
    /// Page size, at most 500
    #[param(value_type = Option<i64>, example = 10)]
    pub size: Option<String>,
    /// Comma separated columns to return
    #[param(example = "id,first_name")]
    pub fields: Option<String>,
    /// `name:fields` pairs separated by `|`; missing fields mean `*`
    #[param(example = "user:id,user_name")]
    pub associations: Option<String>,
}

fn lenient(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

impl PageQuery {
    /// Effective page number, never negative
    #[must_use]
    pub fn page_number(&self) -> i64 {
        lenient(self.page.as_deref()).max(0)
    }

    /// Effective page size: 1 to [`PAGE_MAX`], non-positive or missing means [`PAGE_MAX`]
    #[must_use]
    pub fn page_size(&self) -> i64 {
        match lenient(self.size.as_deref()) {
            size if size <= 0 || size > PAGE_MAX => PAGE_MAX,
            size => size,
        }
    }

    /// Rows to skip
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.page_number().saturating_mul(self.page_size())
    }

    /// Decode into repository query options
    #[must_use]
    pub fn to_options(&self) -> QueryOptions {
        QueryOptions {
            limit: self.page_size(),
            offset: self.offset(),
            select_fields: self.fields.clone().unwrap_or_default(),
            associations: self
                .associations
                .as_deref()
                .map(parse_associations)
                .unwrap_or_default(),
        }
    }
}

/// Parse `name:fields|name2:fields2`; an entry without `:` selects `*`
pub fn parse_associations(raw: &str) -> Vec<QueryAssociation> {
    raw.split('|')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, fields)) => QueryAssociation::new(name.trim(), fields.trim()),
            None => QueryAssociation::new(entry, "*"),
        })
        .collect()
}
