//! Filter descriptor types
//!
//! A [`FilterInput`] is what a client posts to a `/filter` endpoint: a flat,
//! AND-only list of [`FieldPredicate`]s plus an ordered list of [`SortKey`]s.
//! [`QueryOptions`] carries the pagination, projection and association
//! settings decoded from the query string.
//!
//! # Example
//!
//! ```rust
//! use chat_service::query::{FieldPredicate, FilterInput, SortKey};
//!
//! let input = FilterInput::default()
//!     .with_predicate(FieldPredicate::eq("role", "ADMIN"))
//!     .with_predicate(FieldPredicate::ilike("user_name", "jo"))
//!     .with_sort(SortKey::desc("created_at"));
//!
//! assert_eq!(input.fields.len(), 2);
//! assert_eq!(input.sort_keys.len(), 1);
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Validate, ValidationError, Violations};

/// Comparison operators accepted in a field predicate
///
/// The wire names are the lowercase short forms (`eq`, `nin`, `ilike`, ...).
/// `Display` renders the SQL operator.
///
/// # Example
///
/// ```rust
/// use chat_service::query::FilterOperator;
///
/// assert_eq!(format!("{}", FilterOperator::NotEqual), "<>");
/// assert_eq!(FilterOperator::NotEqual.as_str(), "neq");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum FilterOperator {
    /// Equal to (=)
    #[serde(rename = "eq")]
    Equal,
    /// Not equal to (<>)
    #[serde(rename = "neq")]
    NotEqual,
    /// Greater than (>)
    #[serde(rename = "gt")]
    GreaterThan,
    /// Greater than or equal to (>=)
    #[serde(rename = "gte")]
    GreaterThanOrEqual,
    /// Less than (<)
    #[serde(rename = "lt")]
    LessThan,
    /// Less than or equal to (<=)
    #[serde(rename = "lte")]
    LessThanOrEqual,
    /// Value is one of a list (= ANY)
    #[serde(rename = "in")]
    In,
    /// Value is not in a list (NOT IN)
    #[serde(rename = "nin")]
    NotIn,
    /// Case-sensitive substring match (LIKE)
    #[serde(rename = "like")]
    Like,
    /// Negated substring match (NOT LIKE)
    #[serde(rename = "nlike")]
    NotLike,
    /// Case-insensitive substring match (ILIKE)
    #[serde(rename = "ilike")]
    ILike,
    /// Negated case-insensitive substring match (NOT ILIKE)
    #[serde(rename = "nilike")]
    NotILike,
    /// Value is null (IS NULL)
    #[serde(rename = "isnull")]
    IsNull,
    /// Value is not null (IS NOT NULL)
    #[serde(rename = "notnull")]
    IsNotNull,
    /// Value lies within an inclusive range (BETWEEN)
    #[serde(rename = "between")]
    Between,
}

impl FilterOperator {
    /// The operator's wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "neq",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "gte",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "lte",
            Self::In => "in",
            Self::NotIn => "nin",
            Self::Like => "like",
            Self::NotLike => "nlike",
            Self::ILike => "ilike",
            Self::NotILike => "nilike",
            Self::IsNull => "isnull",
            Self::IsNotNull => "notnull",
            Self::Between => "between",
        }
    }

    /// The SQL operator this predicate compiles to
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::In => "= ANY",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::Between => "BETWEEN",
        }
    }

    /// Whether the bound value is rewritten into a `%value%` pattern
    #[must_use]
    pub const fn is_pattern(&self) -> bool {
        matches!(
            self,
            Self::Like | Self::NotLike | Self::ILike | Self::NotILike
        )
    }

    /// Whether the predicate consumes no placeholder at all
    #[must_use]
    pub const fn is_nullary(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A value bound into a compiled query
///
/// Decoded from arbitrary JSON. Strings that parse as UUIDs or RFC 3339
/// timestamps become typed values so Postgres receives parameters of the
/// column's declared type. Homogeneous arrays become typed lists; mixed
/// arrays degrade to [`FilterValue::TextList`]. Predicates on TEXT columns
/// are rebound with [`FilterValue::into_text`] before compilation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterValue {
    /// Text value
    Text(String),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// UUID value
    Uuid(Uuid),
    /// Timestamp value
    Timestamp(DateTime<Utc>),
    /// SQL NULL
    #[default]
    Null,
    /// List of text values
    TextList(Vec<String>),
    /// List of integer values
    IntegerList(Vec<i64>),
    /// List of floating point values
    FloatList(Vec<f64>),
    /// List of boolean values
    BooleanList(Vec<bool>),
    /// List of UUID values
    UuidList(Vec<Uuid>),
    /// List of timestamp values
    TimestampList(Vec<DateTime<Utc>>),
}

impl FilterValue {
    /// Decode a JSON value, coercing strings to UUIDs and timestamps where they parse
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                Self::from_elements(items.into_iter().map(Self::scalar_from_json).collect())
            }
            other => Self::scalar_from_json(other),
        }
    }

    fn scalar_from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::from_text(s),
            nested => Self::Text(nested.to_string()),
        }
    }

    fn from_text(s: String) -> Self {
        if let Ok(id) = Uuid::parse_str(&s) {
            return Self::Uuid(id);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(&s) {
            return Self::Timestamp(ts.with_timezone(&Utc));
        }
        Self::Text(s)
    }

    /// Build a typed list from scalar elements
    ///
    /// All elements of the same kind produce the matching typed list; any mix
    /// (including nulls) produces a text list of the stringified elements.
    pub fn from_elements(elements: Vec<FilterValue>) -> Self {
        macro_rules! homogeneous {
            ($variant:ident, $list:ident) => {
                if elements.iter().all(|e| matches!(e, Self::$variant(_))) {
                    return Self::$list(
                        elements
                            .into_iter()
                            .filter_map(|e| match e {
                                Self::$variant(v) => Some(v),
                                _ => None,
                            })
                            .collect(),
                    );
                }
            };
        }

        if elements.is_empty() {
            return Self::TextList(Vec::new());
        }
        homogeneous!(Integer, IntegerList);
        homogeneous!(Boolean, BooleanList);
        homogeneous!(Uuid, UuidList);
        homogeneous!(Timestamp, TimestampList);
        homogeneous!(Text, TextList);
        if elements
            .iter()
            .all(|e| matches!(e, Self::Float(_) | Self::Integer(_)))
        {
            return Self::FloatList(
                elements
                    .into_iter()
                    .filter_map(|e| match e {
                        Self::Float(f) => Some(f),
                        Self::Integer(i) => Some(i as f64),
                        _ => None,
                    })
                    .collect(),
            );
        }
        Self::TextList(elements.iter().map(Self::to_text).collect())
    }

    /// Whether this value is one of the list variants
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Self::TextList(_)
                | Self::IntegerList(_)
                | Self::FloatList(_)
                | Self::BooleanList(_)
                | Self::UuidList(_)
                | Self::TimestampList(_)
        )
    }

    /// Number of elements (1 for a scalar, 0 for NULL)
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Null => 0,
            Self::TextList(v) => v.len(),
            Self::IntegerList(v) => v.len(),
            Self::FloatList(v) => v.len(),
            Self::BooleanList(v) => v.len(),
            Self::UuidList(v) => v.len(),
            Self::TimestampList(v) => v.len(),
            _ => 1,
        }
    }

    /// Whether the value holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render as plain text, lists joined with commas
    #[must_use]
    pub fn to_text(&self) -> String {
        fn join<T: ToString>(items: &[T]) -> String {
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }

        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Uuid(id) => id.to_string(),
            Self::Timestamp(ts) => ts.to_rfc3339(),
            Self::Null => String::new(),
            Self::TextList(v) => v.join(","),
            Self::IntegerList(v) => join(v),
            Self::FloatList(v) => join(v),
            Self::BooleanList(v) => join(v),
            Self::UuidList(v) => join(v),
            Self::TimestampList(v) => v
                .iter()
                .map(DateTime::to_rfc3339)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Rebind for a TEXT column: every non-null element becomes text
    ///
    /// UUIDs render hyphenated lowercase and timestamps as RFC 3339 in UTC
    /// with a `Z` suffix.
    #[must_use]
    pub fn into_text(self) -> Self {
        fn text(value: FilterValue) -> String {
            match value {
                FilterValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                other => other.to_text(),
            }
        }

        match self {
            Self::Null | Self::Text(_) | Self::TextList(_) => self,
            list if list.is_list() => {
                Self::TextList(list.into_elements().into_iter().map(text).collect())
            }
            scalar => Self::Text(text(scalar)),
        }
    }

    /// Split into scalar elements; a scalar yields itself, NULL yields nothing
    #[must_use]
    pub fn into_elements(self) -> Vec<FilterValue> {
        match self {
            Self::Null => Vec::new(),
            Self::TextList(v) => v.into_iter().map(Self::Text).collect(),
            Self::IntegerList(v) => v.into_iter().map(Self::Integer).collect(),
            Self::FloatList(v) => v.into_iter().map(Self::Float).collect(),
            Self::BooleanList(v) => v.into_iter().map(Self::Boolean).collect(),
            Self::UuidList(v) => v.into_iter().map(Self::Uuid).collect(),
            Self::TimestampList(v) => v.into_iter().map(Self::Timestamp).collect(),
            scalar => vec![scalar],
        }
    }

    /// Wrap a scalar into a one-element list; lists pass through
    #[must_use]
    pub fn into_array(self) -> FilterValue {
        if self.is_list() {
            self
        } else {
            Self::from_elements(self.into_elements())
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Uuid(id) => Value::String(id.to_string()),
            Self::Timestamp(ts) => Value::String(ts.to_rfc3339()),
            Self::Null => Value::Null,
            list => Value::Array(
                list.clone()
                    .into_elements()
                    .iter()
                    .map(Self::to_json)
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Uuid> for FilterValue {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(list: Vec<String>) -> Self {
        Self::TextList(list)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(list: Vec<&str>) -> Self {
        Self::TextList(list.into_iter().map(String::from).collect())
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(list: Vec<i64>) -> Self {
        Self::IntegerList(list)
    }
}

impl From<Vec<Uuid>> for FilterValue {
    fn from(list: Vec<Uuid>) -> Self {
        Self::UuidList(list)
    }
}

/// One `field <op> value` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldPredicate {
    /// Column name, checked against the entity's allow-list
    #[schema(example = "role")]
    pub field: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Bound value; a two-element list for `between`, a list for `in`/`nin`
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: FilterValue,
}

impl FieldPredicate {
    /// Create a new predicate
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value)
    }

    /// `field <> value`
    pub fn neq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::NotEqual, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value)
    }

    /// `field = ANY(values)`
    pub fn is_in(field: impl Into<String>, values: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::In, values)
    }

    /// `field NOT IN (values)`
    pub fn not_in(field: impl Into<String>, values: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::NotIn, values)
    }

    /// `field LIKE %value%`
    pub fn like(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Like, value)
    }

    /// `field ILIKE %value%`
    pub fn ilike(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::ILike, value)
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, FilterValue::Null)
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, FilterValue::Null)
    }

    /// `field BETWEEN low AND high`
    pub fn between(
        field: impl Into<String>,
        low: impl Into<FilterValue>,
        high: impl Into<FilterValue>,
    ) -> Self {
        Self::new(
            field,
            FilterOperator::Between,
            FilterValue::from_elements(vec![low.into(), high.into()]),
        )
    }
}

/// Sort direction of a [`SortKey`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order
    #[default]
    Asc,
    /// Descending order
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// One ORDER BY term, applied in list order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SortKey {
    /// Column name
    #[schema(example = "created_at")]
    pub field: String,
    /// Direction, ascending when omitted
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending sort on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Filter request body
///
/// `tenant_id` is never read from the body; controllers set it from the
/// authenticated claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterInput {
    /// Tenant guard applied before any predicate
    #[serde(skip)]
    pub tenant_id: Option<Uuid>,
    /// AND-joined predicates; order fixes placeholder numbering
    #[serde(default)]
    pub fields: Vec<FieldPredicate>,
    /// Sort keys, applied in order
    #[serde(default)]
    pub sort_keys: Vec<SortKey>,
}

impl FilterInput {
    /// Restrict the query to one tenant
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: Option<Uuid>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    /// Append a predicate
    #[must_use]
    pub fn with_predicate(mut self, predicate: FieldPredicate) -> Self {
        self.fields.push(predicate);
        self
    }

    /// Append a sort key
    #[must_use]
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort_keys.push(key);
        self
    }
}

/// Column names must be present; the allow-list check happens per entity
impl Validate for FilterInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new();
        for (i, predicate) in self.fields.iter().enumerate() {
            violations.required(&format!("fields[{}].field", i), &predicate.field);
        }
        for (i, key) in self.sort_keys.iter().enumerate() {
            violations.required(&format!("sort_keys[{}].field", i), &key.field);
        }
        violations.finish()
    }
}

/// A one-hop association to load alongside a filter result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueryAssociation {
    /// Association name, e.g. `user` or `statuses`
    pub name: String,
    /// Comma separated projection, `*` for all columns
    #[serde(rename = "selectFields", alias = "select_fields")]
    pub select_fields: String,
}

impl QueryAssociation {
    /// Create an association request
    pub fn new(name: impl Into<String>, select_fields: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            select_fields: select_fields.into(),
        }
    }
}

/// Pagination, projection and association settings for a filter query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueryOptions {
    /// Row limit, ignored when not positive
    pub limit: i64,
    /// Row offset, ignored when not positive
    pub offset: i64,
    /// Comma separated projection; empty or `*` selects every column
    #[serde(rename = "selectFields", alias = "select_fields")]
    pub select_fields: String,
    /// Associations to load
    #[serde(default)]
    pub associations: Vec<QueryAssociation>,
}

impl QueryOptions {
    /// Set limit and offset
    #[must_use]
    pub fn with_page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Set the projection
    #[must_use]
    pub fn with_fields(mut self, select_fields: impl Into<String>) -> Self {
        self.select_fields = select_fields.into();
        self
    }

    /// Request an association
    #[must_use]
    pub fn with_association(mut self, association: QueryAssociation) -> Self {
        self.associations.push(association);
        self
    }

    /// The requested projection fields, trimmed; empty means every column
    #[must_use]
    pub fn projection(&self) -> Vec<&str> {
        split_fields(&self.select_fields)
    }
}

/// Split a comma separated field list, treating `*` and blanks as "all"
pub(crate) fn split_fields(fields: &str) -> Vec<&str> {
    let parts: Vec<&str> = fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if parts.iter().any(|f| *f == "*") {
        Vec::new()
    } else {
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_wire_names() {
        let op: FilterOperator = serde_json::from_value(json!("nilike")).unwrap();
        assert_eq!(op, FilterOperator::NotILike);
        assert_eq!(op.as_sql(), "NOT ILIKE");
        assert!(serde_json::from_value::<FilterOperator>(json!("contains")).is_err());
    }

    #[test]
    fn test_into_text_rebinds_typed_values() {
        let id = Uuid::new_v4();
        assert_eq!(
            FilterValue::from_json(json!(id.to_string())).into_text(),
            FilterValue::Text(id.to_string())
        );
        assert_eq!(
            FilterValue::from_json(json!("2024-01-02T03:04:05Z")).into_text(),
            FilterValue::Text("2024-01-02T03:04:05Z".to_string())
        );
        assert_eq!(
            FilterValue::from_json(json!([1, 2])).into_text(),
            FilterValue::TextList(vec!["1".to_string(), "2".to_string()])
        );
        assert_eq!(FilterValue::Null.into_text(), FilterValue::Null);
    }

    #[test]
    fn test_operator_display_is_sql() {
        assert_eq!(FilterOperator::Equal.to_string(), "=");
        assert_eq!(FilterOperator::IsNotNull.to_string(), "IS NOT NULL");
    }

    #[test]
    fn test_value_scalar_coercion() {
        assert_eq!(FilterValue::from_json(json!(42)), FilterValue::Integer(42));
        assert_eq!(FilterValue::from_json(json!(1.5)), FilterValue::Float(1.5));
        assert_eq!(FilterValue::from_json(json!(true)), FilterValue::Boolean(true));
        assert_eq!(FilterValue::from_json(json!(null)), FilterValue::Null);
        assert_eq!(
            FilterValue::from_json(json!("ADMIN")),
            FilterValue::Text("ADMIN".to_string())
        );

        let id = Uuid::new_v4();
        assert_eq!(
            FilterValue::from_json(json!(id.to_string())),
            FilterValue::Uuid(id)
        );

        match FilterValue::from_json(json!("2024-01-02T03:04:05Z")) {
            FilterValue::Timestamp(ts) => assert_eq!(ts.timestamp(), 1_704_164_645),
            other => panic!("expected timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_value_list_coercion() {
        assert_eq!(
            FilterValue::from_json(json!(["ADMIN", "USER"])),
            FilterValue::TextList(vec!["ADMIN".to_string(), "USER".to_string()])
        );
        assert_eq!(
            FilterValue::from_json(json!([1, 2, 3])),
            FilterValue::IntegerList(vec![1, 2, 3])
        );
        assert_eq!(
            FilterValue::from_json(json!([1, 2.5])),
            FilterValue::FloatList(vec![1.0, 2.5])
        );
        assert_eq!(
            FilterValue::from_json(json!(["a", 1, true])),
            FilterValue::TextList(vec!["a".to_string(), "1".to_string(), "true".to_string()])
        );
        assert_eq!(
            FilterValue::from_json(json!([])),
            FilterValue::TextList(Vec::new())
        );
    }

    #[test]
    fn test_value_into_array_wraps_scalar() {
        assert_eq!(
            FilterValue::from("ADMIN").into_array(),
            FilterValue::TextList(vec!["ADMIN".to_string()])
        );
        let list = FilterValue::IntegerList(vec![1, 2]);
        assert_eq!(list.clone().into_array(), list);
    }

    #[test]
    fn test_value_len() {
        assert_eq!(FilterValue::Null.len(), 0);
        assert_eq!(FilterValue::from(7_i64).len(), 1);
        assert_eq!(FilterValue::IntegerList(vec![1, 2, 3]).len(), 3);
        assert!(FilterValue::TextList(Vec::new()).is_empty());
    }

    #[test]
    fn test_value_serializes_as_plain_json() {
        let value = FilterValue::IntegerList(vec![1, 2]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_filter_input_ignores_tenant_in_body() {
        let tenant = Uuid::new_v4();
        let body = json!({
            "tenant_id": tenant.to_string(),
            "fields": [{"field": "role", "operator": "eq", "value": "ADMIN"}],
            "sort_keys": [{"field": "created_at", "direction": "desc"}]
        });
        let input: FilterInput = serde_json::from_value(body).unwrap();
        assert!(input.tenant_id.is_none());
        assert_eq!(input.fields[0], FieldPredicate::eq("role", "ADMIN"));
        assert_eq!(input.sort_keys[0], SortKey::desc("created_at"));
    }

    #[test]
    fn test_sort_direction_rejects_unknown() {
        let body = json!({"field": "created_at", "direction": "sideways"});
        assert!(serde_json::from_value::<SortKey>(body).is_err());

        let body = json!({"field": "created_at"});
        let key: SortKey = serde_json::from_value(body).unwrap();
        assert_eq!(key.direction, SortDirection::Asc);
    }

    #[test]
    fn test_between_constructor_builds_pair() {
        let predicate = FieldPredicate::between("age", 18_i64, 30_i64);
        assert_eq!(predicate.value, FilterValue::IntegerList(vec![18, 30]));
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields(" id , user_name,"), vec!["id", "user_name"]);
        assert!(split_fields("*").is_empty());
        assert!(split_fields("").is_empty());
    }
}
