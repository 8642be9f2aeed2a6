//! Column allow-list validation
//!
//! Field names are interpolated into SQL, so every name a client supplies
//! (predicates, sort keys, projection, associations and their projections)
//! must appear in the entity's static column list before compilation.

use thiserror::Error;

use super::compiler::{BetweenMode, CompilerOptions};
use super::filter::{split_fields, FilterInput, FilterOperator, QueryOptions};

/// Static column list of an entity and of the associations it can load
#[derive(Debug, Clone, Copy)]
pub struct AllowList {
    /// Columns of the entity's table
    pub columns: &'static [&'static str],
    /// Subset of `columns` stored as TEXT
    pub text_columns: &'static [&'static str],
    /// Association name paired with the associated table's columns
    pub associations: &'static [(&'static str, &'static [&'static str])],
}

impl AllowList {
    fn has_column(&self, field: &str) -> bool {
        self.columns.contains(&field)
    }

    fn association(&self, name: &str) -> Option<&'static [&'static str]> {
        self.associations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, cols)| *cols)
    }
}

/// Bind predicate values on TEXT columns as text
///
/// A UUID-shaped or timestamp-shaped string compared against a TEXT column
/// would otherwise reach Postgres as `uuid` or `timestamptz`.
#[must_use]
pub fn bind_text_columns(allow: &AllowList, mut input: FilterInput) -> FilterInput {
    for predicate in &mut input.fields {
        if allow.text_columns.contains(&predicate.field.as_str()) {
            predicate.value = std::mem::take(&mut predicate.value).into_text();
        }
    }
    input
}

/// Every offending field of a rejected filter request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter fields: {}", .fields.join("; "))]
pub struct ColumnError {
    /// One message per violation
    pub fields: Vec<String>,
}

/// Check a filter request against `allow`
pub fn validate(
    allow: &AllowList,
    input: &FilterInput,
    options: &QueryOptions,
    compiler: &CompilerOptions,
) -> Result<(), ColumnError> {
    let mut fields = Vec::new();

    for predicate in &input.fields {
        if !allow.has_column(&predicate.field) {
            fields.push(format!("{} is not a filterable field", predicate.field));
            continue;
        }
        if predicate.operator == FilterOperator::Between
            && compiler.between == BetweenMode::Pair
            && !(predicate.value.is_list() && predicate.value.len() == 2)
        {
            fields.push(format!(
                "{} between expects a two-element list",
                predicate.field
            ));
        }
    }

    for key in &input.sort_keys {
        if !allow.has_column(&key.field) {
            fields.push(format!("{} is not a sortable field", key.field));
        }
    }

    for field in split_fields(&options.select_fields) {
        if !allow.has_column(field) {
            fields.push(format!("{} is not a selectable field", field));
        }
    }

    for association in &options.associations {
        match allow.association(&association.name) {
            Some(columns) => {
                for field in split_fields(&association.select_fields) {
                    if !columns.contains(&field) {
                        fields.push(format!(
                            "{}.{} is not a selectable field",
                            association.name, field
                        ));
                    }
                }
            }
            None => fields.push(format!("{} is not a known association", association.name)),
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ColumnError { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FieldPredicate, FilterValue, QueryAssociation, SortKey};
    use uuid::Uuid;

    const ALLOW: AllowList = AllowList {
        columns: &["id", "user_name", "role", "created_at"],
        text_columns: &["user_name", "role"],
        associations: &[("personnel", &["id", "first_name", "user_id"])],
    };

    #[test]
    fn test_accepts_known_fields() {
        let input = FilterInput::default()
            .with_predicate(FieldPredicate::eq("role", "ADMIN"))
            .with_sort(SortKey::desc("created_at"));
        let options = QueryOptions::default()
            .with_fields("id, user_name")
            .with_association(QueryAssociation::new("personnel", "first_name"));
        assert!(validate(&ALLOW, &input, &options, &CompilerOptions::default()).is_ok());
    }

    #[test]
    fn test_rejects_injection_attempt() {
        let input = FilterInput::default()
            .with_predicate(FieldPredicate::eq("role; DROP TABLE users; --", "x"));
        let err = validate(
            &ALLOW,
            &input,
            &QueryOptions::default(),
            &CompilerOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.fields.len(), 1);
    }

    #[test]
    fn test_collects_every_violation() {
        let input = FilterInput::default()
            .with_predicate(FieldPredicate::eq("password", "x"))
            .with_sort(SortKey::asc("nope"));
        let options = QueryOptions::default()
            .with_fields("id, secret")
            .with_association(QueryAssociation::new("organization", "*"))
            .with_association(QueryAssociation::new("personnel", "salary"));
        let err = validate(&ALLOW, &input, &options, &CompilerOptions::default()).unwrap_err();
        assert_eq!(
            err.fields,
            vec![
                "password is not a filterable field".to_string(),
                "nope is not a sortable field".to_string(),
                "secret is not a selectable field".to_string(),
                "organization is not a known association".to_string(),
                "personnel.salary is not a selectable field".to_string(),
            ]
        );
    }

    #[test]
    fn test_between_shape_checked_in_pair_mode_only() {
        let input = FilterInput::default().with_predicate(FieldPredicate::new(
            "created_at",
            FilterOperator::Between,
            "2024-01-01T00:00:00Z",
        ));
        let options = QueryOptions::default();
        assert!(validate(&ALLOW, &input, &options, &CompilerOptions::default()).is_err());
        assert!(validate(&ALLOW, &input, &options, &CompilerOptions::literal()).is_ok());
    }

    #[test]
    fn test_star_projection_is_allowed() {
        let options = QueryOptions::default()
            .with_fields("*")
            .with_association(QueryAssociation::new("personnel", "*"));
        assert!(validate(
            &ALLOW,
            &FilterInput::default(),
            &options,
            &CompilerOptions::default()
        )
        .is_ok());
    }

    #[test]
    fn test_text_columns_bind_as_text() {
        let id = Uuid::new_v4();
        let input = FilterInput::default()
            .with_predicate(FieldPredicate::eq("user_name", FilterValue::Uuid(id)))
            .with_predicate(FieldPredicate::eq("id", FilterValue::Uuid(id)));
        let input = bind_text_columns(&ALLOW, input);
        assert_eq!(input.fields[0].value, FilterValue::Text(id.to_string()));
        assert_eq!(input.fields[1].value, FilterValue::Uuid(id));
    }
}
