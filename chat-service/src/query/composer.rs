//! Sort, pagination and projection composition
//!
//! Applied after predicate compilation, in the fixed order
//! sort, then limit/offset, then projection.

use super::compiler::SortStyle;
use super::filter::{split_fields, SortKey};

/// Append ORDER BY for `keys` in the given style
pub fn apply_sort(mut sql: String, keys: &[SortKey], style: SortStyle) -> String {
    if keys.is_empty() {
        return sql;
    }
    match style {
        SortStyle::Joined => {
            let terms: Vec<String> = keys
                .iter()
                .map(|k| format!("{} {}", k.field, k.direction))
                .collect();
            sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
        }
        SortStyle::Repeated => {
            for key in keys {
                sql.push_str(&format!(" ORDER BY {} {}", key.field, key.direction));
            }
        }
    }
    sql
}

/// Append LIMIT and OFFSET, each only when positive
pub fn apply_limit_offset(mut sql: String, limit: i64, offset: i64) -> String {
    if limit > 0 {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {}", offset));
    }
    sql
}

/// Replace the first `SELECT * FROM` with the requested columns
pub fn apply_projection(sql: String, select_fields: &str) -> String {
    let fields = split_fields(select_fields);
    if fields.is_empty() {
        return sql;
    }
    sql.replacen(
        "SELECT * FROM",
        &format!("SELECT {} FROM", fields.join(", ")),
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT * FROM users WHERE deleted_at IS NULL";

    #[test]
    fn test_sort_joined() {
        let keys = vec![SortKey::asc("role"), SortKey::desc("created_at")];
        assert_eq!(
            apply_sort(BASE.to_string(), &keys, SortStyle::Joined),
            format!("{} ORDER BY role asc, created_at desc", BASE)
        );
    }

    #[test]
    fn test_sort_repeated() {
        let keys = vec![SortKey::asc("role"), SortKey::desc("created_at")];
        assert_eq!(
            apply_sort(BASE.to_string(), &keys, SortStyle::Repeated),
            format!("{} ORDER BY role asc ORDER BY created_at desc", BASE)
        );
    }

    #[test]
    fn test_sort_without_keys() {
        assert_eq!(apply_sort(BASE.to_string(), &[], SortStyle::Joined), BASE);
    }

    #[test]
    fn test_limit_offset_only_when_positive() {
        assert_eq!(
            apply_limit_offset(BASE.to_string(), 10, 20),
            format!("{} LIMIT 10 OFFSET 20", BASE)
        );
        assert_eq!(
            apply_limit_offset(BASE.to_string(), 10, 0),
            format!("{} LIMIT 10", BASE)
        );
        assert_eq!(apply_limit_offset(BASE.to_string(), 0, -5), BASE);
    }

    #[test]
    fn test_projection_replaces_first_select_only() {
        let sql = format!("{} AND id IN (SELECT * FROM x)", BASE);
        assert_eq!(
            apply_projection(sql, "id, user_name"),
            "SELECT id, user_name FROM users WHERE deleted_at IS NULL AND id IN (SELECT * FROM x)"
        );
    }

    #[test]
    fn test_projection_empty_or_star_keeps_all_columns() {
        assert_eq!(apply_projection(BASE.to_string(), ""), BASE);
        assert_eq!(apply_projection(BASE.to_string(), "*"), BASE);
    }
}
