//! Dynamic filter, sort and pagination query builder
//!
//! Translates a client supplied [`FilterInput`] and [`QueryOptions`] into a
//! pair of parameterized queries over one entity table: a COUNT query that
//! sees only the predicates, and a SELECT query that additionally receives
//! sort, limit/offset and projection.
//!
//! Every query starts from the soft-delete guard `deleted_at IS NULL`. When a
//! tenant column is declared and a tenant id is present, the guard also
//! restricts `organization_id = $1` and predicate placeholders start at `$2`.
//!
//! Field names are interpolated, so callers must run [`columns::validate`]
//! first. Values are always bound.
//!
//! # Example
//!
//! ```rust
//! use chat_service::query::{
//!     build_filter_queries, CompilerOptions, FieldPredicate, FilterInput, QueryOptions,
//!     SortKey,
//! };
//!
//! let input = FilterInput::default()
//!     .with_predicate(FieldPredicate::eq("role", "ADMIN"))
//!     .with_sort(SortKey::desc("created_at"));
//! let options = QueryOptions::default().with_page(10, 0);
//!
//! let queries = build_filter_queries("users", None, &input, &options, &CompilerOptions::default());
//! assert_eq!(
//!     queries.count.sql,
//!     "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND role = $1"
//! );
//! assert_eq!(
//!     queries.select.sql,
//!     "SELECT * FROM users WHERE deleted_at IS NULL AND role = $1 ORDER BY created_at desc LIMIT 10"
//! );
//! ```

pub mod bind;
pub mod columns;
pub mod compiler;
pub mod composer;
pub mod filter;

pub use columns::{bind_text_columns, validate, AllowList, ColumnError};
pub use compiler::{
    compile_predicates, BetweenMode, CompiledQuery, CompilerOptions, NotInMode, SortStyle,
};
pub use composer::{apply_limit_offset, apply_projection, apply_sort};
pub use filter::{
    FieldPredicate, FilterInput, FilterOperator, FilterValue, QueryAssociation, QueryOptions,
    SortDirection, SortKey,
};

/// The COUNT and SELECT halves of one filter request
#[derive(Debug, Clone, PartialEq)]
pub struct FilterQueries {
    /// `SELECT COUNT(*)` over the guarded, filtered rows
    pub count: CompiledQuery,
    /// Full pipeline: predicates, sort, limit/offset, projection
    pub select: CompiledQuery,
}

/// The guarded base query for `table`, with the tenant bound as `$1` when present
pub fn guarded_base(
    select: &str,
    table: &str,
    tenant_column: Option<&str>,
    input: &FilterInput,
) -> CompiledQuery {
    let mut base = CompiledQuery::new(format!(
        "SELECT {} FROM {} WHERE deleted_at IS NULL",
        select, table
    ));
    if let (Some(column), Some(tenant)) = (tenant_column, input.tenant_id) {
        base.sql.push_str(&format!(" AND {} = $1", column));
        base.args.push(FilterValue::Uuid(tenant));
    }
    base
}

/// Build the COUNT and SELECT queries for one filter request
///
/// Both halves share an identical predicate compilation.
pub fn build_filter_queries(
    table: &str,
    tenant_column: Option<&str>,
    input: &FilterInput,
    options: &QueryOptions,
    compiler: &CompilerOptions,
) -> FilterQueries {
    let count_base = guarded_base("COUNT(*)", table, tenant_column, input);
    let first = count_base.next_placeholder();
    let count = compile_predicates(count_base, &input.fields, first, compiler);

    let select_base = guarded_base("*", table, tenant_column, input);
    let first = select_base.next_placeholder();
    let CompiledQuery { sql, args } =
        compile_predicates(select_base, &input.fields, first, compiler);

    let sql = apply_sort(sql, &input.sort_keys, compiler.sort);
    let sql = apply_limit_offset(sql, options.limit, options.offset);
    let sql = apply_projection(sql, &options.select_fields);

    FilterQueries {
        count,
        select: CompiledQuery { sql, args },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_zero_predicates_only_guard() {
        let queries = build_filter_queries(
            "personnel",
            None,
            &FilterInput::default(),
            &QueryOptions::default(),
            &CompilerOptions::default(),
        );
        assert_eq!(
            queries.count.sql,
            "SELECT COUNT(*) FROM personnel WHERE deleted_at IS NULL"
        );
        assert_eq!(
            queries.select.sql,
            "SELECT * FROM personnel WHERE deleted_at IS NULL"
        );
        assert!(queries.count.args.is_empty());
        assert!(queries.select.args.is_empty());
    }

    #[test]
    fn test_count_and_select_share_predicates() {
        let input = FilterInput::default()
            .with_predicate(FieldPredicate::eq("role", "ADMIN"))
            .with_predicate(FieldPredicate::ilike("user_name", "Jo"));
        let queries = build_filter_queries(
            "users",
            None,
            &input,
            &QueryOptions::default().with_page(25, 50),
            &CompilerOptions::default(),
        );
        assert_eq!(queries.count.args, queries.select.args);
        assert!(queries
            .count
            .sql
            .ends_with("AND role = $1 AND user_name ILIKE $2"));
        assert!(!queries.count.sql.contains("LIMIT"));
        assert!(queries.select.sql.ends_with("LIMIT 25 OFFSET 50"));
    }

    #[test]
    fn test_tenant_guard_shifts_placeholders() {
        let tenant = Uuid::new_v4();
        let input = FilterInput::default()
            .with_tenant(Some(tenant))
            .with_predicate(FieldPredicate::eq("role", "USER"));
        let queries = build_filter_queries(
            "users",
            Some("organization_id"),
            &input,
            &QueryOptions::default(),
            &CompilerOptions::default(),
        );
        assert_eq!(
            queries.select.sql,
            "SELECT * FROM users WHERE deleted_at IS NULL AND organization_id = $1 AND role = $2"
        );
        assert_eq!(
            queries.select.args,
            vec![FilterValue::Uuid(tenant), FilterValue::from("USER")]
        );
    }

    #[test]
    fn test_tenant_ignored_without_tenant_column() {
        let input = FilterInput::default().with_tenant(Some(Uuid::new_v4()));
        let queries = build_filter_queries(
            "messages",
            None,
            &input,
            &QueryOptions::default(),
            &CompilerOptions::default(),
        );
        assert_eq!(
            queries.count.sql,
            "SELECT COUNT(*) FROM messages WHERE deleted_at IS NULL"
        );
        assert!(queries.count.args.is_empty());
    }

    #[test]
    fn test_projection_applies_to_select_only() {
        let queries = build_filter_queries(
            "users",
            None,
            &FilterInput::default().with_sort(SortKey::asc("user_name")),
            &QueryOptions::default().with_fields("id,user_name"),
            &CompilerOptions::literal(),
        );
        assert_eq!(
            queries.select.sql,
            "SELECT id, user_name FROM users WHERE deleted_at IS NULL ORDER BY user_name asc"
        );
        assert!(queries.count.sql.starts_with("SELECT COUNT(*) FROM users"));
    }
}
