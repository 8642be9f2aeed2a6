//! Predicate compiler
//!
//! Appends ` AND <field> <op> $n` fragments to a base query and collects the
//! bound values in placeholder order. Compilation is pure: it never touches
//! the database and never fails. Field names must already have passed the
//! column allow-list in [`super::columns`].

use serde::{Deserialize, Serialize};

use super::filter::{FieldPredicate, FilterOperator, FilterValue};

/// How `between` binds its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetweenMode {
    /// Emits `BETWEEN $n AND $n+1` but binds the whole value once and
    /// advances the placeholder counter by one
    Literal,
    /// Requires a two-element list and binds both bounds
    #[default]
    Pair,
}

/// How `nin` binds its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotInMode {
    /// Emits `NOT IN ($n)` with the whole list bound as one argument
    Literal,
    /// Emits one placeholder per element; an empty list emits no clause
    #[default]
    Expanded,
}

/// How multiple sort keys are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStyle {
    /// One `ORDER BY a asc, b desc`
    #[default]
    Joined,
    /// One `ORDER BY` clause per key
    Repeated,
}

/// Compiler mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// `between` binding mode
    pub between: BetweenMode,
    /// `nin` binding mode
    pub not_in: NotInMode,
    /// ORDER BY rendering
    pub sort: SortStyle,
}

impl CompilerOptions {
    /// Reproduce the legacy query shapes exactly
    #[must_use]
    pub const fn literal() -> Self {
        Self {
            between: BetweenMode::Literal,
            not_in: NotInMode::Literal,
            sort: SortStyle::Repeated,
        }
    }
}

/// SQL text plus the values for its placeholders, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    /// SQL text with `$n` placeholders
    pub sql: String,
    /// Bound values; `args[i]` feeds `$(i + 1)`
    pub args: Vec<FilterValue>,
}

impl CompiledQuery {
    /// A query with no bound values
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// A query with pre-bound values
    pub fn with_args(sql: impl Into<String>, args: Vec<FilterValue>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// The placeholder index following the already-bound values
    #[must_use]
    pub fn next_placeholder(&self) -> usize {
        self.args.len() + 1
    }
}

/// Append every predicate to `base`, numbering placeholders from `first_placeholder`
pub fn compile_predicates(
    base: CompiledQuery,
    predicates: &[FieldPredicate],
    first_placeholder: usize,
    options: &CompilerOptions,
) -> CompiledQuery {
    let CompiledQuery { mut sql, mut args } = base;
    let mut next = first_placeholder;

    for predicate in predicates {
        let field = predicate.field.as_str();
        let op = predicate.operator;

        match op {
            FilterOperator::IsNull | FilterOperator::IsNotNull => {
                sql.push_str(&format!(" AND {} {}", field, op));
            }
            FilterOperator::Like
            | FilterOperator::NotLike
            | FilterOperator::ILike
            | FilterOperator::NotILike => {
                sql.push_str(&format!(" AND {} {} ${}", field, op, next));
                args.push(FilterValue::Text(format!(
                    "%{}%",
                    predicate.value.to_text().to_lowercase()
                )));
                next += 1;
            }
            FilterOperator::In => {
                sql.push_str(&format!(" AND {} = ANY(${})", field, next));
                args.push(predicate.value.clone().into_array());
                next += 1;
            }
            FilterOperator::NotIn => match options.not_in {
                NotInMode::Literal => {
                    sql.push_str(&format!(" AND {} NOT IN (${})", field, next));
                    args.push(predicate.value.clone());
                    next += 1;
                }
                NotInMode::Expanded => {
                    let elements = predicate.value.clone().into_elements();
                    if elements.is_empty() {
                        continue;
                    }
                    let placeholders: Vec<String> = (next..next + elements.len())
                        .map(|n| format!("${}", n))
                        .collect();
                    sql.push_str(&format!(
                        " AND {} NOT IN ({})",
                        field,
                        placeholders.join(", ")
                    ));
                    next += elements.len();
                    args.extend(elements);
                }
            },
            FilterOperator::Between => {
                sql.push_str(&format!(
                    " AND {} BETWEEN ${} AND ${}",
                    field,
                    next,
                    next + 1
                ));
                match options.between {
                    BetweenMode::Literal => {
                        args.push(predicate.value.clone());
                        next += 1;
                    }
                    BetweenMode::Pair => {
                        let mut bounds = predicate.value.clone().into_elements().into_iter();
                        args.push(bounds.next().unwrap_or_default());
                        args.push(bounds.next().unwrap_or_default());
                        next += 2;
                    }
                }
            }
            FilterOperator::Equal
            | FilterOperator::NotEqual
            | FilterOperator::GreaterThan
            | FilterOperator::GreaterThanOrEqual
            | FilterOperator::LessThan
            | FilterOperator::LessThanOrEqual => {
                sql.push_str(&format!(" AND {} {} ${}", field, op, next));
                args.push(predicate.value.clone());
                next += 1;
            }
        }
    }

    CompiledQuery { sql, args }
}
