//! Binding of filter values to Postgres arguments

use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;

use super::filter::FilterValue;

/// Encode `values` as positional Postgres arguments
///
/// NULL is sent as an untyped-text NULL; lists are sent as Postgres arrays.
pub fn to_arguments(values: &[FilterValue]) -> Result<PgArguments, BoxDynError> {
    let mut args = PgArguments::default();
    for value in values {
        add_value(&mut args, value)?;
    }
    Ok(args)
}

fn add_value(args: &mut PgArguments, value: &FilterValue) -> Result<(), BoxDynError> {
    match value {
        FilterValue::Text(s) => args.add(s.clone()),
        FilterValue::Integer(i) => args.add(*i),
        FilterValue::Float(f) => args.add(*f),
        FilterValue::Boolean(b) => args.add(*b),
        FilterValue::Uuid(id) => args.add(*id),
        FilterValue::Timestamp(ts) => args.add(*ts),
        FilterValue::Null => args.add(None::<String>),
        FilterValue::TextList(v) => args.add(v.clone()),
        FilterValue::IntegerList(v) => args.add(v.clone()),
        FilterValue::FloatList(v) => args.add(v.clone()),
        FilterValue::BooleanList(v) => args.add(v.clone()),
        FilterValue::UuidList(v) => args.add(v.clone()),
        FilterValue::TimestampList(v) => args.add(v.clone()),
    }
}
