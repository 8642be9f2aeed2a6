//! One-hop association loading
//!
//! Associated rows are fetched in one query per association with
//! `<key> = ANY($1)` over the deduplicated parent keys, and returned as JSON
//! objects so a projection never has to fit the associated entity's struct.
//! Nil keys (the key column was projected away) are skipped.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::RepositoryResult;
use crate::domain::Entity;
use crate::query::filter::split_fields;
use crate::transaction::{with_executor, TxContext};

/// Loaded associations keyed by association name
pub type Associations = BTreeMap<String, Vec<Value>>;

/// How many associated rows each parent must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one row per parent key
    One,
    /// Any number of rows
    Many,
}

fn projection<T: Entity>(fields: &str) -> String {
    let fields = split_fields(fields);
    if fields.is_empty() {
        T::COLUMNS.join(", ")
    } else {
        fields.join(", ")
    }
}

async fn fetch_keyed<T: Entity>(
    pool: &PgPool,
    tx: TxContext<'_>,
    key_column: &str,
    fields: &str,
    keys: &[Uuid],
) -> RepositoryResult<(Vec<Uuid>, Vec<(Uuid, Value)>)> {
    let mut keys = keys.to_vec();
    keys.retain(|k| !k.is_nil());
    keys.sort_unstable();
    keys.dedup();
    if keys.is_empty() {
        return Ok((keys, Vec::new()));
    }

    let sql = format!(
        "SELECT __key, to_jsonb(t) - '__key' FROM \
         (SELECT {key} AS __key, {fields} FROM {table} WHERE {key} = ANY($1) AND deleted_at IS NULL) t",
        key = key_column,
        fields = projection::<T>(fields),
        table = T::TABLE,
    );
    let rows = with_executor!(tx, pool, |exec| {
        sqlx::query_as::<Postgres, (Uuid, Value)>(&sql)
            .bind(keys.clone())
            .fetch_all(exec)
            .await
    })
    .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::LoadAssociation, e))?;

    tracing::debug!(
        table = T::TABLE,
        keys = keys.len(),
        rows = rows.len(),
        "association loaded"
    );
    Ok((keys, rows))
}

/// All undeleted rows of `T` whose `key_column` is one of `keys`
pub async fn load_many<T: Entity>(
    pool: &PgPool,
    tx: TxContext<'_>,
    key_column: &str,
    fields: &str,
    keys: &[Uuid],
) -> RepositoryResult<Vec<Value>> {
    let (_, rows) = fetch_keyed::<T>(pool, tx, key_column, fields, keys).await?;
    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

/// Exactly one undeleted row of `T` per key
///
/// A key without a row is `NotFound`; a key with several rows is a
/// validation failure.
pub async fn load_one<T: Entity>(
    pool: &PgPool,
    tx: TxContext<'_>,
    key_column: &str,
    fields: &str,
    keys: &[Uuid],
) -> RepositoryResult<Vec<Value>> {
    let (keys, rows) = fetch_keyed::<T>(pool, tx, key_column, fields, keys).await?;

    let mut per_key: HashMap<Uuid, usize> = HashMap::with_capacity(keys.len());
    for (key, _) in &rows {
        *per_key.entry(*key).or_default() += 1;
    }
    for key in &keys {
        match per_key.get(key).copied().unwrap_or(0) {
            0 => {
                return Err(RepositoryError::not_found(T::NAME, key.to_string())
                    .with_operation(RepositoryOperation::LoadAssociation))
            }
            1 => {}
            n => {
                return Err(RepositoryError::validation_failed(
                    RepositoryOperation::LoadAssociation,
                    format!("expected one {} for {} = {}, found {}", T::NAME, key_column, key, n),
                ))
            }
        }
    }
    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

/// Dispatch to [`load_one`] or [`load_many`]
pub async fn load<T: Entity>(
    pool: &PgPool,
    tx: TxContext<'_>,
    key_column: &str,
    fields: &str,
    keys: &[Uuid],
    cardinality: Cardinality,
) -> RepositoryResult<Vec<Value>> {
    match cardinality {
        Cardinality::One => load_one::<T>(pool, tx, key_column, fields, keys).await,
        Cardinality::Many => load_many::<T>(pool, tx, key_column, fields, keys).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageStatus, User};

    #[test]
    fn test_star_projection_expands_to_allow_list() {
        let projection = projection::<User>("*");
        assert!(projection.starts_with("id, user_name"));
        assert!(!projection.contains("password"));
    }

    #[test]
    fn test_explicit_projection_is_kept() {
        assert_eq!(projection::<MessageStatus>("id, status"), "id, status");
        assert_eq!(projection::<Message>(""), Message::COLUMNS.join(", "));
    }
}
