//! Unit-of-work transaction coordination
//!
//! Repository operations take an explicit [`TxContext`]: `NoTx` runs on the
//! pool, `InTx` runs on the connection owned by an open [`UnitOfWork`].
//! Composite writes open a unit of work with [`Transactioner::begin`], pass
//! `TxContext::InTx(&mut uow)` to every step and hand the outcome to
//! [`Transactioner::finish`], which commits on `Ok` and rolls back on `Err`.
//!
//! Dropping an open unit of work (request cancelled, timeout) rolls back
//! through sqlx's drop guard.
//!
//! ```rust,ignore
//! let mut uow = transactioner.begin().await?;
//! let result = async {
//!     let user = users.create(TxContext::InTx(&mut uow), new_user).await?;
//!     personnel.create(TxContext::InTx(&mut uow), new_personnel).await?;
//!     Ok::<_, Error>(user)
//! }
//! .await;
//! transactioner.finish(uow, result).await
//! ```

use std::fmt;

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::repository::{RepositoryError, RepositoryOperation, RepositoryResult};

/// Lifecycle state of a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Transaction started, statements may run
    Open,
    /// Transaction committed
    Committed,
    /// Transaction rolled back
    RolledBack,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Committed => write!(f, "committed"),
            Self::RolledBack => write!(f, "rolled_back"),
        }
    }
}

/// An open database transaction and its state
pub struct UnitOfWork {
    id: Uuid,
    tx: Option<Transaction<'static, Postgres>>,
    state: TxState,
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish()
    }
}

impl UnitOfWork {
    fn open(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            id: Uuid::now_v7(),
            tx: Some(tx),
            state: TxState::Open,
        }
    }

    /// Identifier used in log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state
    pub fn state(&self) -> TxState {
        self.state
    }

    /// The transaction's connection; fails once committed or rolled back
    pub fn connection(&mut self) -> RepositoryResult<&mut PgConnection> {
        let state = self.state;
        self.tx.as_deref_mut().ok_or_else(|| {
            RepositoryError::transaction_state(
                RepositoryOperation::Commit,
                format!("unit of work is {}", state),
            )
        })
    }

    /// Borrow as a repository transaction context
    pub fn context(&mut self) -> TxContext<'_> {
        TxContext::InTx(self)
    }

    /// Commit; an already closed unit of work is a transaction-state error
    pub async fn commit(&mut self) -> RepositoryResult<()> {
        let tx = self.tx.take().ok_or_else(|| {
            RepositoryError::transaction_state(
                RepositoryOperation::Commit,
                format!("cannot commit a unit of work that is {}", self.state),
            )
        })?;
        tx.commit()
            .await
            .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Commit, e))?;
        self.state = TxState::Committed;
        tracing::debug!(tx_id = %self.id, "unit of work committed");
        Ok(())
    }

    /// Roll back when `err` is present; `None` is a no-op
    ///
    /// Rolling back with no open transaction only logs a warning.
    pub async fn rollback<E: fmt::Display>(&mut self, err: Option<&E>) {
        let Some(cause) = err else {
            return;
        };
        let Some(tx) = self.tx.take() else {
            tracing::warn!(tx_id = %self.id, state = %self.state, "no transaction found");
            return;
        };
        if let Err(e) = tx.rollback().await {
            tracing::error!(tx_id = %self.id, error = %e, "rollback failed");
        }
        self.state = TxState::RolledBack;
        tracing::debug!(tx_id = %self.id, cause = %cause, "unit of work rolled back");
    }

    #[cfg(test)]
    pub(crate) fn closed(state: TxState) -> Self {
        Self {
            id: Uuid::now_v7(),
            tx: None,
            state,
        }
    }
}

/// Which executor a repository call runs on
pub enum TxContext<'t> {
    /// Run directly on the pool
    NoTx,
    /// Run on the unit of work's connection
    InTx(&'t mut UnitOfWork),
}

impl TxContext<'_> {
    /// Reborrow for a further call without giving up the context
    pub fn reborrow(&mut self) -> TxContext<'_> {
        match self {
            TxContext::NoTx => TxContext::NoTx,
            TxContext::InTx(uow) => TxContext::InTx(uow),
        }
    }
}

/// Evaluate `$body` with `$exec` bound to the pool or the unit of work's connection
macro_rules! with_executor {
    ($tx:expr, $pool:expr, |$exec:ident| $body:expr) => {
        match $tx {
            $crate::transaction::TxContext::NoTx => {
                let $exec = $pool;
                $body
            }
            $crate::transaction::TxContext::InTx(uow) => {
                let $exec = uow.connection()?;
                $body
            }
        }
    };
}

pub(crate) use with_executor;

/// Opens and settles units of work
#[derive(Clone)]
pub struct Transactioner {
    pool: PgPool,
}

impl Transactioner {
    /// Create a transactioner over `pool`
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a unit of work
    pub async fn begin(&self) -> RepositoryResult<UnitOfWork> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Begin, e))?;
        let uow = UnitOfWork::open(tx);
        tracing::debug!(tx_id = %uow.id, "unit of work opened");
        Ok(uow)
    }

    /// Commit on `Ok`, roll back on `Err`, and return `result` unchanged
    ///
    /// A failed commit replaces an `Ok` result with the commit error.
    pub async fn finish<T, E>(&self, mut uow: UnitOfWork, result: Result<T, E>) -> Result<T, E>
    where
        E: From<RepositoryError> + fmt::Display,
    {
        match result {
            Ok(value) => {
                uow.commit().await?;
                Ok(value)
            }
            Err(err) => {
                uow.rollback(Some(&err)).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryErrorKind;

    #[test]
    fn test_state_display() {
        assert_eq!(TxState::Open.to_string(), "open");
        assert_eq!(TxState::Committed.to_string(), "committed");
        assert_eq!(TxState::RolledBack.to_string(), "rolled_back");
    }

    #[tokio::test]
    async fn test_commit_on_closed_unit_is_state_error() {
        let mut uow = UnitOfWork::closed(TxState::RolledBack);
        let err = uow.commit().await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::TransactionState);
        assert_eq!(err.operation, RepositoryOperation::Commit);
    }

    #[tokio::test]
    async fn test_rollback_without_error_is_noop() {
        let mut uow = UnitOfWork::closed(TxState::Committed);
        uow.rollback::<RepositoryError>(None).await;
        assert_eq!(uow.state(), TxState::Committed);
    }

    #[tokio::test]
    async fn test_rollback_without_transaction_is_not_fatal() {
        let mut uow = UnitOfWork::closed(TxState::Committed);
        let cause = RepositoryError::not_found("User", "x");
        uow.rollback(Some(&cause)).await;
        assert_eq!(uow.state(), TxState::Committed);
    }

    #[test]
    fn test_connection_on_closed_unit_fails() {
        let mut uow = UnitOfWork::closed(TxState::Committed);
        let err = uow.connection().unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::TransactionState);
    }

    #[test]
    fn test_reborrow_keeps_context() {
        let mut uow = UnitOfWork::closed(TxState::Committed);
        let mut ctx = uow.context();
        assert!(matches!(ctx.reborrow(), TxContext::InTx(_)));
        assert!(matches!(ctx, TxContext::InTx(_)));
        let mut none = TxContext::NoTx;
        assert!(matches!(none.reborrow(), TxContext::NoTx));
    }
}
