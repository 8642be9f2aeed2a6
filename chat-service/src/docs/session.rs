//! Login sessions for the API documentation
//!
//! Sessions live in process memory, so a docs login is only valid on the
//! instance that issued it.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Issued docs session tokens and their expiry
#[derive(Debug, Clone)]
pub struct DocsSessionStore {
    sessions: Arc<DashMap<String, Instant>>,
    ttl: Duration,
}

impl DocsSessionStore {
    /// Create an empty store whose sessions live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new session token
    pub fn create(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), Instant::now() + self.ttl);
        token
    }

    /// Whether `token` names a live session
    ///
    /// An expired session is evicted on lookup.
    pub fn validate(&self, token: &str) -> bool {
        let now = Instant::now();
        match self.sessions.get(token).map(|expires_at| *expires_at) {
            Some(expires_at) if expires_at > now => true,
            Some(_) => {
                self.sessions.remove(token);
                false
            }
            None => false,
        }
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.sessions.retain(|_, expires_at| {
            let live = *expires_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Live and not yet purged sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is stored
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_session_validates() {
        let store = DocsSessionStore::new(Duration::from_secs(60));
        let token = store.create();
        assert!(Uuid::parse_str(&token).is_ok());
        assert!(store.validate(&token));
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let store = DocsSessionStore::new(Duration::from_secs(60));
        assert!(!store.validate("not-a-session"));
    }

    #[test]
    fn test_expired_session_is_evicted() {
        let store = DocsSessionStore::new(Duration::ZERO);
        let token = store.create();
        assert!(!store.validate(&token));
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let expired = DocsSessionStore::new(Duration::ZERO);
        expired.create();
        expired.create();
        assert_eq!(expired.purge_expired(), 2);

        let live = DocsSessionStore::new(Duration::from_secs(60));
        live.create();
        assert_eq!(live.purge_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn test_purge_counts_only_removed_during_concurrent_logins() {
        let store = DocsSessionStore::new(Duration::from_secs(60));
        for i in 0..3 {
            store.sessions.insert(format!("stale-{}", i), Instant::now());
        }

        let purged = std::thread::scope(|scope| {
            let writer = store.clone();
            scope.spawn(move || {
                for _ in 0..500 {
                    writer.create();
                }
            });
            (0..50).map(|_| store.purge_expired()).sum::<usize>()
        });

        assert_eq!(purged, 3);
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn test_clones_share_sessions() {
        let store = DocsSessionStore::new(Duration::from_secs(60));
        let token = store.clone().create();
        assert!(store.validate(&token));
    }
}
