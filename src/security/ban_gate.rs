//! Connection-time ban check with a short TTL cache.
//!
//! A `DashMap` of cached verdicts sits in front of the `banned_ips` table;
//! admin ban/unban mutations invalidate it by bumping a version counter
//! rather than waiting out each entry's TTL.

use crate::clock::Clock;
use crate::db::{Database, RepoError};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

struct CacheEntry {
    banned: bool,
    cached_at: i64,
    version: u64,
}

/// Propagates repository errors to the caller rather than guessing; the
/// connection admission path treats an error here as refuse-admission.
pub struct BanGate {
    db: Database,
    clock: Arc<dyn Clock>,
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
    version: AtomicU64,
}

impl BanGate {
    pub fn new(db: Database, clock: Arc<dyn Clock>, ttl_secs: u64) -> Self {
        Self {
            db,
            clock,
            cache: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
            version: AtomicU64::new(0),
        }
    }

    /// Invalidate the cache for all entries older than the last ban
    /// mutation. Call this after adding or removing a ban.
    pub fn bump_version(&self) {
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn is_banned(&self, source: &str) -> Result<bool, RepoError> {
        let now = self.clock.now_unix();
        let current_version = self.version.load(Ordering::SeqCst);

        if let Some(entry) = self.cache.get(source) {
            let fresh = entry.version == current_version
                && now - entry.cached_at < self.ttl.as_secs() as i64;
            if fresh {
                return Ok(entry.banned);
            }
        }

        let banned = self.db.bans().is_banned(source).await?;
        self.cache.insert(
            source.to_string(),
            CacheEntry {
                banned,
                cached_at: now,
                version: current_version,
            },
        );
        Ok(banned)
    }

    /// Drop cache entries whose TTL has lapsed, bounding memory growth.
    pub fn prune_expired(&self) {
        let now = self.clock.now_unix();
        let ttl = self.ttl.as_secs() as i64;
        self.cache.retain(|_, entry| now - entry.cached_at < ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    async fn test_db() -> Database {
        Database::new(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn unbanned_source_reads_clean() {
        let db = test_db().await;
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
        let gate = BanGate::new(db, clock, 30);
        assert!(!gate.is_banned("1.2.3.4").await.unwrap());
    }

    #[tokio::test]
    async fn banned_source_is_reported_and_cached() {
        let db = test_db().await;
        db.bans().insert("1.2.3.4", "test", 0, "admin").await.unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FakeClock::new());
        let gate = BanGate::new(db.clone(), clock, 30);

        assert!(gate.is_banned("1.2.3.4").await.unwrap());

        db.bans().remove_by_ip("1.2.3.4").await.unwrap();
        // Cache still holds the stale positive until TTL or version bump.
        assert!(gate.is_banned("1.2.3.4").await.unwrap());

        gate.bump_version();
        assert!(!gate.is_banned("1.2.3.4").await.unwrap());
    }
}
