//! The Hub: central shared-state container threaded through every HTTP
//! route and session task.

use crate::clock::Clock;
use crate::config::Config;
use crate::db::Database;
use crate::metrics;
use crate::security::{BanGate, RateLimitRule, RateLimiter};
use crate::state::{ConnectionRegistry, Matchmaker};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Central dependency container threaded through the HTTP router and every
/// per-session task. Cheap to clone: every field is already `Arc`-backed or
/// itself an `Arc`.
#[derive(Clone)]
pub struct Hub {
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub db: Database,
    pub registry: Arc<ConnectionRegistry>,
    pub matchmaker: Arc<Matchmaker>,
    pub ban_gate: Arc<BanGate>,
    pub rate_limiter: Arc<RateLimiter>,
    pub counters: Arc<Counters>,
    room_id_seq: Arc<AtomicU64>,
    message_id_seq: Arc<AtomicU64>,
}

/// Process-lifetime counters backing the AdminView and metrics gauges.
/// Reset at the local-day boundary by the rollup task; previous day's
/// snapshot is persisted to `daily_stats` before reset.
#[derive(Default)]
pub struct Counters {
    pub today_message_count: AtomicU64,
    pub peak_concurrent_rooms: AtomicU64,
    unique_sources_today: Mutex<HashSet<String>>,
    current_day_epoch: AtomicI64,
}

impl Counters {
    pub fn record_message(&self) {
        self.today_message_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Add a source address to today's unique-sources set.
    pub fn record_source(&self, source_addr: &str) {
        self.unique_sources_today.lock().insert(source_addr.to_string());
    }

    /// Swap out today's unique-sources set and return its size, ready for
    /// the next day to start from empty.
    pub fn take_unique_sources_count(&self) -> u64 {
        let mut sources = self.unique_sources_today.lock();
        let count = sources.len() as u64;
        sources.clear();
        count
    }

    pub fn record_room_count(&self, active_rooms: u64) {
        let mut peak = self.peak_concurrent_rooms.load(Ordering::SeqCst);
        while active_rooms > peak {
            match self.peak_concurrent_rooms.compare_exchange_weak(
                peak,
                active_rooms,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(observed) => peak = observed,
            }
        }
    }

    /// Day-epoch (days since Unix epoch) this counter snapshot belongs to.
    /// Returns the previous epoch if a rollover is due.
    pub fn roll_day_if_needed(&self, today_epoch: i64) -> Option<i64> {
        let previous = self.current_day_epoch.swap(today_epoch, Ordering::SeqCst);
        if previous != 0 && previous != today_epoch {
            Some(previous)
        } else {
            None
        }
    }

    pub fn take_today_message_count(&self) -> u64 {
        self.today_message_count.swap(0, Ordering::SeqCst)
    }

    pub fn take_peak_concurrent_rooms(&self) -> u64 {
        self.peak_concurrent_rooms.swap(0, Ordering::SeqCst)
    }
}

impl Hub {
    pub fn new(config: Config, clock: Arc<dyn Clock>, db: Database) -> Self {
        let ban_gate = Arc::new(BanGate::new(
            db.clone(),
            clock.clone(),
            config.security.ban_cache_ttl_secs,
        ));
        Self {
            config: Arc::new(config),
            clock: clock.clone(),
            db,
            registry: Arc::new(ConnectionRegistry::new()),
            matchmaker: Arc::new(Matchmaker::new()),
            ban_gate,
            rate_limiter: Arc::new(RateLimiter::new(clock)),
            counters: Arc::new(Counters::default()),
            room_id_seq: Arc::new(AtomicU64::new(0)),
            message_id_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn next_room_id(&self) -> String {
        format!("room-{}", self.room_id_seq.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_message_id(&self) -> String {
        format!("msg-{}", self.message_id_seq.fetch_add(1, Ordering::SeqCst))
    }

    pub fn connection_rate_rule(&self) -> RateLimitRule {
        RateLimitRule {
            limit: self.config.security.connection_rate.limit,
            window_secs: self.config.security.connection_rate.window_secs,
        }
    }

    pub fn message_rate_rule(&self) -> RateLimitRule {
        RateLimitRule {
            limit: self.config.security.message_rate.limit,
            window_secs: self.config.security.message_rate.window_secs,
        }
    }

    /// Run the matchmaker's pairing pass and record each new room's
    /// creation with the repository and metrics.
    pub async fn run_matchmaker(&self) {
        let clock = self.clock.clone();
        let rooms = self.matchmaker.match_pairs(&self.registry, &*clock, || self.next_room_id());
        for room in rooms {
            metrics::ROOMS_PAIRED.inc();
            if let Err(err) = self
                .db
                .sessions()
                .start_room(&room.id, &room.source_a, &room.source_b, room.started_at)
                .await
            {
                tracing::warn!(error = %err, room_id = %room.id, "failed to log room start");
            }
            self.counters.record_source(&room.source_a);
            self.counters.record_source(&room.source_b);
            self.counters
                .record_room_count(self.registry.count_rooms() as u64);
        }
        metrics::WAITING_SESSIONS.set(self.matchmaker.len() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_sources_dedupes_repeat_addresses_and_resets_on_take() {
        let counters = Counters::default();
        counters.record_source("1.1.1.1");
        counters.record_source("2.2.2.2");
        counters.record_source("1.1.1.1");

        assert_eq!(counters.take_unique_sources_count(), 2);
        assert_eq!(counters.take_unique_sources_count(), 0);
    }

    #[test]
    fn record_room_count_tracks_the_intra_window_peak() {
        let counters = Counters::default();
        counters.record_room_count(3);
        counters.record_room_count(1);
        counters.record_room_count(5);

        assert_eq!(counters.take_peak_concurrent_rooms(), 5);
        assert_eq!(counters.take_peak_concurrent_rooms(), 0);
    }
}
