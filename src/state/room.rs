//! A paired chat between exactly two sessions.

use super::session::{RoomId, SessionId};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

pub struct Room {
    pub id: RoomId,
    pub session_a: SessionId,
    pub session_b: SessionId,
    pub source_a: String,
    pub source_b: String,
    pub started_at: i64,
    message_count: AtomicU64,
    last_activity_ms: AtomicI64,
}

impl Room {
    pub fn new(
        id: RoomId,
        session_a: SessionId,
        session_b: SessionId,
        source_a: String,
        source_b: String,
        started_at: i64,
    ) -> Self {
        Self {
            id,
            session_a,
            session_b,
            source_a,
            source_b,
            started_at,
            message_count: AtomicU64::new(0),
            last_activity_ms: AtomicI64::new(started_at),
        }
    }

    pub fn partner_of(&self, session_id: &str) -> Option<&SessionId> {
        if self.session_a == session_id {
            Some(&self.session_b)
        } else if self.session_b == session_id {
            Some(&self.session_a)
        } else {
            None
        }
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn record_message(&self, now_ms: i64) {
        self.message_count.fetch_add(1, Ordering::SeqCst);
        self.last_activity_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn last_activity_ms(&self) -> i64 {
        self.last_activity_ms.load(Ordering::SeqCst)
    }
}
