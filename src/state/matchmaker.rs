//! Single-owner FIFO queue pairing waiting sessions into rooms.

use super::registry::ConnectionRegistry;
use super::room::Room;
use super::session::{RoomId, SessionId, SessionState};
use crate::clock::Clock;
use crate::wire::ServerEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct WaitingEntry {
    session_id: SessionId,
    source_addr: String,
    enqueued_at: i64,
}

/// A waiting session as seen by the admin queue view.
pub struct QueueEntry {
    pub session_id: SessionId,
    pub source_addr: String,
    pub enqueued_at: i64,
}

#[derive(Default)]
pub struct Matchmaker {
    queue: Mutex<VecDeque<WaitingEntry>>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, session_id: SessionId, source_addr: String, enqueued_at: i64) {
        self.queue.lock().push_back(WaitingEntry {
            session_id,
            source_addr,
            enqueued_at,
        });
    }

    /// Remove a session from the queue, e.g. on `LEAVE_QUEUE` or channel
    /// close. Returns whether an entry was actually removed.
    pub fn remove(&self, session_id: &str) -> bool {
        let mut queue = self.queue.lock();
        let before = queue.len();
        queue.retain(|e| e.session_id != session_id);
        queue.len() != before
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waiting sessions in enqueue order, oldest first.
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        let mut entries: Vec<QueueEntry> = self
            .queue
            .lock()
            .iter()
            .map(|e| QueueEntry {
                session_id: e.session_id.clone(),
                source_addr: e.source_addr.clone(),
                enqueued_at: e.enqueued_at,
            })
            .collect();
        entries.sort_by_key(|e| e.enqueued_at);
        entries
    }

    /// Pop pairs of waiting entries off the front of the queue and pair
    /// them via `registry`, under one critical section covering the whole
    /// queue drain. A stale entry (its session vanished or is no longer
    /// `Waiting`) is discarded; its still-valid partner is pushed back to
    /// the front so enqueue order is preserved for the next call.
    pub fn match_pairs(
        &self,
        registry: &ConnectionRegistry,
        clock: &dyn Clock,
        mut next_room_id: impl FnMut() -> RoomId,
    ) -> Vec<Arc<Room>> {
        let mut paired = Vec::new();
        let mut queue = self.queue.lock();

        while queue.len() >= 2 {
            let first = queue.pop_front().expect("checked len >= 2");
            let second = queue.pop_front().expect("checked len >= 2");

            let first_session = registry
                .get(&first.session_id)
                .filter(|s| s.state() == SessionState::Waiting);
            let second_session = registry
                .get(&second.session_id)
                .filter(|s| s.state() == SessionState::Waiting);

            match (first_session, second_session) {
                (Some(a), Some(b)) => {
                    let room_id = next_room_id();
                    let now = clock.now_unix();

                    a.pair_with(room_id.clone(), b.id.clone());
                    b.pair_with(room_id.clone(), a.id.clone());

                    let room = Arc::new(Room::new(
                        room_id.clone(),
                        a.id.clone(),
                        b.id.clone(),
                        a.source_addr.clone(),
                        b.source_addr.clone(),
                        now,
                    ));
                    registry.insert_room(room.clone());

                    a.send(ServerEvent::PartnerFound {
                        room_id: room_id.clone(),
                    });
                    b.send(ServerEvent::PartnerFound { room_id });

                    paired.push(room);
                }
                (Some(a), None) => {
                    queue.push_front(WaitingEntry {
                        session_id: a.id.clone(),
                        source_addr: a.source_addr.clone(),
                        enqueued_at: first.enqueued_at,
                    });
                }
                (None, Some(b)) => {
                    queue.push_front(WaitingEntry {
                        session_id: b.id.clone(),
                        source_addr: b.source_addr.clone(),
                        enqueued_at: second.enqueued_at,
                    });
                }
                (None, None) => {}
            }
        }

        paired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::state::session::SessionState;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn room_id_gen() -> impl FnMut() -> RoomId {
        let counter = AtomicU64::new(0);
        move || format!("room-{}", counter.fetch_add(1, Ordering::SeqCst))
    }

    fn register_waiting(registry: &ConnectionRegistry, id: &str) {
        let (session, _rx) = registry.register(id.to_string(), "1.1.1.1".to_string());
        session.set_state(SessionState::Waiting);
    }

    #[test]
    fn pairs_two_waiting_sessions_fifo() {
        let registry = ConnectionRegistry::new();
        let matchmaker = Matchmaker::new();
        let clock = FakeClock::new();

        register_waiting(&registry, "a");
        register_waiting(&registry, "b");
        matchmaker.enqueue("a".to_string(), "1.1.1.1".to_string(), 0);
        matchmaker.enqueue("b".to_string(), "1.1.1.1".to_string(), 1);

        let rooms = matchmaker.match_pairs(&registry, &clock, room_id_gen());
        assert_eq!(rooms.len(), 1);
        assert_eq!(registry.get("a").unwrap().state(), SessionState::Paired);
        assert_eq!(registry.get("b").unwrap().state(), SessionState::Paired);
        assert_eq!(
            registry.get("a").unwrap().partner_id().as_deref(),
            Some("b")
        );
        assert!(matchmaker.is_empty());
    }

    #[test]
    fn stale_entry_is_discarded_and_survivor_requeued() {
        let registry = ConnectionRegistry::new();
        let matchmaker = Matchmaker::new();
        let clock = FakeClock::new();

        register_waiting(&registry, "a");
        // "b" enqueued but never registered -- simulates a vanished session.
        matchmaker.enqueue("a".to_string(), "1.1.1.1".to_string(), 0);
        matchmaker.enqueue("b".to_string(), "1.1.1.1".to_string(), 1);

        let rooms = matchmaker.match_pairs(&registry, &clock, room_id_gen());
        assert!(rooms.is_empty());
        assert_eq!(matchmaker.len(), 1);
        assert_eq!(registry.get("a").unwrap().state(), SessionState::Waiting);
    }

    #[test]
    fn leave_queue_removes_entry() {
        let matchmaker = Matchmaker::new();
        matchmaker.enqueue("a".to_string(), "1.1.1.1".to_string(), 0);
        assert!(matchmaker.remove("a"));
        assert!(!matchmaker.remove("a"));
        assert!(matchmaker.is_empty());
    }

    #[test]
    fn snapshot_is_sorted_by_enqueue_time_regardless_of_insertion_order() {
        let matchmaker = Matchmaker::new();
        matchmaker.enqueue("late".to_string(), "2.2.2.2".to_string(), 50);
        matchmaker.enqueue("early".to_string(), "1.1.1.1".to_string(), 10);
        matchmaker.enqueue("middle".to_string(), "3.3.3.3".to_string(), 30);

        let snapshot = matchmaker.snapshot();
        let ids: Vec<&str> = snapshot.iter().map(|e| e.session_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "middle", "late"]);
        assert_eq!(snapshot[0].enqueued_at, 10);
    }
}
