//! The authoritative in-memory map of live sessions and rooms.

use super::room::Room;
use super::session::{RoomId, Session, SessionId, SessionState};
use crate::wire::ServerEvent;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound channel capacity; a session whose client stalls past this
/// backlog has its frames dropped rather than blocking the router task.
const OUTBOUND_QUEUE_LIMIT_DEFAULT: usize = 64;

/// Owns every live [`Session`] and [`Room`]. No external holder should keep
/// a `Session` reference past the owning channel's close; callers look
/// sessions up by id on each access instead.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
    rooms: DashMap<RoomId, Arc<Room>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly admitted connection and return its outbound
    /// receiver for the frame-writer task to drain.
    pub fn register(
        &self,
        id: SessionId,
        source_addr: String,
    ) -> (Arc<Session>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_LIMIT_DEFAULT);
        let session = Arc::new(Session::new(id.clone(), source_addr, tx));
        self.sessions.insert(id, session.clone());
        (session, rx)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|s| s.clone())
    }

    pub fn get_room(&self, id: &str) -> Option<Arc<Room>> {
        self.rooms.get(id).map(|r| r.clone())
    }

    pub fn insert_room(&self, room: Arc<Room>) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn remove_room(&self, id: &str) -> Option<Arc<Room>> {
        self.rooms.remove(id).map(|(_, r)| r)
    }

    /// Enqueue one outbound frame; silently dropped if the session is
    /// unknown or its channel is gone/full.
    pub fn send(&self, id: &str, event: ServerEvent) {
        if let Some(session) = self.sessions.get(id) {
            session.send(event);
        }
    }

    /// Remove a session. Idempotent — a second call for the same id is a
    /// no-op. Does not itself notify a partner; callers handle that via the
    /// disconnect flow before calling this.
    pub fn unregister(&self, id: &str) {
        if self.sessions.remove(id).is_some() {
            debug!(session_id = %id, "session unregistered");
        }
    }

    pub fn count_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn count_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn snapshot_rooms(&self) -> Vec<Arc<Room>> {
        self.rooms.iter().map(|e| e.value().clone()).collect()
    }

    pub fn count_waiting(&self) -> usize {
        self.sessions
            .iter()
            .filter(|e| e.value().state() == SessionState::Waiting)
            .count()
    }
}
