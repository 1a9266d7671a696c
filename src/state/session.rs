//! A single connected client and the state machine it drives.

use crate::wire::ServerEvent;
use parking_lot::Mutex;
use tokio::sync::mpsc;

pub type SessionId = String;
pub type RoomId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Waiting,
    Paired,
    Closed,
}

pub struct Session {
    pub id: SessionId,
    pub source_addr: String,
    state: Mutex<SessionState>,
    links: Mutex<(Option<RoomId>, Option<SessionId>)>,
    outbound: mpsc::Sender<ServerEvent>,
    /// Last time a `TYPING` frame was forwarded, used to coalesce bursts.
    pub last_typing_forward_ms: Mutex<i64>,
}

impl Session {
    pub fn new(id: SessionId, source_addr: String, outbound: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id,
            source_addr,
            state: Mutex::new(SessionState::Idle),
            links: Mutex::new((None, None)),
            outbound,
            last_typing_forward_ms: Mutex::new(0),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.links.lock().0.clone()
    }

    pub fn partner_id(&self) -> Option<SessionId> {
        self.links.lock().1.clone()
    }

    /// Atomically set state to Paired with the given partner/room.
    pub fn pair_with(&self, room_id: RoomId, partner_id: SessionId) {
        *self.links.lock() = (Some(room_id), Some(partner_id));
        *self.state.lock() = SessionState::Paired;
    }

    /// Atomically clear partner/room links and return to Idle.
    pub fn unpair(&self) {
        *self.links.lock() = (None, None);
        *self.state.lock() = SessionState::Idle;
    }

    /// Best-effort enqueue; a full or closed channel is silently dropped per
    /// the registry's outbound-delivery contract.
    pub fn send(&self, event: ServerEvent) {
        let _ = self.outbound.try_send(event);
    }
}
