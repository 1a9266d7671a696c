//! In-memory realtime state: sessions, rooms, the connection registry, and
//! the matchmaker that pairs waiting sessions.

pub mod matchmaker;
pub mod registry;
pub mod room;
pub mod session;

pub use matchmaker::{Matchmaker, QueueEntry};
pub use registry::ConnectionRegistry;
pub use room::Room;
pub use session::{RoomId, Session, SessionId, SessionState};
