//! Partner teardown, shared by explicit `DISCONNECT_CHAT` and full channel
//! close / router-fatal error.

use crate::error::SessionError;
use crate::hub::Hub;
use crate::state::{Session, SessionState};
use crate::wire::ServerEvent;
use std::sync::Arc;

/// Notify the partner (if any) and destroy the shared room, without
/// touching `session`'s own state — callers decide whether that becomes
/// Idle (explicit disconnect, still connected) or Closed (channel gone).
async fn break_pairing(hub: &Hub, session: &Arc<Session>) {
    if let Some(partner_id) = session.partner_id()
        && let Some(partner) = hub.registry.get(&partner_id)
    {
        partner.send(ServerEvent::PartnerDisconnected);
        partner.unpair();
    }

    if let Some(room_id) = session.room_id() {
        hub.registry.remove_room(&room_id);
        let now = hub.clock.now_unix();
        if let Err(err) = hub.db.sessions().end_room(&room_id, now).await {
            tracing::warn!(error = %err, room_id = %room_id, "failed to log room end");
        }
    }
}

/// Explicit `DISCONNECT_CHAT`: both sides return to Idle, the connection
/// itself stays open.
pub async fn handle_disconnect_chat(hub: &Hub, session: &Arc<Session>) -> Result<(), SessionError> {
    if session.state() != SessionState::Paired {
        return Err(SessionError::IllegalState);
    }
    break_pairing(hub, session).await;
    session.unpair();
    Ok(())
}

/// Channel close or router-fatal error: tear the session down entirely.
/// Idempotent; a session already `Closed` is a no-op.
pub async fn handle_channel_close(hub: &Hub, session: &Arc<Session>) {
    match session.state() {
        SessionState::Closed => return,
        SessionState::Paired => break_pairing(hub, session).await,
        SessionState::Waiting => {
            hub.matchmaker.remove(&session.id);
        }
        SessionState::Idle => {}
    }
    hub.registry.unregister(&session.id);
    session.set_state(SessionState::Closed);
}
