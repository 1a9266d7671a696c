//! Per-frame dispatch driving the session state machine (§ state machine).

use super::{disconnect, media, message, typing};
use crate::error::SessionError;
use crate::hub::Hub;
use crate::state::{Session, SessionState};
use crate::wire::{ClientEvent, ServerEvent};
use std::sync::Arc;
use tracing::warn;

async fn handle_join_queue(hub: &Hub, session: &Arc<Session>) -> Result<(), SessionError> {
    if session.state() != SessionState::Idle {
        return Err(SessionError::IllegalState);
    }
    let now = hub.clock.now_unix();
    hub.matchmaker
        .enqueue(session.id.clone(), session.source_addr.clone(), now);
    session.set_state(SessionState::Waiting);
    session.send(ServerEvent::QueueJoined);
    hub.run_matchmaker().await;
    Ok(())
}

fn handle_leave_queue(hub: &Hub, session: &Arc<Session>) -> Result<(), SessionError> {
    if session.state() != SessionState::Waiting {
        return Err(SessionError::IllegalState);
    }
    hub.matchmaker.remove(&session.id);
    session.set_state(SessionState::Idle);
    Ok(())
}

/// Handle one inbound frame. Errors that map to an in-band reply are sent
/// straight back to the sender; a fatal error tears the session down.
pub async fn dispatch(hub: &Hub, session: &Arc<Session>, event: ClientEvent) {
    let result = match event {
        ClientEvent::JoinQueue => handle_join_queue(hub, session).await,
        ClientEvent::LeaveQueue => handle_leave_queue(hub, session),
        ClientEvent::SendMessage { content } => {
            message::handle_send_message(hub, session, content).await
        }
        ClientEvent::SendMedia { url, kind, name, size } => {
            media::handle_send_media(hub, session, url, kind, name, size).await
        }
        ClientEvent::Typing => typing::handle_typing(hub, session, true),
        ClientEvent::StopTyping => typing::handle_typing(hub, session, false),
        ClientEvent::DisconnectChat => disconnect::handle_disconnect_chat(hub, session).await,
    };

    if let Err(err) = result {
        match err.to_frame() {
            Some(frame) => session.send(frame),
            None => {
                warn!(session_id = %session.id, error = %err, "fatal session error, closing");
                disconnect::handle_channel_close(hub, session).await;
            }
        }
    }
}
