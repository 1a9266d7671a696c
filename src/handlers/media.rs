//! `SEND_MEDIA`: forward a media reference to the partner, unmoderated.

use crate::error::SessionError;
use crate::hub::Hub;
use crate::state::{Session, SessionState};
use crate::wire::{ChatMessage, MediaKind, MessageKind, ServerEvent};
use std::sync::Arc;

pub async fn handle_send_media(
    hub: &Hub,
    session: &Arc<Session>,
    url: String,
    kind: MediaKind,
    name: Option<String>,
    size: Option<u64>,
) -> Result<(), SessionError> {
    if session.state() != SessionState::Paired {
        return Err(SessionError::NotPaired);
    }
    if url.trim().is_empty() {
        return Err(SessionError::InvalidMedia);
    }

    let room_id = session.room_id().ok_or(SessionError::NotPaired)?;
    let partner_id = session.partner_id().ok_or(SessionError::NotPaired)?;
    let now_ms = hub.clock.now_ms();

    let message = ChatMessage {
        id: hub.next_message_id(),
        content: String::new(),
        sender_id: session.id.clone(),
        timestamp: now_ms,
        kind: MessageKind::User,
        media_url: Some(url.clone()),
        media_kind: Some(kind),
        file_name: name,
        file_size: size,
    };

    hub.registry
        .send(&partner_id, ServerEvent::MediaReceived { message });

    if let Some(room) = hub.registry.get_room(&room_id) {
        room.record_message(now_ms);
    }
    hub.counters.record_message();

    if let Err(err) = hub
        .db
        .sessions()
        .log_message(&room_id, &session.source_addr, &url, now_ms / 1000, false, None)
        .await
    {
        tracing::warn!(error = %err, room_id = %room_id, "failed to log media message");
    }

    Ok(())
}
