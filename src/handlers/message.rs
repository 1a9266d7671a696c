//! The `SEND_MESSAGE` pipeline: gate, rate-limit, sanitize, moderate, relay.

use crate::error::SessionError;
use crate::hub::Hub;
use crate::metrics;
use crate::security::moderator;
use crate::state::{Session, SessionState};
use crate::wire::{ChatMessage, MessageKind, ServerEvent};
use std::sync::Arc;

/// Fallback used only by the unit tests below; production call sites pass
/// `hub.config.security.max_message_len`.
#[cfg(test)]
const MAX_MESSAGE_LEN: usize = 2000;

/// HTML-escape the characters that matter for a JSON-wrapped chat bubble,
/// trim surrounding whitespace, and clamp to `max_len`.
fn sanitize(input: &str, max_len: usize) -> String {
    let escaped: String = input
        .chars()
        .map(|c| match c {
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            other => other.to_string(),
        })
        .collect();
    let trimmed = escaped.trim();
    trimmed.chars().take(max_len).collect()
}

pub async fn handle_send_message(
    hub: &Hub,
    session: &Arc<Session>,
    content: String,
) -> Result<(), SessionError> {
    if session.state() != SessionState::Paired {
        return Err(SessionError::NotPaired);
    }

    let rule = hub.message_rate_rule();
    if !hub.rate_limiter.check(&session.source_addr, "message", rule) {
        metrics::RATE_LIMIT_HITS.inc();
        return Err(SessionError::RateLimited(
            "You're sending messages too quickly".to_string(),
        ));
    }

    let max_len = hub.config.security.max_message_len;
    let sanitized = sanitize(&content, max_len);
    if sanitized.is_empty() || sanitized.chars().count() > max_len {
        return Err(SessionError::InvalidMessage);
    }

    hub.rate_limiter.increment(&session.source_addr, "message", rule);

    let room_id = session.room_id().ok_or(SessionError::NotPaired)?;
    let partner_id = session.partner_id().ok_or(SessionError::NotPaired)?;
    let now_ms = hub.clock.now_ms();

    if moderator::is_spam(&sanitized) {
        log_flagged(hub, &room_id, &session.source_addr, &sanitized, now_ms, "spam").await;
        return Err(SessionError::Flagged(
            "Your message looked like spam and was not delivered".to_string(),
        ));
    }

    let verdict = moderator::check(&sanitized);
    let relay_text = match verdict.severity {
        moderator::Severity::Blocked => {
            log_flagged(
                hub,
                &room_id,
                &session.source_addr,
                &sanitized,
                now_ms,
                "profanity",
            )
            .await;
            return Err(SessionError::Flagged(
                "Your message was blocked by the content filter".to_string(),
            ));
        }
        moderator::Severity::Warning => moderator::mask(&sanitized),
        moderator::Severity::Clean => sanitized,
    };

    let message = ChatMessage {
        id: hub.next_message_id(),
        content: relay_text.clone(),
        sender_id: session.id.clone(),
        timestamp: now_ms,
        kind: MessageKind::User,
        media_url: None,
        media_kind: None,
        file_name: None,
        file_size: None,
    };

    hub.registry.send(
        &partner_id,
        ServerEvent::MessageReceived {
            message: message.clone(),
        },
    );
    metrics::MESSAGES_RELAYED.inc();

    if let Some(room) = hub.registry.get_room(&room_id) {
        room.record_message(now_ms);
    }
    hub.counters.record_message();

    if let Err(err) = hub
        .db
        .sessions()
        .log_message(&room_id, &session.source_addr, &relay_text, now_ms / 1000, false, None)
        .await
    {
        tracing::warn!(error = %err, room_id = %room_id, "failed to log message");
    }

    Ok(())
}

async fn log_flagged(
    hub: &Hub,
    room_id: &str,
    sender_ip: &str,
    content: &str,
    now_ms: i64,
    reason: &str,
) {
    metrics::MESSAGES_FLAGGED.inc();
    if let Err(err) = hub
        .db
        .sessions()
        .log_message(room_id, sender_ip, content, now_ms / 1000, true, Some(reason))
        .await
    {
        tracing::warn!(error = %err, room_id = %room_id, "failed to log flagged message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_escapes_html_and_trims() {
        assert_eq!(
            sanitize("  <b>hi</b>  ", MAX_MESSAGE_LEN),
            "&lt;b&gt;hi&lt;/b&gt;"
        );
    }

    #[test]
    fn sanitize_clamps_length() {
        let long = "a".repeat(3000);
        assert_eq!(sanitize(&long, MAX_MESSAGE_LEN).chars().count(), MAX_MESSAGE_LEN);
    }
}
