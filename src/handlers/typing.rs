//! `TYPING` / `STOP_TYPING`: forwarded to the partner, with typing bursts
//! coalesced to at most one outbound frame per configured interval.

use crate::error::SessionError;
use crate::hub::Hub;
use crate::state::{Session, SessionState};
use crate::wire::ServerEvent;
use std::sync::Arc;

pub fn handle_typing(hub: &Hub, session: &Arc<Session>, is_typing: bool) -> Result<(), SessionError> {
    if session.state() != SessionState::Paired {
        return Err(SessionError::NotPaired);
    }
    let partner_id = session.partner_id().ok_or(SessionError::NotPaired)?;

    if is_typing {
        let now = hub.clock.now_ms();
        let mut last = session.last_typing_forward_ms.lock();
        let coalesce_ms = hub.config.session.typing_coalesce_ms as i64;
        if now - *last < coalesce_ms {
            return Ok(());
        }
        *last = now;
        drop(last);
        hub.registry.send(&partner_id, ServerEvent::PartnerTyping);
    } else {
        *session.last_typing_forward_ms.lock() = 0;
        hub.registry
            .send(&partner_id, ServerEvent::PartnerStoppedTyping);
    }

    Ok(())
}
