//! `/ws`: the realtime duplex channel. Admits a connection past the ban
//! gate and rate limiter, registers a [`Session`], then runs its frame loop.

use crate::handlers;
use crate::hub::Hub;
use crate::state::SessionState;
use crate::wire::{ClientEvent, ServerEvent};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tracing::{info, warn};
use uuid::Uuid;

/// First entry of `x-forwarded-for` if present, else the peer socket
/// address, else `0.0.0.0`.
pub fn extract_source_addr(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(value) = headers.get("x-forwarded-for")
        && let Ok(raw) = value.to_str()
        && let Some(first) = raw.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    peer.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "0.0.0.0".to_string())
}

pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(hub): State<Hub>,
    headers: HeaderMap,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let source_addr = extract_source_addr(&headers, Some(peer));
    ws.on_upgrade(move |socket| handle_socket(socket, hub, source_addr))
}

async fn handle_socket(mut socket: WebSocket, hub: Hub, source_addr: String) {
    let rule = hub.connection_rate_rule();
    if !hub.rate_limiter.check(&source_addr, "connection", rule) {
        let _ = send_frame(&mut socket, &ServerEvent::RateLimited {
            message: "Too many connection attempts, try again later".to_string(),
        })
        .await;
        return;
    }
    hub.rate_limiter.increment(&source_addr, "connection", rule);

    match hub.ban_gate.is_banned(&source_addr).await {
        Ok(true) => {
            let _ = send_frame(&mut socket, &ServerEvent::Banned).await;
            crate::metrics::BANS_ENFORCED.inc();
            return;
        }
        Err(err) => {
            warn!(error = %err, source = %source_addr, "ban check failed; refusing admission");
            let _ = send_frame(
                &mut socket,
                &ServerEvent::Error {
                    message: "service unavailable".to_string(),
                },
            )
            .await;
            return;
        }
        Ok(false) => {}
    }

    let session_id = Uuid::new_v4().to_string();
    let (session, mut outbound_rx) = hub.registry.register(session_id.clone(), source_addr.clone());
    info!(session_id = %session_id, source = %source_addr, "session admitted");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(event) => {
                        let Ok(payload) = serde_json::to_string(&event) else { continue };
                        if sink.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => handlers::dispatch(&hub, &session, event).await,
                            Err(err) => warn!(session_id = %session.id, error = %err, "malformed frame ignored"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(session_id = %session.id, error = %err, "socket read error");
                        break;
                    }
                }
            }
        }

        if session.state() == SessionState::Closed {
            break;
        }
    }

    handlers::handle_channel_close(&hub, &session).await;
}

async fn send_frame(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(event).expect("ServerEvent always serializes");
    socket.send(Message::Text(payload)).await
}
