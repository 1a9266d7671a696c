//! A thin WebSocket client speaking the tagged JSON wire protocol directly,
//! for black-box assertions against a real [`super::TestServer`].

#![allow(dead_code)]

use anonchat::wire::{ClientEvent, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub struct TestClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(url: &str) -> Self {
        let (socket, _response) = connect_async(url).await.expect("connect to test server");
        Self { socket }
    }

    /// Connect with a spoofed `x-forwarded-for`, so tests can exercise
    /// per-source behavior (bans, rate limits) without needing distinct
    /// real loopback addresses.
    pub async fn connect_from(url: &str, source_ip: &str) -> Self {
        let mut request = url.into_client_request().expect("build handshake request");
        request
            .headers_mut()
            .insert("x-forwarded-for", source_ip.parse().expect("valid header value"));
        let (socket, _response) = connect_async(request).await.expect("connect to test server");
        Self { socket }
    }

    pub async fn send(&mut self, event: ClientEvent) {
        let payload = serde_json::to_string(&event).expect("serialize client event");
        self.socket
            .send(Message::Text(payload))
            .await
            .expect("send frame");
    }

    /// Receive the next text frame and decode it, failing the test if none
    /// arrives within a few seconds.
    pub async fn recv(&mut self) -> ServerEvent {
        self.try_recv(Duration::from_secs(5))
            .await
            .expect("expected a server frame before timeout")
    }

    pub async fn try_recv(&mut self, timeout: Duration) -> Option<ServerEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let next = tokio::time::timeout(remaining, self.socket.next()).await.ok()??;
            match next.ok()? {
                Message::Text(text) => {
                    return serde_json::from_str(&text).ok();
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Whether a frame arrives within `timeout` at all, without caring what
    /// it decodes to.
    pub async fn silent_for(&mut self, timeout: Duration) -> bool {
        self.try_recv(timeout).await.is_none()
    }

    pub async fn close(mut self) {
        let _ = self.socket.close(None).await;
    }
}
