//! End-to-end scenarios driven over a real WebSocket connection against an
//! in-process server.

mod common;

use anonchat::wire::{ClientEvent, MediaKind, ServerEvent};
use common::{TestClient, TestServer};
use std::time::Duration;

async fn pair(server: &TestServer) -> (TestClient, TestClient) {
    let mut a = TestClient::connect(&server.ws_url()).await;
    let mut b = TestClient::connect(&server.ws_url()).await;

    a.send(ClientEvent::JoinQueue).await;
    assert!(matches!(a.recv().await, ServerEvent::QueueJoined));

    b.send(ClientEvent::JoinQueue).await;
    assert!(matches!(b.recv().await, ServerEvent::QueueJoined));

    assert!(matches!(a.recv().await, ServerEvent::PartnerFound { .. }));
    assert!(matches!(b.recv().await, ServerEvent::PartnerFound { .. }));

    (a, b)
}

#[tokio::test]
async fn happy_pair_exchanges_a_message_then_disconnects() {
    let server = TestServer::spawn().await;
    let (mut a, mut b) = pair(&server).await;

    a.send(ClientEvent::SendMessage {
        content: "hello".to_string(),
    })
    .await;
    match b.recv().await {
        ServerEvent::MessageReceived { message } => assert_eq!(message.content, "hello"),
        other => panic!("expected message_received, got {other:?}"),
    }

    a.send(ClientEvent::DisconnectChat).await;
    match b.recv().await {
        ServerEvent::PartnerDisconnected => {}
        other => panic!("expected partner_disconnected, got {other:?}"),
    }
}

#[tokio::test]
async fn twenty_first_message_in_a_window_is_rate_limited() {
    let server = TestServer::spawn().await;
    let (mut a, mut b) = pair(&server).await;

    for i in 0..20 {
        a.send(ClientEvent::SendMessage {
            content: format!("message {i}"),
        })
        .await;
        match b.recv().await {
            ServerEvent::MessageReceived { .. } => {}
            other => panic!("expected message {i} to be relayed, got {other:?}"),
        }
    }

    a.send(ClientEvent::SendMessage {
        content: "one too many".to_string(),
    })
    .await;
    match a.recv().await {
        ServerEvent::RateLimited { .. } => {}
        other => panic!("expected rate_limited, got {other:?}"),
    }
    assert!(
        b.silent_for(Duration::from_millis(300)).await,
        "partner should not receive the throttled message"
    );
}

#[tokio::test]
async fn blocked_content_is_flagged_and_never_relayed() {
    let server = TestServer::spawn().await;
    let (mut a, mut b) = pair(&server).await;

    a.send(ClientEvent::SendMessage {
        content: "you fucking idiot".to_string(),
    })
    .await;

    match a.recv().await {
        ServerEvent::MessageFlagged { .. } => {}
        other => panic!("expected message_flagged, got {other:?}"),
    }
    assert!(
        b.silent_for(Duration::from_millis(300)).await,
        "partner should never see a blocked message"
    );
}

#[tokio::test]
async fn warning_content_is_masked_before_relay() {
    let server = TestServer::spawn().await;
    let (mut a, mut b) = pair(&server).await;

    a.send(ClientEvent::SendMessage {
        content: "you are such an idiot".to_string(),
    })
    .await;

    match b.recv().await {
        ServerEvent::MessageReceived { message } => {
            assert!(!message.content.contains("idiot"));
            assert_eq!(message.content.len(), "you are such an idiot".len());
        }
        other => panic!("expected a masked message_received, got {other:?}"),
    }
}

#[tokio::test]
async fn media_reference_is_relayed_unmoderated() {
    let server = TestServer::spawn().await;
    let (mut a, mut b) = pair(&server).await;

    a.send(ClientEvent::SendMedia {
        url: "https://example.com/cat.png".to_string(),
        kind: MediaKind::Image,
        name: Some("cat.png".to_string()),
        size: Some(1024),
    })
    .await;

    match b.recv().await {
        ServerEvent::MediaReceived { message } => {
            assert_eq!(message.media_url.as_deref(), Some("https://example.com/cat.png"));
        }
        other => panic!("expected media_received, got {other:?}"),
    }
}

#[tokio::test]
async fn banned_source_is_refused_admission() {
    let server = TestServer::spawn().await;
    server
        .hub
        .db
        .bans()
        .insert("203.0.113.9", "abuse report", server.hub.clock.now_unix(), "admin")
        .await
        .expect("insert ban");
    server.hub.ban_gate.bump_version();

    let mut client = TestClient::connect_from(&server.ws_url(), "203.0.113.9").await;
    match client.recv().await {
        ServerEvent::Banned => {}
        other => panic!("expected banned, got {other:?}"),
    }
    assert!(
        client.silent_for(Duration::from_millis(200)).await,
        "a banned connection should receive nothing else"
    );
}

#[tokio::test]
async fn fifo_queue_skips_a_session_that_left_before_matching() {
    let server = TestServer::spawn().await;

    let mut a = TestClient::connect_from(&server.ws_url(), "198.51.100.1").await;
    a.send(ClientEvent::JoinQueue).await;
    assert!(matches!(a.recv().await, ServerEvent::QueueJoined));
    a.close().await;

    // Give the server's socket loop time to notice the close and drop `a`
    // from the matchmaker queue before b/c join.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.hub.matchmaker.len(), 0);

    let mut b = TestClient::connect_from(&server.ws_url(), "198.51.100.2").await;
    let mut c = TestClient::connect_from(&server.ws_url(), "198.51.100.3").await;

    b.send(ClientEvent::JoinQueue).await;
    assert!(matches!(b.recv().await, ServerEvent::QueueJoined));
    c.send(ClientEvent::JoinQueue).await;
    assert!(matches!(c.recv().await, ServerEvent::QueueJoined));

    assert!(matches!(b.recv().await, ServerEvent::PartnerFound { .. }));
    assert!(matches!(c.recv().await, ServerEvent::PartnerFound { .. }));
}

#[tokio::test]
async fn partner_close_notifies_the_other_side() {
    let server = TestServer::spawn().await;
    let (mut a, mut b) = pair(&server).await;

    b.send(ClientEvent::SendMessage {
        content: "hi".to_string(),
    })
    .await;
    match a.recv().await {
        ServerEvent::MessageReceived { message } => assert_eq!(message.content, "hi"),
        other => panic!("expected message_received, got {other:?}"),
    }

    b.close().await;

    match a.recv().await {
        ServerEvent::PartnerDisconnected => {}
        other => panic!("expected partner_disconnected, got {other:?}"),
    }
}

#[tokio::test]
async fn rejoining_queue_while_already_waiting_is_an_error() {
    let server = TestServer::spawn().await;
    let mut a = TestClient::connect(&server.ws_url()).await;

    a.send(ClientEvent::JoinQueue).await;
    assert!(matches!(a.recv().await, ServerEvent::QueueJoined));

    a.send(ClientEvent::JoinQueue).await;
    match a.recv().await {
        ServerEvent::Error { .. } => {}
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(server.hub.matchmaker.len(), 1);
}
