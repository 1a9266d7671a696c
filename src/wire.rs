//! Wire protocol: the JSON frames exchanged over `/ws`.
//!
//! Every frame on the socket is `{ "type": <string>, "data": <object> }`.
//! Client and server each get a closed tagged enum so a malformed or unknown
//! `type` fails to deserialize instead of silently matching the wrong arm.

use serde::{Deserialize, Serialize};

/// Media attachment kind for `send_media` / `media_received`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// A relayed chat message, as seen by the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    #[serde(rename = "senderId")]
    pub sender_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(rename = "mediaUrl", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(rename = "mediaKind", skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<MediaKind>,
    #[serde(rename = "fileName", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "fileSize", skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    System,
}

/// Inbound frames: client -> server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinQueue,
    LeaveQueue,
    SendMessage { content: String },
    Typing,
    StopTyping,
    DisconnectChat,
    SendMedia {
        url: String,
        kind: MediaKind,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        size: Option<u64>,
    },
}

/// Outbound frames: server -> client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    QueueJoined,
    PartnerFound { #[serde(rename = "roomId")] room_id: String },
    MessageReceived { message: ChatMessage },
    MediaReceived { message: ChatMessage },
    PartnerTyping,
    PartnerStoppedTyping,
    PartnerDisconnected,
    Banned,
    Error { message: String },
    RateLimited { message: String },
    MessageFlagged { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_message_frame() {
        let raw = r#"{"type":"send_message","data":{"content":"hi"}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::SendMessage { content } => assert_eq!(content, "hi"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let raw = r#"{"type":"not_a_real_event","data":{}}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn server_event_serializes_tagged_shape() {
        let event = ServerEvent::PartnerFound { room_id: "abc".into() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "partner_found");
        assert_eq!(json["data"]["roomId"], "abc");
    }
}
