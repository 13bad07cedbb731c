//! Frames exchanged over the real-time channel.
//!
//! Every frame is a JSON object `{"event": <name>, "data": {...}}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProjectMessage;

/// Client to server requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinProject { project_id: String },
    LeaveProject { project_id: String },
    SendMessage { project_id: String, message_text: String },
}

impl ClientEvent {
    pub fn action(&self) -> ClientAction {
        match self {
            ClientEvent::JoinProject { .. } => ClientAction::JoinProject,
            ClientEvent::LeaveProject { .. } => ClientAction::LeaveProject,
            ClientEvent::SendMessage { .. } => ClientAction::SendMessage,
        }
    }

    pub fn project_id(&self) -> &str {
        match self {
            ClientEvent::JoinProject { project_id } |
            ClientEvent::LeaveProject { project_id } |
            ClientEvent::SendMessage { project_id, .. } => project_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientAction {
    JoinProject,
    LeaveProject,
    SendMessage,
}

/// Positive answer to a client request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub action: ClientAction,
    pub project_id: String,
}

/// Negative answer to a client request, carrying the same error codes as the HTTP API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// `None` when the frame could not be decoded at all
    pub action: Option<ClientAction>,
    pub project_id: Option<String>,
    pub errcode: String,
    pub error: String,
}

/// Broadcast payload for one persisted message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub id: String,
    pub project_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub message_text: String,
    pub sent_at: DateTime<Utc>,
}

impl NewMessage {
    pub fn from_message(message: &ProjectMessage, sender_name: impl Into<String>) -> Self {
        Self {
            id: message.message_id.clone(),
            project_id: message.project_id.clone(),
            sender_id: message.sender_id.clone(),
            sender_name: sender_name.into(),
            message_text: message.message_text.clone(),
            sent_at: message.sent_at,
        }
    }
}

/// Server to client frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    Ack(Ack),
    Rejected(Rejection),
    NewMessage(NewMessage),
    /// The connection was dropped from the room because the membership ended
    MembershipRevoked { project_id: String },
    Ping { timestamp: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_frames_use_kebab_case_event_names() {
        let frame = json!({
            "event": "send-message",
            "data": { "project_id": "p1", "message_text": "hello" }
        });
        let event: ClientEvent = serde_json::from_value(frame).unwrap();

        assert_eq!(event.action(), ClientAction::SendMessage);
        assert_eq!(event.project_id(), "p1");
    }

    #[test]
    fn new_message_frame_carries_sender_fields() {
        let message = ProjectMessage {
            message_id: "m1".to_string(),
            project_id: "p1".to_string(),
            sender_id: "u1".to_string(),
            message_text: "hi".to_string(),
            seq: 1,
            sent_at: Utc::now(),
        };
        let frame = serde_json::to_value(ServerEvent::NewMessage(NewMessage::from_message(
            &message, "Ada",
        )))
        .unwrap();

        assert_eq!(frame["event"], "new-message");
        assert_eq!(frame["data"]["id"], "m1");
        assert_eq!(frame["data"]["sender_id"], "u1");
        assert_eq!(frame["data"]["sender_name"], "Ada");
        assert_eq!(frame["data"]["message_text"], "hi");
        assert!(frame["data"]["sent_at"].is_string());
    }

    #[test]
    fn unknown_event_names_do_not_decode() {
        let frame = json!({ "event": "delete-project", "data": { "project_id": "p1" } });
        assert!(serde_json::from_value::<ClientEvent>(frame).is_err());
    }
}
