//! Webhook wire types

use crate::transport::{ContactPayload, DocumentRef, Incoming, MessageShape, PhotoRef};
use serde::{Deserialize, Serialize};

/// One transport update delivered to the webhook
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    /// Absent for update kinds this service does not handle
    #[serde(default)]
    pub message: Option<UpdateMessage>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessage {
    pub from: Sender,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub contact: Option<WireContact>,
    #[serde(default)]
    pub photo: Option<WirePhoto>,
    #[serde(default)]
    pub document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireContact {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct WirePhoto {
    pub file_id: String,
    #[serde(default = "default_photo_media_type")]
    pub media_type: String,
    /// Base64 image bytes, inlined by the transport binding
    pub data: String,
}

fn default_photo_media_type() -> String {
    "image/jpeg".to_string()
}

#[derive(Debug, Deserialize)]
pub struct WireDocument {
    pub file_id: String,
    pub file_name: String,
    pub mime_type: String,
}

impl Update {
    /// Map the update onto the core's inbound message shape. Returns
    /// `None` for updates carrying nothing this service handles.
    pub fn into_incoming(self) -> Option<Incoming> {
        let message = self.message?;
        let shape = if let Some(contact) = message.contact {
            MessageShape::Contact(ContactPayload {
                phone_number: contact.phone_number,
            })
        } else if let Some(photo) = message.photo {
            MessageShape::Photo(PhotoRef {
                file_id: photo.file_id,
                media_type: photo.media_type,
                data: photo.data,
            })
        } else if let Some(document) = message.document {
            MessageShape::Document(DocumentRef {
                file_id: document.file_id,
                file_name: document.file_name,
                mime_type: document.mime_type,
            })
        } else if let Some(text) = message.text {
            MessageShape::from_text(&text)
        } else {
            return None;
        };

        Some(Incoming {
            identity: message.from.id,
            message_id: self.update_id.to_string(),
            display_name: message.from.first_name,
            handle: message.from.username,
            shape,
        })
    }
}

/// Webhook acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

/// Health probe response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Command;

    fn update(json: serde_json::Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_text_update_maps_to_text_shape() {
        let incoming = update(serde_json::json!({
            "update_id": 7,
            "message": {
                "from": { "id": 42, "first_name": "Ada", "username": "ada" },
                "text": "hello"
            }
        }))
        .into_incoming()
        .unwrap();

        assert_eq!(incoming.identity, 42);
        assert_eq!(incoming.message_id, "7");
        assert_eq!(incoming.display_name.as_deref(), Some("Ada"));
        assert_eq!(incoming.shape, MessageShape::Text("hello".to_string()));
    }

    #[test]
    fn test_command_text_maps_to_command_shape() {
        let incoming = update(serde_json::json!({
            "update_id": 8,
            "message": {
                "from": { "id": 42 },
                "text": "/start"
            }
        }))
        .into_incoming()
        .unwrap();

        assert_eq!(incoming.shape, MessageShape::Command(Command::Start));
    }

    #[test]
    fn test_contact_takes_priority_over_text() {
        let incoming = update(serde_json::json!({
            "update_id": 9,
            "message": {
                "from": { "id": 42 },
                "text": "ignored caption",
                "contact": { "phone_number": "+14155550123" }
            }
        }))
        .into_incoming()
        .unwrap();

        assert!(matches!(incoming.shape, MessageShape::Contact(_)));
    }

    #[test]
    fn test_photo_and_document_map() {
        let photo = update(serde_json::json!({
            "update_id": 10,
            "message": {
                "from": { "id": 42 },
                "photo": { "file_id": "p-1", "data": "aGVsbG8=" }
            }
        }))
        .into_incoming()
        .unwrap();
        match photo.shape {
            MessageShape::Photo(p) => {
                assert_eq!(p.file_id, "p-1");
                assert_eq!(p.media_type, "image/jpeg");
            }
            other => panic!("Expected photo, got {other:?}"),
        }

        let doc = update(serde_json::json!({
            "update_id": 11,
            "message": {
                "from": { "id": 42 },
                "document": { "file_id": "d-1", "file_name": "a.pdf", "mime_type": "application/pdf" }
            }
        }))
        .into_incoming()
        .unwrap();
        assert!(matches!(doc.shape, MessageShape::Document(_)));
    }

    #[test]
    fn test_empty_update_is_ignored() {
        assert!(update(serde_json::json!({ "update_id": 12 }))
            .into_incoming()
            .is_none());
        assert!(update(serde_json::json!({
            "update_id": 13,
            "message": { "from": { "id": 42 } }
        }))
        .into_incoming()
        .is_none());
    }
}
