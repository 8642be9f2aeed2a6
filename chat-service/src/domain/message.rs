//! Messages and their delivery status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::validate::{Validate, ValidationError, Violations};
use super::Entity;

const MESSAGE_STATUS_COLUMNS: &[&str] = &[
    "id",
    "message_id",
    "status",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Maximum message length in characters
pub const MAX_CONTENT_LEN: usize = 4096;

/// Delivery state of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MessageState {
    Sent,
    Delivered,
    Read,
}

impl MessageState {
    /// Wire and column value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Delivered => "Delivered",
            Self::Read => "Read",
        }
    }

    /// Every accepted value
    pub const ALL: &'static [&'static str] = &["Sent", "Delivered", "Read"];
}

impl std::str::FromStr for MessageState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sent" => Ok(Self::Sent),
            "Delivered" => Ok(Self::Delivered),
            "Read" => Ok(Self::Read),
            _ => Err(ValidationError {
                fields: vec![format!("m_status must be one of {}", Self::ALL.join(" "))],
            }),
        }
    }
}

/// A row of `messages`
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
#[sqlx(default)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[schema(example = "hi how are you")]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Message {
    const NAME: &'static str = "Message";
    const TABLE: &'static str = "messages";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "sender_id",
        "receiver_id",
        "content",
        "created_at",
        "updated_at",
        "deleted_at",
    ];
    const TEXT_COLUMNS: &'static [&'static str] = &["content"];
    const ASSOCIATIONS: &'static [(&'static str, &'static [&'static str])] =
        &[("statuses", MESSAGE_STATUS_COLUMNS)];

    fn id(&self) -> Uuid {
        self.id
    }
}

/// A row of `message_statuses`
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
#[sqlx(default)]
pub struct MessageStatus {
    pub id: Uuid,
    pub message_id: Uuid,
    #[serde(rename = "m_status")]
    #[schema(example = "Sent")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for MessageStatus {
    const NAME: &'static str = "MessageStatus";
    const TABLE: &'static str = "message_statuses";
    const COLUMNS: &'static [&'static str] = MESSAGE_STATUS_COLUMNS;
    const TEXT_COLUMNS: &'static [&'static str] = &["status"];

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Body of `POST /messages`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateMessageInput {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[schema(example = "hi how are you")]
    pub content: String,
}

impl Validate for CreateMessageInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .required_id("sender_id", self.sender_id)
            .required_id("receiver_id", self.receiver_id)
            .required("content", &self.content)
            .max_len("content", &self.content, MAX_CONTENT_LEN)
            .finish()
    }
}

/// Body of `PUT /messages/{id}`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateMessageInput {
    pub content: String,
}

impl Validate for UpdateMessageInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .required("content", &self.content)
            .max_len("content", &self.content, MAX_CONTENT_LEN)
            .finish()
    }
}

/// Body of `PUT /messages/{id}/status`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateMessageStatusInput {
    #[schema(example = "Delivered")]
    pub m_status: String,
}

impl Validate for UpdateMessageStatusInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .required("m_status", &self.m_status)
            .one_of("m_status", &self.m_status, MessageState::ALL)
            .finish()
    }
}

/// Query string of `GET /messages`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessageQuery {
    /// Only messages sent by this user
    pub sender_id: Option<Uuid>,
    /// Only messages received by this user
    pub receiver_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_m_status() {
        let status = MessageStatus {
            status: MessageState::Sent.as_str().to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["m_status"], "Sent");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_state_parses_wire_values() {
        assert_eq!("Read".parse::<MessageState>().unwrap(), MessageState::Read);
        assert!("read".parse::<MessageState>().is_err());
    }

    #[test]
    fn test_status_input_rejects_unknown_state() {
        let err = UpdateMessageStatusInput {
            m_status: "Lost".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.fields, vec!["m_status must be one of Sent Delivered Read"]);
    }

    #[test]
    fn test_create_requires_all_fields() {
        let err = CreateMessageInput::default().validate().unwrap_err();
        assert_eq!(
            err.fields,
            vec![
                "sender_id is required",
                "receiver_id is required",
                "content is required",
            ]
        );
    }

    #[test]
    fn test_content_length_limit() {
        let input = UpdateMessageInput {
            content: "x".repeat(MAX_CONTENT_LEN + 1),
        };
        assert!(input.validate().is_err());
    }
}
