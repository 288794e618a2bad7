use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::resolver::ReplySource;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Trimmed, non-empty user text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance(String);

impl Utterance {
    pub fn parse(text: &str) -> Result<Self, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Reply body of `POST /api/chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: Status,
    pub response: String,
    pub source: ReplySource,
    pub timestamp: String,
}

impl ResponseEnvelope {
    pub fn new(status: Status, response: String, source: ReplySource) -> Self {
        Self {
            status,
            response,
            source,
            timestamp: timestamp_now(),
        }
    }
}

/// Informational body used for the chat info, health and 405 replies.
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoEnvelope {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Current UTC time as ISO-8601 with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
