//! Chat transcript types for PropertEase.
//!
//! A transcript is an append-only list of [`ChatMessage`]s exchanged between
//! the user and the listing assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Opening message of every new transcript.
pub const DEFAULT_GREETING: &str = "Hello! How can I help you find your perfect space today? You can ask me about listings, neighborhoods, or scheduling a tour.";

/// Bot reply appended when an exchange fails for any reason.
pub const FALLBACK_REPLY: &str = "I'm sorry, something went wrong. Please try again later.";

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single message within a transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    /// When the message was appended. Display metadata only; ordering
    /// comes from the transcript position.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// How much of the transcript is sent to the model for the next reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// Only the user message just submitted.
    #[default]
    Latest,
    /// The whole transcript, rendered as a dialogue.
    Full,
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextMode::Latest => write!(f, "latest"),
            ContextMode::Full => write!(f, "full"),
        }
    }
}
