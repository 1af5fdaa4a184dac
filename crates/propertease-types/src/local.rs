//! Types for the on-device model session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prompt::Modality;

/// Result of probing the host runtime for a local model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    /// The model is loaded or can be loaded without a download.
    ReadilyAvailable,
    /// The runtime works but the model still has to be downloaded.
    AfterDownload,
    /// The runtime cannot serve a local model at all.
    No,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::ReadilyAvailable => write!(f, "readily-available"),
            Availability::AfterDownload => write!(f, "after-download"),
            Availability::No => write!(f, "no"),
        }
    }
}

/// Declared capabilities a session is negotiated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub expected_inputs: Vec<Modality>,
    pub expected_outputs: Vec<Modality>,
}

impl SessionOptions {
    /// Text and image in, text out.
    pub fn multimodal() -> Self {
        Self {
            expected_inputs: vec![Modality::Text, Modality::Image],
            expected_outputs: vec![Modality::Text],
        }
    }

    pub fn accepts(&self, modality: Modality) -> bool {
        self.expected_inputs.contains(&modality)
    }
}

/// Observable state of the on-device session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocalSessionState {
    Uninitialized,
    Checking,
    Ready,
    Unavailable { reason: String },
}

impl LocalSessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LocalSessionState::Ready)
    }
}

impl fmt::Display for LocalSessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSessionState::Uninitialized => write!(f, "uninitialized"),
            LocalSessionState::Checking => write!(f, "checking"),
            LocalSessionState::Ready => write!(f, "ready"),
            LocalSessionState::Unavailable { reason } => write!(f, "unavailable: {reason}"),
        }
    }
}
