//! Value types shared by provisioning, persistence and rendering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One broadcast chat that receives an invite link per batch.
pub struct Destination {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "chat_id")]
    pub platform_id: i64,
}

impl Destination {
    pub fn new(display_name: impl Into<String>, platform_id: i64) -> Self {
        Self {
            display_name: display_name.into(),
            platform_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResult {
    Success { url: String },
    Failure { reason: String },
}

impl LinkResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The URL for a success, the failure reason otherwise.
    pub fn value(&self) -> &str {
        match self {
            Self::Success { url } => url,
            Self::Failure { reason } => reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub display_name: String,
    pub result: LinkResult,
}

impl LinkOutcome {
    pub fn success(display_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            result: LinkResult::Success { url: url.into() },
        }
    }

    pub fn failure(display_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            result: LinkResult::Failure {
                reason: reason.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Outcomes of one provisioning run, in destination registry order.
pub struct LinkBatch {
    outcomes: Vec<LinkOutcome>,
}

impl LinkBatch {
    pub fn new(outcomes: Vec<LinkOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[LinkOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_success())
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkLabelError {
    #[error("link label cannot be empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Requester-supplied name attached to every link of a batch.
///
/// Trimmed and guaranteed non-empty; otherwise passed to the platform as-is.
pub struct LinkLabel(String);

impl LinkLabel {
    pub fn parse(raw: &str) -> Result<Self, LinkLabelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LinkLabelError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LinkLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
