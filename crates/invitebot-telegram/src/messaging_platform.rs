use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Parameters of one `createChatInviteLink` call.
///
/// No `expire_date` or `member_limit` is ever sent, so created links never
/// expire; `creates_join_request` gates joins behind admin approval.
pub struct InviteLinkRequest {
    pub chat_id: i64,
    pub name: String,
    pub creates_join_request: bool,
}

impl InviteLinkRequest {
    pub fn join_request_gated(chat_id: i64, name: impl Into<String>) -> Self {
        Self {
            chat_id,
            name: name.into(),
            creates_join_request: true,
        }
    }
}

#[derive(Debug, Error)]
/// Failure of a single messaging platform call.
///
/// `Display` is the human-readable reason recorded in failed link outcomes.
pub enum PlatformError {
    #[error("telegram {method} request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{description}")]
    Rejected {
        method: &'static str,
        error_code: Option<i64>,
        description: String,
    },
    #[error("telegram {method} returned status {status}: {body}")]
    HttpStatus {
        method: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode telegram {method} response: {detail}")]
    Decode { method: &'static str, detail: String },
    #[error("telegram {method} response did not include a result")]
    MissingResult { method: &'static str },
}

impl PlatformError {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Transport { method, .. }
            | Self::Rejected { method, .. }
            | Self::HttpStatus { method, .. }
            | Self::Decode { method, .. }
            | Self::MissingResult { method } => method,
        }
    }
}

#[async_trait]
/// Outbound operations the invite-link runtime needs from a chat platform.
pub trait MessagingPlatform: Send + Sync {
    /// Creates an invite link and returns its URL.
    async fn create_invite_link(&self, request: &InviteLinkRequest)
        -> Result<String, PlatformError>;

    /// Sends plain text to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), PlatformError>;
}
