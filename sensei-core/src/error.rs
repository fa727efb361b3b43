//! Error taxonomy for remote calls and conversation sends.

use thiserror::Error;

/// Shown for every remote failure that did not carry a structured `detail`.
pub const CONNECTIVITY_MESSAGE: &str =
    "Failed to connect to the analysis service. Is the backend running?";

/// Appended to a conversation when a chat call fails without a `detail`.
pub const CHAT_FAILURE_NOTICE: &str = "Error: Could not connect to Sensei.";

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure of an `/analyze`, `/chat` or `/feedback` call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service could not be reached (refused, DNS, TLS, timeout).
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    /// The service answered non-2xx with a `{ "detail": ... }` body.
    #[error("service error {status}: {detail}")]
    Service { status: u16, detail: String },
    /// The service answered non-2xx without a recognised error body.
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16 },
    /// 2xx, but the body does not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Text safe to put in front of the user.
    ///
    /// Structured details pass through verbatim; everything else collapses to
    /// the generic connectivity message. Raw transport errors never leak.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Service { detail, .. } if !detail.trim().is_empty() => detail.clone(),
            _ => CONNECTIVITY_MESSAGE.to_owned(),
        }
    }

    /// Inline notice appended to a conversation for a failed chat call.
    pub fn chat_notice(&self) -> String {
        match self {
            ApiError::Service { detail, .. } if !detail.trim().is_empty() => {
                format!("Error: {detail}")
            }
            _ => CHAT_FAILURE_NOTICE.to_owned(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Malformed(e.to_string())
    }
}

/// Rejected conversation send.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply for this block is still pending")]
    SendInFlight,
    #[error("cannot clear a conversation while its reply is pending")]
    ReplyPending,
    #[error("no analysed block with that identity")]
    UnknownBlock,
}
