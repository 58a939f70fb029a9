use crate::model::{EventAction, EventStatus};

/// Fallback text shown when the backend rejects a request without a message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// All errors that can occur while talking to the lounge backend.
#[derive(thiserror::Error, Debug)]
pub enum LoungeError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The backend answered 401. The session has already been expired.
    #[error("unauthorized request to {url}")]
    Unauthorized { url: String },

    /// The backend answered 404.
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// Any other non-success status, carrying the server's message.
    #[error("unexpected status {status} for {url}: {message}")]
    Api {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    /// The envelope came back with `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The body did not match the expected schema.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// The envelope decoded but is structurally unusable.
    #[error("malformed envelope from {url}: {reason}")]
    MalformedEnvelope { url: String, reason: &'static str },

    /// A blob endpoint answered with the wrong content type.
    #[error("expected {expected} from {url}, got {actual}")]
    UnexpectedContentType {
        url: String,
        expected: &'static str,
        actual: String,
    },

    /// Client-side form validation failed; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A lifecycle command is not legal from the event's current status.
    #[error("cannot {action} event {event_id} while it is {status}")]
    InvalidTransition {
        event_id: String,
        status: EventStatus,
        action: EventAction,
    },

    /// Placement ranks are limited to 1st, 2nd and 3rd.
    #[error("invalid placement rank {0}, expected 1-3")]
    InvalidRank(u8),

    /// One request of a joined events+teams fetch failed, so nothing was
    /// derived. Shown to the user as the generic message.
    #[error("combined fetch failed: {source}")]
    Composite { source: Box<LoungeError> },

    /// Realtime socket failure.
    #[error("socket error on {url}: {source}")]
    Socket {
        url: String,
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },

    /// Writing an export to disk failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Missing or unparsable configuration.
    #[error("invalid configuration for {key}: {message}")]
    Config { key: &'static str, message: String },
}

impl LoungeError {
    /// The text a view shows inline or in a toast for this failure.
    pub fn user_message(&self) -> String {
        match self {
            LoungeError::Http { .. } => "Network error. Check your connection.".to_string(),
            LoungeError::Unauthorized { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            LoungeError::NotFound { .. } => "The requested item no longer exists.".to_string(),
            LoungeError::Api { message, .. } | LoungeError::Rejected(message) => {
                if message.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    message.clone()
                }
            }
            LoungeError::Validation(errors) => validation_summary(errors),
            LoungeError::InvalidTransition { .. } | LoungeError::InvalidRank(_) => self.to_string(),
            LoungeError::Composite { .. } => GENERIC_ERROR_MESSAGE.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// True when the failure came from the auth layer and the caller is being redirected.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            LoungeError::Unauthorized { .. } => true,
            LoungeError::Composite { source } => source.is_unauthorized(),
            _ => false,
        }
    }

    pub(crate) fn composite(source: LoungeError) -> Self {
        LoungeError::Composite {
            source: Box::new(source),
        }
    }
}

fn validation_summary(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "is invalid".to_string());
            if field == "__all__" {
                detail
            } else {
                format!("{field} {detail}")
            }
        })
        .collect();
    fields.sort();
    if fields.is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        fields.join("; ")
    }
}

pub type Result<T> = std::result::Result<T, LoungeError>;
