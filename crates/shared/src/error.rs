use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared by every failure that most likely comes from the endpoint being
/// deployed with restricted access instead of public access.
pub const ACCESS_HINT: &str =
    "Most likely cause: the endpoint's \"Who has access\" setting is not \"Anyone\".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConfigured,
    Transport,
    Server,
    MalformedResponse,
    Application,
}

/// Every way a call to the confirmation endpoint can fail. `Display` is the
/// plain-language text shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsvpError {
    #[error("The endpoint URL is not configured. Finish the setup guide, copy your script URL and paste it into the configuration.")]
    NotConfigured,
    #[error("Connection error (network or CORS). {}", ACCESS_HINT)]
    Transport { detail: String },
    #[error("Server error (status code: {status}). Check that the script is deployed with access for \"Anyone\".")]
    Server { status: u16 },
    #[error("Unexpected reply from the server: the script did not return valid JSON. Check the script's permissions and code.")]
    MalformedResponse { detail: String },
    #[error("The endpoint script reported an error: {message}")]
    Application { message: String },
}

impl RsvpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RsvpError::NotConfigured => ErrorKind::NotConfigured,
            RsvpError::Transport { .. } => ErrorKind::Transport,
            RsvpError::Server { .. } => ErrorKind::Server,
            RsvpError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            RsvpError::Application { .. } => ErrorKind::Application,
        }
    }

    /// Diagnostic detail that is logged but kept out of the visitor message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            RsvpError::Transport { detail } | RsvpError::MalformedResponse { detail } => {
                Some(detail)
            }
            _ => None,
        }
    }
}
