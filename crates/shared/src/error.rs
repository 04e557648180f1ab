use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connectivity,
    Unauthorized,
    Rejected,
    Protocol,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Transport(_) => ErrorKind::Connectivity,
            BackendError::Status { status, .. } if *status == 401 || *status == 403 => {
                ErrorKind::Unauthorized
            }
            BackendError::Status { .. } => ErrorKind::Rejected,
            BackendError::InvalidUrl { .. } | BackendError::Decode(_) => ErrorKind::Protocol,
        }
    }

    /// Generic wording shown to the user for connectivity-class failures.
    pub fn user_notice(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Connectivity => "Backend unreachable; check that the server is running.",
            ErrorKind::Unauthorized => "Not connected to Spotify.",
            ErrorKind::Rejected => "Backend rejected the request.",
            ErrorKind::Protocol => "Unexpected response from backend.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        let unauthorized = BackendError::Status {
            status: 401,
            body: String::new(),
        };
        assert_eq!(unauthorized.kind(), ErrorKind::Unauthorized);

        let rejected = BackendError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(rejected.kind(), ErrorKind::Rejected);
        assert_eq!(
            BackendError::Transport("refused".to_string()).kind(),
            ErrorKind::Connectivity
        );
    }
}
