//! Client side of the leave API: an HTTP client, a session that survives
//! restarts through a [`storage::TokenStorage`], and the view-state behind the
//! employee and admin dashboards.

pub mod api;
pub mod dashboard;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use dashboard::{AdminDashboard, AdminTab, EmployeeDashboard, LeaveForm, LeaveStats};
pub use session::{Session, SessionState};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

use crate::error::FieldErrors;

#[derive(Debug)]
pub enum ClientError {
    /// Transport failure or an undecodable body.
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Api {
        status: u16,
        message: String,
        errors: Option<FieldErrors>,
    },
    Storage(String),
    NotAuthenticated,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Api { errors, .. } => errors.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(err) => write!(f, "HTTP error: {err}"),
            ClientError::Api { status, message, .. } => write!(f, "API error {status}: {message}"),
            ClientError::Storage(msg) => write!(f, "Token storage error: {msg}"),
            ClientError::NotAuthenticated => write!(f, "Not authenticated"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}
