//! vSphere client errors

use crate::models::LocalizedMethodFault;
use thiserror::Error;

/// Errors that can occur when interacting with the vSphere API
#[derive(Debug, Error)]
pub enum VSphereError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// vSphere API rejected the request
    #[error("vSphere API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Login failed or the session is no longer valid
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Managed object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., malformed inventory path)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A remote task reached the `error` state
    ///
    /// The localized message is rendered verbatim so operators see exactly
    /// what vCenter reported.
    #[error("{0}")]
    TaskFault(LocalizedMethodFault),
}

impl VSphereError {
    /// Returns the structured fault when this error came from a failed task
    pub fn task_fault(&self) -> Option<&LocalizedMethodFault> {
        match self {
            VSphereError::TaskFault(fault) => Some(fault),
            _ => None,
        }
    }
}
