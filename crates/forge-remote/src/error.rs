//! Error types for forge-remote

use thiserror::Error;

/// Errors that can occur when talking to the hosting or archival service
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport failure (connect, DNS, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A resource that must be unique already exists (e.g. a branch ref)
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Conditional write rejected because the stored version changed
    #[error("conflicting write on {path}: {body}")]
    Conflict { path: String, body: String },

    /// A resource required by the operation does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Client could not be built from its configuration
    #[error("client not configured: {0}")]
    NotConfigured(String),
}

impl RemoteError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            RemoteError::AlreadyExists(_) => Some(422),
            RemoteError::Conflict { .. } => Some(409),
            RemoteError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status_and_body() {
        let err = RemoteError::Api {
            status: 403,
            body: "Resource not accessible by integration".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("not accessible"));
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_conflict_reports_409() {
        let err = RemoteError::Conflict {
            path: "README.md".to_string(),
            body: "sha mismatch".to_string(),
        };
        assert_eq!(err.status(), Some(409));
        assert!(err.to_string().contains("README.md"));
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = RemoteError::Http("connection refused".to_string());
        assert_eq!(err.status(), None);
    }
}
