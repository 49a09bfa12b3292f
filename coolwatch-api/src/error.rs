use thiserror::Error;

/// Common error type for CoolWatch components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid server URL: {0}")]
    Url(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Status code for API errors, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error means the session is missing or expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Result type alias using CoolWatch's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_exposes_status() {
        let error = Error::Api {
            status: 404,
            detail: "Heat exchanger not found".to_string(),
        };

        assert_eq!(error.status(), Some(404));
        assert!(!error.is_unauthorized());
        assert!(error.to_string().contains("404"));
    }

    #[test]
    fn test_unauthorized_detection() {
        for status in [401, 403] {
            let error = Error::Api {
                status,
                detail: "Not authenticated".to_string(),
            };
            assert!(error.is_unauthorized());
        }

        assert!(!Error::Config("bad".to_string()).is_unauthorized());
    }
}
