use thiserror::Error;

/// Failure talking to the backend REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors surfaced by the candidate browser to its presentation layer.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to load candidates: {0}")]
    Load(#[from] ApiError),

    #[error("Unknown filter '{0}' (expected experience, role, location or skill)")]
    UnknownFilter(String),

    #[error("Unknown pass policy '{0}' (expected withhold or retract)")]
    UnknownPassPolicy(String),

    #[error("Unknown command '{0}' (type 'help' for a list)")]
    UnknownCommand(String),

    #[error("Missing value: {0}")]
    MissingArgument(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status() {
        let err = ApiError::Api {
            status: 503,
            message: "down".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        let parse = serde_json::from_str::<u64>("nope").unwrap_err();
        assert_eq!(ApiError::from(parse).status(), None);
    }

    #[test]
    fn test_load_error_wraps_api_error_message() {
        let err = BrowserError::from(ApiError::Api {
            status: 401,
            message: "Invalid token.".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to load candidates: API error (status 401): Invalid token."
        );
    }
}
