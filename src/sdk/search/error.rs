use serde::Deserialize;
use thiserror::Error;

/// Shown when the failure has nothing more specific to say.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred during search";
/// Shown when the server rejects the search without an error message.
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed";

// Error body returned by the query endpoint
#[derive(Deserialize, Debug)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Underlying request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // The server answered with a non-success status and a JSON error body
    #[error("API Error (HTTP {status}): {}", .message.as_deref().unwrap_or("<no message>"))]
    Api { status: u16, message: Option<String> },

    // A non-success status whose body is not the expected JSON
    #[error("Unstructured API Error (HTTP {status}): {body}")]
    RawApi { status: u16, body: String },

    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SearchError {
    /// The single message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            SearchError::Api { .. } | SearchError::RawApi { .. } => {
                SEARCH_FAILED_MESSAGE.to_string()
            }
            SearchError::Transport(_) | SearchError::Decode(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Transport(_) => "transport",
            SearchError::Api { .. } | SearchError::RawApi { .. } => "api",
            SearchError::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_message_is_shown_verbatim() {
        let err = SearchError::Api {
            status: 400,
            message: Some("Please provide either lat+lon or a [city,] state".to_string()),
        };
        assert_eq!(
            err.user_message(),
            "Please provide either lat+lon or a [city,] state"
        );
        assert_eq!(err.kind(), "api");
    }

    #[test]
    fn api_without_message_falls_back() {
        let err = SearchError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), SEARCH_FAILED_MESSAGE);

        let err = SearchError::RawApi {
            status: 502,
            body: "<html>Bad Gateway</html>".to_string(),
        };
        assert_eq!(err.user_message(), SEARCH_FAILED_MESSAGE);
    }

    #[test]
    fn decode_failure_uses_generic_message() {
        let err: SearchError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.kind(), "decode");
    }
}
