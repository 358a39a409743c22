use thiserror::Error;

/// Message shown when a failure carries no description of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to load cards";

/// Failure of the external search call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("search endpoint answered {status}")]
    Status { status: reqwest::StatusCode },
    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    pub fn new(msg: &str) -> SearchError {
        SearchError::Other(msg.to_string())
    }

    /// Human-readable message for the error state, falling back to
    /// [`GENERIC_FAILURE_MESSAGE`] when the failure describes nothing.
    pub fn display_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[derive(Debug, Error)]
pub enum CardListError {
    #[error("unknown sort key '{0}'")]
    InvalidSortKey(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("card list controller has stopped")]
    ControllerStopped,
}
