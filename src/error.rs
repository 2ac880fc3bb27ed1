use thiserror::Error;

/// Failure of a single suggestion request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request was superseded or the fetcher was disconnected.
    #[error("request cancelled")]
    Cancelled,

    /// Network failure or a body that could not be read as JSON.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-2xx status.
    #[error("server returned status {0}")]
    Status(u16),

    /// JSON arrived but not in the `[query, [candidates], ...]` shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Request(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid delay {0:?}: expected milliseconds")]
    InvalidDelay(String),

    #[error("invalid value {value:?} for {name}: expected true or false")]
    InvalidFlag { name: &'static str, value: String },
}
