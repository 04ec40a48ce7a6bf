use thiserror::Error;

/// Common error type for tsmetrics components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid sink endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("Sink connection to {endpoint} failed: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid measurement: {0}")]
    Measurement(String),
}

impl Error {
    pub(crate) fn endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Endpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using tsmetrics' Error.
pub type Result<T> = std::result::Result<T, Error>;
