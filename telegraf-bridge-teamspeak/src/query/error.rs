use std::time::Duration;

/// Error type for ServerQuery transport and protocol failures.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error("Connection closed by server")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error {id}: {message}")]
    Server { id: u32, message: String },

    #[error("Undecodable response: {0}")]
    Decode(String),
}

impl QueryError {
    /// ServerQuery error id, for errors reported by the server itself.
    pub fn server_id(&self) -> Option<u32> {
        match self {
            QueryError::Server { id, .. } => Some(*id),
            _ => None,
        }
    }
}
