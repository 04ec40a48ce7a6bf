//! Error types for collecting virtual server statistics.

use thiserror::Error;

use crate::query::QueryError;

/// Failure of one collection pass against a ServerQuery session.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The server rejected the query login.
    #[error("ServerQuery login failed: {0}")]
    Auth(#[source] QueryError),

    /// The current selection could not be determined.
    #[error("Failed to query session state: {0}")]
    SessionQuery(#[source] QueryError),

    /// A virtual server could not be selected.
    #[error("Failed to select virtual server {id}: {source}")]
    Selection {
        id: u32,
        #[source]
        source: QueryError,
    },

    /// A listing or info command failed or returned undecodable data.
    #[error("Command '{command}' failed: {source}")]
    Command {
        command: String,
        #[source]
        source: QueryError,
    },

    /// The original selection could not be restored.
    #[error("Failed to restore selection of port {port}: {source}")]
    Restoration {
        port: u16,
        #[source]
        source: QueryError,
    },

    /// Collection failed, and restoring the selection afterwards failed too.
    #[error("{primary} (and then: {restoration})")]
    RestorationAfterFailure {
        #[source]
        primary: Box<CollectError>,
        restoration: Box<CollectError>,
    },
}

impl CollectError {
    pub(crate) fn command(command: impl Into<String>, source: QueryError) -> Self {
        Self::Command {
            command: command.into(),
            source,
        }
    }

    /// Combine the outcome of a collection body with that of restoring the
    /// selection afterwards. A body error is never replaced.
    pub(crate) fn combine<T>(
        body: Result<T, CollectError>,
        restore: Result<(), CollectError>,
    ) -> Result<T, CollectError> {
        match (body, restore) {
            (body, Ok(())) => body,
            (Ok(_), Err(restoration)) => Err(restoration),
            (Err(primary), Err(restoration)) => Err(Self::RestorationAfterFailure {
                primary: Box::new(primary),
                restoration: Box::new(restoration),
            }),
        }
    }

    /// The error that aborted collection, ignoring any restoration failure.
    ///
    /// For a bare [`Restoration`](Self::Restoration) this is the error itself.
    pub fn primary(&self) -> &CollectError {
        match self {
            Self::RestorationAfterFailure { primary, .. } => primary,
            other => other,
        }
    }

    /// The restoration failure, if restoring the selection failed.
    pub fn restoration(&self) -> Option<&CollectError> {
        match self {
            Self::Restoration { .. } => Some(self),
            Self::RestorationAfterFailure { restoration, .. } => Some(restoration),
            _ => None,
        }
    }

    /// The underlying query error of a non-aggregate error.
    pub fn query_error(&self) -> Option<&QueryError> {
        match self {
            Self::Auth(source) | Self::SessionQuery(source) => Some(source),
            Self::Selection { source, .. }
            | Self::Command { source, .. }
            | Self::Restoration { source, .. } => Some(source),
            Self::RestorationAfterFailure { .. } => None,
        }
    }
}
