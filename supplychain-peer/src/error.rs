use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the peer runtime and its client protocol.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("world state error: {0}")]
    State(#[from] supplychain_state::StateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The peer executed the invocation and the contract refused it.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("peer protocol error: {0}")]
    Protocol(String),

    #[error("peer is not running (socket missing: {socket})")]
    PeerNotRunning { socket: PathBuf },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PeerError {
    PeerError::Io {
        path: path.into(),
        source,
    }
}
