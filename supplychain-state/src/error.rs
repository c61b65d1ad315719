//! Error types for supplychain-state.

use std::path::PathBuf;

use thiserror::Error;

use supplychain_core::ContractError;

/// All errors that can arise from world-state and transaction operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// The contract rejected the invocation; nothing was committed.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file in the state directory does not decode to a key.
    #[error("unrecognised world state entry at {path}")]
    CorruptEntry { path: PathBuf },

    /// Keys must be non-empty and short enough to name a file.
    #[error("invalid world state key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.supplychain/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`StateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StateError {
    StateError::Io {
        path: path.into(),
        source,
    }
}
