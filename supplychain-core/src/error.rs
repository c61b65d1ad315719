//! Error types for supplychain-core.

use thiserror::Error;

use crate::stub::StubError;

/// All errors a contract operation or dispatch can return.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The stub could not supply a usable transaction timestamp.
    #[error("failed to get transaction timestamp: {0}")]
    TimestampUnavailable(String),

    /// `CreateProduct` called for an id that is already stored.
    #[error("product with ID {id} already exists")]
    DuplicateId { id: String },

    /// Update / transfer / query against an absent id.
    #[error("product with ID {id} does not exist")]
    NotFound { id: String },

    /// A point read or range-scan construction failed in the world state.
    #[error("failed to read from world state: {source}")]
    StorageReadFailure {
        key: String,
        #[source]
        source: StubError,
    },

    /// An upsert failed in the world state.
    #[error("failed to put product {key} to world state: {source}")]
    StorageWriteFailure {
        key: String,
        #[source]
        source: StubError,
    },

    /// Stored bytes under `key` do not parse as a product.
    #[error("failed to decode product stored at {key}: {source}")]
    DeserializationFailure {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A product could not be encoded before writing.
    #[error("failed to encode product {id}: {source}")]
    SerializationFailure {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A range scan could not advance.
    #[error("failed to iterate world state: {0}")]
    IterationFailure(#[source] StubError),

    /// An argument violated a product invariant (e.g. empty id).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Dispatch received a function name the contract does not export.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Dispatch received the wrong number of string arguments.
    #[error("{function} expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        function: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ContractError {
    pub(crate) fn read(key: impl Into<String>, source: StubError) -> Self {
        Self::StorageReadFailure {
            key: key.into(),
            source,
        }
    }

    pub(crate) fn write(key: impl Into<String>, source: StubError) -> Self {
        Self::StorageWriteFailure {
            key: key.into(),
            source,
        }
    }

    /// True for errors caused by the caller rather than the world state.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ContractError::DuplicateId { .. }
                | ContractError::NotFound { .. }
                | ContractError::InvalidArgument(_)
                | ContractError::UnknownFunction(_)
                | ContractError::InvalidArguments { .. }
        )
    }
}
