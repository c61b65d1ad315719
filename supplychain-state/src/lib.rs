//! # supplychain-state
//!
//! File-backed world state and the transaction stub that simulates one
//! contract invocation against it.
//!
//! Call [`execute_at`] to run a single named function as one transaction:
//! reads see committed state, writes are buffered and committed only when the
//! invocation succeeds.

pub mod error;
pub mod execute;
pub mod transaction;
pub mod world_state;

pub use error::StateError;
pub use execute::{execute, execute_at, Execution};
pub use transaction::{timestamp_now, CommitSummary, Transaction};
pub use world_state::FileWorldState;
