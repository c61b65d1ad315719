//! Supply-chain registry core: product schema, stub seam, contract, dispatch.
//!
//! Public API surface:
//! - [`types`]: [`Product`] and the [`ProductId`] newtype
//! - [`error`]: [`ContractError`]
//! - [`stub`] / [`context`]: the world-state primitives the contract consumes
//! - [`contract`]: [`SupplyChainContract`] operations
//! - [`dispatch`]: name + string-args invocation surface
//! - [`memory`]: in-memory [`MemoryStub`]

pub mod context;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod stub;
pub mod types;

pub use context::TransactionContext;
pub use contract::{SupplyChainContract, STATUS_MANUFACTURED};
pub use dispatch::Function;
pub use error::ContractError;
pub use memory::MemoryStub;
pub use stub::{ChaincodeStub, KeyValue, StateQueryIterator, StubError, TxTimestamp};
pub use types::{Product, ProductId};
