//! Run one contract invocation as one transaction.

use std::path::Path;

use supplychain_core::{ChaincodeStub, Function, SupplyChainContract, TransactionContext, TxTimestamp};

use crate::error::StateError;
use crate::transaction::{CommitSummary, Transaction};
use crate::world_state::FileWorldState;

/// Outcome of a successful invocation.
#[derive(Debug, Clone)]
pub struct Execution {
    pub function: Function,
    /// Contract payload; empty for mutations.
    pub payload: Vec<u8>,
    /// `None` for read-only functions, which never commit.
    pub commit: Option<CommitSummary>,
}

/// Simulate `function(args)` at `timestamp` and commit its write set on success.
///
/// A contract error drops the transaction, so the committed state is left
/// exactly as it was.
pub fn execute(
    state: &FileWorldState,
    function: &str,
    args: &[String],
    timestamp: TxTimestamp,
) -> Result<Execution, StateError> {
    let function: Function = function.parse()?;
    let mut tx = Transaction::begin(state, function.name(), args, timestamp);

    let result =
        SupplyChainContract::new().invoke(&mut TransactionContext::new(&mut tx), function, args);
    let payload = match result {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!(
                "tx {} ({}) rejected, {} buffered write(s) discarded: {}",
                tx.tx_id(),
                function,
                tx.write_set().len(),
                err
            );
            return Err(err.into());
        }
    };

    let commit = if function.is_read_only() {
        None
    } else {
        Some(tx.commit()?)
    };
    Ok(Execution {
        function,
        payload,
        commit,
    })
}

/// `execute` against the world state under `home`.
pub fn execute_at(
    home: &Path,
    function: &str,
    args: &[String],
    timestamp: TxTimestamp,
) -> Result<Execution, StateError> {
    let state = FileWorldState::open_at(home)?;
    execute(&state, function, args, timestamp)
}
