//! One simulated transaction over a [`FileWorldState`].
//!
//! Reads go to the committed state; writes land in a write set. Own writes
//! are not visible to later reads in the same transaction, matching ledger
//! simulation. Nothing reaches disk until [`Transaction::commit`]; dropping an
//! uncommitted transaction discards its write set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use supplychain_core::stub::{
    ChaincodeStub, StateQueryIterator, StubError, TxTimestamp, VecQueryIterator,
};

use crate::error::StateError;
use crate::world_state::{validate_key, FileWorldState};

/// What a successful commit wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    /// Keys written, in key order.
    pub written: Vec<String>,
}

pub struct Transaction<'a> {
    state: &'a FileWorldState,
    tx_id: String,
    timestamp: TxTimestamp,
    writes: BTreeMap<String, Vec<u8>>,
}

impl<'a> Transaction<'a> {
    /// Start a transaction for `function(args)` at logical time `timestamp`.
    pub fn begin(
        state: &'a FileWorldState,
        function: &str,
        args: &[String],
        timestamp: TxTimestamp,
    ) -> Self {
        Self {
            state,
            tx_id: tx_id_for(function, args, timestamp),
            timestamp,
            writes: BTreeMap::new(),
        }
    }

    /// Buffered, not yet committed writes.
    pub fn write_set(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.writes
    }

    /// Apply the write set in key order.
    ///
    /// Each key is replaced atomically, but the write set as a whole is not:
    /// if a write fails, keys earlier in order stay committed and the error is
    /// returned for the failing key.
    pub fn commit(self) -> Result<CommitSummary, StateError> {
        let mut written = Vec::with_capacity(self.writes.len());
        for (key, value) in &self.writes {
            self.state.put(key, value)?;
            written.push(key.clone());
        }
        tracing::debug!("tx {} committed {} write(s)", self.tx_id, written.len());
        Ok(CommitSummary {
            timestamp: to_datetime(self.timestamp),
            tx_id: self.tx_id,
            written,
        })
    }
}

impl ChaincodeStub for Transaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StubError> {
        self.state.get(key).map_err(to_stub_error)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StubError> {
        validate_key(key).map_err(to_stub_error)?;
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_range<'s>(
        &'s self,
        start: &str,
        end: &str,
    ) -> Result<Box<dyn StateQueryIterator + 's>, StubError> {
        let entries = self.state.range(start, end).map_err(to_stub_error)?;
        Ok(Box::new(VecQueryIterator::new(entries)))
    }

    fn get_tx_timestamp(&self) -> Result<TxTimestamp, StubError> {
        Ok(self.timestamp)
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }
}

/// Logical time for a transaction submitted now.
pub fn timestamp_now() -> TxTimestamp {
    let now = Utc::now();
    TxTimestamp::new(now.timestamp(), now.timestamp_subsec_nanos() as i32)
}

/// Hex SHA-256 over function, args and timestamp.
fn tx_id_for(function: &str, args: &[String], timestamp: TxTimestamp) -> String {
    let mut hasher = Sha256::new();
    hasher.update(function.as_bytes());
    for arg in args {
        hasher.update([0u8]);
        hasher.update(arg.as_bytes());
    }
    hasher.update(timestamp.seconds.to_be_bytes());
    hasher.update(timestamp.nanos.to_be_bytes());
    hex::encode(hasher.finalize())
}

fn to_datetime(ts: TxTimestamp) -> DateTime<Utc> {
    u32::try_from(ts.nanos)
        .ok()
        .and_then(|nanos| DateTime::<Utc>::from_timestamp(ts.seconds, nanos))
        .unwrap_or_default()
}

fn to_stub_error(err: StateError) -> StubError {
    StubError::new(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ts() -> TxTimestamp {
        TxTimestamp::new(1_714_039_200, 0)
    }

    #[test]
    fn writes_are_invisible_until_commit() {
        let home = TempDir::new().unwrap();
        let state = FileWorldState::open_at(home.path()).unwrap();
        let mut tx = Transaction::begin(&state, "CreateProduct", &[], ts());

        tx.put_state("p1", b"{}".to_vec()).unwrap();
        assert_eq!(tx.get_state("p1").unwrap(), None, "no read-your-writes");
        assert_eq!(state.get("p1").unwrap(), None, "nothing on disk before commit");

        let summary = tx.commit().unwrap();
        assert_eq!(summary.written, vec!["p1"]);
        assert_eq!(state.get("p1").unwrap(), Some(b"{}".to_vec()));
    }

    #[test]
    fn dropped_transaction_discards_writes() {
        let home = TempDir::new().unwrap();
        let state = FileWorldState::open_at(home.path()).unwrap();
        {
            let mut tx = Transaction::begin(&state, "InitLedger", &[], ts());
            tx.put_state("p1", b"{}".to_vec()).unwrap();
        }
        assert!(state.is_empty().unwrap());
    }

    #[test]
    fn tx_id_depends_on_function_args_and_time() {
        let a = tx_id_for("TransferOwnership", &["p1".into(), "B".into()], ts());
        let b = tx_id_for("TransferOwnership", &["p1".into(), "C".into()], ts());
        let c = tx_id_for("TransferOwnership", &["p1".into(), "B".into()], TxTimestamp::new(1, 0));
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, tx_id_for("TransferOwnership", &["p1".into(), "B".into()], ts()));
    }

    #[test]
    fn oversized_key_is_refused_at_put_not_at_commit() {
        let home = TempDir::new().unwrap();
        let state = FileWorldState::open_at(home.path()).unwrap();
        let mut tx = Transaction::begin(&state, "CreateProduct", &[], ts());

        let err = tx.put_state(&"y".repeat(121), b"{}".to_vec()).unwrap_err();
        assert!(err.0.contains("longer than 120 bytes"), "got: {err}");
        assert!(tx.write_set().is_empty());
    }

    #[test]
    fn commit_failure_keeps_earlier_keys() {
        let home = TempDir::new().unwrap();
        let state = FileWorldState::open_at(home.path()).unwrap();
        // A directory squatting on p2's file name makes its rename fail.
        std::fs::create_dir(state.key_path("p2")).unwrap();

        let mut tx = Transaction::begin(&state, "InitLedger", &[], ts());
        tx.put_state("p1", b"{}".to_vec()).unwrap();
        tx.put_state("p2", b"{}".to_vec()).unwrap();
        tx.commit().unwrap_err();

        assert_eq!(state.get("p1").unwrap(), Some(b"{}".to_vec()));
    }

    #[test]
    fn commit_summary_carries_timestamp() {
        let home = TempDir::new().unwrap();
        let state = FileWorldState::open_at(home.path()).unwrap();
        let summary = Transaction::begin(&state, "InitLedger", &[], ts()).commit().unwrap();
        assert_eq!(summary.timestamp.to_rfc3339(), "2024-04-25T10:00:00+00:00");
        assert!(summary.written.is_empty());
    }
}
