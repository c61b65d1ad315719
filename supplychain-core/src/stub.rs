//! World-state primitives consumed by the contract.
//!
//! The ledger platform owns replication, ordering and commit. The contract only
//! sees this seam: point read, unconditional upsert, range scan and the
//! transaction's logical time.

use std::fmt;

use thiserror::Error;

/// Failure reported by the platform side of the seam.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StubError(pub String);

impl StubError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Logical transaction time, identical for every endorsing execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl TxTimestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }
}

impl fmt::Display for TxTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// One entry yielded by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// Cursor over a range scan. Callers must `close` it exactly once.
pub trait StateQueryIterator {
    fn has_next(&self) -> bool;
    fn next(&mut self) -> Result<KeyValue, StubError>;
    fn close(&mut self) -> Result<(), StubError>;
}

/// The per-transaction view of the world state.
pub trait ChaincodeStub {
    /// `Ok(None)` means the key is absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StubError>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StubError>;

    /// `start` inclusive, `end` exclusive; an empty bound is open on that side.
    fn get_state_by_range<'a>(
        &'a self,
        start: &str,
        end: &str,
    ) -> Result<Box<dyn StateQueryIterator + 'a>, StubError>;

    fn get_tx_timestamp(&self) -> Result<TxTimestamp, StubError>;

    fn tx_id(&self) -> &str;
}

/// True when `key` falls inside the half-open `[start, end)` scan bounds.
pub fn in_range(key: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}

/// Iterator over an already materialized, ordered batch of entries.
///
/// Backends that snapshot a range up front hand this out.
#[derive(Debug, Default)]
pub struct VecQueryIterator {
    entries: std::vec::IntoIter<KeyValue>,
    pending: Option<KeyValue>,
    closed: bool,
}

impl VecQueryIterator {
    pub fn new(entries: Vec<KeyValue>) -> Self {
        let mut entries = entries.into_iter();
        let pending = entries.next();
        Self {
            entries,
            pending,
            closed: false,
        }
    }
}

impl StateQueryIterator for VecQueryIterator {
    fn has_next(&self) -> bool {
        !self.closed && self.pending.is_some()
    }

    fn next(&mut self) -> Result<KeyValue, StubError> {
        if self.closed {
            return Err(StubError::new("iterator already closed"));
        }
        let current = self
            .pending
            .take()
            .ok_or_else(|| StubError::new("no more entries in range"))?;
        self.pending = self.entries.next();
        Ok(current)
    }

    fn close(&mut self) -> Result<(), StubError> {
        self.closed = true;
        self.pending = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(key: &str) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: key.as_bytes().to_vec(),
        }
    }

    #[test]
    fn range_bounds_are_half_open() {
        assert!(in_range("p1", "", ""));
        assert!(in_range("p1", "p1", "p2"));
        assert!(!in_range("p2", "p1", "p2"));
        assert!(!in_range("a", "b", ""));
    }

    #[test]
    fn vec_iterator_yields_in_order_then_stops() {
        let mut it = VecQueryIterator::new(vec![kv("a"), kv("b")]);
        assert!(it.has_next());
        assert_eq!(it.next().unwrap().key, "a");
        assert_eq!(it.next().unwrap().key, "b");
        assert!(!it.has_next());
        assert!(it.next().is_err());
    }

    #[test]
    fn closed_iterator_reports_no_more_entries() {
        let mut it = VecQueryIterator::new(vec![kv("a")]);
        it.close().unwrap();
        assert!(!it.has_next());
        assert!(it.next().is_err());
    }

    #[test]
    fn timestamp_display_pads_nanos() {
        assert_eq!(TxTimestamp::new(5, 42).to_string(), "5.000000042");
    }
}
