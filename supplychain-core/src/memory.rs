//! In-memory world state.
//!
//! Reads observe writes made earlier through the same stub, so a sequence of
//! calls against one `MemoryStub` behaves like a sequence of committed
//! transactions.

use std::collections::BTreeMap;

use crate::stub::{
    in_range, ChaincodeStub, KeyValue, StateQueryIterator, StubError, TxTimestamp,
    VecQueryIterator,
};

#[derive(Debug, Clone)]
pub struct MemoryStub {
    state: BTreeMap<String, Vec<u8>>,
    timestamp: Option<TxTimestamp>,
    tx_id: String,
}

impl Default for MemoryStub {
    fn default() -> Self {
        Self::new(TxTimestamp::new(0, 0))
    }
}

impl MemoryStub {
    pub fn new(timestamp: TxTimestamp) -> Self {
        Self {
            state: BTreeMap::new(),
            timestamp: Some(timestamp),
            tx_id: "memory-tx".to_string(),
        }
    }

    /// Move the logical clock, as a new transaction would.
    pub fn set_timestamp(&mut self, timestamp: TxTimestamp) {
        self.timestamp = Some(timestamp);
    }

    /// Simulate a platform that cannot report transaction time.
    pub fn clear_timestamp(&mut self) {
        self.timestamp = None;
    }

    pub fn set_tx_id(&mut self, tx_id: impl Into<String>) {
        self.tx_id = tx_id.into();
    }

    /// Raw stored bytes, bypassing the contract.
    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.state.get(key).map(Vec::as_slice)
    }

    /// Store raw bytes, bypassing the contract.
    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.state.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }
}

impl ChaincodeStub for MemoryStub {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StubError> {
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StubError> {
        if key.is_empty() {
            return Err(StubError::new("empty key is not allowed"));
        }
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_range<'a>(
        &'a self,
        start: &str,
        end: &str,
    ) -> Result<Box<dyn StateQueryIterator + 'a>, StubError> {
        let entries = self
            .state
            .iter()
            .filter(|(key, _)| in_range(key, start, end))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        Ok(Box::new(VecQueryIterator::new(entries)))
    }

    fn get_tx_timestamp(&self) -> Result<TxTimestamp, StubError> {
        self.timestamp
            .ok_or_else(|| StubError::new("transaction timestamp not set"))
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }
}
