//! Fault-injecting stub shared by the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use supplychain_core::{
    ChaincodeStub, KeyValue, MemoryStub, StateQueryIterator, StubError, TxTimestamp,
};

/// 2024-04-25T10:00:00Z
pub const T0: TxTimestamp = TxTimestamp {
    seconds: 1_714_039_200,
    nanos: 0,
};

pub const T0_RFC3339: &str = "2024-04-25T10:00:00Z";

/// Wraps a [`MemoryStub`] and fails chosen primitives on demand.
#[derive(Default)]
pub struct FaultyStub {
    pub inner: MemoryStub,
    /// Every `get_state` fails with this message.
    pub fail_get: Option<String>,
    /// `put_state` fails for this key (any key when `None` and `fail_put_any`).
    pub fail_put_key: Option<String>,
    pub fail_put_any: bool,
    /// `get_state_by_range` fails with this message.
    pub fail_range: Option<String>,
    /// The range cursor fails on the advance after this many successful ones.
    pub fail_next_after: Option<usize>,
    /// Number of `close` calls observed on range cursors.
    pub closes: Rc<Cell<usize>>,
    /// Number of successful `put_state` calls.
    pub puts: Cell<usize>,
}

impl FaultyStub {
    pub fn new() -> Self {
        Self {
            inner: MemoryStub::new(T0),
            ..Self::default()
        }
    }
}

impl ChaincodeStub for FaultyStub {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StubError> {
        if let Some(message) = &self.fail_get {
            return Err(StubError::new(message.clone()));
        }
        self.inner.get_state(key)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StubError> {
        if self.fail_put_any || self.fail_put_key.as_deref() == Some(key) {
            return Err(StubError::new("failed inserting key"));
        }
        self.inner.put_state(key, value)?;
        self.puts.set(self.puts.get() + 1);
        Ok(())
    }

    fn get_state_by_range<'a>(
        &'a self,
        start: &str,
        end: &str,
    ) -> Result<Box<dyn StateQueryIterator + 'a>, StubError> {
        if let Some(message) = &self.fail_range {
            return Err(StubError::new(message.clone()));
        }
        Ok(Box::new(CountingIterator {
            inner: self.inner.get_state_by_range(start, end)?,
            advanced: 0,
            fail_after: self.fail_next_after,
            closes: Rc::clone(&self.closes),
        }))
    }

    fn get_tx_timestamp(&self) -> Result<TxTimestamp, StubError> {
        self.inner.get_tx_timestamp()
    }

    fn tx_id(&self) -> &str {
        self.inner.tx_id()
    }
}

struct CountingIterator<'a> {
    inner: Box<dyn StateQueryIterator + 'a>,
    advanced: usize,
    fail_after: Option<usize>,
    closes: Rc<Cell<usize>>,
}

impl StateQueryIterator for CountingIterator<'_> {
    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<KeyValue, StubError> {
        if self.fail_after == Some(self.advanced) {
            return Err(StubError::new("failed retrieving next item"));
        }
        self.advanced += 1;
        self.inner.next()
    }

    fn close(&mut self) -> Result<(), StubError> {
        self.closes.set(self.closes.get() + 1);
        self.inner.close()
    }
}
