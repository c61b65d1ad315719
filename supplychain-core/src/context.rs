//! Per-invocation transaction context.

use crate::stub::ChaincodeStub;

/// Handle passed explicitly into every contract operation.
///
/// Wraps the stub for the transaction being simulated; the contract holds no
/// other state.
pub struct TransactionContext<'a> {
    stub: &'a mut dyn ChaincodeStub,
}

impl<'a> TransactionContext<'a> {
    pub fn new(stub: &'a mut dyn ChaincodeStub) -> Self {
        Self { stub }
    }

    pub fn stub(&self) -> &dyn ChaincodeStub {
        &*self.stub
    }

    pub fn stub_mut(&mut self) -> &mut dyn ChaincodeStub {
        &mut *self.stub
    }

    pub fn tx_id(&self) -> &str {
        self.stub.tx_id()
    }
}
