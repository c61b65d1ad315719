//! The supply-chain registry contract.
//!
//! # Operations
//!
//! | Operation            | Reads | Writes | Failure modes                                   |
//! |----------------------|-------|--------|-------------------------------------------------|
//! | `init_ledger`        | –     | seeds  | timestamp, write                                |
//! | `create_product`     | id    | id     | invalid id, read, duplicate, timestamp, write   |
//! | `update_product`     | id    | id     | read, not found, decode, timestamp, write       |
//! | `transfer_ownership` | id    | id     | read, not found, decode, timestamp, write       |
//! | `query_product`      | id    | –      | read, not found, decode                         |
//! | `product_exists`     | id    | –      | read                                            |
//! | `get_all_products`   | range | –      | read, iteration, decode                         |
//!
//! Every operation receives the [`TransactionContext`] explicitly. Writes are
//! unconditional upserts of the whole record; there is no compare-and-swap at
//! this layer, so conflicting concurrent updates are resolved only by the
//! platform's commit-time version check.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::context::TransactionContext;
use crate::error::ContractError;
use crate::stub::{KeyValue, StateQueryIterator, StubError, TxTimestamp};
use crate::types::{Product, ProductId};

/// Status assigned to every newly created product.
pub const STATUS_MANUFACTURED: &str = "Manufactured";

/// Stateless contract; all durable state lives behind the context's stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupplyChainContract;

impl SupplyChainContract {
    pub fn new() -> Self {
        Self
    }

    // -----------------------------------------------------------------------
    // 1. Time
    // -----------------------------------------------------------------------

    /// The transaction's logical time as RFC3339 (UTC, whole seconds).
    pub fn get_timestamp(&self, ctx: &TransactionContext<'_>) -> Result<String, ContractError> {
        let ts = ctx
            .stub()
            .get_tx_timestamp()
            .map_err(|e| ContractError::TimestampUnavailable(e.to_string()))?;
        format_timestamp(ts)
    }

    // -----------------------------------------------------------------------
    // 2. Mutations
    // -----------------------------------------------------------------------

    /// Seed the ledger with the fixed demo products.
    ///
    /// Not idempotent: a second call overwrites `p1`/`p2` with fresh timestamps
    /// instead of failing. Stops at the first write error; writes already made
    /// stay in the transaction's write set and the platform decides whether
    /// they commit.
    pub fn init_ledger(&self, ctx: &mut TransactionContext<'_>) -> Result<(), ContractError> {
        let timestamp = self.get_timestamp(ctx)?;
        for product in seed_products(&timestamp) {
            self.put_product(ctx, &product)?;
        }
        tracing::info!(tx_id = ctx.tx_id(), "ledger seeded");
        Ok(())
    }

    /// Register a new product with status [`STATUS_MANUFACTURED`].
    pub fn create_product(
        &self,
        ctx: &mut TransactionContext<'_>,
        id: &str,
        name: &str,
        owner: &str,
        description: &str,
        category: &str,
    ) -> Result<(), ContractError> {
        if id.is_empty() {
            return Err(ContractError::InvalidArgument(
                "product id must not be empty".to_string(),
            ));
        }
        if self.product_exists(ctx, id)? {
            return Err(ContractError::DuplicateId { id: id.to_string() });
        }

        let timestamp = self.get_timestamp(ctx)?;
        let product = Product {
            id: ProductId::from(id),
            name: name.to_string(),
            status: STATUS_MANUFACTURED.to_string(),
            owner: owner.to_string(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
            description: description.to_string(),
            category: category.to_string(),
        };
        self.put_product(ctx, &product)?;
        tracing::debug!(tx_id = ctx.tx_id(), product = id, owner, "product created");
        Ok(())
    }

    /// Overwrite status, owner, description and category of an existing product.
    pub fn update_product(
        &self,
        ctx: &mut TransactionContext<'_>,
        id: &str,
        new_status: &str,
        new_owner: &str,
        new_description: &str,
        new_category: &str,
    ) -> Result<(), ContractError> {
        if new_status.is_empty() {
            return Err(ContractError::InvalidArgument(
                "product status must not be empty".to_string(),
            ));
        }
        self.modify_product(ctx, id, |product| {
            product.status = new_status.to_string();
            product.owner = new_owner.to_string();
            product.description = new_description.to_string();
            product.category = new_category.to_string();
        })?;
        tracing::debug!(tx_id = ctx.tx_id(), product = id, status = new_status, "product updated");
        Ok(())
    }

    /// Hand a product to `new_owner`; nothing else but `updated_at` changes.
    pub fn transfer_ownership(
        &self,
        ctx: &mut TransactionContext<'_>,
        id: &str,
        new_owner: &str,
    ) -> Result<(), ContractError> {
        let mut previous_owner = String::new();
        self.modify_product(ctx, id, |product| {
            previous_owner = std::mem::replace(&mut product.owner, new_owner.to_string());
        })?;
        tracing::debug!(
            tx_id = ctx.tx_id(),
            product = id,
            from = %previous_owner,
            to = new_owner,
            "ownership transferred"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // 3. Reads
    // -----------------------------------------------------------------------

    pub fn query_product(
        &self,
        ctx: &TransactionContext<'_>,
        id: &str,
    ) -> Result<Product, ContractError> {
        let bytes = ctx
            .stub()
            .get_state(id)
            .map_err(|e| ContractError::read(id, e))?
            .ok_or_else(|| ContractError::NotFound { id: id.to_string() })?;
        decode_product(id, &bytes)
    }

    /// A read failure is returned as an error, never reported as absence.
    pub fn product_exists(
        &self,
        ctx: &TransactionContext<'_>,
        id: &str,
    ) -> Result<bool, ContractError> {
        let bytes = ctx
            .stub()
            .get_state(id)
            .map_err(|e| ContractError::read(id, e))?;
        Ok(bytes.is_some())
    }

    /// Every stored product in the store's range order (lexicographic by key).
    ///
    /// Aborts on the first bad entry. The range cursor is closed exactly once
    /// however the scan ends.
    pub fn get_all_products(
        &self,
        ctx: &TransactionContext<'_>,
    ) -> Result<Vec<Product>, ContractError> {
        let iter = ctx
            .stub()
            .get_state_by_range("", "")
            .map_err(|e| ContractError::read("", e))?;
        let mut scan = ScanGuard::new(iter);

        let mut products = Vec::new();
        while scan.has_next() {
            let KeyValue { key, value } = scan.next_entry().map_err(ContractError::IterationFailure)?;
            products.push(decode_product(&key, &value)?);
        }
        Ok(products)
    }

    // -----------------------------------------------------------------------
    // 4. Storage helpers
    // -----------------------------------------------------------------------

    /// Encode and upsert `product` under its id. Overwrites unconditionally.
    pub fn put_product(
        &self,
        ctx: &mut TransactionContext<'_>,
        product: &Product,
    ) -> Result<(), ContractError> {
        let bytes = product
            .to_bytes()
            .map_err(|e| ContractError::SerializationFailure {
                id: product.id.0.clone(),
                source: e,
            })?;
        ctx.stub_mut()
            .put_state(product.id.as_str(), bytes)
            .map_err(|e| ContractError::write(product.id.as_str(), e))
    }

    /// Shared read-modify-write core for update and transfer.
    fn modify_product(
        &self,
        ctx: &mut TransactionContext<'_>,
        id: &str,
        apply: impl FnOnce(&mut Product),
    ) -> Result<Product, ContractError> {
        let mut product = self.query_product(ctx, id)?;
        let timestamp = self.get_timestamp(ctx)?;
        apply(&mut product);
        product.updated_at = timestamp;
        self.put_product(ctx, &product)?;
        Ok(product)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn seed_products(timestamp: &str) -> [Product; 2] {
    let seed = |id: &str, name: &str, owner: &str, description: &str| Product {
        id: ProductId::from(id),
        name: name.to_string(),
        status: STATUS_MANUFACTURED.to_string(),
        owner: owner.to_string(),
        created_at: timestamp.to_string(),
        updated_at: timestamp.to_string(),
        description: description.to_string(),
        category: "Electronics".to_string(),
    };
    [
        seed("p1", "Laptop", "CompanyA", "High-end gaming laptop"),
        seed("p2", "Smartphone", "CompanyB", "Latest model smartphone"),
    ]
}

fn decode_product(key: &str, bytes: &[u8]) -> Result<Product, ContractError> {
    Product::from_bytes(bytes).map_err(|e| ContractError::DeserializationFailure {
        key: key.to_string(),
        source: e,
    })
}

pub(crate) fn format_timestamp(ts: TxTimestamp) -> Result<String, ContractError> {
    let nanos = u32::try_from(ts.nanos).map_err(|_| {
        ContractError::TimestampUnavailable(format!("negative nanoseconds in {ts}"))
    })?;
    let at = DateTime::<Utc>::from_timestamp(ts.seconds, nanos).ok_or_else(|| {
        ContractError::TimestampUnavailable(format!("timestamp {ts} is out of range"))
    })?;
    Ok(at.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Owns a range cursor and closes it on drop.
struct ScanGuard<'a> {
    iter: Box<dyn StateQueryIterator + 'a>,
}

impl<'a> ScanGuard<'a> {
    fn new(iter: Box<dyn StateQueryIterator + 'a>) -> Self {
        Self { iter }
    }

    fn has_next(&self) -> bool {
        self.iter.has_next()
    }

    fn next_entry(&mut self) -> Result<KeyValue, StubError> {
        self.iter.next()
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.iter.close() {
            tracing::warn!(error = %err, "failed to close range iterator");
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
