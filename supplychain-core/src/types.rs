//! Domain types for the supply-chain registry.
//!
//! A [`Product`] is a value object: rebuilt from stored bytes on every read and
//! fully re-encoded on every write. Timestamps stay as the RFC3339 strings that
//! were written so a decode/encode cycle never changes stored bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed product identifier; also the world-state key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A tracked physical product.
///
/// Field order is the encoded key order: `id, name, status, owner, created_at,
/// updated_at, description, category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Free-form lifecycle state, e.g. `"Manufactured"`.
    pub status: String,
    pub owner: String,
    /// RFC3339; set once at creation.
    pub created_at: String,
    /// RFC3339; refreshed by every mutation.
    pub updated_at: String,
    pub description: String,
    pub category: String,
}

impl Product {
    /// Canonical stored form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
