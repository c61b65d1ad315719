pub mod ledger;
pub mod peer;
pub mod query;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use supplychain_core::Function;
use supplychain_state::{execute_at, timestamp_now};

/// Where an invocation is executed.
#[derive(Args, Debug, Clone, Copy)]
pub struct TargetArgs {
    /// Submit through the running peer instead of the local world state.
    #[arg(long)]
    pub peer: bool,
}

/// Result of one submitted invocation.
#[derive(Debug)]
pub struct Submitted {
    /// Set when the invocation committed a transaction.
    pub tx_id: Option<String>,
    /// Decoded contract payload, `Null` when there is none.
    pub payload: Value,
}

impl TargetArgs {
    pub fn submit(self, function: Function, args: Vec<String>) -> Result<Submitted> {
        let home = home()?;
        if self.peer {
            let result = supplychain_peer::request_invoke(&home, function.name(), args)
                .with_context(|| format!("{function} failed on peer"))?;
            return Ok(Submitted {
                tx_id: result.tx_id,
                payload: result.payload,
            });
        }

        let execution = execute_at(&home, function.name(), &args, timestamp_now())
            .with_context(|| format!("{function} failed"))?;
        let payload = if execution.payload.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&execution.payload)
                .with_context(|| format!("{function} returned malformed JSON"))?
        };
        Ok(Submitted {
            tx_id: execution.commit.map(|commit| commit.tx_id),
            payload,
        })
    }
}

pub fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// First 12 hex digits of a transaction id.
pub fn short_tx(tx_id: &str) -> &str {
    tx_id.get(..12).unwrap_or(tx_id)
}
