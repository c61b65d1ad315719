//! Supplychain: product registry CLI.
//!
//! # Usage
//!
//! ```text
//! supplychain init-ledger [--peer]
//! supplychain create <id> --name N --owner O [--description D] [--category C] [--peer]
//! supplychain update <id> --status S --owner O [--description D] [--category C] [--peer]
//! supplychain transfer <id> <new-owner> [--peer]
//! supplychain query <id> [--json] [--peer]
//! supplychain list [--json] [--peer]
//! supplychain peer start|stop|status
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    ledger::{CreateArgs, InitLedgerArgs, TransferArgs, UpdateArgs},
    peer::PeerCommand,
    query::{ListArgs, QueryArgs},
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "supplychain",
    version,
    about = "Record and track products on a local supply-chain ledger",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed the ledger with the two sample products.
    InitLedger(InitLedgerArgs),

    /// Register a new product.
    Create(CreateArgs),

    /// Replace the mutable fields of an existing product.
    Update(UpdateArgs),

    /// Hand a product over to a new owner.
    Transfer(TransferArgs),

    /// Show one product.
    Query(QueryArgs),

    /// Show every product in key order.
    List(ListArgs),

    /// Run or talk to the local peer.
    Peer {
        #[command(subcommand)]
        command: PeerCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::InitLedger(args) => args.run(),
        Commands::Create(args) => args.run(),
        Commands::Update(args) => args.run(),
        Commands::Transfer(args) => args.run(),
        Commands::Query(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Peer { command } => commands::peer::run(command),
    }
}
