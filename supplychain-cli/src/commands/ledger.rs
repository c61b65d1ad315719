//! Mutating commands: `init-ledger`, `create`, `update`, `transfer`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use supplychain_core::Function;

use super::{short_tx, Submitted, TargetArgs};

#[derive(Args, Debug)]
pub struct InitLedgerArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl InitLedgerArgs {
    pub fn run(self) -> Result<()> {
        let submitted = self.target.submit(Function::InitLedger, vec![])?;
        report(&submitted, "seeded ledger with p1, p2");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Product id, used as the ledger key.
    pub id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub owner: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub category: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl CreateArgs {
    pub fn run(self) -> Result<()> {
        let message = format!("created {} owned by {}", self.id, self.owner);
        let submitted = self.target.submit(
            Function::CreateProduct,
            vec![self.id, self.name, self.owner, self.description, self.category],
        )?;
        report(&submitted, &message);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    /// New lifecycle status (e.g. "Shipped").
    #[arg(long)]
    pub status: String,

    #[arg(long)]
    pub owner: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub category: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl UpdateArgs {
    pub fn run(self) -> Result<()> {
        let message = format!("updated {} to status {}", self.id, self.status);
        let submitted = self.target.submit(
            Function::UpdateProduct,
            vec![self.id, self.status, self.owner, self.description, self.category],
        )?;
        report(&submitted, &message);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    pub id: String,

    pub new_owner: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl TransferArgs {
    pub fn run(self) -> Result<()> {
        let message = format!("transferred {} to {}", self.id, self.new_owner);
        let submitted = self
            .target
            .submit(Function::TransferOwnership, vec![self.id, self.new_owner])?;
        report(&submitted, &message);
        Ok(())
    }
}

fn report(submitted: &Submitted, message: &str) {
    match submitted.tx_id.as_deref() {
        Some(tx_id) => println!(
            "{} {message} {}",
            "✓".green().bold(),
            format!("(tx {})", short_tx(tx_id)).bright_black()
        ),
        None => println!("{} {message}", "✓".green().bold()),
    }
}
