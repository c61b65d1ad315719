//! Read-only commands: `query` and `list`.

use anyhow::{Context, Result};
use serde_json::Value;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use supplychain_core::{Function, Product};

use super::TargetArgs;

#[derive(Args, Debug)]
pub struct QueryArgs {
    pub id: String,

    /// Emit the stored record as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl QueryArgs {
    pub fn run(self) -> Result<()> {
        let submitted = self.target.submit(Function::QueryProduct, vec![self.id])?;
        let product = decode_product(submitted.payload)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&product).context("failed to render product JSON")?
            );
            return Ok(());
        }

        println!("{}", product.id.as_str().bold());
        for (label, value) in [
            ("name", &product.name),
            ("status", &product.status),
            ("owner", &product.owner),
            ("description", &product.description),
            ("category", &product.category),
            ("created", &product.created_at),
            ("updated", &product.updated_at),
        ] {
            println!("  {} {value}", format!("{label:<12}").bright_black());
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "owner")]
    owner: String,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "updated")]
    updated_at: String,
}

impl From<Product> for ProductRow {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.0,
            name: p.name,
            status: p.status,
            owner: p.owner,
            category: p.category,
            updated_at: p.updated_at,
        }
    }
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let submitted = self.target.submit(Function::GetAllProducts, vec![])?;
        let products = decode_products(submitted.payload)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&products)
                    .context("failed to serialize product list JSON")?
            );
            return Ok(());
        }

        if products.is_empty() {
            println!("No products recorded.");
            println!("Run: supplychain init-ledger");
            return Ok(());
        }

        let count = products.len();
        let rows: Vec<ProductRow> = products.into_iter().map(ProductRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!("{}", format!("{count} product(s)").bright_black());
        Ok(())
    }
}

fn decode_product(payload: Value) -> Result<Product> {
    serde_json::from_value(payload).context("ledger returned a malformed product")
}

fn decode_products(payload: Value) -> Result<Vec<Product>> {
    serde_json::from_value(payload).context("ledger returned a malformed product list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_product_payload_blames_the_ledger() {
        let err = decode_product(Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "ledger returned a malformed product");

        let err = decode_products(json!({"id": "p1"})).unwrap_err();
        assert_eq!(err.to_string(), "ledger returned a malformed product list");
    }

    #[test]
    fn well_formed_payload_decodes() {
        let product = decode_product(json!({
            "id": "p1",
            "name": "Laptop",
            "status": "Manufactured",
            "owner": "CompanyA",
            "created_at": "2024-04-25T10:00:00Z",
            "updated_at": "2024-04-25T10:00:00Z",
            "description": "High-end gaming laptop",
            "category": "Electronics"
        }))
        .unwrap();
        assert_eq!(product.owner, "CompanyA");
        assert!(decode_products(json!([])).unwrap().is_empty());
    }
}
