//! `supplychain peer`: local peer lifecycle.

use anyhow::{Context, Result};
use clap::Subcommand;

use supplychain_peer::paths::socket_path;
use supplychain_peer::{request_status, request_stop, start_blocking, PeerError};

use super::home;

#[derive(Subcommand, Debug)]
pub enum PeerCommand {
    /// Run the peer in the foreground.
    Start,
    /// Request graceful peer shutdown over the Unix socket.
    Stop,
    /// Query peer runtime status over the Unix socket.
    Status,
}

pub fn run(command: PeerCommand) -> Result<()> {
    let home = home()?;

    match command {
        PeerCommand::Start => {
            start_blocking(&home).context("peer exited with error")?;
        }
        PeerCommand::Stop => match request_stop(&home) {
            Ok(()) => println!("peer stop requested"),
            Err(PeerError::PeerNotRunning { .. }) => {
                println!("peer is not running");
            }
            Err(err) => return Err(err).context("failed to stop peer"),
        },
        PeerCommand::Status => {
            let status = match request_status(&home) {
                Ok(status) => status,
                Err(PeerError::PeerNotRunning { .. }) => serde_json::json!({
                    "running": false,
                    "socket": socket_path(&home).display().to_string(),
                }),
                Err(err) => return Err(err).context("failed to query peer status"),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&status).context("failed to render peer status JSON")?
            );
        }
    }

    Ok(())
}
