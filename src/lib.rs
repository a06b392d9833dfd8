// src/lib.rs

pub mod agent;
pub mod cli;
pub mod config;
pub mod coord;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod monitor;
pub mod runner;
pub mod seeder;

use anyhow::Result;
use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::coord::client::CoordClient;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - coordination-service connection
/// - descriptor loading and validation
/// - one monitor + coordinator pair per process (agent)
/// - tree seeding / master-token writing (seed, master)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Agent {
            connect,
            descriptor,
        } => {
            let service = coord::connect(&connect)?;
            let client = CoordClient::new(service);

            let specs = config::load_and_validate(&descriptor)?;
            info!(descriptor = %descriptor, processes = specs.len(), "descriptor loaded");

            // Ctrl-C ends the agent; coordinators otherwise run until the
            // session dies.
            tokio::select! {
                res = agent::run_agent(client, specs) => res?,
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received; shutting down");
                }
            }
            Ok(())
        }

        Command::Seed {
            connect,
            nodes,
            mode,
        } => {
            let service = coord::connect(&connect)?;
            let client = CoordClient::new(service);

            let nodes_file = seeder::load_nodes_file(&nodes)?;
            seeder::seed(&client, &nodes_file.nodes, mode).await?;
            Ok(())
        }

        Command::Master { connect, mode } => {
            let service = coord::connect(&connect)?;
            let client = CoordClient::new(service);

            seeder::write_master_token(&client, mode).await?;
            Ok(())
        }
    }
}
