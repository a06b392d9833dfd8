// src/seeder.rs

//! Master-side tree initializer.
//!
//! Seeds or resets the per-node sub-tree (`/Description`, `/State`,
//! `/StateInfo`, `/Timestamp/*`) for every listed node and finally writes the
//! master token. Runs once, synchronously, before steady-state operation; it
//! is allowed to fail loudly.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::info;

use crate::coord::client::CoordClient;
use crate::coord::paths::{
    MASTER_CONTINUE, MASTER_START, MASTER_STATE_PATH, MASTER_STOP, STATE_IDLE, STATE_SUCCESS,
    SUFFIX_DESCRIPTION, SUFFIX_STATE, SUFFIX_STATE_INFO, SUFFIX_TIMESTAMP_END,
    SUFFIX_TIMESTAMP_START, sub_node,
};
use crate::errors::Result;

/// Start mode for the seeder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedMode {
    /// Reset every node and enable the fleet.
    Start,
    /// Write the master stop token; node states are left untouched.
    Stop,
    /// Resume: reset only nodes that have not already succeeded.
    Continue,
}

impl SeedMode {
    fn master_token(self) -> &'static str {
        match self {
            SeedMode::Start => MASTER_START,
            SeedMode::Stop => MASTER_STOP,
            SeedMode::Continue => MASTER_CONTINUE,
        }
    }
}

/// Nodes file: a TOML table mapping node path to description.
///
/// ```toml
/// [nodes]
/// "/Pipeline/Fetch" = "Fetch raw inputs"
/// "/Pipeline/Extract" = "Extract and normalize"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct NodesFile {
    #[serde(default)]
    pub nodes: BTreeMap<String, String>,
}

pub fn load_nodes_file(path: impl AsRef<Path>) -> Result<NodesFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let nodes: NodesFile = toml::from_str(&contents)?;
    Ok(nodes)
}

/// Seed or reset the tree for the given nodes and write the master token.
pub async fn seed(client: &CoordClient, nodes: &BTreeMap<String, String>, mode: SeedMode) -> Result<()> {
    info!(?mode, nodes = nodes.len(), "seeding coordination tree");

    // Halt the fleet before touching anything else.
    if mode == SeedMode::Stop {
        client.set_data(MASTER_STATE_PATH, MASTER_STOP).await?;
    }

    for (node, description) in nodes {
        client
            .set_data(&sub_node(node, SUFFIX_DESCRIPTION), description)
            .await?;

        match mode {
            SeedMode::Start => {
                client.set_data(&sub_node(node, SUFFIX_STATE), STATE_IDLE).await?;
                client.set_data(&sub_node(node, SUFFIX_STATE_INFO), "").await?;
                client.set_data(&sub_node(node, SUFFIX_TIMESTAMP_START), "").await?;
                client.set_data(&sub_node(node, SUFFIX_TIMESTAMP_END), "").await?;
            }
            SeedMode::Continue => {
                // Resume semantics: nodes that already succeeded keep their
                // state; everything else goes back to idle.
                let state = client.get_data(&sub_node(node, SUFFIX_STATE)).await;
                if state != STATE_SUCCESS {
                    client.set_data(&sub_node(node, SUFFIX_STATE), STATE_IDLE).await?;
                }
            }
            SeedMode::Stop => {}
        }
    }

    if mode != SeedMode::Stop {
        client.set_data(MASTER_STATE_PATH, mode.master_token()).await?;
    }

    info!("tree seeding complete");
    Ok(())
}

/// Write a master token directly (the reduced form of the original
/// interactive master console).
pub async fn write_master_token(client: &CoordClient, mode: SeedMode) -> Result<()> {
    client.set_data(MASTER_STATE_PATH, mode.master_token()).await?;
    info!(token = mode.master_token(), "master token written");
    Ok(())
}
