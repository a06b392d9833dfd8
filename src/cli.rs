// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::seeder::SeedMode;

/// Command-line arguments for `fleetrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fleetrun",
    version,
    about = "Dependency-aware process launcher coordinated through a shared node tree.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLEETRUN_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the agent: launch coordinators for every process in the
    /// descriptor and keep them running.
    Agent {
        /// Coordination service target (e.g. "mem://").
        #[arg(long, value_name = "TARGET")]
        connect: String,

        /// Path to the run descriptor (TOML).
        #[arg(long, value_name = "PATH")]
        descriptor: String,
    },

    /// Seed or reset the coordination tree and write the master token.
    Seed {
        /// Coordination service target (e.g. "mem://").
        #[arg(long, value_name = "TARGET")]
        connect: String,

        /// Path to the nodes file (TOML table of node path -> description).
        #[arg(long, value_name = "PATH")]
        nodes: String,

        /// Start mode.
        #[arg(long, value_enum, default_value = "start")]
        mode: SeedMode,
    },

    /// Write a master token directly (start, stop, continue).
    Master {
        /// Coordination service target (e.g. "mem://").
        #[arg(long, value_name = "TARGET")]
        connect: String,

        /// Token to write to the master state node.
        #[arg(value_enum)]
        mode: SeedMode,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
