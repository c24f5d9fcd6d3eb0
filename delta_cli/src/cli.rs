//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cicada Δ - a layered puzzle descent in the terminal
#[derive(Parser, Debug)]
#[command(name = "delta")]
#[command(about = "Cicada Δ - a layered puzzle descent in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Player store file (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for a reproducible session
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Delay between narrative beats, in milliseconds
    #[arg(long, global = true)]
    pub pacing_ms: Option<u64>,

    /// Player handle (prompted for when omitted)
    #[arg(long, global = true)]
    pub handle: Option<String>,

    /// Log engine events at debug level to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Play every remaining layer until a halt or the end of content
    Play,

    /// Show a player's record
    Status,

    /// List the layer table
    Layers,
}
