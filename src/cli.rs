use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "inventory-agent")]
#[command(about = "Collects server hardware inventory and reports it to the inventory API")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect the inventory record and print it
    Collect {
        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,

        /// JSON node attributes supplied by the orchestration agent
        #[arg(long)]
        node_context: Option<PathBuf>,
    },

    /// Collect the inventory record and submit it to the inventory API
    Submit {
        /// Config file (default: ~/.config/inventory-agent/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Inventory API base URL
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Inventory API token
        #[arg(long)]
        api_token: Option<String>,

        /// JSON node attributes supplied by the orchestration agent
        #[arg(long)]
        node_context: Option<PathBuf>,
    },
}
