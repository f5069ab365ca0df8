//! CLI definitions for the `colab` binary.

pub mod config;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Multi-agent chat service.
#[derive(Parser)]
#[command(name = "colab", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Export spans with the OpenTelemetry stdout exporter.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP and WebSocket server.
    Serve {
        /// Address to bind (overrides config and COLAB_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and COLAB_PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the resolved configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}
