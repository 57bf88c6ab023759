//! CLI command definitions for the `chatkeep` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod conversation;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Persist chat transcripts and proxy completions for a browser chat UI.
#[derive(Parser)]
#[command(name = "chatkeep", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML config file (default: ./chatkeep.toml if present).
    #[arg(long, global = true, env = "CHATKEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (overrides config and PORT).
        #[arg(long)]
        port: Option<u16>,

        /// Interface to bind (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// List stored conversations, newest first.
    #[command(alias = "ls")]
    List,

    /// Print one conversation transcript.
    Show {
        /// Conversation id.
        id: String,
    },

    /// Delete a stored conversation.
    #[command(alias = "rm")]
    Delete {
        /// Conversation id.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,chatkeep=debug",
            _ => "trace",
        }
    }
}
