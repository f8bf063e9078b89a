//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};

/// hipertexto static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(name = "ht", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build your site to the public folder
    Build,

    /// Serve the public folder over http on the local network
    Serve {
        /// Port to bind
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Rebuild automatically when source files change
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        reload: Option<bool>,
    },

    /// Create a new project
    Init {
        /// Name of the project directory
        name: String,
    },
}
