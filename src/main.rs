//! hipertexto - a Markdown static site generator.

mod assets;
mod build;
mod cli;
mod config;
mod error;
mod generator;
mod init;
mod logger;
mod markdown;
mod paths;
mod serve;
mod template;
mod watch;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use config::SiteDirs;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = Path::new(".");

    match cli.command {
        Commands::Init { name } => init::new_project(root, &name),
        Commands::Build => build::build_site(&SiteDirs::from_root(root)),
        Commands::Serve { port, reload } => {
            serve::serve_site(&SiteDirs::from_root(root), port, reload.unwrap_or(true))
        }
    }
}
