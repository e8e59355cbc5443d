//! CLI argument definitions
//!
//! Uses clap derive macros for argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sidcfg - Inspect the console SID player configuration
#[derive(Parser, Debug)]
#[command(name = "sidcfg")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Use this directory instead of the per-user config directory
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Use this directory instead of the per-user data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the configuration and print the resulting settings
    Show {
        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration file location
    Path,
}
