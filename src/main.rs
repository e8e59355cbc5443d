//! sidcfg - Console SID player configuration tool
//!
//! Entry point for the CLI.

mod cli;

use clap::Parser;
use cli::{Args, Commands};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let paths = cli::resolver(&args);

    match args.command {
        Commands::Show { json } => cli::show(paths.as_ref(), json),
        Commands::Path => cli::path(paths.as_ref()),
    }
}
