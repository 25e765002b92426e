mod cli;
mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::Backend;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("puzzlefeed=info".parse()?)
                .add_directive("puzzlefeed_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Fetch(args) => {
            let backend = Backend::resolve(&cli.backend)?;
            commands::fetch::run(&backend, args)
        }
        Command::Browse(args) => {
            let backend = Backend::resolve(&cli.backend)?;
            commands::browse::run(&backend, args)
        }
        Command::Prefs(command) => {
            let store = puzzlefeed::FilePreferences::new(config::prefs_path(&cli.backend)?);
            commands::prefs::run(&store, command)
        }
    }
}
