mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use pyfunc_core::{config, observability};

fn main() -> Result<()> {
    // Before any config read, thread or child process.
    config::load_dotenv();
    observability::init_tracing();
    let cli = Cli::parse();
    tracing::debug!(?cli, "Parsed command line");

    match cli.command {
        Commands::Call {
            target,
            python,
            timeout,
            inspect,
        } => commands::call(&target, python, timeout, inspect)?,
        Commands::Script { target } => commands::script(&target)?,
        Commands::Resolve { script } => commands::resolve(&script)?,
        Commands::Tokens => commands::tokens()?,
    }
    Ok(())
}
