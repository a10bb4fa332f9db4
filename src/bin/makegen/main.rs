//! makegen CLI - generates a Makefile from Makegen.toml and runs make

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use makegen::{ConfigError, CONFIG_ERROR_EXIT_CODE};

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => report(e),
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("makegen=debug")
    } else {
        EnvFilter::new("makegen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(&cli.global, args),
        Commands::Generate(args) => commands::generate::execute(&cli.global, args).map(|_| 0),
        Commands::Deps(args) => commands::deps::execute(&cli.global, args).map(|_| 0),
        Commands::Targets(args) => commands::targets::execute(&cli.global, args).map(|_| 0),
        Commands::Completions(args) => commands::completions::execute(args).map(|_| 0),
    }
}

/// Print an error and pick the exit status for it.
fn report(e: anyhow::Error) -> i32 {
    match e.downcast_ref::<ConfigError>() {
        Some(config_error) => {
            eprintln!("{:?}", miette::Report::new(config_error.clone()));
            CONFIG_ERROR_EXIT_CODE
        }
        None => {
            eprintln!("error: {:#}", e);
            1
        }
    }
}
