pub mod commands;

use std::process::ExitCode;

use clap::Parser;
use commands::Commands;
use shared::{config::Role, env, logger};

/// Distributed Mandelbrot renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    // `.env` first so it can set RUST_LOG.
    let env_file = env::init();
    logger::init();
    env_file.log();

    let cli = Cli::parse();

    let (role, result) = match cli.command {
        Commands::Local(command) => (Role::Coordinator, commands::local::run(command).await),
        Commands::Coordinator(command) => {
            (Role::Coordinator, commands::coordinator::run(command).await)
        }
        Commands::Worker(command) => (Role::Worker, commands::worker::run(command).await),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(commands::report(&e, role) as u8),
    }
}
