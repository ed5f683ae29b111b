use clap::Parser;
use shared::{config::Role, error::RenderError, networking::server::ServerConfig};

use super::{build_config, render::RenderArgs};

/// 🖥️ Coordinator Command
///
/// Waits for the configured number of workers, then 🚀 renders.
#[derive(Parser, Debug)]
#[command(name = "coordinator", about = "🚀 Distribute a render over TCP workers.", long_about = None)]
pub struct CoordinatorCommand {
    /// 📌 Address to listen on. Defaults to all interfaces.
    #[arg(long, value_name = "ADDRESS", env = "FRAKT_ADDRESS")]
    pub address: Option<String>,

    /// 🚪 Port to listen on (default 8787).
    #[arg(long, value_name = "PORT", env = "FRAKT_PORT")]
    pub port: Option<u16>,

    /// 👷 Number of workers to wait for.
    #[arg(short = 'w', long, value_name = "COUNT", env = "FRAKT_WORKERS", default_value_t = 1)]
    pub workers: usize,

    #[command(flatten)]
    pub render: RenderArgs,
}

pub async fn run(command: CoordinatorCommand) -> Result<(), RenderError> {
    let config = build_config(command.render.into(), command.workers, Role::Coordinator)?;
    let server = ServerConfig::new(
        command.address.unwrap_or_else(|| "0.0.0.0".to_string()),
        command.port.unwrap_or(8787),
        command.workers,
    );
    coordinator::run_coordinator(&server, &config).await?;
    Ok(())
}
