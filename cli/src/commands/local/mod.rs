use clap::Parser;
use log::{info, warn};
use shared::{config::Role, error::RenderError};
use worker::local::spawn_local_pool;

use super::{build_config, render::RenderArgs};

/// 🏠 Local Command
///
/// Coordinator and workers share this process and talk over channels.
#[derive(Parser, Debug)]
pub struct LocalCommand {
    /// 👷 Number of workers (default: number of CPUs).
    #[arg(short = 'w', long, value_name = "COUNT", env = "FRAKT_WORKERS")]
    pub workers: Option<usize>,

    #[command(flatten)]
    pub render: RenderArgs,
}

pub async fn run(command: LocalCommand) -> Result<(), RenderError> {
    let workers = command.workers.unwrap_or_else(num_cpus::get);
    let config = build_config(command.render.into(), workers, Role::Coordinator)?;

    let pool = spawn_local_pool(&config, workers);
    let report = coordinator::render(&config, pool.links, pool.events).await?;
    for handle in pool.handles {
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Worker ended with an error after the render: {}", e),
            Err(e) => warn!("Worker task panicked: {}", e),
        }
    }
    info!(
        "Rendered {} rows in {} task(s)",
        report.rows,
        report.total_tasks()
    );
    Ok(())
}
