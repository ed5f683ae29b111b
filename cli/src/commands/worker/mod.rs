use clap::Parser;
use log::info;
use shared::{config::Role, error::RenderError, networking::worker::Worker};
use uuid::Uuid;

use super::{build_config, render::RenderArgs};

#[derive(Parser, Debug)]
pub struct WorkerCommand {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, env = "FRAKT_ADDRESS")]
    pub address: Option<String>,

    #[arg(long, env = "FRAKT_PORT")]
    pub port: Option<u16>,

    /// Worker count of the run; needed to validate the block size.
    #[arg(short = 'w', long, env = "FRAKT_WORKERS", default_value_t = 1)]
    pub workers: usize,

    #[command(flatten)]
    pub render: RenderArgs,
}

pub async fn run(command: WorkerCommand) -> Result<(), RenderError> {
    let config = build_config(command.render.into(), command.workers, Role::Worker)?;
    let worker_name = match &command.name {
        Some(name) => name.to_owned(),
        None => format!("worker-{}", Uuid::new_v4()),
    };
    let address = match command.address {
        Some(address) => address,
        None => "localhost".to_string(),
    };
    let port = match command.port {
        Some(port) => port,
        None => 8787,
    };

    let worker = Worker::new(worker_name, address, port);
    let completed = worker::run_worker(&worker, &config).await?;
    info!("{} served {} assignment(s)", worker.name, completed);
    Ok(())
}
