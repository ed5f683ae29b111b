pub mod coordinator_state;
pub mod progress;
pub mod scheduler;
pub mod tcp;

use chrono::Utc;
use log::{debug, info};
use shared::{
    config::RenderConfig,
    dtos::render_report::RenderReport,
    error::{RenderError, RenderResult},
    graphics::bitmap::write_bitmap,
    models::fragments::messages::{CoordinatorMessage, WorkerEvent},
};
use tokio::sync::mpsc::{Receiver, Sender};

use self::scheduler::{ScheduleOutcome, Scheduler};

pub use self::tcp::run_coordinator;

/// Runs the scheduling loop over `links` and writes the finished image to the
/// configured output path.
pub async fn render(
    config: &RenderConfig,
    links: Vec<Sender<CoordinatorMessage>>,
    events: Receiver<WorkerEvent>,
) -> RenderResult<RenderReport> {
    info!("Computation started with {} worker(s)", links.len());
    let started = Utc::now();

    let ScheduleOutcome {
        framebuffer,
        tasks_per_worker,
    } = Scheduler::new(config, links, events).run().await?;

    let compute_seconds = (Utc::now() - started).num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6;
    info!("Computation finished in {} sec", compute_seconds);

    info!("Creating bitmap image");
    write_bitmap(&config.output, &framebuffer).map_err(|source| RenderError::Output {
        path: config.output.clone(),
        source,
    })?;
    info!("Image stored in '{}'", config.output.display());

    let report = RenderReport {
        width: config.width,
        height: config.height,
        block_size: config.block_size,
        rows: framebuffer.written_rows(),
        tasks_per_worker,
        compute_seconds,
        output: config.output.clone(),
    };
    debug!(
        "Render report: {}",
        serde_json::to_string(&report).unwrap_or_else(|_| "Error serializing report".to_string())
    );
    Ok(report)
}
