use clap::Subcommand;
use colored::Colorize;
use log::{log, Level};
use shared::{
    config::{RenderConfig, RenderOptions, Role},
    error::RenderError,
};

use self::{coordinator::CoordinatorCommand, local::LocalCommand, worker::WorkerCommand};

pub mod coordinator;
pub mod local;
pub mod render;
pub mod worker;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 🏠 Local Mode
    ///
    /// Run the coordinator and a pool of in-process workers.
    Local(LocalCommand),

    /// 🚀 Start Coordinator
    ///
    /// Wait for workers over TCP, distribute rows and write the image.
    Coordinator(CoordinatorCommand),

    /// 👷 Worker Mode
    ///
    /// Connect to a coordinator and compute the rows it assigns.
    Worker(WorkerCommand),
}

/// Validates the options the same way in every process; only the coordinator
/// tells the operator what is wrong.
pub fn build_config(
    options: RenderOptions,
    worker_count: usize,
    role: Role,
) -> Result<RenderConfig, RenderError> {
    let config = RenderConfig::new(options, worker_count)?;
    if role.reports_errors() {
        println!("{}", "Computation parameters:".bold());
        println!("{}\n", config);
    }
    Ok(config)
}

/// Level `err` is logged at. Configuration errors are only shown by the
/// coordinator; other processes keep them at debug.
fn report_level(err: &RenderError, role: Role) -> Level {
    match err {
        RenderError::Config(_) if !role.reports_errors() => Level::Debug,
        _ => Level::Error,
    }
}

/// Logs `err` according to `role` and returns the process exit code.
pub fn report(err: &RenderError, role: Role) -> i32 {
    log!(report_level(err, role), "{}", err);
    err.exit_code()
}
