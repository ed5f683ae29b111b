use std::io::Write;

use chrono::Local;
use colored::Colorize;
use env_logger::Env;
use log::Level;

pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "ERROR".red().bold(),
                Level::Warn => "WARN ".yellow(),
                Level::Info => "INFO ".green(),
                Level::Debug => "DEBUG".blue(),
                Level::Trace => "TRACE".dimmed(),
            };
            writeln!(
                buf,
                "{} {} {}: {}",
                Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                level,
                record.target(),
                record.args()
            )
        })
        .try_init();
}
