use colored::Colorize;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Sets up the logging configuration for the application.
///
/// Logs go to stderr with a colored level label, so replies on stdout stay clean.
/// Defaults to `Info`; `RUST_LOG` overrides it.
pub fn setup_log() {
    let default_log_level = LevelFilter::Info;
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            let l = record.level();
            let colored_level = match l {
                log::Level::Error => l.to_string().red().bold(),
                log::Level::Warn => l.to_string().yellow().bold(),
                log::Level::Info => l.to_string().green().bold(),
                log::Level::Debug => l.to_string().blue().bold(),
                log::Level::Trace => l.to_string().purple().bold(),
            };
            writeln!(buf, "{} {}", colored_level, record.args())
        })
        .filter(None, default_log_level)
        .parse_default_env();

    // Tests and embedding hosts may have installed a logger already
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
