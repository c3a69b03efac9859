use crate::Utils::config::{ConfigError, parse_level};
use chrono::Local;
use simplelog::*;
use std::fs::File;

/// name of the log file for the current moment
pub fn log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("algex_log_{}.txt", date_and_time)
}

/// Initialize the logger: terminal output at `level`, plus a log file when `to_file` is set.
/// A logger installed earlier stays in place.
pub fn init_logger(level: &str, to_file: bool) -> Result<(), ConfigError> {
    let level = parse_level(level)
        .ok_or_else(|| ConfigError::Invalid(format!("unknown log level {:?}", level)))?;
    if level == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if to_file {
        let file = File::create(log_file_name())?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(())
}
