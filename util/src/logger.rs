//! Logger setup for the executables

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::collections::BTreeMap;
use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use serde::Deserialize;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logging parameters, usually found in the `[logger]` table of an exec's
/// parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggerParams {
    /// Level for all targets not listed in `target_levels`.
    pub min_level: LevelFilter,

    /// If true log lines are also written to stdout, otherwise only the
    /// session log file is used.
    #[serde(default = "default_to_stdout")]
    pub to_stdout: bool,

    /// Per target overrides, for example `"guide_lib::kinematics" = "Debug"`.
    #[serde(default)]
    pub target_levels: BTreeMap<String, LevelFilter>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level at least as verbose as `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LoggerParams {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            to_stdout: true,
            target_levels: BTreeMap::new()
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
/// 
/// # Notes
/// 
/// - `params.min_level` must be `Info` or more verbose.
/// - This function must only be called once, fern will refuse a second
///   global logger.
pub fn logger_init(
    params: &LoggerParams, 
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if params.min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(params.min_level))
    }

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // Debug and trace lines carry their target
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            }
            else {
                out.finish(format_args!(
                    "[{:10.6} {}] {}",
                    session::get_elapsed_seconds(),
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(params.min_level);

    for (target, level) in params.target_levels.iter() {
        dispatch = dispatch.level_for(target.clone(), *level);
    }

    if params.to_stdout {
        dispatch = dispatch.chain(std::io::stdout());
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    dispatch
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;
    
    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", params.min_level);
    for (target, level) in params.target_levels.iter() {
        info!("    Log level for {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_to_stdout() -> bool {
    true
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_logger_params_from_toml() {
        let params: LoggerParams = crate::params::from_str(r#"
            min_level = "Debug"

            [target_levels]
            "guide_lib::kinematics" = "Trace"
        "#).unwrap();

        assert_eq!(params.min_level, LevelFilter::Debug);
        assert!(params.to_stdout);
        assert_eq!(
            params.target_levels.get("guide_lib::kinematics"),
            Some(&LevelFilter::Trace)
        );
    }
}
