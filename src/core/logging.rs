//! Logging initialisation built on flexi_logger
//!
//! All crate code logs through the `log` facade; this module wires the facade
//! to flexi_logger with the formats the surrounding system expects.

use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

// Global static logger handle for runtime level reconfiguration
static LOGGER_HANDLE: OnceLock<Mutex<flexi_logger::LoggerHandle>> = OnceLock::new();

/// Output format for log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    Text,
    Json,
}

/// Initialise logging
///
/// # Arguments
/// * `log_level` - level spec string (e.g. "info", "debug"); defaults to "info"
/// * `log_format` - "text" or "json"; defaults to text
/// * `log_file` - optional file path; stderr when absent
/// * `color_enabled` - colorize text output (ignored for json)
///
/// # Limitations
/// Format and output destination are fixed at initialisation; only the log
/// level can be changed afterwards via `reconfigure_log_level`.
pub fn init_logging(
    log_level: Option<&str>,
    log_format: Option<&str>,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let level_str = log_level.unwrap_or("info");
    let format = log_format
        .map(LogFormat::from_str)
        .transpose()
        .map_err(|_| format!("Unknown log format '{}'", log_format.unwrap_or_default()))?
        .unwrap_or(LogFormat::Text);

    let mut logger = Logger::try_with_str(level_str)?;

    logger = match (format, color_enabled) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Text, true) => logger.format(text_color_format),
        (LogFormat::Text, false) => logger.format(text_format),
    };

    if let Some(file_path) = log_file {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));

    Ok(())
}

/// Change the active log level at runtime
pub fn reconfigure_log_level(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(handle_mutex) = LOGGER_HANDLE.get() {
        if let Ok(mut handle) = handle_mutex.lock() {
            let _ = handle.parse_and_push_temp_spec(log_level);
            Ok(())
        } else {
            Err("Could not acquire logger handle lock".into())
        }
    } else {
        Err("Logger handle not initialised. Call init_logging first.".into())
    }
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

// Format target as path-like: module::submodule -> module/submodule.rs:42
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path = target.replace("::", "/");
    match line {
        Some(line) => format!("{}.rs:{}", path, line),
        None => format!("{}.rs", path),
    }
}

// Plain text format: "YYYY-MM-DD HH:mm:ss.fff INF message (queue/manager.rs:42)"
fn text_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn text_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    let level_colored = match record.level() {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    };

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored,
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let json_obj = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match serde_json::to_string(&json_obj) {
        Ok(json_str) => write!(w, "{}", json_str),
        Err(_) => write!(w, "{{\"error\":\"log serialization failed\"}}"),
    }
}
