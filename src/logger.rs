use crate::config::{ConfigError, LogConfig};
use crate::constants::PROXY_LOG_TARGET;

/// Simplifies file paths by extracting relevant parts from cargo registry paths
///
/// # Arguments
/// * `file_path` - The file path to simplify
///
/// # Returns
/// A simplified version of the file path
fn simplify_file_path(file_path: &str) -> String {
    if file_path.contains("ccrelay") {
        if let Some(pos) = file_path.rfind("/src/") {
            return file_path[(pos + 1)..].to_string();
        }
    }

    if let Some((_, suffix)) = file_path.split_once(".cargo/registry/src/") {
        if let Some(first_slash) = suffix.find('/') {
            suffix[(first_slash + 1)..].to_string()
        } else {
            suffix.to_string()
        }
    } else {
        file_path.to_string()
    }
}

/// Formats log messages for console output with a simplified format
///
/// # Features
/// * Simplified time format (HH:MM:SS)
/// * Level-colored output
pub fn console_log_formatter(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    let level = record.level();
    let level_color = match level {
        log::Level::Error => "\x1B[31m", // red
        log::Level::Warn => "\x1B[33m",  // yellow
        log::Level::Info => "\x1B[32m",  // green
        log::Level::Debug => "\x1B[0m",  // normal
        log::Level::Trace => "\x1B[35m", // purple
    };
    let reset = "\x1B[0m";

    out.finish(format_args!(
        "{}{}[{}] {}:{} {}{}",
        level_color,
        chrono::Local::now().format("%H:%M:%S.%3f "),
        get_level(level),
        simplify_file_path(record.file().unwrap_or("")),
        record.line().unwrap_or(0),
        message,
        reset,
    ))
}

/// Formats log messages for file output with a full date-time prefix
pub fn file_log_formatter(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    record: &log::Record,
) {
    out.finish(format_args!(
        "{}[{}] {}:{} {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        get_level(record.level()),
        simplify_file_path(record.file().unwrap_or("")),
        record.line().unwrap_or(0),
        message
    ))
}

/// Proxied bodies are written verbatim with only a timestamp.
fn proxy_log_formatter(
    out: fern::FormatCallback,
    message: &std::fmt::Arguments,
    _record: &log::Record,
) {
    out.finish(format_args!(
        "{} {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        message
    ))
}

/// Dependencies only get through when they log above debug.
fn is_relevant(record: &log::Metadata, level: log::LevelFilter) -> bool {
    record.target().starts_with("ccrelay") || record.level() < level.min(log::LevelFilter::Debug)
}

/// Sets up the application logger with console and optional file outputs
pub fn setup_logger(config: &LogConfig) -> Result<(), ConfigError> {
    let level = config.level_filter()?;

    let base_dispatcher = fern::Dispatch::new().level(log::LevelFilter::Trace);

    let stdout_dispatcher = fern::Dispatch::new()
        .level(level)
        .filter(move |metadata| {
            metadata.target() != PROXY_LOG_TARGET && is_relevant(metadata, level)
        })
        .format(console_log_formatter)
        .chain(std::io::stdout());

    let mut dispatcher = base_dispatcher.chain(stdout_dispatcher);

    if let Some(log_file_path) = &config.file {
        let file = fern::log_file(log_file_path).map_err(|e| ConfigError::Read {
            path: log_file_path.display().to_string(),
            error: e.to_string(),
        })?;
        dispatcher = dispatcher.chain(
            fern::Dispatch::new()
                .level(level)
                .filter(move |metadata| {
                    metadata.target() != PROXY_LOG_TARGET && is_relevant(metadata, level)
                })
                .format(file_log_formatter)
                .chain(file),
        );
    }

    if let Some(proxy_file_path) = &config.proxy_file {
        let file = fern::log_file(proxy_file_path).map_err(|e| ConfigError::Read {
            path: proxy_file_path.display().to_string(),
            error: e.to_string(),
        })?;
        dispatcher = dispatcher.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Info)
                .filter(|metadata| metadata.target() == PROXY_LOG_TARGET)
                .format(proxy_log_formatter)
                .chain(file),
        );
    }

    // A logger may already be installed (tests, embedding); keep that one.
    if let Err(e) = dispatcher.apply() {
        log::warn!("Logger already initialized: {}", e);
    }

    log::debug!(
        "Logger initialized, level: {}, file: {:?}, proxy file: {:?}",
        level,
        config.file,
        config.proxy_file
    );
    Ok(())
}

fn get_level(level: log::Level) -> String {
    match level {
        log::Level::Error => "E",
        log::Level::Warn => "W",
        log::Level::Info => "I",
        log::Level::Debug => "D",
        log::Level::Trace => "T",
    }
    .to_string()
}

/// Console-only logger for tests
#[cfg(test)]
pub fn setup_test_logger() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        // Another test binary helper may have installed a logger first.
        let _ = fern::Dispatch::new()
            .format(console_log_formatter)
            .level(log::LevelFilter::Debug)
            .filter(|metadata| is_relevant(metadata, log::LevelFilter::Debug))
            .chain(std::io::stdout())
            .apply();
    });
}
