//! Logger module
//!
//! Provides logging utilities for the file server including:
//! - Server lifecycle logging
//! - Access logging (common or JSON)
//! - Error and warning logging with a level threshold
//! - File-based logging support
//!
//! Every line starts with an RFC 2822 timestamp and the level. Before
//! `init` is called, lines go straight to stdout/stderr.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Log severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    /// Parse a configured level name, `info` for anything unknown
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
        }
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn line(level: Level, message: &str) -> String {
    format!(
        "{} | {} {message}",
        chrono::Local::now().to_rfc2822(),
        level.label()
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(level != Level::Debug, |w| w.enabled(level))
}

/// Write to info/access log
fn write_info(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    let line = line(level, message);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

/// Write to error log
fn write_error(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    let line = line(level, message);
    match writer::get() {
        Some(w) => w.write_error(&line),
        None => eprintln!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, root: &std::path::Path) {
    write_info(Level::Info, "======================================");
    write_info(Level::Info, "[Main] Folder server started");
    write_info(Level::Info, &format!("[Main] Listening on: http://{addr}/"));
    write_info(Level::Info, &format!("[Main] Serving: {}", root.display()));
    write_info(
        Level::Info,
        &format!(
            "[Main] Worker pool: {} concurrent requests, backlog {}",
            config.server.max_concurrent_requests, config.server.backlog
        ),
    );
    if config.files.show_folder_size {
        write_info(Level::Info, "[Main] Recursive folder sizes enabled");
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(Level::Info, &format!("[Main] Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(Level::Info, &format!("[Main] Error log: {path}"));
    }
    write_info(Level::Info, "======================================");
}

pub fn log_config(rendered: &str) {
    write_info(Level::Debug, &format!("[Config] Effective configuration:\n{rendered}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(Level::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

/// Connection-level failure; client disconnects are routine and only debug
pub fn log_connection_error(err: &hyper::Error) {
    if err.is_incomplete_message() || err.is_canceled() {
        write_error(Level::Debug, &format!("[Connection] Closed early: {err}"));
    } else {
        write_error(Level::Warn, &format!("[Connection] Failed to serve connection: {err}"));
    }
}

pub fn log_request(method: &hyper::Method, path: &str, kind: &str) {
    write_info(Level::Debug, &format!("[Request] {method} {path} -> {kind}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    if !enabled(Level::Info) {
        return;
    }
    let message = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&message),
        None => println!("{message}"),
    }
}

pub fn log_info(message: &str) {
    write_info(Level::Info, message);
}

pub fn log_debug(message: &str) {
    write_info(Level::Debug, message);
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_shutdown_requested(reason: &str) {
    write_info(Level::Info, &format!("[Main] Shutdown requested ({reason})"));
}

pub fn log_shutdown_complete(unfinished: usize) {
    if unfinished == 0 {
        write_info(Level::Info, "[Main] All workers finished, server stopped");
    } else {
        write_error(
            Level::Warn,
            &format!("[Main] Stopped with {unfinished} request(s) still in flight"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("error"), Level::Error);
        assert_eq!(Level::parse("WARN"), Level::Warn);
        assert_eq!(Level::parse(" debug "), Level::Debug);
        assert_eq!(Level::parse("verbose"), Level::Info);
    }

    #[test]
    fn test_line_layout() {
        let l = line(Level::Warn, "[WARN] disk slow");
        let (time, rest) = l.split_once(" | ").unwrap();
        assert!(chrono::DateTime::parse_from_rfc2822(time).is_ok());
        assert_eq!(rest, "WARN  [WARN] disk slow");
    }
}
