//! Logger module
//!
//! Provides logging utilities for the service including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.is_debug(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Password service started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Endpoint: GET http://{addr}/v1/password?length=<int>&count=<int>"));
    let mut generator = config.generator.path.clone();
    for arg in &config.generator.args {
        generator.push(' ');
        generator.push_str(arg);
    }
    write_info(&format!("Generator: {generator}"));
    if config.generator.timeout_secs > 0 {
        write_info(&format!("Generator timeout: {}s", config.generator.timeout_secs));
    }
    write_info(&format!(
        "Limits: length {}..={}, count {}..={}",
        config.limits.min_length,
        config.limits.max_length,
        config.limits.min_count,
        config.limits.max_count
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max_conn) = config.performance.max_connections {
        write_info(&format!("Max connections: {max_conn}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_server_stopped(pending_connections: usize) {
    write_info(&format!(
        "[Shutdown] Listener closed, {pending_connections} connection(s) still open"
    ));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Emitted only when `logging.level` is `debug` or `trace`
pub fn log_debug(message: &str) {
    if let Some(w) = writer::get() {
        if w.debug_enabled() {
            w.write_info(&format!("[DEBUG] {message}"));
        }
    }
}

pub fn log_generator_failed(err: &crate::generator::GeneratorError) {
    let (_, stderr) = err.captured_output();
    if stderr.is_empty() {
        log_error(&format!("[Generator] {err}"));
    } else {
        log_error(&format!("[Generator] {err}: {}", stderr.trim_end()));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
