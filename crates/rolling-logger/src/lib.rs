//! Rolling Logger
//!
//! A `log` backend that keeps the most recent lines in a circular buffer and echoes
//! each line to the browser console (WASM) or stderr (native). The buffer backs the
//! in-app diagnostics panel.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LoggerError {
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
    #[error("capacity must be positive")]
    ZeroCapacity,
}

/// Fixed-size line buffer; the oldest line is dropped when full
#[derive(Debug)]
pub struct RollingBuffer {
    capacity: usize,
    lines: VecDeque<String>,
}

impl RollingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub struct RollingLogger {
    app_name: String,
    buffer: Mutex<RollingBuffer>,
}

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

/// `[12:00:00.123] INFO app: message`
pub fn format_line(app_name: &str, level: Level, message: &str) -> String {
    format!(
        "[{}] {} {}: {}",
        chrono::Local::now().format("%H:%M:%S%.3f"),
        level,
        app_name,
        message
    )
}

impl RollingLogger {
    fn new(app_name: &str, capacity: usize) -> Self {
        Self {
            app_name: app_name.to_string(),
            buffer: Mutex::new(RollingBuffer::new(capacity)),
        }
    }

    fn write(&self, level: Level, message: &str) {
        let line = format_line(&self.app_name, level, message);
        emit(level, &line);
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(line);
        }
    }
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.write(record.level(), &record.args().to_string());
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

/// Install the logger as the global `log` backend, keeping the last `capacity` lines
pub fn init_logger(app_name: &str, capacity: usize) -> Result<(), LoggerError> {
    if capacity == 0 {
        return Err(LoggerError::ZeroCapacity);
    }
    LOGGER
        .set(RollingLogger::new(app_name, capacity))
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    let logger = LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    log::set_logger(logger).map_err(|_| LoggerError::AlreadyInitialized)?;
    log::set_max_level(if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info });
    Ok(())
}

fn installed() -> Result<&'static RollingLogger, LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)
}

/// Buffered lines, oldest first (empty before init)
pub fn recent_lines() -> Vec<String> {
    installed()
        .ok()
        .and_then(|l| l.buffer.lock().ok().map(|b| b.lines()))
        .unwrap_or_default()
}

pub fn clear() {
    if let Ok(logger) = installed() {
        if let Ok(mut buffer) = logger.buffer.lock() {
            buffer.clear();
        }
    }
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    installed()?.write(Level::Info, message);
    Ok(())
}

pub fn warn(message: &str) -> Result<(), LoggerError> {
    installed()?.write(Level::Warn, message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    installed()?.write(Level::Error, message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_drops_oldest() {
        let mut buffer = RollingBuffer::new(2);
        buffer.push("a".into());
        buffer.push("b".into());
        buffer.push("c".into());
        assert_eq!(buffer.lines(), vec!["b".to_string(), "c".to_string()]);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_format_line() {
        let line = format_line("Coach", Level::Warn, "slow request");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] WARN Coach: slow request"));
    }

    // The global logger can be installed once per process, so one test covers it
    #[test]
    fn test_global_logger() {
        assert_eq!(init_logger("Coach", 0), Err(LoggerError::ZeroCapacity));
        init_logger("Coach", 3).unwrap();
        assert_eq!(init_logger("Coach", 3), Err(LoggerError::AlreadyInitialized));

        log::info!("[TEST] one");
        info("two").unwrap();
        error("three").unwrap();
        warn("four").unwrap();

        let lines = recent_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("two"));
        assert!(lines[2].contains("WARN Coach: four"));

        clear();
        assert!(recent_lines().is_empty());
    }
}
