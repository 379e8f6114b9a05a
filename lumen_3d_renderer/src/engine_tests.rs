//! Unit tests for the Engine logger registry
//!
//! LOGGER is a global shared across all tests: every test here is #[serial].

use crate::lumen3d::Engine;
use crate::lumen3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Captures entries as "Severity|source|message|file"
///
/// Only entries from "lumen3d::Test" are kept: renderer tests running in
/// parallel log through the same global.
#[derive(Clone)]
struct CaptureLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CaptureLogger {
    fn new() -> Self {
        Self { entries: Arc::new(Mutex::new(Vec::new())) }
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source != "lumen3d::Test" {
            return;
        }
        self.entries.lock().unwrap().push(format!(
            "{:?}|{}|{}|{}",
            entry.severity,
            entry.source,
            entry.message,
            entry.file.is_some()
        ));
    }
}

// ============================================================================
// LOGGER REGISTRY
// ============================================================================

#[test]
#[serial]
fn test_default_logger_logs_without_panic() {
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "lumen3d::Test", "hello".to_string());
}

#[test]
#[serial]
fn test_custom_logger_receives_macro_output() {
    let capture = CaptureLogger::new();
    Engine::set_logger(capture.clone());

    crate::engine_info!("lumen3d::Test", "frame {}", 3);
    crate::engine_warn!("lumen3d::Test", "clamped to {}", 6);

    let entries = capture.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], "Info|lumen3d::Test|frame 3|false");
    assert_eq!(entries[1], "Warn|lumen3d::Test|clamped to 6|false");

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_error_macro_carries_location() {
    let capture = CaptureLogger::new();
    Engine::set_logger(capture.clone());

    crate::engine_error!("lumen3d::Test", "device lost");

    let entries = capture.entries();
    assert_eq!(entries, vec!["Error|lumen3d::Test|device lost|true".to_string()]);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let capture = CaptureLogger::new();
    Engine::set_logger(capture.clone());
    Engine::reset_logger();

    Engine::log(LogSeverity::Debug, "lumen3d::Test", "after reset".to_string());
    assert!(capture.entries().is_empty());
}
