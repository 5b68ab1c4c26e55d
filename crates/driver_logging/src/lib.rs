#![deny(missing_docs)]
//! Shared logging utilities for the driver workspace.
//!
//! This crate provides the `driver_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.

use std::cell::RefCell;

thread_local! {
    /// Thread-local storage for the name of the job currently being driven.
    static JOB_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the current job label for the current thread.
/// The run loop should call this when it starts driving a job.
pub fn set_job_label(label: &str) {
    JOB_LABEL.with(|v| *v.borrow_mut() = Some(label.to_string()));
}

/// Clears the current job label for the current thread.
pub fn clear_job_label() {
    JOB_LABEL.with(|v| *v.borrow_mut() = None);
}

/// Retrieves the current job label for the current thread, if one is set.
pub fn job_label() -> Option<String> {
    JOB_LABEL.with(|v| v.borrow().clone())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! driver_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! driver_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! driver_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! driver_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! driver_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
