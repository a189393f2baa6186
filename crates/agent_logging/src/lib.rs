#![deny(missing_docs)]
//! Shared logging utilities for the page agent workspace.
//!
//! This crate provides the `agent_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line is
//! prefixed with the frame index of the scroll loop running on the current
//! thread, so a log can be lined up against the frame callbacks that caused it.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local storage for the index of the frame callback being delivered.
    static FRAME: Cell<u64> = const { Cell::new(0) };
}

/// Sets the frame index for the current thread.
/// The scheduler calls this once per delivered frame callback.
pub fn set_frame(frame: u64) {
    FRAME.with(|v| v.set(frame));
}

/// Retrieves the frame index for the current thread.
/// Returns 0 before the first frame has been delivered.
pub fn current_frame() -> u64 {
    FRAME.with(|v| v.get())
}

/// Logs a trace-level message prefixed with the current frame.
#[macro_export]
macro_rules! agent_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message prefixed with the current frame.
#[macro_export]
macro_rules! agent_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message prefixed with the current frame.
#[macro_export]
macro_rules! agent_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message prefixed with the current frame.
#[macro_export]
macro_rules! agent_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message prefixed with the current frame.
#[macro_export]
macro_rules! agent_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[f{}] {}", $crate::current_frame(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_is_per_thread() {
        set_frame(42);
        assert_eq!(current_frame(), 42);
        let other = std::thread::spawn(current_frame).join().unwrap();
        assert_eq!(other, 0);
    }

    #[test]
    fn macros_expand_without_a_logger() {
        initialize_for_tests();
        set_frame(3);
        agent_debug!("speed {}", 5);
        agent_warn!("store unavailable");
    }
}
