#![deny(missing_docs)]
//! Shared logging utilities for the preview workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Messages logged while
//! a transform run is executing on the current thread are tagged with the
//! run's token so interleaved runs can be told apart in the log.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Token of the transform run executing on this thread, 0 when idle.
    static CURRENT_RUN: Cell<u64> = const { Cell::new(0) };
}

/// Sets the run token for the current thread.
pub fn set_current_run(run: u64) {
    CURRENT_RUN.with(|v| v.set(run));
}

/// Retrieves the run token for the current thread.
/// Returns 0 if no run is executing.
pub fn current_run() -> u64 {
    CURRENT_RUN.with(|v| v.get())
}

/// Tags log output on this thread with `run` until the returned guard drops.
pub fn enter_run(run: u64) -> RunScope {
    let previous = current_run();
    set_current_run(run);
    RunScope { previous }
}

/// Restores the previous run tag when dropped.
#[must_use = "the run tag is cleared as soon as the scope is dropped"]
pub struct RunScope {
    previous: u64,
}

impl Drop for RunScope {
    fn drop(&mut self) {
        set_current_run(self.previous);
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($level:expr, $($arg:tt)*) => {{
        match $crate::current_run() {
            0 => $crate::log::log!($level, $($arg)*),
            run => $crate::log::log!($level, "[run {}] {}", run, format_args!($($arg)*)),
        }
    }};
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {
        $crate::__engine_log!($crate::log::Level::Trace, $($arg)*)
    };
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {
        $crate::__engine_log!($crate::log::Level::Info, $($arg)*)
    };
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {
        $crate::__engine_log!($crate::log::Level::Debug, $($arg)*)
    };
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {
        $crate::__engine_log!($crate::log::Level::Warn, $($arg)*)
    };
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {
        $crate::__engine_log!($crate::log::Level::Error, $($arg)*)
    };
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
