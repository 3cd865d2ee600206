#![deny(missing_docs)]
//! Shared logging utilities for the crawler workspace.
//!
//! This crate provides the `crawl_*` logging macros used across the codebase,
//! the page counter they prefix every line with, and a minimal test
//! initializer for the global logger.

use std::sync::atomic::{AtomicU64, Ordering};

/// Results page currently being processed by the crawl session (1-based, 0 before the first fetch).
static CRAWL_PAGE: AtomicU64 = AtomicU64::new(0);

/// Sets the results page number for log prefixes.
/// The crawl controller calls this once per fetched page.
pub fn set_crawl_page(page: u64) {
    CRAWL_PAGE.store(page, Ordering::Relaxed);
}

/// Retrieves the results page number last set by [`set_crawl_page`].
/// Returns 0 if no page has been fetched yet.
pub fn crawl_page() -> u64 {
    CRAWL_PAGE.load(Ordering::Relaxed)
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! crawl_trace {
    ($($arg:tt)*) => {{
        log::trace!("[page {}] {}", $crate::crawl_page(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! crawl_info {
    ($($arg:tt)*) => {{
        log::info!("[page {}] {}", $crate::crawl_page(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! crawl_debug {
    ($($arg:tt)*) => {{
        log::debug!("[page {}] {}", $crate::crawl_page(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! crawl_warn {
    ($($arg:tt)*) => {{
        log::warn!("[page {}] {}", $crate::crawl_page(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! crawl_error {
    ($($arg:tt)*) => {{
        log::error!("[page {}] {}", $crate::crawl_page(), format_args!($($arg)*));
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

#[cfg(test)]
mod tests {
    use super::{crawl_page, set_crawl_page};

    #[test]
    fn page_counter_round_trips() {
        set_crawl_page(3);
        assert_eq!(crawl_page(), 3);
        crawl_info!("visible with page prefix {}", 1);
        set_crawl_page(0);
    }
}
