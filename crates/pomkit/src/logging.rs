//! Structured logging.
//!
//! Assertions log under the `pomkit::assertion` target as
//! `"<message>: Passed|Failed"`; alias registrations log under
//! `pomkit::intercept`. Call [`init`] once from a test harness to see them.

use tracing_subscriber::EnvFilter;

/// Filter variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "POMKIT_LOG";

/// Target for assertion outcomes
pub const ASSERTION_TARGET: &str = "pomkit::assertion";

/// Target for intercept registrations
pub const INTERCEPT_TARGET: &str = "pomkit::intercept";

/// Install a fmt subscriber filtered by `POMKIT_LOG`, then `RUST_LOG`, then `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// `"<message>: Passed"` or `"<message>: Failed"`
#[must_use]
pub fn assertion_line(message: &str, passed: bool) -> String {
    format!("{message}: {}", if passed { "Passed" } else { "Failed" })
}

/// Log an assertion outcome
pub fn log_assertion(message: &str, passed: bool) {
    let line = assertion_line(message, passed);
    if passed {
        tracing::info!(target: ASSERTION_TARGET, result = "Passed", "{line}");
    } else {
        tracing::warn!(target: ASSERTION_TARGET, result = "Failed", "{line}");
    }
}

/// Log an alias registration
pub fn log_intercept_request(method: &str, url: &str, alias: &str) {
    tracing::info!(
        target: INTERCEPT_TARGET,
        method,
        url,
        alias,
        "InterceptRequest, {method} METHOD, {url}, {alias}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_line() {
        assert_eq!(
            assertion_line("Assert Element Existence", true),
            "Assert Element Existence: Passed"
        );
        assert_eq!(assertion_line("Assert URL", false), "Assert URL: Failed");
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        log_assertion("Assert Element Visible", true);
        log_intercept_request("GET", "/api/users", "users");
    }
}
