//! Tracing and logging setup shared by binaries and integration tests.

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    self::tracing::init();
}

/// Subscriber configuration (filter, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, LOG_FORMAT_ENV_VAR};
