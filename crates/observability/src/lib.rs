//! Tracing/logging setup shared by the service binaries.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize process-wide logging from the environment (`LOG_FORMAT`, `RUST_LOG`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
