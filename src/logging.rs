//! Diagnostics setup.
//!
//! Library code logs through `tracing`. [`init`] installs a `tracing-subscriber`
//! fmt subscriber filtered at the configured minimum level. Only the first
//! installation in a process takes effect; later calls are ignored.

use crate::config::LogLevel;

pub fn init(level: LogLevel) {
    let max: tracing::Level = level.into();
    let installed = tracing_subscriber::fmt()
        .with_max_level(max)
        .with_target(false)
        .try_init();
    if installed.is_ok() {
        tracing::debug!(?level, "log subscriber installed");
    }
}
