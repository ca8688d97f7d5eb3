//! Tracing setup for the CLI binary.

use tracing_subscriber::{fmt, EnvFilter};

/// Default level when neither `--log-level` nor `RUST_LOG` says otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Filter directive for the crate at `level`, other crates stay at warn.
pub fn filter_directive(level: &str) -> String {
    format!("blend_calc_rs={level},warn")
}

/// Initialize the stderr subscriber. `RUST_LOG` wins over `level` when set.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level.unwrap_or(DEFAULT_LOG_LEVEL))));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
