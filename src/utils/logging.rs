// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber for a combiner run.
///
/// Progress and per-file warnings go to stderr so a run can be piped or
/// redirected without mixing logs into anything else. `RUST_LOG` narrows or
/// widens the output (e.g. `RUST_LOG=debug` shows every matched instrument);
/// without it only `info` and above are shown.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Logging initialised");
}
