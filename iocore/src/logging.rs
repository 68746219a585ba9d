use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the engine's tracing filter directive.
pub const LOG_ENV: &str = "IOCORE_LOG";

static INIT: Once = Once::new();

/// Installs a JSON subscriber on stderr, filtered by `IOCORE_LOG` (default `info`).
///
/// Runs at most once per process and leaves an already installed global
/// subscriber in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
