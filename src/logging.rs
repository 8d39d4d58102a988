//! Logging setup shared by both binaries.
//!
//! Events go to stderr; stdout belongs to the native host protocol and the
//! CLI's reports. `RUST_LOG` overrides the default filter.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(false),
        )
        .try_init()?;

    let _ = INITIALISED.set(());
    Ok(())
}
