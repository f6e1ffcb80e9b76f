//! Telemetry initialization (tracing registry + fmt subscriber).
//!
//! Log verbosity is controlled through the standard `RUST_LOG` environment
//! variable and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=debug ocr-intake
//! RUST_LOG=ocr_intake=debug,tower_http=info ocr-intake
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing-subscriber with console output
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
