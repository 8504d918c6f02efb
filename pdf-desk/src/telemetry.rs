use std::sync::Once;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over
/// `default_directive` when set.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| anyhow!("Invalid log filter {:?}: {}", default_directive, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

static TEST_INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_test_tracing() {
    TEST_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,pdf_desk=debug,pdf_archive=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}
