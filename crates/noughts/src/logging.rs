//! Log subscriber setup for binaries embedding the server.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::NoughtsError;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"` or
/// `"noughts=debug,noughts_room=debug"`) is used. `json` switches to one
/// JSON object per event.
pub fn setup_logging(default_level: &str, json: bool) -> Result<(), NoughtsError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| NoughtsError::Logging(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_thread_ids(true))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()
    };
    result.map_err(|e| NoughtsError::Logging(e.to_string()))?;

    tracing::info!(level = default_level, json, "logging initialised");
    Ok(())
}
