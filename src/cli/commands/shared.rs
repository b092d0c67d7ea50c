//! Shared helpers for CLI commands

use crate::error::Result;

/// Set up structured logging for a command.
///
/// Honors `RUST_LOG` when set, otherwise filters this crate to the
/// level derived from the command's verbosity flags.
pub fn setup_logging(log_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hl7v2_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}
