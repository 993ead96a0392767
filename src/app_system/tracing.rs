use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ReconcilerConfig};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Calling it again is harmless; only the first subscriber is kept.
pub fn setup_tracing(config: &ReconcilerConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    let result = match config.log_format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = result {
        ::tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
