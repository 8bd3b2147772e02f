//! Initialisation du logging `tracing`

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Filtre : `RUST_LOG` s'il est défini, sinon `log.min_level` de la configuration
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.get_log_min_level().to_lowercase()))
}

/// Installe un subscriber console.
///
/// Renvoie `false` si un subscriber global était déjà installé.
pub fn init_logging(config: &Config) -> bool {
    Registry::default()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .is_ok()
}
