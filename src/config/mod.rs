pub mod persist;
mod runtime;
mod types;

pub use runtime::{RuntimeSettings, SettingsUpdate, SharedSettings};
pub use types::*;

use anyhow::{Context, Result};
use mediabot_common::Service;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./mediabot.toml",
        "~/.config/mediabot/config.toml",
        "/etc/mediabot/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.cache.ttl_secs == 0 {
        anyhow::bail!("Cache TTL cannot be 0");
    }

    for service in Service::ALL {
        let settings = config.services.resolve(service);
        if settings.budget == 0 {
            anyhow::bail!("Service '{}' has a zero request budget", service);
        }
        if settings.window.is_zero() {
            anyhow::bail!("Service '{}' has a zero rate window", service);
        }
    }

    if config.bot.enabled {
        let configured = Service::ALL
            .iter()
            .filter(|s| config.services.resolve(**s).api_key.is_some())
            .count();
        if configured == 0 {
            anyhow::bail!("Bot is enabled but no catalog service has an API key");
        }
        for service in Service::ALL {
            if config.services.resolve(service).api_key.is_none() {
                tracing::warn!(
                    service = %service,
                    "No API key configured; {} lookups will fail",
                    service.media_type()
                );
            }
        }
    }

    if config.forum.api_key.is_none() {
        tracing::warn!("No forum API key configured; replies cannot be posted");
    }

    Ok(())
}
