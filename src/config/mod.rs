mod types;

pub use types::*;

use anyhow::{Context, Result};
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
        "./streamgate.toml",
        "~/.config/streamgate/config.toml",
        "/etc/streamgate/config.toml",
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
    if config.service.url.trim().is_empty() {
        anyhow::bail!("Authorization service URL cannot be empty");
    }

    reqwest::Url::parse(&config.service.url)
        .with_context(|| format!("Invalid authorization service URL: {}", config.service.url))?;

    if config.validation.interval_ms == 0 {
        anyhow::bail!("Validation interval cannot be 0");
    }

    if config.validation.claim.is_empty() {
        anyhow::bail!("Validation claim cannot be empty");
    }

    if config.validation.claim != ACCESS_VIDEO_CLAIM {
        tracing::warn!(
            "Validation claim '{}' differs from '{}'; the authorization service may reject it",
            config.validation.claim,
            ACCESS_VIDEO_CLAIM
        );
    }

    if !config.media.resource_path.starts_with('/') {
        anyhow::bail!(
            "Media resource path must start with '/': {}",
            config.media.resource_path
        );
    }

    if config.origin.param.is_empty() {
        anyhow::bail!("Origin location parameter cannot be empty");
    }

    Ok(())
}
