use crate::config::schema::{ProvisionerConfig, RawConfig};
use crate::error::{ProvisionError, Result};
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load and validate the provisioner configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProvisionerConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        ProvisionError::Config(format!("Failed to read config from {:?}: {}", path, e))
    })?;
    let raw: RawConfig = toml::from_str(&content)?;
    let config = raw.validate()?;
    tracing::info!("Loaded config from {:?}: browser={}", path, config.browser);
    Ok(config)
}
