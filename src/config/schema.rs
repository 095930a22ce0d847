use crate::error::{ProvisionError, Result};
use serde::Deserialize;
use std::fmt;

/// The fixed set of browsers the provisioner knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
    Ie,
    Safari,
}

impl Browser {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "edge" => Ok(Browser::Edge),
            "ie" => Ok(Browser::Ie),
            "safari" => Ok(Browser::Safari),
            other => Err(ProvisionError::UnsupportedBrowser(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
            Browser::Ie => "ie",
            Browser::Safari => "safari",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated provisioner configuration. Loaded once, immutable after load.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub browser: Browser,
    pub local: bool,
    pub remote_url: Option<String>,
}

/// Raw on-disk shape of `config.toml`.
///
/// ```toml
/// [automation]
/// browser = "chrome"
/// local = "yes"
/// url = "http://grid:4444"
/// ```
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub automation: AutomationSection,
}

#[derive(Debug, Deserialize)]
pub struct AutomationSection {
    pub browser: String,
    pub local: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// The `local` key is a boolean-like string: true / y / yes mean local.
pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "y" | "yes")
}

impl RawConfig {
    pub fn validate(self) -> Result<ProvisionerConfig> {
        let browser = Browser::parse(&self.automation.browser)?;
        let local = is_truthy(&self.automation.local);
        if !local && self.automation.url.is_none() {
            return Err(ProvisionError::MissingField("automation.url"));
        }
        Ok(ProvisionerConfig {
            browser,
            local,
            remote_url: if local { None } else { self.automation.url },
        })
    }
}
