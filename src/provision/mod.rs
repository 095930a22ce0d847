//! Orchestration: one linear pass per launch — detect, resolve, install,
//! register on the search path, construct the session.

use crate::config::{Browser, ProvisionerConfig};
use crate::detect;
use crate::error::{ProvisionError, Result};
use crate::install;
use crate::release::{self, DriverRelease, Endpoints, Platform};
use crate::session::{self, BrowserSession};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub struct Provisioner {
    client: reqwest::Client,
    endpoints: Endpoints,
    driver_root: PathBuf,
    platform: Platform,
}

impl Provisioner {
    pub fn new() -> Result<Self> {
        Self::with_options(
            Endpoints::default(),
            PathBuf::from(install::DRIVER_ROOT),
            Platform::current(),
        )
    }

    pub fn with_options(
        endpoints: Endpoints,
        driver_root: PathBuf,
        platform: Platform,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| ProvisionError::Download(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoints,
            driver_root,
            platform,
        })
    }

    pub fn driver_root(&self) -> &Path {
        &self.driver_root
    }

    /// Resolve the driver release for a local-mode browser. Safari resolves
    /// to `None`: the platform ships its own driver.
    pub async fn resolve(&self, browser: Browser) -> Result<Option<DriverRelease>> {
        match browser {
            Browser::Chrome => {
                let installed = detect::installed_browser_version(Browser::Chrome)?;
                let release = release::resolve_chrome(
                    &self.client,
                    &self.endpoints,
                    &installed,
                    self.platform,
                )
                .await?;
                Ok(Some(release))
            }
            Browser::Firefox => {
                let release =
                    release::resolve_firefox(&self.client, &self.endpoints, self.platform).await?;
                Ok(Some(release))
            }
            Browser::Edge => {
                let installed = detect::installed_browser_version(Browser::Edge)?;
                Ok(Some(release::resolve_edge(
                    &self.endpoints,
                    &installed,
                    self.platform,
                )))
            }
            Browser::Ie => Ok(Some(release::resolve_ie(&self.endpoints, self.platform))),
            Browser::Safari => Ok(None),
        }
    }

    /// Install the resolved release (no-op when the version is already on
    /// disk) and register its directory on the executable search path.
    pub async fn install(&self, release: &DriverRelease) -> Result<PathBuf> {
        let exe = install::ensure_installed(&self.client, release, &self.driver_root).await?;
        install::register_on_search_path(&release.install_dir(&self.driver_root))?;
        Ok(exe)
    }

    /// Provision the selected browser and hand back a live session.
    pub async fn launch(&self, config: &ProvisionerConfig) -> Result<BrowserSession> {
        if !config.local {
            let url = config
                .remote_url
                .as_deref()
                .ok_or(ProvisionError::MissingField("automation.url"))?;
            return session::start_remote(config.browser, url).await;
        }

        match self.resolve(config.browser).await? {
            Some(release) => {
                let exe = self.install(&release).await?;
                session::start_local(config.browser, &exe).await
            }
            // Safari: no provisioning, the system safaridriver is used.
            None => session::start_local(Browser::Safari, Path::new("safaridriver")).await,
        }
    }
}
