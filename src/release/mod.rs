//! Per-browser driver release resolution: map an installed browser version
//! (or a fixed/latest release) to a concrete download URL and install layout.

use crate::config::Browser;
use crate::error::{ProvisionError, Result};
use std::path::{Path, PathBuf};

/// Vendor endpoints queried during resolution. Overridable for tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub chromedriver: String,
    pub geckodriver: String,
    pub edgedriver: String,
    pub selenium_release: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            chromedriver: "https://chromedriver.storage.googleapis.com".to_string(),
            geckodriver: "https://github.com/mozilla/geckodriver/releases".to_string(),
            edgedriver: "https://msedgedriver.azureedge.net".to_string(),
            selenium_release: "https://selenium-release.storage.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Windows,
    MacOs,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X64,
}

/// Host platform as the vendor endpoints see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn current() -> Self {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Linux
        };
        let arch = if cfg!(target_pointer_width = "32") {
            Arch::X86
        } else {
            Arch::X64
        };
        Platform { os, arch }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

/// A resolved driver release: everything `ensure_installed` needs to place
/// the executable at `<root>/<browser>/<version>/<driver binary>`.
#[derive(Debug, Clone)]
pub struct DriverRelease {
    pub browser: Browser,
    pub version: String,
    pub download_url: String,
    pub archive: ArchiveFormat,
    pub platform: Platform,
}

impl DriverRelease {
    pub fn install_dir(&self, root: &Path) -> PathBuf {
        root.join(self.browser.as_str()).join(&self.version)
    }

    /// Name of the driver binary inside the extracted archive.
    pub fn executable_name(&self) -> &'static str {
        driver_executable_name(self.browser, self.platform.os)
    }

    /// Transient archive file written next to the per-browser directories.
    pub fn archive_file_name(&self) -> String {
        format!("{}.{}", driver_stem(self.browser), self.archive.extension())
    }
}

fn driver_stem(browser: Browser) -> &'static str {
    match browser {
        Browser::Chrome => "chromedriver",
        Browser::Firefox => "geckodriver",
        Browser::Edge => "msedgedriver",
        Browser::Ie => "IEDriverServer",
        Browser::Safari => "safaridriver",
    }
}

pub fn driver_executable_name(browser: Browser, os: Os) -> &'static str {
    match (browser, os) {
        (Browser::Chrome, Os::Windows) => "chromedriver.exe",
        (Browser::Chrome, _) => "chromedriver",
        (Browser::Firefox, Os::Windows) => "geckodriver.exe",
        (Browser::Firefox, _) => "geckodriver",
        (Browser::Edge, Os::Windows) => "msedgedriver.exe",
        (Browser::Edge, _) => "msedgedriver",
        // The IE driver only ships as a Windows executable.
        (Browser::Ie, _) => "IEDriverServer.exe",
        (Browser::Safari, _) => "safaridriver",
    }
}

/// Leading dot-separated component of a browser version, e.g.
/// "114.0.5735.198" -> "114".
pub fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

fn chrome_platform_suffix(platform: Platform) -> &'static str {
    match platform.os {
        Os::Windows => "win32",
        Os::MacOs => "mac64",
        Os::Linux => "linux64",
    }
}

pub fn chrome_download_url(api: &str, version: &str, platform: Platform) -> String {
    format!(
        "{}/{}/chromedriver_{}.zip",
        api,
        version,
        chrome_platform_suffix(platform)
    )
}

fn firefox_asset_suffix(platform: Platform) -> (&'static str, ArchiveFormat) {
    match (platform.os, platform.arch) {
        (Os::Windows, Arch::X86) => ("win32.zip", ArchiveFormat::Zip),
        (Os::Windows, Arch::X64) => ("win64.zip", ArchiveFormat::Zip),
        (Os::MacOs, _) => ("macos.tar.gz", ArchiveFormat::TarGz),
        (Os::Linux, Arch::X86) => ("linux32.tar.gz", ArchiveFormat::TarGz),
        (Os::Linux, Arch::X64) => ("linux64.tar.gz", ArchiveFormat::TarGz),
    }
}

pub fn firefox_download_url(api: &str, tag: &str, platform: Platform) -> (String, ArchiveFormat) {
    let (suffix, archive) = firefox_asset_suffix(platform);
    (
        format!("{}/download/{}/geckodriver-{}-{}", api, tag, tag, suffix),
        archive,
    )
}

fn edge_platform_suffix(platform: Platform) -> &'static str {
    match (platform.os, platform.arch) {
        (Os::Windows, Arch::X64) => "win64",
        (Os::Windows, Arch::X86) => "win32",
        (Os::MacOs, _) => "mac64",
        (Os::Linux, _) => "linux64",
    }
}

pub fn edge_download_url(api: &str, version: &str, platform: Platform) -> String {
    format!(
        "{}/{}/edgedriver_{}.zip",
        api,
        version,
        edge_platform_suffix(platform)
    )
}

/// The IE driver has no version coupling; a fixed release is used.
pub const IE_DRIVER_VERSION: &str = "3.150.1";

pub fn ie_download_url(api: &str) -> String {
    format!("{}/3.150/IEDriverServer_Win32_{}.zip", api, IE_DRIVER_VERSION)
}

/// Resolve the chromedriver release matching the installed Chrome version:
/// the `LATEST_RELEASE_<major>` endpoint returns the release tag verbatim.
pub async fn resolve_chrome(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    installed_version: &str,
    platform: Platform,
) -> Result<DriverRelease> {
    let url = format!(
        "{}/LATEST_RELEASE_{}",
        endpoints.chromedriver,
        major_version(installed_version)
    );
    let version = client
        .get(&url)
        .send()
        .await
        .map_err(|e| ProvisionError::Resolution(format!("chromedriver release query: {}", e)))?
        .error_for_status()
        .map_err(|e| ProvisionError::Resolution(format!("chromedriver release query: {}", e)))?
        .text()
        .await
        .map_err(|e| ProvisionError::Resolution(format!("chromedriver release body: {}", e)))?
        .trim()
        .to_string();
    tracing::info!("Latest chromedriver version: {}", version);
    Ok(DriverRelease {
        browser: Browser::Chrome,
        download_url: chrome_download_url(&endpoints.chromedriver, &version, platform),
        version,
        archive: ArchiveFormat::Zip,
        platform,
    })
}

/// Resolve the latest geckodriver release by following the vendor's
/// latest-release redirect; the tag is the last path segment of the final URL.
pub async fn resolve_firefox(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    platform: Platform,
) -> Result<DriverRelease> {
    let response = client
        .get(format!("{}/latest", endpoints.geckodriver))
        .send()
        .await
        .map_err(|e| ProvisionError::Resolution(format!("geckodriver latest query: {}", e)))?;
    let tag = version_from_redirect(response.url().as_str()).ok_or_else(|| {
        ProvisionError::Resolution(format!(
            "geckodriver latest redirect has no tag segment: {}",
            response.url()
        ))
    })?;
    tracing::info!("Latest geckodriver version: {}", tag);
    let (download_url, archive) = firefox_download_url(&endpoints.geckodriver, &tag, platform);
    Ok(DriverRelease {
        browser: Browser::Firefox,
        version: tag,
        download_url,
        archive,
        platform,
    })
}

/// Last non-empty path segment of the resolved latest-release URL.
pub fn version_from_redirect(url: &str) -> Option<String> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Edge driver versions track browser versions 1:1; no endpoint query needed.
pub fn resolve_edge(
    endpoints: &Endpoints,
    installed_version: &str,
    platform: Platform,
) -> DriverRelease {
    DriverRelease {
        browser: Browser::Edge,
        version: installed_version.to_string(),
        download_url: edge_download_url(&endpoints.edgedriver, installed_version, platform),
        archive: ArchiveFormat::Zip,
        platform,
    }
}

pub fn resolve_ie(endpoints: &Endpoints, platform: Platform) -> DriverRelease {
    DriverRelease {
        browser: Browser::Ie,
        version: IE_DRIVER_VERSION.to_string(),
        download_url: ie_download_url(&endpoints.selenium_release),
        archive: ArchiveFormat::Zip,
        platform,
    }
}
