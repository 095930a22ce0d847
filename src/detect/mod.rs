//! Installed browser version detection. Only Chrome and Edge couple their
//! driver releases to the installed browser version; the other browsers are
//! resolved independently.

use crate::config::Browser;
use crate::error::{ProvisionError, Result};
use std::process::Command;

const CHROME_REG_KEY: &str = r"HKEY_CURRENT_USER\Software\Google\Chrome\BLBeacon";
const EDGE_REG_KEY: &str = r"HKEY_CURRENT_USER\Software\Microsoft\Edge\BLBeacon";

const CHROME_MAC_BINARY: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";
const EDGE_MAC_BINARY: &str = "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge";

const CHROME_LINUX_BINARY: &str = "google-chrome";
const EDGE_LINUX_BINARY: &str = "microsoft-edge";

/// Query the OS for the installed browser version: a registry read on
/// Windows, a direct `--version` invocation elsewhere.
pub fn installed_browser_version(browser: Browser) -> Result<String> {
    let version = if cfg!(target_os = "windows") {
        let key = match browser {
            Browser::Chrome => CHROME_REG_KEY,
            Browser::Edge => EDGE_REG_KEY,
            other => {
                return Err(ProvisionError::Detection(format!(
                    "no version detection defined for {}",
                    other
                )))
            }
        };
        let output = run_command("reg", &["query", key, "/v", "version"])?;
        version_from_reg_output(&output).ok_or_else(|| {
            ProvisionError::Detection(format!("no version value in registry output: {}", output))
        })?
    } else {
        let binary = match (browser, cfg!(target_os = "macos")) {
            (Browser::Chrome, true) => CHROME_MAC_BINARY,
            (Browser::Chrome, false) => CHROME_LINUX_BINARY,
            (Browser::Edge, true) => EDGE_MAC_BINARY,
            (Browser::Edge, false) => EDGE_LINUX_BINARY,
            (other, _) => {
                return Err(ProvisionError::Detection(format!(
                    "no version detection defined for {}",
                    other
                )))
            }
        };
        let output = run_command(binary, &["--version"])?;
        version_from_banner(&output).ok_or_else(|| {
            ProvisionError::Detection(format!("no version token in output: {}", output))
        })?
    };
    tracing::info!("Installed {} browser version: {}", browser, version);
    Ok(version)
}

fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| ProvisionError::Detection(format!("{} failed to run: {}", program, e)))?;
    if !output.status.success() {
        return Err(ProvisionError::Detection(format!(
            "{} exited with {}",
            program, output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Pull the version value out of `reg query` output. The matching line looks
/// like `    version    REG_SZ    114.0.5735.198`.
pub fn version_from_reg_output(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains("REG_SZ"))
        .and_then(|line| line.split_whitespace().last())
        .map(|s| s.to_string())
}

/// Pull the version token out of a `--version` banner such as
/// `Google Chrome 114.0.5735.198`: the first whitespace-separated token made
/// of digits and dots.
pub fn version_from_banner(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|token| {
            token.contains('.')
                && token.chars().all(|c| c.is_ascii_digit() || c == '.')
                && token.starts_with(|c: char| c.is_ascii_digit())
        })
        .map(|s| s.to_string())
}
