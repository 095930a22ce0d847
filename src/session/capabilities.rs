use crate::config::Browser;
use crate::error::{ProvisionError, Result};
use thirtyfour::common::capabilities::desiredcapabilities::Capabilities;
use thirtyfour::DesiredCapabilities;

/// Capability template for a locally provisioned browser.
pub fn local_capabilities(browser: Browser) -> Capabilities {
    match browser {
        Browser::Chrome => DesiredCapabilities::chrome().into(),
        Browser::Firefox => DesiredCapabilities::firefox().into(),
        Browser::Edge => DesiredCapabilities::edge().into(),
        Browser::Ie => ie_capabilities(),
        Browser::Safari => DesiredCapabilities::safari().into(),
    }
}

/// Capability template for remote execution. Only chrome and firefox have
/// templates; any other browser in remote mode is an explicit failure.
pub fn remote_capabilities(browser: Browser) -> Result<Capabilities> {
    match browser {
        Browser::Chrome => Ok(DesiredCapabilities::chrome().into()),
        Browser::Firefox => Ok(DesiredCapabilities::firefox().into()),
        other => Err(ProvisionError::Config(format!(
            "no remote capability template for browser: {}",
            other
        ))),
    }
}

/// IE sessions carry four fixed compatibility options.
fn ie_capabilities() -> Capabilities {
    let mut caps: Capabilities = DesiredCapabilities::internet_explorer().into();
    caps.insert(
        "se:ieOptions".to_string(),
        serde_json::json!({
            "ignoreProtectedModeSettings": true,
            "ie.ensureCleanSession": true,
            "requireWindowFocus": true,
            "ignoreZoomSetting": true,
        }),
    );
    caps
}
