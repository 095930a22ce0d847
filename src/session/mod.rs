//! WebDriver session construction: spawn a driver server for local mode or
//! connect to a remote execution endpoint, and hand back the live handle.

pub mod capabilities;
pub mod port;

pub use capabilities::{local_capabilities, remote_capabilities};
pub use port::allocate_driver_port;

use crate::config::Browser;
use crate::error::Result;
use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;
use thirtyfour::common::capabilities::desiredcapabilities::Capabilities;
use thirtyfour::WebDriver;

/// A live browser automation session. For local mode it owns the spawned
/// driver server process, which is killed when the session is quit.
#[derive(Debug)]
pub struct BrowserSession {
    driver: WebDriver,
    endpoint: String,
    server: Option<Child>,
}

impl BrowserSession {
    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Quit the WebDriver session and stop the local driver server, if any.
    pub async fn quit(self) -> Result<()> {
        let BrowserSession {
            driver, mut server, ..
        } = self;
        let quit_result = driver.quit().await;
        if let Some(child) = server.as_mut() {
            child.kill().ok();
            child.wait().ok();
        }
        quit_result?;
        Ok(())
    }
}

/// Build the driver-server launch command with its port argument.
pub fn driver_command(browser: Browser, exe: &Path, port: u16) -> Command {
    let mut cmd = Command::new(exe);
    match browser {
        Browser::Chrome | Browser::Edge => {
            cmd.arg(format!("--port={}", port));
        }
        Browser::Firefox => {
            cmd.arg("--port").arg(port.to_string());
        }
        Browser::Ie => {
            cmd.arg(format!("/port={}", port));
        }
        Browser::Safari => {
            cmd.arg("-p").arg(port.to_string());
        }
    }
    cmd
}

/// Spawn the driver server and connect a session to it.
pub async fn start_local(browser: Browser, exe: &Path) -> Result<BrowserSession> {
    let port = allocate_driver_port();
    let mut server = driver_command(browser, exe, port).spawn()?;
    let endpoint = format!("http://localhost:{}", port);
    tracing::info!("Started {} driver server at {}", browser, endpoint);

    match connect_local(browser, &endpoint).await {
        Ok(mut session) => {
            session.server = Some(server);
            Ok(session)
        }
        Err(err) => {
            server.kill().ok();
            server.wait().ok();
            Err(err)
        }
    }
}

/// Connect a local-mode session to a driver server listening at `endpoint`.
/// The server needs a moment to start listening after spawn, so connection
/// attempts are retried briefly.
pub async fn connect_local(browser: Browser, endpoint: &str) -> Result<BrowserSession> {
    let caps = local_capabilities(browser);
    let driver = connect(endpoint, caps, 10).await?;
    Ok(BrowserSession {
        driver,
        endpoint: endpoint.to_string(),
        server: None,
    })
}

/// Connect a session to a remote execution endpoint.
pub async fn start_remote(browser: Browser, url: &str) -> Result<BrowserSession> {
    let caps = remote_capabilities(browser)?;
    let driver = connect(url, caps, 0).await?;
    tracing::info!("Connected {} session to remote endpoint {}", browser, url);
    Ok(BrowserSession {
        driver,
        endpoint: url.to_string(),
        server: None,
    })
}

async fn connect(server_url: &str, caps: Capabilities, max_retries: u32) -> Result<WebDriver> {
    let mut attempts = 0;
    loop {
        match WebDriver::new(server_url, caps.clone()).await {
            Ok(driver) => return Ok(driver),
            Err(err) => {
                attempts += 1;
                if attempts > max_retries {
                    return Err(err.into());
                }
                tracing::warn!("WebDriver connection not ready: {:?}", err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }
}
