//! driverup: provisions the WebDriver executable matching the locally
//! installed browser, then hands back a ready-to-use session handle.
//!
//! One linear pass per launch: detect the installed browser version, resolve
//! the matching driver release from the vendor endpoint, download and extract
//! the archive into a version-keyed directory (skipped when already present),
//! register the directory on `PATH`, and construct the session — locally
//! against a spawned driver server, or against a remote execution endpoint.

pub mod config;
pub mod detect;
pub mod error;
pub mod install;
pub mod provision;
pub mod release;
pub mod session;

pub use config::{load_config, Browser, ProvisionerConfig};
pub use error::{ProvisionError, Result};
pub use provision::Provisioner;
pub use session::BrowserSession;
