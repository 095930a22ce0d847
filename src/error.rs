use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported browser name: {0}")]
    UnsupportedBrowser(String),

    #[error("Missing configuration field: {0}")]
    MissingField(&'static str),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Browser version detection failed: {0}")]
    Detection(String),

    #[error("Driver release resolution failed: {0}")]
    Resolution(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("WebDriver session error: {0}")]
    Session(#[from] thirtyfour::error::WebDriverError),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
