use std::path::Path;

use driverup::{config, Provisioner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = config::load_config(Path::new(config::CONFIG_FILE))?;
    let provisioner = Provisioner::new()?;

    let session = provisioner.launch(&config).await?;
    tracing::info!(
        "Browser session ready: {} at {}",
        config.browser,
        session.endpoint()
    );

    session.quit().await?;
    Ok(())
}
