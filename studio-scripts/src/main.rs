use anyhow::Context;
use studio_config::StudioConfig;
use studio_kernel::StudioContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StudioConfig::from_env().context("invalid configuration")?;
    studio_telemetry::init_subscriber(config.log_filter(), config.log_file())?;

    let studio = StudioContext::live(config.clone()).context("failed to build providers")?;
    let registry = studio_scripts::registry(&studio)?;
    tracing::info!(tools = registry.len(), "script server ready");

    studio_kernel::serve_stdio(studio_scripts::SERVER_INFO, &config, registry).await?;
    Ok(())
}
