use anyhow::Context;
use studio_config::StudioConfig;
use studio_kernel::StudioContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StudioConfig::from_env().context("invalid configuration")?;
    studio_telemetry::init_subscriber(config.log_filter(), config.log_file())?;

    let studio = StudioContext::live(config.clone()).context("failed to build providers")?;
    let registry = studio_ideas::registry(&studio)?;
    tracing::info!(tools = registry.len(), "idea server ready");

    studio_kernel::serve_stdio(studio_ideas::SERVER_INFO, &config, registry).await?;
    Ok(())
}
