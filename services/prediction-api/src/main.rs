use anyhow::Result;
use forecast_core::{init_tracing, load_config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = load_config("prediction-api").await?;
    init_tracing(&cfg.service_name, &cfg.log_level)?;
    info!(?cfg, "config loaded");
    prediction_api::run(cfg).await
}
