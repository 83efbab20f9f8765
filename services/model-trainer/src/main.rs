use anyhow::Result;
use forecast_core::{init_tracing, load_config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = load_config("model-trainer").await?;
    init_tracing(&cfg.service_name, &cfg.log_level)?;
    info!(?cfg, "config loaded");
    let report = model_trainer::run(&cfg)?;
    info!(records = report.records, models = report.models, sha256 = %report.sha256, "training complete");
    Ok(())
}
