//! Batch job: read every sale from the store, fit one model per product, write the registry artifact.

use anyhow::{Context, Result};
use forecast_core::ServiceConfig;
use forecast_model::{train_registry, ModelRegistry};
use forecast_store::SalesStore;
use std::path::Path;
use tracing::info;

pub struct TrainingReport {
    pub records: usize,
    pub models: usize,
    pub sha256: String,
}

pub fn run(cfg: &ServiceConfig) -> Result<TrainingReport> {
    let store = SalesStore::open(&cfg.store_path)
        .with_context(|| format!("opening sales store {}; run `sales-ingest bootstrap` first", cfg.store_path.display()))?;
    train_from_store(&store, &cfg.registry_path)
}

pub fn train_from_store(store: &SalesStore, artifact: &Path) -> Result<TrainingReport> {
    let records = store.records().context("reading sales records")?;
    info!(records = records.len(), "sales data loaded");
    let registry = train_registry(&records)?;
    log_models(&registry);
    let sha256 = registry.dump(artifact).with_context(|| format!("writing {}", artifact.display()))?;
    info!(path = %artifact.display(), models = registry.len(), %sha256, "registry artifact written");
    Ok(TrainingReport { records: records.len(), models: registry.len(), sha256 })
}

fn log_models(registry: &ModelRegistry) {
    for (entity_id, model) in registry.iter() {
        info!(entity_id, coefficient = model.coefficient, intercept = model.intercept, samples = model.samples, "model trained");
    }
}
