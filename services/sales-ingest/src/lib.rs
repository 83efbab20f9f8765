//! Record producers: flat-file bootstrap and synthetic sale generation.

use anyhow::{Context, Result};
use forecast_model::SaleRecord;
use forecast_store::{read_csv, synthetic_sale, SalesStore};
use std::path::Path;
use tracing::info;

/// Replace the sales table with the contents of `csv`. Nothing is written when the file
/// cannot be read or parsed.
pub fn bootstrap(store: &SalesStore, csv: &Path) -> Result<usize> {
    let records = read_csv(csv).with_context(|| format!("loading {}", csv.display()))?;
    info!(path = %csv.display(), rows = records.len(), "sales csv loaded");
    let count = store.replace_all(&records).context("populating sales table")?;
    info!(count, "sales table populated");
    Ok(count)
}

/// Append one random sale stamped with the local wall clock.
pub fn add_sale(store: &SalesStore) -> Result<SaleRecord> {
    let now = chrono::Local::now().naive_local();
    let sale = synthetic_sale(&mut rand::thread_rng(), now);
    store.append(&sale).context("appending sale")?;
    info!(entity_id = sale.entity_id, quantity = sale.quantity, date = %sale.timestamp, "added new sale");
    Ok(sale)
}
