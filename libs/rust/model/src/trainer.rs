//! Batch training: one least-squares model per product, day-of-year → quantity.

use crate::record::{EntityId, SaleRecord};
use crate::regression::{FitError, LinearModel};
use crate::registry::ModelRegistry;
use chrono::Utc;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum TrainError {
    #[error("fitting model for product {entity_id}: {source}")]
    Fit { entity_id: EntityId, #[source] source: FitError },
}

/// Registry keys are exactly the distinct `entity_id`s present in `records`. No records yields an
/// empty registry, which still loads as "no models trained yet".
pub fn train_registry(records: &[SaleRecord]) -> Result<ModelRegistry, TrainError> {
    if records.is_empty() { warn!("no sales records to train on, registry will be empty"); }
    let mut grouped: BTreeMap<EntityId, Vec<(f64, f64)>> = BTreeMap::new();
    for r in records {
        grouped.entry(r.entity_id).or_default().push((f64::from(r.day_of_year()), f64::from(r.quantity)));
    }
    info!(products = grouped.len(), records = records.len(), "training one model per product");
    let mut models = BTreeMap::new();
    for (entity_id, samples) in grouped {
        let model = LinearModel::fit(&samples).map_err(|source| TrainError::Fit { entity_id, source })?;
        debug!(entity_id, coefficient = model.coefficient, intercept = model.intercept, samples = model.samples, "model trained");
        models.insert(entity_id, model);
    }
    Ok(ModelRegistry::new(models).with_trained_at(Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::Regressor;
    use chrono::{Duration, NaiveDate};

    fn rec(day_offset: i64, id: EntityId, qty: u32) -> SaleRecord {
        let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        SaleRecord::new(base + Duration::days(day_offset), id, qty)
    }

    #[test]
    fn one_model_per_distinct_product() {
        let records = vec![rec(0, 101, 10), rec(1, 101, 12), rec(0, 102, 40), rec(5, 103, 7), rec(9, 101, 30)];
        let reg = train_registry(&records).unwrap();
        assert_eq!(reg.entity_ids().collect::<Vec<_>>(), vec![101, 102, 103]);
        assert_eq!(reg.get(102).unwrap().samples, 1);
        assert!(reg.trained_at().is_some());
    }

    #[test]
    fn uses_day_of_year_as_feature() {
        // day 1 -> 5, day 2 -> 7, day 3 -> 9
        let reg = train_registry(&[rec(0, 7, 5), rec(1, 7, 7), rec(2, 7, 9)]).unwrap();
        let m = reg.get(7).unwrap();
        assert!((m.predict(4.0).unwrap() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn same_records_train_same_models() {
        let records = vec![rec(3, 101, 10), rec(30, 101, 22), rec(90, 101, 17)];
        let a = train_registry(&records).unwrap();
        let b = train_registry(&records).unwrap();
        assert_eq!(a.get(101), b.get(101));
    }

    #[test]
    fn empty_input_gives_empty_registry() {
        let reg = train_registry(&[]).unwrap();
        assert!(reg.is_empty());
        assert!(reg.trained_at().is_some());
    }
}
