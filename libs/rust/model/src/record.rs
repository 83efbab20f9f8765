use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Product key shared by the store, the trainer and the registry.
pub type EntityId = i64;

/// One sale, as persisted in the record store. Field names on the wire follow the
/// `date, product_id, quantity_sold` table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(rename = "date")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "product_id")]
    pub entity_id: EntityId,
    #[serde(rename = "quantity_sold")]
    pub quantity: u32,
}

impl SaleRecord {
    pub fn new(timestamp: NaiveDateTime, entity_id: EntityId, quantity: u32) -> Self {
        Self { timestamp, entity_id, quantity }
    }

    /// 1-based ordinal day within the record's calendar year.
    pub fn day_of_year(&self) -> u32 { self.timestamp.ordinal() }
}
