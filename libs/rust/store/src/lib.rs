//! Append-only sales table backed by sled, plus the producers that fill it.

use forecast_model::SaleRecord;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub mod csv_import;
pub mod synthetic;

pub use csv_import::{parse_timestamp, read_csv};
pub use synthetic::{synthetic_sale, SYNTHETIC_PRODUCTS};

const SALES_TREE: &str = "sales";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled: {0}")]
    Db(#[from] sled::Error),
    #[error("record encoding: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("reading {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("{path}:{line}: {reason}")]
    Csv { path: String, line: usize, reason: String },
}

#[derive(Clone)]
pub struct SalesStore {
    db: sled::Db,
    sales: sled::Tree,
}

impl SalesStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        info!(path = %path.display(), "sales store opened");
        Self::from_db(db)
    }

    /// In-memory store that is discarded on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let sales = db.open_tree(SALES_TREE)?;
        Ok(Self { db, sales })
    }

    pub fn append(&self, record: &SaleRecord) -> Result<(), StoreError> {
        self.insert(record)?;
        self.sales.flush()?;
        debug!(entity_id = record.entity_id, quantity = record.quantity, "sale appended");
        Ok(())
    }

    /// Drop every stored row and insert `records` in order, atomically: on error the previous
    /// rows are left as they were.
    pub fn replace_all(&self, records: &[SaleRecord]) -> Result<usize, StoreError> {
        self.replace_encoded(records.iter().map(|r| -> Result<Vec<u8>, StoreError> { Ok(serde_json::to_vec(r)?) }))
    }

    fn replace_encoded<I>(&self, rows: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = Result<Vec<u8>, StoreError>>,
    {
        let mut batch = sled::Batch::default();
        for key in self.sales.iter().keys() { batch.remove(key?); }
        for row in rows {
            let row = row?;
            batch.insert(&self.next_key()?[..], row);
        }
        self.sales.apply_batch(batch)?;
        self.sales.flush()?;
        Ok(self.sales.len())
    }

    /// All records in insertion order.
    pub fn records(&self) -> Result<Vec<SaleRecord>, StoreError> {
        self.sales
            .iter()
            .values()
            .map(|v| -> Result<SaleRecord, StoreError> { Ok(serde_json::from_slice(&v?)?) })
            .collect()
    }

    pub fn len(&self) -> usize { self.sales.len() }
    pub fn is_empty(&self) -> bool { self.sales.is_empty() }

    fn insert(&self, record: &SaleRecord) -> Result<(), StoreError> {
        self.sales.insert(self.next_key()?, serde_json::to_vec(record)?)?;
        Ok(())
    }

    // generate_id is monotonic, big-endian keeps iteration in insertion order
    fn next_key(&self) -> Result<[u8; 8], StoreError> { Ok(self.db.generate_id()?.to_be_bytes()) }
}
