//! Sales records, per-product regression models and the registry artifact they are shipped in.
//!
//! The trainer turns a batch of [`SaleRecord`]s into a [`ModelRegistry`]; the registry is dumped to
//! a JSON artifact and loaded back by the serving side without any knowledge of how it was built.

pub mod record;
pub mod regression;
pub mod registry;
pub mod trainer;

pub use record::{EntityId, SaleRecord};
pub use regression::{FitError, InferenceError, LinearModel, Regressor};
pub use registry::{ModelRegistry, RegistryError, REGISTRY_FORMAT_VERSION};
pub use trainer::{train_registry, TrainError};
