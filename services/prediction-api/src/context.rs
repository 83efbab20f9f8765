//! Registry loading. Runs once at startup; the result is shared read-only by every handler.

use forecast_model::ModelRegistry;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum RegistryState {
    Loaded(ModelRegistry),
    /// Load failed at startup. Distinct from a loaded-but-empty registry.
    Unavailable { reason: String },
}

#[derive(Debug)]
pub struct PredictionContext {
    registry: RegistryState,
}

impl PredictionContext {
    /// Never fails: a missing or corrupt artifact leaves the service running in degraded mode.
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Self {
        match ModelRegistry::load(path, expected_sha256) {
            Ok(registry) => {
                info!(path = %path.display(), models = registry.len(), trained_at = ?registry.trained_at(), "prediction models loaded");
                Self::from_registry(registry)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "prediction models not loaded - running degraded");
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn from_registry(registry: ModelRegistry) -> Self { Self { registry: RegistryState::Loaded(registry) } }

    pub fn unavailable(reason: impl Into<String>) -> Self { Self { registry: RegistryState::Unavailable { reason: reason.into() } } }

    pub fn registry(&self) -> Option<&ModelRegistry> {
        match &self.registry {
            RegistryState::Loaded(r) => Some(r),
            RegistryState::Unavailable { .. } => None,
        }
    }

    pub fn state(&self) -> &RegistryState { &self.registry }
}
