//! Product → model mapping and its on-disk JSON artifact.

use crate::record::EntityId;
use crate::regression::LinearModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

pub const REGISTRY_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry artifact {path} not readable: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("registry artifact is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("unsupported registry format version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("registry digest mismatch expected={expected} got={actual}")]
    DigestMismatch { expected: String, actual: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelRegistry {
    models: BTreeMap<EntityId, LinearModel>,
    trained_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct Artifact {
    format_version: u32,
    trained_at: Option<DateTime<Utc>>,
    models: BTreeMap<EntityId, LinearModel>,
}

impl ModelRegistry {
    pub fn new(models: BTreeMap<EntityId, LinearModel>) -> Self { Self { models, trained_at: None } }

    pub fn with_trained_at(mut self, at: DateTime<Utc>) -> Self { self.trained_at = Some(at); self }

    /// Explicit present/absent lookup; a missing key never falls back to another model.
    pub fn get(&self, id: EntityId) -> Option<&LinearModel> { self.models.get(&id) }

    pub fn contains(&self, id: EntityId) -> bool { self.models.contains_key(&id) }
    pub fn len(&self) -> usize { self.models.len() }
    pub fn is_empty(&self) -> bool { self.models.is_empty() }
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ { self.models.keys().copied() }
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &LinearModel)> + '_ { self.models.iter().map(|(k, v)| (*k, v)) }
    pub fn trained_at(&self) -> Option<DateTime<Utc>> { self.trained_at }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, RegistryError> {
        let artifact = Artifact { format_version: REGISTRY_FORMAT_VERSION, trained_at: self.trained_at, models: self.models.clone() };
        Ok(serde_json::to_vec_pretty(&artifact)?)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, RegistryError> {
        let artifact: Artifact = serde_json::from_slice(bytes)?;
        if artifact.format_version != REGISTRY_FORMAT_VERSION {
            return Err(RegistryError::UnsupportedVersion { found: artifact.format_version });
        }
        Ok(Self { models: artifact.models, trained_at: artifact.trained_at })
    }

    /// Write the artifact next to `path` and rename it into place. Returns the hex SHA-256 of the
    /// bytes written.
    pub fn dump(&self, path: &Path) -> Result<String, RegistryError> {
        let bytes = self.to_json_bytes()?;
        let io_err = |source| RegistryError::Io { path: path.display().to_string(), source };
        let tmp = path.with_extension("json.tmp");
        {
            let mut f = std::fs::File::create(&tmp).map_err(io_err)?;
            f.write_all(&bytes).map_err(io_err)?;
            f.sync_all().map_err(io_err)?;
        }
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(sha256_hex(&bytes))
    }

    /// Read an artifact. When `expected_sha256` is set the file must hash to it.
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Result<Self, RegistryError> {
        let bytes = std::fs::read(path).map_err(|source| RegistryError::Io { path: path.display().to_string(), source })?;
        if let Some(expected) = expected_sha256.filter(|e| !e.is_empty()) {
            let actual = sha256_hex(&bytes);
            if !expected.eq_ignore_ascii_case(&actual) {
                return Err(RegistryError::DigestMismatch { expected: expected.to_string(), actual });
            }
        }
        Self::from_json_bytes(&bytes)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
