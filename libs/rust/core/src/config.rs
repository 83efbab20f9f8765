//! Layered service configuration: defaults, optional file, then `FORECAST__*` env.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServiceConfig {
    pub service_name: String,
    pub log_level: String,
    pub listen_addr: String,
    pub registry_path: PathBuf,
    /// Hex SHA-256 the registry artifact must match, when set.
    pub registry_sha256: Option<String>,
    pub store_path: PathBuf,
    pub csv_path: PathBuf,
}

pub async fn load_config(service: &str) -> Result<ServiceConfig> {
    let file = std::env::var("FORECAST_CONFIG_FILE").ok();
    build_config(service, file.as_deref())
}

fn build_config(service: &str, file: Option<&str>) -> Result<ServiceConfig> {
    let mut builder = config::Config::builder()
        .set_default("service_name", service)?
        .set_default("log_level", "info")?
        .set_default("listen_addr", "0.0.0.0:5000")?
        .set_default("registry_path", "prediction_models.json")?
        .set_default("store_path", "data/inventory.sled")?
        .set_default("csv_path", "data/sales_data.csv")?;
    if let Some(file) = file {
        builder = builder.add_source(config::File::with_name(file).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("FORECAST").separator("__"));
    let cfg = builder.build().context("building configuration")?;
    let svc: ServiceConfig = cfg.try_deserialize().context("deserializing configuration")?;
    Ok(svc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_sources() {
        let cfg = build_config("prediction-api", None).unwrap();
        assert_eq!(cfg.service_name, "prediction-api");
        assert_eq!(cfg.registry_path, PathBuf::from("prediction_models.json"));
        assert!(cfg.registry_sha256.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(f, "listen_addr: \"127.0.0.1:8088\"\nregistry_path: /srv/models.json").unwrap();
        let cfg = build_config("prediction-api", f.path().to_str()).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:8088");
        assert_eq!(cfg.registry_path, PathBuf::from("/srv/models.json"));
        assert_eq!(cfg.log_level, "info");
    }
}
