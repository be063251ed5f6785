//! Catalog models and loaders for the Ship Design Calculator.
//!
//! Fuel technologies, ship types and port-to-port routes are kept in keyed,
//! read-only registries. The bundled catalogs under `data/` are compiled into
//! the crate; callers may layer their own YAML or TOML records on top.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

mod fuel;
mod registry;
mod route;
mod ship;

pub use fuel::{EnergyStorage, FuelConfig, NuclearConfig};
pub use registry::{FuelRegistry, Keyed, Registries, Registry, RouteRegistry, ShipRegistry};
pub use route::RouteTemplate;
pub use ship::{
    BlockCoefficientRegression, CiiReference, EediReference, ExpansionLimits, FreeboardType,
    Proportions, SeedRegression, ShipConfig, VolumeCoefficients, WeightCoefficients,
};

/// Errors that can occur while loading or querying catalogs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid catalog entry `{key}`: {reason}")]
    Invalid { key: String, reason: String },
    #[error("duplicate {kind} key `{key}`")]
    DuplicateKey { kind: &'static str, key: String },
    #[error("unknown {kind} `{key}`")]
    Unknown { kind: &'static str, key: String },
}

/// Load a list of records from a YAML file, a single TOML file, or a directory of TOML files.
pub fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Load a single document (YAML or TOML, chosen by extension).
pub fn load_document<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

pub(crate) fn ensure(key: &str, ok: bool, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    }
}

pub(crate) fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
