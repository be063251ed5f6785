use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::{ConfigError, FuelConfig, RouteTemplate, ShipConfig, load_records};

const BUNDLED_FUELS: &str = include_str!("../data/fuels.yaml");
const BUNDLED_SHIPS: &str = include_str!("../data/ships.yaml");
const BUNDLED_ROUTES: &str = include_str!("../data/routes.yaml");

/// A catalog record addressable by a stable key.
pub trait Keyed {
    /// Human-readable record kind used in error messages.
    const KIND: &'static str;

    fn key(&self) -> &str;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Keyed for FuelConfig {
    const KIND: &'static str = "fuel";

    fn key(&self) -> &str {
        &self.key
    }

    fn validate(&self) -> Result<(), ConfigError> {
        FuelConfig::validate(self)
    }
}

impl Keyed for ShipConfig {
    const KIND: &'static str = "ship type";

    fn key(&self) -> &str {
        &self.key
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ShipConfig::validate(self)
    }
}

impl Keyed for RouteTemplate {
    const KIND: &'static str = "route";

    fn key(&self) -> &str {
        &self.key
    }

    fn validate(&self) -> Result<(), ConfigError> {
        RouteTemplate::validate(self)
    }
}

/// Read-only keyed collection of validated records.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: BTreeMap<String, T>,
}

pub type FuelRegistry = Registry<FuelConfig>;
pub type ShipRegistry = Registry<ShipConfig>;
pub type RouteRegistry = Registry<RouteTemplate>;

impl<T: Keyed> Registry<T> {
    /// Validate records and index them by key; duplicate keys are rejected.
    pub fn from_records(records: Vec<T>) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for record in records {
            record.validate()?;
            let key = record.key().to_string();
            if entries.contains_key(&key) {
                return Err(ConfigError::DuplicateKey { kind: T::KIND, key });
            }
            entries.insert(key, record);
        }
        Ok(Self { entries })
    }

    /// Replace or add records by key.
    pub fn merge(&mut self, records: Vec<T>) -> Result<(), ConfigError> {
        for record in records {
            record.validate()?;
            self.entries.insert(record.key().to_string(), record);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    /// Like [`Registry::get`] but reports a missing key as an error.
    pub fn lookup(&self, key: &str) -> Result<&T, ConfigError> {
        self.entries.get(key).ok_or_else(|| ConfigError::Unknown {
            kind: T::KIND,
            key: key.to_string(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three catalogs a design run draws on.
#[derive(Debug, Clone)]
pub struct Registries {
    pub fuels: FuelRegistry,
    pub ships: ShipRegistry,
    pub routes: RouteRegistry,
}

impl Registries {
    /// Process-wide registries parsed from the bundled catalogs on first use.
    pub fn builtin() -> &'static Registries {
        static BUILTIN: OnceLock<Registries> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::parse_bundled().expect("bundled catalogs are valid"))
    }

    /// Parse the catalogs compiled into the crate.
    pub fn parse_bundled() -> Result<Self, ConfigError> {
        Ok(Self {
            fuels: Registry::from_records(serde_yaml::from_str(BUNDLED_FUELS)?)?,
            ships: Registry::from_records(serde_yaml::from_str(BUNDLED_SHIPS)?)?,
            routes: Registry::from_records(serde_yaml::from_str(BUNDLED_ROUTES)?)?,
        })
    }

    /// Bundled registries with user catalogs layered on top, record by record.
    pub fn with_overrides(
        fuels: Option<&Path>,
        ships: Option<&Path>,
        routes: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut registries = Self::builtin().clone();
        if let Some(path) = fuels {
            registries.fuels.merge(load_records(path)?)?;
        }
        if let Some(path) = ships {
            registries.ships.merge(load_records(path)?)?;
        }
        if let Some(path) = routes {
            registries.routes.merge(load_records(path)?)?;
        }
        Ok(registries)
    }
}
