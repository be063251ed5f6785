//! Scenario files for the command-line tools.

use std::path::{Path, PathBuf};

use shipdes_config::{ConfigError, Registries, load_document};
use shipdes_design::{DesignTarget, SweepRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to load `{path}`: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("failed to load catalogs: {0}")]
    Catalog(#[from] ConfigError),
}

/// Catalog files layered over the bundled registries.
#[derive(Debug, Clone, Default)]
pub struct CatalogOverrides {
    pub fuels: Option<PathBuf>,
    pub ships: Option<PathBuf>,
    pub routes: Option<PathBuf>,
}

impl CatalogOverrides {
    pub fn is_empty(&self) -> bool {
        self.fuels.is_none() && self.ships.is_none() && self.routes.is_none()
    }

    pub fn load(&self) -> Result<Registries, ScenarioError> {
        if self.is_empty() {
            return Ok(Registries::builtin().clone());
        }
        Ok(Registries::with_overrides(
            self.fuels.as_deref(),
            self.ships.as_deref(),
            self.routes.as_deref(),
        )?)
    }
}

fn load<T, P>(path: P) -> Result<T, ScenarioError>
where
    T: for<'de> serde::Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    load_document(path).map_err(|source| ScenarioError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a design target from YAML or TOML.
pub fn load_target<P: AsRef<Path>>(path: P) -> Result<DesignTarget, ScenarioError> {
    load(path)
}

/// Read a complete sweep request from YAML or TOML.
pub fn load_sweep<P: AsRef<Path>>(path: P) -> Result<SweepRequest, ScenarioError> {
    load(path)
}
