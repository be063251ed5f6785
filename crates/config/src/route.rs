use serde::{Deserialize, Serialize};

use crate::{ConfigError, ensure, non_negative};

/// Port-to-port route with one-way leg distances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTemplate {
    pub key: String,
    pub name: String,
    /// Harbour approaches at both ends combined (nm).
    pub port_approach_nm: f64,
    pub canal_nm: f64,
    pub open_ocean_nm: f64,
    pub port_days_origin: f64,
    pub port_days_destination: f64,
}

impl RouteTemplate {
    pub fn one_way_distance_nm(&self) -> f64 {
        self.port_approach_nm + self.canal_nm + self.open_ocean_nm
    }

    pub fn port_days(&self) -> f64 {
        self.port_days_origin + self.port_days_destination
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.key.as_str();
        ensure(key, !key.is_empty(), "key must not be empty")?;
        ensure(
            key,
            non_negative(self.port_approach_nm)
                && non_negative(self.canal_nm)
                && non_negative(self.open_ocean_nm),
            "leg distances must be non-negative",
        )?;
        ensure(
            key,
            self.one_way_distance_nm() > 0.0,
            "route must have a positive length",
        )?;
        ensure(
            key,
            non_negative(self.port_days_origin) && non_negative(self.port_days_destination),
            "port days must be non-negative",
        )
    }
}
