use serde::{Deserialize, Serialize};

use crate::{ConfigError, ensure, non_negative, positive};

/// How the energy carrier is held on board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyStorage {
    /// Consumable fuel burnt or converted during the voyage.
    Bunker,
    /// Rechargeable storage; carried mass is not consumed.
    Battery,
    /// Reactor core replaced on a multi-year cycle.
    ReactorCore,
}

/// Reactor-specific properties for nuclear plants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NuclearConfig {
    pub reactor_specific_mass_t_per_kw: f64,
    pub shielding_mass_t: f64,
    pub reactor_cost_usd_per_kw: f64,
    pub core_cost_usd_per_kw: f64,
    pub core_life_years: u32,
    pub decommissioning_cost_usd: f64,
    pub decommissioning_fund_rate: f64,
}

/// Physical and economic properties of one fuel/engine technology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelConfig {
    pub key: String,
    pub name: String,
    pub storage: EnergyStorage,
    pub lhv_mj_per_kg: f64,
    pub density_t_per_m3: f64,
    /// Tank volume per unit of liquid (or pack) volume.
    pub storage_volume_factor: f64,
    /// Fuel energy to brake energy.
    pub efficiency: f64,
    /// Brake power to delivered shaft power.
    pub transmission_efficiency: f64,
    pub machinery_base_mass_t: f64,
    pub machinery_specific_mass_t_per_kw: f64,
    pub machinery_cost_usd_per_kw: f64,
    #[serde(default)]
    pub storage_cost_usd_per_m3: f64,
    pub energy_price_usd_per_gj: f64,
    /// Tonnes of CO₂ per tonne of fuel.
    pub co2_factor: f64,
    #[serde(default)]
    pub nuclear: Option<NuclearConfig>,
}

impl FuelConfig {
    /// Specific fuel consumption at the engine output (kg/kWh).
    pub fn specific_fuel_consumption_kg_per_kwh(&self) -> f64 {
        3.6 / (self.efficiency * self.lhv_mj_per_kg)
    }

    /// True when burning (or converting) the fuel emits no CO₂.
    pub fn is_zero_carbon(&self) -> bool {
        self.co2_factor == 0.0
    }

    /// True when the carried energy mass is drawn down over a voyage.
    pub fn is_consumable(&self) -> bool {
        self.storage == EnergyStorage::Bunker
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.key.as_str();
        ensure(key, !key.is_empty(), "key must not be empty")?;
        ensure(key, positive(self.lhv_mj_per_kg), "lower heating value must be positive")?;
        ensure(key, positive(self.density_t_per_m3), "density must be positive")?;
        ensure(
            key,
            positive(self.efficiency) && self.efficiency <= 1.0,
            "efficiency must lie in (0, 1]",
        )?;
        ensure(
            key,
            positive(self.transmission_efficiency) && self.transmission_efficiency <= 1.0,
            "transmission efficiency must lie in (0, 1]",
        )?;
        ensure(
            key,
            self.storage_volume_factor.is_finite() && self.storage_volume_factor >= 1.0,
            "storage volume factor must be at least 1",
        )?;
        for (value, what) in [
            (self.machinery_base_mass_t, "machinery base mass"),
            (self.machinery_specific_mass_t_per_kw, "machinery specific mass"),
            (self.machinery_cost_usd_per_kw, "machinery cost"),
            (self.storage_cost_usd_per_m3, "storage cost"),
            (self.energy_price_usd_per_gj, "energy price"),
            (self.co2_factor, "CO2 factor"),
        ] {
            if !non_negative(value) {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    reason: format!("{what} must be finite and non-negative"),
                });
            }
        }
        match (&self.nuclear, self.storage) {
            (None, EnergyStorage::ReactorCore) => Err(ConfigError::Invalid {
                key: key.to_string(),
                reason: "reactor-core storage requires a nuclear block".to_string(),
            }),
            (Some(nuclear), _) => {
                ensure(key, nuclear.core_life_years > 0, "core life must be positive")?;
                ensure(
                    key,
                    non_negative(nuclear.reactor_specific_mass_t_per_kw)
                        && non_negative(nuclear.shielding_mass_t)
                        && non_negative(nuclear.reactor_cost_usd_per_kw)
                        && non_negative(nuclear.core_cost_usd_per_kw)
                        && non_negative(nuclear.decommissioning_cost_usd)
                        && non_negative(nuclear.decommissioning_fund_rate),
                    "nuclear properties must be finite and non-negative",
                )
            }
            (None, _) => Ok(()),
        }
    }
}
