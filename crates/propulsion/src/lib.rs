//! Fuel consumption, tank volume and CO₂ from propulsion power.
//!
//! Brake energy is converted to fuel energy through the technology's
//! efficiency and to fuel mass through its lower heating value. Route
//! profiles are summed segment by segment using the propeller law for
//! off-design speed and an Admiralty correction for partial loading.

mod route;

pub use route::{LegSpeedFractions, RouteProfile, RouteSegment};

use serde::{Deserialize, Serialize};
use shipdes_config::{EnergyStorage, FuelConfig};
use shipdes_core::constants::HOURS_PER_DAY;
use shipdes_core::units::kwh_to_gj;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuelModelError {
    #[error("invalid route profile: {0}")]
    InvalidRoute(&'static str),
    #[error("invalid operating profile: {0}")]
    InvalidOperation(&'static str),
    #[error("range must be positive, got {0} nm")]
    InvalidRange(f64),
    #[error("service condition must be positive and finite (speed {speed_knots} kn, power {power_kw} kW)")]
    InvalidServiceCondition { speed_knots: f64, power_kw: f64 },
}

/// Annual operating pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingProfile {
    pub sea_days_per_year: f64,
    /// Used when no route profile is supplied.
    pub voyages_per_year: f64,
    /// Bunker carried beyond the range requirement, as a fraction.
    pub bunker_reserve: f64,
}

impl Default for OperatingProfile {
    fn default() -> Self {
        Self {
            sea_days_per_year: 340.0,
            voyages_per_year: 17.0,
            bunker_reserve: 0.10,
        }
    }
}

impl OperatingProfile {
    pub fn validate(&self) -> Result<(), FuelModelError> {
        if !(self.sea_days_per_year > 0.0 && self.sea_days_per_year <= 365.0) {
            return Err(FuelModelError::InvalidOperation(
                "sea days per year must lie in (0, 365]",
            ));
        }
        if !(self.voyages_per_year > 0.0 && self.voyages_per_year.is_finite()) {
            return Err(FuelModelError::InvalidOperation(
                "voyages per year must be positive",
            ));
        }
        if !(self.bunker_reserve >= 0.0 && self.bunker_reserve.is_finite()) {
            return Err(FuelModelError::InvalidOperation(
                "bunker reserve must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Brake power away from the service condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerCurve {
    pub service_speed_knots: f64,
    pub service_power_kw: f64,
    pub loaded_displacement_t: f64,
    pub lightship_t: f64,
}

impl PowerCurve {
    /// Cube-law speed scaling with `(Δ/Δ_loaded)^(2/3)` for partial loads.
    pub fn brake_power_kw(&self, speed_knots: f64, load_factor: f64) -> f64 {
        let speed_ratio = speed_knots / self.service_speed_knots;
        let deadweight = (self.loaded_displacement_t - self.lightship_t).max(0.0);
        let displacement = self.lightship_t + load_factor.clamp(0.0, 1.0) * deadweight;
        let displacement_ratio = if self.loaded_displacement_t > 0.0 {
            displacement / self.loaded_displacement_t
        } else {
            1.0
        };
        self.service_power_kw * speed_ratio.powi(3) * displacement_ratio.powf(2.0 / 3.0)
    }
}

/// Fuel burnt over one passage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoyageFuel {
    pub distance_nm: f64,
    pub duration_h: f64,
    pub energy_gj: f64,
    pub fuel_mass_t: f64,
    /// Tank volume drawn down, storage penalty included.
    pub fuel_volume_m3: f64,
    pub co2_t: f64,
}

/// Fuel used over a year of operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualFuel {
    pub voyages: f64,
    pub distance_nm: f64,
    pub sea_hours: f64,
    pub energy_gj: f64,
    pub fuel_mass_t: f64,
    pub fuel_volume_m3: f64,
    pub co2_t: f64,
}

/// Bunker requirement and consumption for one design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelEstimate {
    pub sfc_kg_per_kwh: f64,
    /// Energy carrier mass on board at departure, reserve included.
    pub bunker_mass_t: f64,
    pub tank_volume_m3: f64,
    pub range_voyage: VoyageFuel,
    pub annual: AnnualFuel,
}

#[derive(Debug, Clone)]
pub struct FuelRequest<'a> {
    pub fuel: &'a FuelConfig,
    pub power: PowerCurve,
    pub range_nm: f64,
    pub route: Option<&'a RouteProfile>,
    pub operation: &'a OperatingProfile,
}

/// Fuel energy (GJ) needed for a brake energy (kWh).
fn fuel_energy_gj(fuel: &FuelConfig, brake_energy_kwh: f64) -> f64 {
    kwh_to_gj(brake_energy_kwh) / fuel.efficiency
}

/// Consumed fuel mass (t) for a fuel energy; stored or fissile carriers consume none.
fn consumed_mass_t(fuel: &FuelConfig, energy_gj: f64) -> f64 {
    match fuel.storage {
        EnergyStorage::Bunker => energy_gj / fuel.lhv_mj_per_kg,
        EnergyStorage::Battery | EnergyStorage::ReactorCore => 0.0,
    }
}

fn passage(fuel: &FuelConfig, distance_nm: f64, duration_h: f64, brake_energy_kwh: f64) -> VoyageFuel {
    let energy_gj = fuel_energy_gj(fuel, brake_energy_kwh);
    let fuel_mass_t = consumed_mass_t(fuel, energy_gj);
    VoyageFuel {
        distance_nm,
        duration_h,
        energy_gj,
        fuel_mass_t,
        fuel_volume_m3: fuel_mass_t / fuel.density_t_per_m3 * fuel.storage_volume_factor,
        co2_t: fuel_mass_t * fuel.co2_factor,
    }
}

/// Bunker mass, tank volume and voyage/annual consumption.
pub fn estimate_fuel(request: &FuelRequest<'_>) -> Result<FuelEstimate, FuelModelError> {
    let fuel = request.fuel;
    let power = request.power;
    if !(power.service_speed_knots > 0.0
        && power.service_power_kw >= 0.0
        && power.service_power_kw.is_finite())
    {
        return Err(FuelModelError::InvalidServiceCondition {
            speed_knots: power.service_speed_knots,
            power_kw: power.service_power_kw,
        });
    }
    if !(request.range_nm > 0.0 && request.range_nm.is_finite()) {
        return Err(FuelModelError::InvalidRange(request.range_nm));
    }
    request.operation.validate()?;

    let range_hours = request.range_nm / power.service_speed_knots;
    let range_voyage = passage(
        fuel,
        request.range_nm,
        range_hours,
        power.service_power_kw * range_hours,
    );
    let bunker_mass_t = match fuel.storage {
        EnergyStorage::ReactorCore => 0.0,
        EnergyStorage::Bunker | EnergyStorage::Battery => {
            range_voyage.energy_gj / fuel.lhv_mj_per_kg * (1.0 + request.operation.bunker_reserve)
        }
    };
    let tank_volume_m3 = bunker_mass_t / fuel.density_t_per_m3 * fuel.storage_volume_factor;

    let annual = match request.route {
        Some(route) => {
            route.validate()?;
            let brake_energy_kwh: f64 = route
                .segments
                .iter()
                .map(|s| power.brake_power_kw(s.speed_knots, s.load_factor) * s.duration_h)
                .sum();
            let voyage = passage(fuel, route.distance_nm(), route.duration_h(), brake_energy_kwh);
            let voyages = request.operation.sea_days_per_year / route.voyage_days();
            AnnualFuel {
                voyages,
                distance_nm: voyage.distance_nm * voyages,
                sea_hours: voyage.duration_h * voyages,
                energy_gj: voyage.energy_gj * voyages,
                fuel_mass_t: voyage.fuel_mass_t * voyages,
                fuel_volume_m3: voyage.fuel_volume_m3 * voyages,
                co2_t: voyage.co2_t * voyages,
            }
        }
        None => {
            let sea_hours = request.operation.sea_days_per_year * HOURS_PER_DAY;
            let year = passage(
                fuel,
                sea_hours * power.service_speed_knots,
                sea_hours,
                power.service_power_kw * sea_hours,
            );
            AnnualFuel {
                voyages: request.operation.voyages_per_year,
                distance_nm: year.distance_nm,
                sea_hours,
                energy_gj: year.energy_gj,
                fuel_mass_t: year.fuel_mass_t,
                fuel_volume_m3: year.fuel_volume_m3,
                co2_t: year.co2_t,
            }
        }
    };

    Ok(FuelEstimate {
        sfc_kg_per_kwh: fuel.specific_fuel_consumption_kg_per_kwh(),
        bunker_mass_t,
        tank_volume_m3,
        range_voyage,
        annual,
    })
}
