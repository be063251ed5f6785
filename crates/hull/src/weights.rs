//! Lightship weight regressions.

use serde::Serialize;
use shipdes_config::{FuelConfig, ShipConfig};

use crate::Dimensions;

/// Design and build margin on the summed lightship groups.
const LIGHTSHIP_MARGIN: f64 = 0.02;

/// Lightship weight groups in tonnes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lightship {
    pub steel_t: f64,
    pub outfit_t: f64,
    pub machinery_t: f64,
    pub margin_t: f64,
    pub total_t: f64,
}

/// Net steel weight from the Lloyd's-style equipment numeral.
pub fn steel_weight_t(ship: &ShipConfig, dims: &Dimensions) -> f64 {
    let (l, b, t, d) = (dims.length_m, dims.breadth_m, dims.draft_m, dims.depth_m);
    let numeral = l * (b + t) + 0.85 * l * (d - t) + 250.0;
    let cb_correction = dims.block_coefficient + (0.8 * d - t) / (10.0 * t);
    ship.weights.steel_k1 * numeral.powf(1.36) * (1.0 + 0.5 * (cb_correction - 0.7))
}

pub fn outfit_weight_t(ship: &ShipConfig, dims: &Dimensions) -> f64 {
    ship.outfit_k2(dims.length_m) * dims.length_m * dims.breadth_m
}

/// Propulsion plant weight; nuclear plants add reactor and shielding.
pub fn machinery_weight_t(fuel: &FuelConfig, installed_power_kw: f64) -> f64 {
    let plant = fuel.machinery_base_mass_t + fuel.machinery_specific_mass_t_per_kw * installed_power_kw;
    let reactor = fuel
        .nuclear
        .as_ref()
        .map(|n| n.shielding_mass_t + n.reactor_specific_mass_t_per_kw * installed_power_kw)
        .unwrap_or(0.0);
    plant + reactor
}

pub fn lightship(
    ship: &ShipConfig,
    fuel: &FuelConfig,
    dims: &Dimensions,
    installed_power_kw: f64,
) -> Lightship {
    let steel_t = steel_weight_t(ship, dims);
    let outfit_t = outfit_weight_t(ship, dims);
    let machinery_t = machinery_weight_t(fuel, installed_power_kw);
    let margin_t = LIGHTSHIP_MARGIN * (steel_t + outfit_t + machinery_t);
    Lightship {
        steel_t,
        outfit_t,
        machinery_t,
        margin_t,
        total_t: steel_t + outfit_t + machinery_t + margin_t,
    }
}

/// Crew, provisions and stores carried as deadweight.
pub fn stores_and_crew_t(displacement_t: f64) -> f64 {
    13.0 * displacement_t.max(0.0).powf(0.35)
}
