//! IMO energy-efficiency indices: design EEDI and operational CII.

use std::fmt;

use serde::Serialize;
use shipdes_config::{CiiReference, EediReference, ShipConfig};
use thiserror::Error;

/// Auxiliary power switches from a proportional to an offset rule at this main power.
const AUXILIARY_POWER_BREAK_KW: f64 = 10_000.0;
/// EEDI main-engine power as a share of installed power.
const MAIN_ENGINE_LOAD: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegulatoryError {
    #[error("capacity must be positive, got {0} t")]
    InvalidCapacity(f64),
    #[error("reference speed must be positive, got {0} kn")]
    InvalidSpeed(f64),
    #[error("annual distance must be positive, got {0} nm")]
    InvalidDistance(f64),
    #[error("{0} must be finite and non-negative")]
    InvalidInput(&'static str),
}

/// Operational carbon-intensity rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CiiRating {
    A,
    B,
    C,
    D,
    E,
}

impl CiiRating {
    /// Rating for an attained/required ratio against boundaries d1..d4.
    pub fn from_ratio(ratio: f64, boundaries: &[f64; 4]) -> Self {
        let [d1, d2, d3, d4] = *boundaries;
        if ratio <= d1 {
            CiiRating::A
        } else if ratio <= d2 {
            CiiRating::B
        } else if ratio <= d3 {
            CiiRating::C
        } else if ratio <= d4 {
            CiiRating::D
        } else {
            CiiRating::E
        }
    }
}

impl fmt::Display for CiiRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            CiiRating::A => "A",
            CiiRating::B => "B",
            CiiRating::C => "C",
            CiiRating::D => "D",
            CiiRating::E => "E",
        };
        f.write_str(letter)
    }
}

/// Design-condition inputs shared by both indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegulatoryInput {
    pub deadweight_t: f64,
    pub speed_knots: f64,
    pub installed_power_kw: f64,
    /// t CO₂ per t fuel.
    pub co2_factor: f64,
    pub sfc_g_per_kwh: f64,
    pub annual_co2_t: f64,
    pub annual_distance_nm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EediAssessment {
    pub main_engine_kw: f64,
    pub auxiliary_kw: f64,
    pub capacity_t: f64,
    /// g CO₂ per tonne-mile.
    pub attained: f64,
    pub reference: f64,
    pub required: f64,
    pub compliant: bool,
    /// Reduction of the attained index below the reference line (%).
    pub reduction_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CiiAssessment {
    pub capacity_t: f64,
    /// g CO₂ per tonne-mile.
    pub attained: f64,
    pub reference: f64,
    pub required: f64,
    pub ratio: f64,
    pub rating: CiiRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegulatorySummary {
    pub eedi: EediAssessment,
    pub cii: CiiAssessment,
}

/// Auxiliary power counted in the EEDI for a given installed power.
pub fn auxiliary_power_kw(installed_power_kw: f64) -> f64 {
    if installed_power_kw >= AUXILIARY_POWER_BREAK_KW {
        0.025 * installed_power_kw + 250.0
    } else {
        0.05 * installed_power_kw
    }
}

pub fn eedi(reference: &EediReference, input: &RegulatoryInput) -> EediAssessment {
    let main_engine_kw = MAIN_ENGINE_LOAD * input.installed_power_kw;
    let auxiliary_kw = auxiliary_power_kw(input.installed_power_kw);
    let capacity_t = reference.capacity_fraction * input.deadweight_t;
    let attained = (main_engine_kw + auxiliary_kw) * input.co2_factor * input.sfc_g_per_kwh
        / (capacity_t * input.speed_knots);
    let reference_value = reference.a * capacity_t.powf(-reference.c);
    let required = (1.0 - reference.b) * reference_value;
    EediAssessment {
        main_engine_kw,
        auxiliary_kw,
        capacity_t,
        attained,
        reference: reference_value,
        required,
        compliant: attained <= required,
        reduction_pct: (1.0 - attained / reference_value) * 100.0,
    }
}

pub fn cii(reference: &CiiReference, input: &RegulatoryInput) -> CiiAssessment {
    let capacity_t = input.deadweight_t;
    let attained = input.annual_co2_t * 1.0e6 / (capacity_t * input.annual_distance_nm);
    let reference_value = reference.a * capacity_t.powf(-reference.c);
    let required = (1.0 - reference.reduction) * reference_value;
    let ratio = attained / required;
    CiiAssessment {
        capacity_t,
        attained,
        reference: reference_value,
        required,
        ratio,
        rating: CiiRating::from_ratio(ratio, &reference.boundaries),
    }
}

/// EEDI and CII for a design of the given ship type.
pub fn assess(ship: &ShipConfig, input: &RegulatoryInput) -> Result<RegulatorySummary, RegulatoryError> {
    if !(input.deadweight_t > 0.0 && input.deadweight_t.is_finite()) {
        return Err(RegulatoryError::InvalidCapacity(input.deadweight_t));
    }
    if !(input.speed_knots > 0.0 && input.speed_knots.is_finite()) {
        return Err(RegulatoryError::InvalidSpeed(input.speed_knots));
    }
    if !(input.annual_distance_nm > 0.0 && input.annual_distance_nm.is_finite()) {
        return Err(RegulatoryError::InvalidDistance(input.annual_distance_nm));
    }
    for (value, what) in [
        (input.installed_power_kw, "installed power"),
        (input.co2_factor, "CO2 factor"),
        (input.sfc_g_per_kwh, "specific fuel consumption"),
        (input.annual_co2_t, "annual CO2"),
    ] {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(RegulatoryError::InvalidInput(what));
        }
    }
    Ok(RegulatorySummary {
        eedi: eedi(&ship.eedi, input),
        cii: cii(&ship.cii, input),
    })
}
