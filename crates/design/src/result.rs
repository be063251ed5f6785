use serde::Serialize;
use shipdes_economics::EconomicSummary;
use shipdes_hull::{CapacityTarget, Dimensions, ExpansionFactors, Lightship};
use shipdes_propulsion::FuelEstimate;
use shipdes_regulatory::RegulatorySummary;
use shipdes_resistance::PowerEstimate;

/// Hull at one point of the mass iteration; frozen into the result once converged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HullState {
    pub dimensions: Dimensions,
    pub lightship: Lightship,
    pub displacement_t: f64,
    /// Displacement minus lightship.
    pub deadweight_t: f64,
    /// Deadweight left for cargo after bunker, stores and crew.
    pub cargo_deadweight_t: f64,
    pub bunker_t: f64,
    pub stores_t: f64,
    pub available_volume_m3: f64,
    pub expansion: ExpansionFactors,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerProfile {
    pub power: PowerEstimate,
    pub fuel: FuelEstimate,
}

impl PowerProfile {
    pub fn service_power_kw(&self) -> f64 {
        self.power.service_power_kw
    }

    pub fn installed_power_kw(&self) -> f64 {
        self.power.installed_power_kw
    }
}

/// Hold and tank volume against what the hull offers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeBudget {
    pub cargo_m3: f64,
    pub tank_m3: f64,
    pub required_m3: f64,
    pub available_m3: f64,
}

impl VolumeBudget {
    pub fn fits(&self) -> bool {
        self.required_m3 <= self.available_m3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignResult {
    pub ship_type: String,
    pub fuel: String,
    pub capacity: CapacityTarget,
    pub speed_knots: f64,
    pub range_nm: f64,
    pub hull: HullState,
    pub power: PowerProfile,
    pub volume: VolumeBudget,
    pub economics: EconomicSummary,
    pub regulatory: RegulatorySummary,
    pub estimated_teu_capacity: f64,
    /// Mass iterations summed over every convergence pass.
    pub iterations: usize,
    pub volume_expansions: usize,
}
