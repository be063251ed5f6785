//! Cargo capacity targets and internal volume.

use serde::{Deserialize, Serialize};
use shipdes_config::ShipConfig;

use crate::{Dimensions, HullParticulars};

/// Mean loaded container mass when none is given (t).
pub const DEFAULT_TEU_MASS_T: f64 = 14.0;

const STOWAGE_REGRESSION_COEFFICIENT: f64 = 104.422;
const STOWAGE_REGRESSION_OFFSET: f64 = 20_143.62;
const STOWAGE_REGRESSION_EXPONENT: f64 = 0.9;

fn default_teu_mass() -> f64 {
    DEFAULT_TEU_MASS_T
}

/// Payload the design must carry, or the hull that carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapacityTarget {
    Deadweight {
        tonnes: f64,
    },
    Teu {
        teu: f64,
        #[serde(default = "default_teu_mass")]
        mean_teu_mass_t: f64,
    },
    /// Principal dimensions given outright; cargo deadweight is whatever the
    /// displacement leaves after lightship, bunker and stores.
    Dimensions(HullParticulars),
}

impl CapacityTarget {
    /// Cargo deadweight the hull must be sized for; `None` for a given hull.
    pub fn cargo_deadweight_t(&self) -> Option<f64> {
        match *self {
            CapacityTarget::Deadweight { tonnes } => Some(tonnes),
            CapacityTarget::Teu {
                teu,
                mean_teu_mass_t,
            } => Some(teu * mean_teu_mass_t),
            CapacityTarget::Dimensions(_) => None,
        }
    }

    /// Revenue units carried per voyage (tonnes or TEU).
    ///
    /// `cargo_deadweight_t` is what the hull actually carries; it only counts
    /// when the dimensions were given.
    pub fn revenue_units(&self, cargo_deadweight_t: f64) -> f64 {
        match *self {
            CapacityTarget::Deadweight { tonnes } => tonnes,
            CapacityTarget::Teu { teu, .. } => teu,
            CapacityTarget::Dimensions(_) => cargo_deadweight_t,
        }
    }

    pub fn is_teu(&self) -> bool {
        matches!(self, CapacityTarget::Teu { .. })
    }

    pub fn fixed_hull(&self) -> Option<&HullParticulars> {
        match self {
            CapacityTarget::Dimensions(particulars) => Some(particulars),
            _ => None,
        }
    }

    /// Hold volume the cargo needs.
    pub fn cargo_volume_m3(&self, ship: &ShipConfig, cargo_deadweight_t: f64) -> f64 {
        match *self {
            CapacityTarget::Deadweight { tonnes } => tonnes * ship.volume.stowage_factor_m3_per_t,
            CapacityTarget::Teu { teu, .. } => ship.volume.teu_hold_fraction * teu_box_volume_m3(teu),
            CapacityTarget::Dimensions(_) => {
                cargo_deadweight_t.max(0.0) * ship.volume.stowage_factor_m3_per_t
            }
        }
    }
}

/// Container-stowage regression: box volume `L·B·D` needed for a TEU count.
pub fn teu_box_volume_m3(teu: f64) -> f64 {
    (STOWAGE_REGRESSION_COEFFICIENT * teu.max(0.0).powf(STOWAGE_REGRESSION_EXPONENT)
        - STOWAGE_REGRESSION_OFFSET)
        .max(0.0)
}

/// Inverse of [`teu_box_volume_m3`]: TEU a box volume would stow.
pub fn estimated_teu_capacity(box_volume_m3: f64) -> f64 {
    ((box_volume_m3 + STOWAGE_REGRESSION_OFFSET) / STOWAGE_REGRESSION_COEFFICIENT)
        .max(0.0)
        .powf(1.0 / STOWAGE_REGRESSION_EXPONENT)
}

/// Moulded volume to the upper deck using the block coefficient at depth.
pub fn moulded_volume_m3(dims: &Dimensions) -> f64 {
    let cb = dims.block_coefficient;
    let cb_depth = (cb + (1.0 - cb) * (0.8 * dims.depth_m - dims.draft_m) / (3.0 * dims.draft_m))
        .clamp(cb, 1.0);
    dims.length_m * dims.breadth_m * dims.depth_m * cb_depth
}

/// Share of moulded volume available for cargo holds and fuel tanks.
pub fn available_volume_m3(ship: &ShipConfig, dims: &Dimensions) -> f64 {
    (1.0 - ship.volume.non_cargo_fraction) * moulded_volume_m3(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stowage_regression_inverts() {
        let volume = teu_box_volume_m3(8_000.0);
        assert!((300_000.0..340_000.0).contains(&volume), "{volume}");
        let teu = estimated_teu_capacity(volume);
        assert!((teu - 8_000.0).abs() < 1e-6, "{teu}");
    }

    #[test]
    fn teu_target_defaults_container_mass() {
        let target: CapacityTarget =
            serde_yaml::from_str("kind: teu\nteu: 1000\n").expect("teu target parses");
        assert_eq!(target.cargo_deadweight_t(), Some(14_000.0));
        assert_eq!(target.revenue_units(13_990.0), 1_000.0);
    }

    #[test]
    fn given_dimensions_carry_whatever_is_left() {
        let target: CapacityTarget = serde_yaml::from_str(
            "kind: dimensions\nlength_m: 180\nbreadth_m: 32\ndraft_m: 11\ndepth_m: 17\nblock_coefficient: 0.8\n",
        )
        .expect("dimensions target parses");
        assert_eq!(target.cargo_deadweight_t(), None);
        assert_eq!(target.revenue_units(41_250.0), 41_250.0);
        assert_eq!(target.fixed_hull().map(|hull| hull.depth_m), Some(17.0));
    }
}
