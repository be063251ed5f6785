//! Principal dimensions from displacement.

use serde::{Deserialize, Serialize};
use shipdes_config::ShipConfig;
use shipdes_core::constants::SEAWATER_DENSITY_T_M3;
use shipdes_core::similarity::froude_number;
use shipdes_core::units::knots_to_ms;
use shipdes_resistance::HullGeometry;

use crate::HullError;
use crate::freeboard::minimum_freeboard_m;

const MAX_SHAPE_ITERATIONS: usize = 200;
const SHAPE_TOLERANCE: f64 = 1e-11;

/// Optional proportions fixed by the designer instead of taken from regressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullConstraints {
    pub length_breadth_ratio: Option<f64>,
    pub breadth_m: Option<f64>,
    pub breadth_draft_ratio: Option<f64>,
    pub block_coefficient: Option<f64>,
}

impl HullConstraints {
    pub fn validate(&self) -> Result<(), HullError> {
        if self.length_breadth_ratio.is_some() && self.breadth_m.is_some() {
            return Err(HullError::InvalidConstraint(
                "length/breadth ratio and breadth cannot both be fixed",
            ));
        }
        let positive = |value: Option<f64>| value.is_none_or(|v| v.is_finite() && v > 0.0);
        if !positive(self.length_breadth_ratio) {
            return Err(HullError::InvalidConstraint("length/breadth ratio must be positive"));
        }
        if !positive(self.breadth_m) {
            return Err(HullError::InvalidConstraint("breadth must be positive"));
        }
        if !positive(self.breadth_draft_ratio) {
            return Err(HullError::InvalidConstraint("breadth/draft ratio must be positive"));
        }
        if let Some(cb) = self.block_coefficient {
            if !(0.35..=0.95).contains(&cb) {
                return Err(HullError::InvalidConstraint(
                    "block coefficient must lie in [0.35, 0.95]",
                ));
            }
        }
        Ok(())
    }
}

/// Depth and breadth multipliers applied by the volume check.
///
/// Breadth expansion divides draft by the same factor so that displacement per
/// unit length, and with it the block coefficient, is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpansionFactors {
    pub depth: f64,
    pub breadth: f64,
}

impl Default for ExpansionFactors {
    fn default() -> Self {
        Self {
            depth: 1.0,
            breadth: 1.0,
        }
    }
}

/// Principal dimensions supplied by the designer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HullParticulars {
    pub length_m: f64,
    pub breadth_m: f64,
    pub draft_m: f64,
    pub depth_m: f64,
    pub block_coefficient: f64,
}

impl HullParticulars {
    pub fn validate(&self) -> Result<(), HullError> {
        let fields = [
            self.length_m,
            self.breadth_m,
            self.draft_m,
            self.depth_m,
            self.block_coefficient,
        ];
        if !fields.iter().all(|v| v.is_finite() && *v > 0.0) {
            return Err(HullError::InvalidConstraint("hull dimensions must be positive"));
        }
        if self.block_coefficient > 1.0 {
            return Err(HullError::InvalidConstraint("block coefficient must not exceed 1"));
        }
        if self.depth_m <= self.draft_m {
            return Err(HullError::InvalidConstraint("depth must exceed draft"));
        }
        Ok(())
    }

    /// Displacement, freeboard and the rest of [`Dimensions`] for this hull.
    pub fn dimensions(&self, ship: &ShipConfig) -> Result<Dimensions, HullError> {
        self.validate()?;
        Ok(Dimensions {
            length_m: self.length_m,
            breadth_m: self.breadth_m,
            draft_m: self.draft_m,
            depth_m: self.depth_m,
            block_coefficient: self.block_coefficient,
            freeboard_m: minimum_freeboard_m(
                ship.proportions.freeboard,
                self.length_m,
                self.depth_m,
                self.draft_m,
                self.block_coefficient,
            ),
            displacement_t: SEAWATER_DENSITY_T_M3
                * self.length_m
                * self.breadth_m
                * self.draft_m
                * self.block_coefficient,
        })
    }
}

/// Principal dimensions of a candidate hull.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub length_m: f64,
    pub breadth_m: f64,
    pub draft_m: f64,
    pub depth_m: f64,
    pub block_coefficient: f64,
    pub freeboard_m: f64,
    pub displacement_t: f64,
}

impl Dimensions {
    pub fn geometry(&self) -> HullGeometry {
        HullGeometry {
            length_m: self.length_m,
            breadth_m: self.breadth_m,
            draft_m: self.draft_m,
            depth_m: self.depth_m,
            block_coefficient: self.block_coefficient,
        }
    }

    pub fn length_breadth_ratio(&self) -> f64 {
        self.length_m / self.breadth_m
    }

    pub fn breadth_draft_ratio(&self) -> f64 {
        self.breadth_m / self.draft_m
    }

    /// `L·B·D`, the argument of the container-stowage regression.
    pub fn box_volume_m3(&self) -> f64 {
        self.length_m * self.breadth_m * self.depth_m
    }
}

/// Iterate `x = f(x)`; the freeboard couplings are strong contractions.
fn settle(mut x: f64, f: impl Fn(f64) -> f64) -> f64 {
    for _ in 0..50 {
        let next = f(x);
        if (next - x).abs() < 1e-12 {
            return next;
        }
        x = next;
    }
    x
}

struct Shape {
    breadth: f64,
    draft: f64,
    depth: f64,
    block_coefficient: f64,
}

fn shape_at_length(
    ship: &ShipConfig,
    length: f64,
    speed_knots: f64,
    constraints: &HullConstraints,
) -> Result<Shape, HullError> {
    let p = &ship.proportions;
    let froude = froude_number(knots_to_ms(speed_knots), length);
    let block_coefficient = constraints
        .block_coefficient
        .unwrap_or_else(|| ship.block_coefficient(froude));
    let breadth = match constraints.breadth_m {
        Some(breadth) => breadth,
        None => {
            length
                / constraints
                    .length_breadth_ratio
                    .unwrap_or_else(|| ship.length_breadth_ratio(length))
        }
    };

    let freeboard = |depth: f64, draft: f64| {
        minimum_freeboard_m(p.freeboard, length, depth, draft, block_coefficient)
    };
    let (draft, depth) = match constraints.breadth_draft_ratio {
        Some(ratio) => {
            let draft = breadth / ratio;
            let nominal = draft / p.draft_depth_ratio;
            let depth = settle(nominal, |depth| nominal.max(draft + freeboard(depth, draft)));
            (draft, depth)
        }
        None => {
            let depth = length / p.length_depth_ratio;
            let nominal = p.draft_depth_ratio * depth;
            let draft = settle(nominal, |draft| nominal.min(depth - freeboard(depth, draft)));
            (draft, depth)
        }
    };
    if !(draft > 0.0 && depth.is_finite()) {
        return Err(HullError::NonPositiveDraft { length_m: length });
    }

    Ok(Shape {
        breadth,
        draft,
        depth,
        block_coefficient,
    })
}

/// Dimensions whose displacement equals `displacement_t`.
///
/// Length is found by fixed-point iteration on `Δ = ρ·L·B·T·C_B`, where the
/// ratios come from the ship-type regressions or the designer's constraints.
/// Expansion factors are applied afterwards and leave displacement unchanged.
pub fn dimensions_for_displacement(
    ship: &ShipConfig,
    displacement_t: f64,
    speed_knots: f64,
    constraints: &HullConstraints,
    expansion: ExpansionFactors,
) -> Result<Dimensions, HullError> {
    if !displacement_t.is_finite() || displacement_t <= 0.0 {
        return Err(HullError::InvalidDisplacement(displacement_t));
    }
    let target_volume = displacement_t / SEAWATER_DENSITY_T_M3;
    let mut length = ship.seed_length(displacement_t * ship.seed.deadweight_ratio);

    let mut settled = None;
    for _ in 0..MAX_SHAPE_ITERATIONS {
        let shape = shape_at_length(ship, length, speed_knots, constraints)?;
        let volume = length * shape.breadth * shape.draft * shape.block_coefficient;
        let ratio = target_volume / volume;
        if (ratio - 1.0).abs() < SHAPE_TOLERANCE {
            settled = Some(shape);
            break;
        }
        length *= ratio.cbrt();
    }
    let shape = settled.ok_or(HullError::ProportionsNotConverged { displacement_t })?;

    let breadth = shape.breadth * expansion.breadth;
    let draft = shape.draft / expansion.breadth;
    let depth = shape.depth * expansion.depth;
    let freeboard_m = minimum_freeboard_m(
        ship.proportions.freeboard,
        length,
        depth,
        draft,
        shape.block_coefficient,
    );

    Ok(Dimensions {
        length_m: length,
        breadth_m: breadth,
        draft_m: draft,
        depth_m: depth,
        block_coefficient: shape.block_coefficient,
        freeboard_m,
        displacement_t: SEAWATER_DENSITY_T_M3
            * length
            * breadth
            * draft
            * shape.block_coefficient,
    })
}
