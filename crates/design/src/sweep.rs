//! Parameter sweeps: independent solves over a fuel × value grid.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shipdes_config::Registries;
use shipdes_hull::{CapacityTarget, DEFAULT_TEU_MASS_T};
use thiserror::Error;
use tracing::{info, warn};

use crate::{DesignResult, DesignTarget, SolverError, SolverSettings, solve_with};

/// Upper bound on the number of values a range expands to.
const MAX_SWEEP_VALUES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("unknown sweep parameter `{0}` (expected speed, deadweight, teu, lb, breadth, bt or cb)")]
    UnknownParameter(String),
    #[error("invalid sweep range {start}..={end} step {step}")]
    InvalidRange { start: f64, end: f64, step: f64 },
}

/// Target quantity varied along a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepParameter {
    #[serde(rename = "speed")]
    Speed,
    #[serde(rename = "deadweight")]
    Deadweight,
    #[serde(rename = "teu")]
    Teu,
    #[serde(rename = "lb")]
    LengthBreadth,
    #[serde(rename = "breadth")]
    Breadth,
    #[serde(rename = "bt")]
    BreadthDraft,
    #[serde(rename = "cb")]
    BlockCoefficient,
}

impl SweepParameter {
    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::Speed => "speed",
            SweepParameter::Deadweight => "deadweight",
            SweepParameter::Teu => "teu",
            SweepParameter::LengthBreadth => "lb",
            SweepParameter::Breadth => "breadth",
            SweepParameter::BreadthDraft => "bt",
            SweepParameter::BlockCoefficient => "cb",
        }
    }

    /// Set this parameter on a target.
    ///
    /// Fixing breadth releases a fixed L/B ratio and vice versa.
    pub fn apply(self, target: &mut DesignTarget, value: f64) {
        let constraints = &mut target.constraints;
        match self {
            SweepParameter::Speed => target.speed_knots = value,
            SweepParameter::Deadweight => {
                target.capacity = CapacityTarget::Deadweight { tonnes: value };
            }
            SweepParameter::Teu => {
                let mean_teu_mass_t = match target.capacity {
                    CapacityTarget::Teu {
                        mean_teu_mass_t, ..
                    } => mean_teu_mass_t,
                    CapacityTarget::Deadweight { .. } | CapacityTarget::Dimensions(_) => {
                        DEFAULT_TEU_MASS_T
                    }
                };
                target.capacity = CapacityTarget::Teu {
                    teu: value,
                    mean_teu_mass_t,
                };
            }
            SweepParameter::LengthBreadth => {
                constraints.length_breadth_ratio = Some(value);
                constraints.breadth_m = None;
            }
            SweepParameter::Breadth => {
                constraints.breadth_m = Some(value);
                constraints.length_breadth_ratio = None;
            }
            SweepParameter::BreadthDraft => constraints.breadth_draft_ratio = Some(value),
            SweepParameter::BlockCoefficient => constraints.block_coefficient = Some(value),
        }
    }
}

impl FromStr for SweepParameter {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "speed" => Ok(SweepParameter::Speed),
            "deadweight" | "dwt" => Ok(SweepParameter::Deadweight),
            "teu" => Ok(SweepParameter::Teu),
            "lb" => Ok(SweepParameter::LengthBreadth),
            "breadth" => Ok(SweepParameter::Breadth),
            "bt" => Ok(SweepParameter::BreadthDraft),
            "cb" => Ok(SweepParameter::BlockCoefficient),
            _ => Err(SweepError::UnknownParameter(s.to_string())),
        }
    }
}

/// Inclusive evenly spaced values from `start` to `end`.
pub fn values_from_range(start: f64, end: f64, step: f64) -> Result<Vec<f64>, SweepError> {
    let invalid = SweepError::InvalidRange { start, end, step };
    if !(start.is_finite() && end.is_finite() && step.is_finite() && step > 0.0 && end >= start) {
        return Err(invalid);
    }
    let count = ((end - start) / step + 1e-9).floor() + 1.0;
    if !(count <= MAX_SWEEP_VALUES as f64) {
        return Err(invalid);
    }
    Ok((0..count as usize).map(|i| start + i as f64 * step).collect())
}

/// Fuels × values grid around a base target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    pub base: DesignTarget,
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
    /// Fuels to sweep; the base target's fuel when empty.
    #[serde(default)]
    pub fuels: Vec<String>,
}

impl SweepRequest {
    /// Grid points in output order: fuel-major, then value.
    pub fn grid(&self) -> Vec<(String, f64)> {
        let fuels = if self.fuels.is_empty() {
            std::slice::from_ref(&self.base.fuel)
        } else {
            self.fuels.as_slice()
        };
        fuels
            .iter()
            .flat_map(|fuel| self.values.iter().map(move |&value| (fuel.clone(), value)))
            .collect()
    }

    /// Target for one grid point.
    pub fn target_for(&self, fuel: &str, value: f64) -> DesignTarget {
        let mut target = self.base.clone();
        target.fuel = fuel.to_string();
        self.parameter.apply(&mut target, value);
        target
    }
}

/// Shared flag checked before each grid point.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    Solved(Box<DesignResult>),
    Failed(SolverError),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub fuel: String,
    pub value: f64,
    pub outcome: SweepOutcome,
}

impl SweepPoint {
    pub fn result(&self) -> Option<&DesignResult> {
        match &self.outcome {
            SweepOutcome::Solved(result) => Some(result),
            _ => None,
        }
    }
}

pub fn run_sweep(
    request: &SweepRequest,
    registries: &Registries,
    settings: &SolverSettings,
    cancel: &CancellationToken,
) -> Vec<SweepPoint> {
    run_sweep_with(request, registries, settings, cancel, |_| {})
}

/// Solve every grid point in parallel, calling `on_point` as each finishes.
///
/// Points reached after cancellation are reported as cancelled; results keep
/// the grid order.
pub fn run_sweep_with<F>(
    request: &SweepRequest,
    registries: &Registries,
    settings: &SolverSettings,
    cancel: &CancellationToken,
    on_point: F,
) -> Vec<SweepPoint>
where
    F: Fn(&SweepPoint) + Sync,
{
    let grid = request.grid();
    info!(
        parameter = request.parameter.name(),
        points = grid.len(),
        "starting sweep"
    );
    grid.into_par_iter()
        .map(|(fuel, value)| {
            let outcome = if cancel.is_cancelled() {
                SweepOutcome::Cancelled
            } else {
                let target = request.target_for(&fuel, value);
                match solve_with(&target, registries, settings) {
                    Ok(result) => SweepOutcome::Solved(Box::new(result)),
                    Err(err) => {
                        warn!(fuel = %fuel, value, error = %err, "sweep point failed");
                        SweepOutcome::Failed(err)
                    }
                }
            };
            let point = SweepPoint {
                fuel,
                value,
                outcome,
            };
            on_point(&point);
            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DesignTarget {
        DesignTarget::new(
            "container",
            "direct_diesel",
            CapacityTarget::Teu {
                teu: 4_000.0,
                mean_teu_mass_t: 12.0,
            },
            18.0,
            8_000.0,
        )
    }

    #[test]
    fn range_includes_end_point() {
        let values = values_from_range(10.0, 25.0, 2.5).expect("valid range");
        assert_eq!(values.len(), 7);
        assert_eq!(values.last().copied(), Some(25.0));
        assert!(values_from_range(5.0, 1.0, 1.0).is_err());
        assert!(values_from_range(0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn oversized_range_is_rejected() {
        assert!(values_from_range(0.0, 1e300, 1e-300).is_err());
        assert!(values_from_range(0.0, 1e6, 1.0).is_err());
        let values = values_from_range(1.0, 10_000.0, 1.0).expect("at the limit");
        assert_eq!(values.len(), MAX_SWEEP_VALUES);
    }

    #[test]
    fn parameters_parse_by_short_name() {
        assert_eq!("lb".parse::<SweepParameter>(), Ok(SweepParameter::LengthBreadth));
        assert_eq!("CB".parse::<SweepParameter>(), Ok(SweepParameter::BlockCoefficient));
        assert!("draft".parse::<SweepParameter>().is_err());
    }

    #[test]
    fn grid_is_fuel_major() {
        let request = SweepRequest {
            base: base(),
            parameter: SweepParameter::Speed,
            values: vec![14.0, 16.0],
            fuels: vec!["direct_diesel".into(), "methanol".into()],
        };
        let grid = request.grid();
        assert_eq!(
            grid,
            vec![
                ("direct_diesel".to_string(), 14.0),
                ("direct_diesel".to_string(), 16.0),
                ("methanol".to_string(), 14.0),
                ("methanol".to_string(), 16.0),
            ]
        );
    }

    #[test]
    fn teu_sweep_keeps_container_mass_and_breadth_releases_ratio() {
        let mut target = base();
        SweepParameter::Teu.apply(&mut target, 6_000.0);
        assert_eq!(
            target.capacity,
            CapacityTarget::Teu {
                teu: 6_000.0,
                mean_teu_mass_t: 12.0
            }
        );
        target.constraints.length_breadth_ratio = Some(7.0);
        SweepParameter::Breadth.apply(&mut target, 40.0);
        assert_eq!(target.constraints.breadth_m, Some(40.0));
        assert_eq!(target.constraints.length_breadth_ratio, None);
    }

    #[test]
    fn cancelled_sweep_solves_nothing() {
        let request = SweepRequest {
            base: base(),
            parameter: SweepParameter::Speed,
            values: vec![14.0, 16.0, 18.0],
            fuels: Vec::new(),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let points = run_sweep(
            &request,
            Registries::builtin(),
            &SolverSettings::default(),
            &cancel,
        );
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.outcome == SweepOutcome::Cancelled));
        assert_eq!(points[2].value, 18.0);
    }
}
