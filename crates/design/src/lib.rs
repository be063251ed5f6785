//! Ship design solver.
//!
//! `solve` sizes a ship for a [`DesignTarget`]: a mass fixed point ties hull
//! dimensions, lightship, power and bunker to the cargo deadweight, a volume
//! check expands the hull when holds and tanks do not fit, and the converged
//! hull is priced and rated. Each step is an explicit phase:
//!
//! Seed → MassConverge → VolumeCheck → [Expand → MassConverge]* → Finalize
//!
//! Sweeps run independent solves over a parameter grid in parallel.

mod phases;
mod result;
mod sweep;
mod target;

use std::time::Duration;

use shipdes_config::Registries;
use shipdes_hull::HullError;
use shipdes_resistance::ResistanceError;
use thiserror::Error;

pub use result::{DesignResult, HullState, PowerProfile, VolumeBudget};
pub use sweep::{
    CancellationToken, SweepError, SweepOutcome, SweepParameter, SweepPoint, SweepRequest,
    run_sweep, run_sweep_with, values_from_range,
};
pub use target::{DesignTarget, PowerMargins, Resolved, RouteSpec, TargetIssue};

/// Why the mass loop stopped without converging.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvergenceReason {
    #[error("iteration limit reached")]
    IterationLimit,
    #[error("displacement change grew for {0} consecutive iterations")]
    Diverging(usize),
    #[error("hull state became non-finite")]
    NonFinite,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("resistance estimate rejected the hull: {0}")]
    Resistance(ResistanceError),
    #[error("hull proportions failed: {0}")]
    Proportions(HullError),
    #[error("implausible proportions L/B {length_breadth:.2}, B/T {breadth_draft:.2}")]
    ImplausibleProportions { length_breadth: f64, breadth_draft: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("invalid design target: {0}")]
    InvalidTarget(#[from] TargetIssue),
    #[error("no converged hull after {iterations} iterations: {reason}")]
    ConvergenceFailure {
        iterations: usize,
        reason: ConvergenceReason,
        last_state: Option<Box<HullState>>,
    },
    #[error(
        "required volume {required_m3:.0} m³ exceeds available {available_m3:.0} m³ after {expansions} expansions"
    )]
    VolumeInfeasible {
        required_m3: f64,
        available_m3: f64,
        expansions: usize,
    },
    #[error("no required freight rate in [{low}, {high}] USD/unit")]
    RfrNotFound { low: f64, high: f64 },
}

/// Iteration limits for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    /// Displacement change tolerance relative to the cargo deadweight.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Consecutive growing steps treated as divergence.
    pub divergence_window: usize,
    pub max_expansions: usize,
    pub deadline: Option<Duration>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 300,
            divergence_window: 6,
            max_expansions: 25,
            deadline: None,
        }
    }
}

/// Size a ship against the bundled catalogs with default settings.
pub fn solve(target: &DesignTarget) -> Result<DesignResult, SolverError> {
    solve_with(target, Registries::builtin(), &SolverSettings::default())
}

pub fn solve_with(
    target: &DesignTarget,
    registries: &Registries,
    settings: &SolverSettings,
) -> Result<DesignResult, SolverError> {
    let resolved = target.resolve(registries)?;
    phases::Solver::new(resolved, settings).run()
}
