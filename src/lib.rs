//! Ship Design Calculator.
//!
//! Estimates principal dimensions, propulsion, fuel, economics and IMO
//! efficiency indices of a merchant ship from high-level targets. The member
//! crates hold the models; this crate re-exports them for front-ends and adds
//! scenario loading and logging setup for the binaries.

pub mod logging;
pub mod scenario;

pub use shipdes_config as config;
pub use shipdes_core as common;
pub use shipdes_design as design;
pub use shipdes_economics as economics;
pub use shipdes_hull as hull;
pub use shipdes_propulsion as propulsion;
pub use shipdes_regulatory as regulatory;
pub use shipdes_resistance as resistance;

pub use shipdes_design::{
    DesignResult, DesignTarget, SolverError, SolverSettings, SweepRequest, solve, solve_with,
};
