//! Hull proportions, load-line freeboard, lightship weights and internal volume.
//!
//! Everything here is a pure regression over principal dimensions; the design
//! solver owns the iteration that ties them to a deadweight target.

pub mod capacity;
pub mod freeboard;
pub mod proportions;
pub mod weights;

pub use capacity::{CapacityTarget, DEFAULT_TEU_MASS_T};
pub use proportions::{
    Dimensions, ExpansionFactors, HullConstraints, HullParticulars, dimensions_for_displacement,
};
pub use weights::{Lightship, lightship, stores_and_crew_t};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HullError {
    #[error("displacement must be finite and positive, got {0} t")]
    InvalidDisplacement(f64),
    #[error("invalid hull constraint: {0}")]
    InvalidConstraint(&'static str),
    #[error("freeboard leaves no positive draft at L = {length_m:.1} m")]
    NonPositiveDraft { length_m: f64 },
    #[error("hull proportions did not settle for displacement {displacement_t:.0} t")]
    ProportionsNotConverged { displacement_t: f64 },
}
