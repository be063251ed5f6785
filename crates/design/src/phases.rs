//! Solver phases and the mass/volume fixed point.

use std::time::Instant;

use shipdes_economics::{CostBasis, EconomicsError, FreightUnit, evaluate};
use shipdes_hull::capacity::{available_volume_m3, estimated_teu_capacity};
use shipdes_hull::{
    Dimensions, ExpansionFactors, HullConstraints, HullParticulars, dimensions_for_displacement,
    lightship, stores_and_crew_t,
};
use shipdes_propulsion::{FuelEstimate, FuelRequest, PowerCurve, estimate_fuel};
use shipdes_regulatory::{RegulatoryInput, assess};
use shipdes_resistance::{PowerEstimate, PowerRequest, estimate_power};
use tracing::{debug, info, info_span, warn};

use crate::result::{DesignResult, HullState, PowerProfile, VolumeBudget};
use crate::target::{Resolved, TargetIssue};
use crate::{ConvergenceReason, SolverError, SolverSettings};

/// Multiplier on the volume shortfall so an expansion clears it.
const EXPANSION_OVERSHOOT: f64 = 1.01;
const LENGTH_BREADTH_BOUNDS: (f64, f64) = (3.0, 10.0);
const BREADTH_DRAFT_BOUNDS: (f64, f64) = (1.5, 7.0);

enum Phase {
    Seed,
    MassConverge { displacement_t: f64, cargo_t: f64 },
    Given(HullParticulars),
    VolumeCheck(Box<Converged>),
    Expand(Box<Converged>),
    Finalize(Box<Converged>),
}

/// Outcome of one mass step.
#[derive(Debug, Clone, Copy)]
struct Converged {
    state: HullState,
    power: PowerEstimate,
    fuel: FuelEstimate,
    volume: VolumeBudget,
}

struct Step {
    converged: Converged,
    next_displacement_t: f64,
}

pub(crate) struct Solver<'a> {
    resolved: Resolved<'a>,
    settings: &'a SolverSettings,
    started: Instant,
    iterations: usize,
    expansions: usize,
    expansion: ExpansionFactors,
    /// Target constraints, plus the block coefficient once the first pass converges.
    constraints: HullConstraints,
}

impl<'a> Solver<'a> {
    pub(crate) fn new(resolved: Resolved<'a>, settings: &'a SolverSettings) -> Self {
        let constraints = resolved.target.constraints.clone();
        Self {
            resolved,
            settings,
            started: Instant::now(),
            iterations: 0,
            expansions: 0,
            expansion: ExpansionFactors::default(),
            constraints,
        }
    }

    pub(crate) fn run(mut self) -> Result<DesignResult, SolverError> {
        let target = self.resolved.target;
        let _span = info_span!(
            "solve",
            ship = %target.ship_type,
            fuel = %target.fuel,
            speed_knots = target.speed_knots
        )
        .entered();
        self.drive(Phase::Seed)
    }

    fn drive(&mut self, mut phase: Phase) -> Result<DesignResult, SolverError> {
        loop {
            phase = match phase {
                Phase::Seed => self.seed(),
                Phase::MassConverge {
                    displacement_t,
                    cargo_t,
                } => self.converge_mass(displacement_t, cargo_t)?,
                Phase::Given(particulars) => self.evaluate_given(&particulars)?,
                Phase::VolumeCheck(converged) => self.check_volume(converged),
                Phase::Expand(converged) => self.expand(&converged)?,
                Phase::Finalize(converged) => return self.finalize(&converged),
            };
        }
    }

    fn seed(&self) -> Phase {
        let capacity = &self.resolved.target.capacity;
        if let Some(particulars) = capacity.fixed_hull() {
            return Phase::Given(*particulars);
        }
        let cargo_t = capacity.cargo_deadweight_t().unwrap_or_default();
        let displacement_t = self.resolved.ship.seed_displacement(cargo_t);
        info!(cargo_t, displacement_t, "seeded displacement");
        Phase::MassConverge {
            displacement_t,
            cargo_t,
        }
    }

    /// Power, weights and volume of a hull whose dimensions were given.
    fn evaluate_given(&mut self, particulars: &HullParticulars) -> Result<Phase, SolverError> {
        let dims = particulars
            .dimensions(self.resolved.ship)
            .map_err(|err| SolverError::InvalidTarget(TargetIssue::Constraint(err)))?;
        self.iterations += 1;
        let converged = self
            .evaluate(dims, dims.displacement_t)
            .map_err(|reason| self.failure(reason, None))?;
        let cargo_deadweight_t = converged.state.cargo_deadweight_t;
        if !(cargo_deadweight_t > 0.0) {
            return Err(SolverError::InvalidTarget(TargetIssue::NoCargoCapacity {
                cargo_deadweight_t,
            }));
        }
        info!(
            displacement_t = dims.displacement_t,
            cargo_deadweight_t, "given hull evaluated"
        );
        Ok(Phase::VolumeCheck(Box::new(converged)))
    }

    fn converge_mass(&mut self, mut displacement_t: f64, cargo_t: f64) -> Result<Phase, SolverError> {
        let tolerance_t = self.settings.tolerance * cargo_t;
        let mut last_state: Option<HullState> = None;
        let mut previous_change = f64::INFINITY;
        let mut growing = 0;

        for _ in 0..self.settings.max_iterations {
            if self
                .settings
                .deadline
                .is_some_and(|deadline| self.started.elapsed() >= deadline)
            {
                return Err(self.failure(ConvergenceReason::DeadlineExceeded, last_state));
            }
            self.iterations += 1;

            let step = self
                .step(displacement_t, cargo_t)
                .map_err(|reason| self.failure(reason, last_state))?;
            last_state = Some(step.converged.state);
            let next = step.next_displacement_t;
            if !next.is_finite() || next <= 0.0 {
                return Err(self.failure(ConvergenceReason::NonFinite, last_state));
            }

            let change = (next - displacement_t).abs();
            let relative = change / displacement_t;
            debug!(
                iteration = self.iterations,
                displacement_t,
                next_displacement_t = next,
                relative_change = relative,
                "mass iteration"
            );
            if change <= tolerance_t {
                info!(
                    iterations = self.iterations,
                    displacement_t,
                    length_m = step.converged.state.dimensions.length_m,
                    "mass converged"
                );
                return Ok(Phase::VolumeCheck(Box::new(step.converged)));
            }

            if relative > previous_change {
                growing += 1;
                if growing >= self.settings.divergence_window {
                    return Err(self.failure(ConvergenceReason::Diverging(growing), last_state));
                }
            } else {
                growing = 0;
            }
            previous_change = relative;
            displacement_t = next;
        }
        Err(self.failure(ConvergenceReason::IterationLimit, last_state))
    }

    /// Hull, power and bunker at `displacement_t`, and the displacement they imply.
    fn step(&self, displacement_t: f64, cargo_t: f64) -> Result<Step, ConvergenceReason> {
        let dims = dimensions_for_displacement(
            self.resolved.ship,
            displacement_t,
            self.resolved.target.speed_knots,
            &self.constraints,
            self.expansion,
        )
        .map_err(ConvergenceReason::Proportions)?;
        let converged = self.evaluate(dims, displacement_t)?;
        let state = &converged.state;
        let next_displacement_t = state.lightship.total_t + cargo_t + state.bunker_t + state.stores_t;
        Ok(Step {
            converged,
            next_displacement_t,
        })
    }

    fn evaluate(&self, dims: Dimensions, displacement_t: f64) -> Result<Converged, ConvergenceReason> {
        let Resolved {
            target,
            ship,
            fuel,
            route,
        } = &self.resolved;

        let geometry = dims.geometry();
        let propulsion = target.margins.context(fuel);
        let power = estimate_power(&PowerRequest {
            hull: &geometry,
            speed_knots: target.speed_knots,
            superstructure_height_m: ship.volume.superstructure_height_m,
            environment: &target.environment,
            devices: &target.devices,
            propulsion: &propulsion,
        })
        .map_err(ConvergenceReason::Resistance)?;
        if !(power.installed_power_kw.is_finite() && power.installed_power_kw >= 0.0) {
            return Err(ConvergenceReason::NonFinite);
        }

        let weights = lightship(ship, fuel, &dims, power.installed_power_kw);
        // Inputs were validated up front, so only a degenerate power curve can fail here.
        let fuel_estimate = estimate_fuel(&FuelRequest {
            fuel,
            power: PowerCurve {
                service_speed_knots: target.speed_knots,
                service_power_kw: power.service_power_kw,
                loaded_displacement_t: displacement_t,
                lightship_t: weights.total_t,
            },
            range_nm: target.range_nm,
            route: route.as_ref(),
            operation: &target.operation,
        })
        .map_err(|_| ConvergenceReason::NonFinite)?;

        let stores_t = stores_and_crew_t(displacement_t);
        let deadweight_t = displacement_t - weights.total_t;
        let cargo_deadweight_t = deadweight_t - fuel_estimate.bunker_mass_t - stores_t;
        let available_m3 = available_volume_m3(ship, &dims);
        let cargo_m3 = target.capacity.cargo_volume_m3(ship, cargo_deadweight_t);
        let state = HullState {
            dimensions: dims,
            lightship: weights,
            displacement_t,
            deadweight_t,
            cargo_deadweight_t,
            bunker_t: fuel_estimate.bunker_mass_t,
            stores_t,
            available_volume_m3: available_m3,
            expansion: self.expansion,
        };
        let volume = VolumeBudget {
            cargo_m3,
            tank_m3: fuel_estimate.tank_volume_m3,
            required_m3: cargo_m3 + fuel_estimate.tank_volume_m3,
            available_m3,
        };

        Ok(Converged {
            state,
            power,
            fuel: fuel_estimate,
            volume,
        })
    }

    fn check_volume(&self, converged: Box<Converged>) -> Phase {
        let volume = converged.volume;
        if volume.fits() {
            info!(
                required_m3 = volume.required_m3,
                available_m3 = volume.available_m3,
                "volume check passed"
            );
            Phase::Finalize(converged)
        } else {
            Phase::Expand(converged)
        }
    }

    /// Grow depth first, then breadth, by the volume shortfall.
    fn expand(&mut self, converged: &Converged) -> Result<Phase, SolverError> {
        let volume = converged.volume;
        let limits = &self.resolved.ship.expansion;
        let infeasible = SolverError::VolumeInfeasible {
            required_m3: volume.required_m3,
            available_m3: volume.available_m3,
            expansions: self.expansions,
        };
        // A given hull is never resized.
        let Some(cargo_t) = self.resolved.target.capacity.cargo_deadweight_t() else {
            return Err(infeasible);
        };
        if self.expansions >= self.settings.max_expansions {
            return Err(infeasible);
        }

        let factor = volume.required_m3 / volume.available_m3 * EXPANSION_OVERSHOOT;
        let current = self.expansion;
        let depth = (current.depth * factor).min(limits.max_depth_factor);
        let remaining = factor * current.depth / depth;
        let breadth = if remaining > 1.0 {
            (current.breadth * remaining).min(limits.max_breadth_factor)
        } else {
            current.breadth
        };
        if depth <= current.depth && breadth <= current.breadth {
            return Err(infeasible);
        }

        let block_coefficient = *self
            .constraints
            .block_coefficient
            .get_or_insert(converged.state.dimensions.block_coefficient);
        self.expansion = ExpansionFactors { depth, breadth };
        self.expansions += 1;
        warn!(
            expansion = self.expansions,
            shortfall_m3 = volume.required_m3 - volume.available_m3,
            depth_factor = depth,
            breadth_factor = breadth,
            block_coefficient,
            "hull too small for cargo and tanks, expanding"
        );
        Ok(Phase::MassConverge {
            displacement_t: converged.state.displacement_t,
            cargo_t,
        })
    }

    fn finalize(&self, converged: &Converged) -> Result<DesignResult, SolverError> {
        let Resolved {
            target, ship, fuel, ..
        } = &self.resolved;
        let state = converged.state;
        let dims = state.dimensions;

        let length_breadth = dims.length_breadth_ratio();
        let breadth_draft = dims.breadth_draft_ratio();
        let plausible = |value: f64, (low, high): (f64, f64)| (low..=high).contains(&value);
        if !(plausible(length_breadth, LENGTH_BREADTH_BOUNDS)
            && plausible(breadth_draft, BREADTH_DRAFT_BOUNDS))
        {
            return Err(self.failure(
                ConvergenceReason::ImplausibleProportions {
                    length_breadth,
                    breadth_draft,
                },
                Some(state),
            ));
        }

        let fuel_estimate = converged.fuel;
        let basis = CostBasis {
            length_m: dims.length_m,
            block_coefficient: dims.block_coefficient,
            steel_t: state.lightship.steel_t,
            outfit_t: state.lightship.outfit_t,
            lightship_t: state.lightship.total_t,
            installed_power_kw: converged.power.installed_power_kw,
            tank_volume_m3: fuel_estimate.tank_volume_m3,
            annual_energy_gj: fuel_estimate.annual.energy_gj,
            annual_co2_t: fuel_estimate.annual.co2_t,
            annual_voyages: fuel_estimate.annual.voyages,
            cargo_units_per_voyage: target.capacity.revenue_units(state.cargo_deadweight_t),
            unit: if target.capacity.is_teu() {
                FreightUnit::Teu
            } else {
                FreightUnit::Tonne
            },
        };
        let economics = evaluate(&basis, fuel, &target.finance).map_err(|err| match err {
            EconomicsError::RfrNotFound { low, high } => SolverError::RfrNotFound { low, high },
            other => SolverError::InvalidTarget(TargetIssue::Finance(other)),
        })?;

        let regulatory = assess(
            ship,
            &RegulatoryInput {
                deadweight_t: state.deadweight_t,
                speed_knots: target.speed_knots,
                installed_power_kw: converged.power.installed_power_kw,
                co2_factor: fuel.co2_factor,
                sfc_g_per_kwh: fuel_estimate.sfc_kg_per_kwh * 1_000.0,
                annual_co2_t: fuel_estimate.annual.co2_t,
                annual_distance_nm: fuel_estimate.annual.distance_nm,
            },
        )
        .map_err(|err| SolverError::InvalidTarget(TargetIssue::Regulatory(err)))?;

        info!(
            iterations = self.iterations,
            expansions = self.expansions,
            length_m = dims.length_m,
            installed_kw = converged.power.installed_power_kw,
            rfr = economics.required_freight_rate_usd,
            "design complete"
        );

        Ok(DesignResult {
            ship_type: target.ship_type.clone(),
            fuel: target.fuel.clone(),
            capacity: target.capacity.clone(),
            speed_knots: target.speed_knots,
            range_nm: target.range_nm,
            hull: state,
            power: PowerProfile {
                power: converged.power,
                fuel: fuel_estimate,
            },
            volume: converged.volume,
            economics,
            regulatory,
            estimated_teu_capacity: estimated_teu_capacity(dims.box_volume_m3()),
            iterations: self.iterations,
            volume_expansions: self.expansions,
        })
    }

    fn failure(&self, reason: ConvergenceReason, last_state: Option<HullState>) -> SolverError {
        SolverError::ConvergenceFailure {
            iterations: self.iterations,
            reason,
            last_state: last_state.map(Box::new),
        }
    }
}
