//! Design targets and their validation against the catalogs.

use serde::{Deserialize, Serialize};
use shipdes_config::{FuelConfig, Registries, ShipConfig};
use shipdes_economics::{EconomicsError, FinancialAssumptions};
use shipdes_hull::{CapacityTarget, HullConstraints, HullError};
use shipdes_propulsion::{FuelModelError, LegSpeedFractions, OperatingProfile, RouteProfile};
use shipdes_regulatory::RegulatoryError;
use shipdes_resistance::{EnergySavingDevices, Environment, PropulsionContext, ResistanceError};
use thiserror::Error;

/// Why a target was rejected before iteration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TargetIssue {
    #[error("unknown ship type `{0}`")]
    UnknownShipType(String),
    #[error("unknown fuel `{0}`")]
    UnknownFuel(String),
    #[error("unknown route `{0}`")]
    UnknownRoute(String),
    #[error("ship type `{0}` does not take a TEU target")]
    TeuNotSupported(String),
    #[error("{what} {value} outside the {low}..{high} range for `{ship_type}`")]
    CapacityOutOfRange {
        ship_type: String,
        what: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("given hull leaves no cargo deadweight ({cargo_deadweight_t:.0} t)")]
    NoCargoCapacity { cargo_deadweight_t: f64 },
    #[error("invalid margin: {0}")]
    InvalidMargin(&'static str),
    #[error(transparent)]
    Constraint(#[from] HullError),
    #[error(transparent)]
    Devices(#[from] ResistanceError),
    #[error(transparent)]
    FuelModel(#[from] FuelModelError),
    #[error(transparent)]
    Finance(#[from] EconomicsError),
    #[error(transparent)]
    Regulatory(#[from] RegulatoryError),
}

fn default_diameter_ratio() -> f64 {
    0.65
}

fn default_margin() -> f64 {
    0.15
}

/// Propeller size and power margins; transmission losses come from the fuel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerMargins {
    #[serde(default = "default_diameter_ratio")]
    pub propeller_diameter_ratio: f64,
    #[serde(default = "default_margin")]
    pub sea_margin: f64,
    #[serde(default = "default_margin")]
    pub engine_margin: f64,
}

impl Default for PowerMargins {
    fn default() -> Self {
        Self {
            propeller_diameter_ratio: default_diameter_ratio(),
            sea_margin: default_margin(),
            engine_margin: default_margin(),
        }
    }
}

impl PowerMargins {
    pub(crate) fn context(&self, fuel: &FuelConfig) -> PropulsionContext {
        PropulsionContext {
            transmission_efficiency: fuel.transmission_efficiency,
            propeller_diameter_ratio: self.propeller_diameter_ratio,
            sea_margin: self.sea_margin,
            engine_margin: self.engine_margin,
        }
    }

    fn validate(&self) -> Result<(), TargetIssue> {
        if !(self.propeller_diameter_ratio > 0.0 && self.propeller_diameter_ratio <= 1.0) {
            return Err(TargetIssue::InvalidMargin(
                "propeller diameter ratio must lie in (0, 1]",
            ));
        }
        if !((0.0..=1.0).contains(&self.sea_margin) && (0.0..=1.0).contains(&self.engine_margin)) {
            return Err(TargetIssue::InvalidMargin("sea and engine margins must lie in [0, 1]"));
        }
        Ok(())
    }
}

fn default_return_load() -> f64 {
    0.0
}

/// Voyage pattern used for annual consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteSpec {
    /// Explicit speed/duration/load segments.
    Segments(RouteProfile),
    /// Round trip over a catalog route at the design speed.
    PortToPort {
        route: String,
        #[serde(default)]
        speeds: LegSpeedFractions,
        #[serde(default = "default_return_load")]
        return_load_factor: f64,
    },
}

/// Everything the solver needs to size one ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignTarget {
    pub ship_type: String,
    pub fuel: String,
    pub capacity: CapacityTarget,
    pub speed_knots: f64,
    pub range_nm: f64,
    #[serde(default)]
    pub route: Option<RouteSpec>,
    #[serde(default)]
    pub constraints: HullConstraints,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub devices: EnergySavingDevices,
    #[serde(default)]
    pub margins: PowerMargins,
    #[serde(default)]
    pub operation: OperatingProfile,
    #[serde(default)]
    pub finance: FinancialAssumptions,
}

impl DesignTarget {
    /// A target with default environment, margins, operation and finance.
    pub fn new(
        ship_type: impl Into<String>,
        fuel: impl Into<String>,
        capacity: CapacityTarget,
        speed_knots: f64,
        range_nm: f64,
    ) -> Self {
        Self {
            ship_type: ship_type.into(),
            fuel: fuel.into(),
            capacity,
            speed_knots,
            range_nm,
            route: None,
            constraints: HullConstraints::default(),
            environment: Environment::default(),
            devices: EnergySavingDevices::default(),
            margins: PowerMargins::default(),
            operation: OperatingProfile::default(),
            finance: FinancialAssumptions::default(),
        }
    }

    /// Check the target and look up its catalog entries.
    pub fn resolve<'a>(&'a self, registries: &'a Registries) -> Result<Resolved<'a>, TargetIssue> {
        let ship = registries
            .ships
            .get(&self.ship_type)
            .ok_or_else(|| TargetIssue::UnknownShipType(self.ship_type.clone()))?;
        let fuel = registries
            .fuels
            .get(&self.fuel)
            .ok_or_else(|| TargetIssue::UnknownFuel(self.fuel.clone()))?;

        for (field, value) in [("speed", self.speed_knots), ("range", self.range_nm)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(TargetIssue::NonPositive { field, value });
            }
        }
        self.check_capacity(ship)?;
        self.constraints.validate()?;
        self.devices.validate()?;
        if let Some(depth) = self.environment.water_depth_m {
            if !(depth > 0.0 && depth.is_finite()) {
                return Err(TargetIssue::NonPositive {
                    field: "water depth",
                    value: depth,
                });
            }
        }
        if !(self.environment.hull_roughness_um >= 0.0 && self.environment.hull_roughness_um.is_finite()) {
            return Err(TargetIssue::NonPositive {
                field: "hull roughness",
                value: self.environment.hull_roughness_um,
            });
        }
        self.margins.validate()?;
        self.operation.validate()?;
        self.finance.validate()?;

        let route = match &self.route {
            None => None,
            Some(RouteSpec::Segments(profile)) => {
                profile.validate()?;
                Some(profile.clone())
            }
            Some(RouteSpec::PortToPort {
                route,
                speeds,
                return_load_factor,
            }) => {
                let template = registries
                    .routes
                    .get(route)
                    .ok_or_else(|| TargetIssue::UnknownRoute(route.clone()))?;
                let profile = RouteProfile::port_to_port(
                    template,
                    self.speed_knots,
                    speeds,
                    *return_load_factor,
                )?;
                profile.validate()?;
                Some(profile)
            }
        };

        Ok(Resolved {
            target: self,
            ship,
            fuel,
            route,
        })
    }

    fn check_capacity(&self, ship: &ShipConfig) -> Result<(), TargetIssue> {
        let out_of_range = |what, value, [low, high]: [f64; 2]| TargetIssue::CapacityOutOfRange {
            ship_type: ship.key.clone(),
            what,
            value,
            low,
            high,
        };
        match self.capacity {
            CapacityTarget::Deadweight { tonnes } => {
                if !(tonnes > 0.0 && tonnes.is_finite()) {
                    return Err(TargetIssue::NonPositive {
                        field: "deadweight",
                        value: tonnes,
                    });
                }
                if !ship.accepts_deadweight(tonnes) {
                    return Err(out_of_range("deadweight", tonnes, ship.deadweight_range_t));
                }
            }
            CapacityTarget::Teu {
                teu,
                mean_teu_mass_t,
            } => {
                let Some(range) = ship.teu_range else {
                    return Err(TargetIssue::TeuNotSupported(ship.key.clone()));
                };
                for (field, value) in [("TEU", teu), ("mean TEU mass", mean_teu_mass_t)] {
                    if !(value > 0.0 && value.is_finite()) {
                        return Err(TargetIssue::NonPositive { field, value });
                    }
                }
                if !ship.accepts_teu(teu) {
                    return Err(out_of_range("TEU", teu, range));
                }
            }
            CapacityTarget::Dimensions(particulars) => {
                particulars.validate()?;
                if self.constraints != HullConstraints::default() {
                    return Err(TargetIssue::Constraint(HullError::InvalidConstraint(
                        "proportion constraints do not apply to given dimensions",
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A validated target with its catalog entries.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub target: &'a DesignTarget,
    pub ship: &'a ShipConfig,
    pub fuel: &'a FuelConfig,
    pub route: Option<RouteProfile>,
}
