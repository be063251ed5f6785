//! Voyage profiles made of speed/duration/load segments.

use serde::{Deserialize, Serialize};
use shipdes_config::RouteTemplate;
use shipdes_core::constants::HOURS_PER_DAY;

use crate::FuelModelError;

fn full_load() -> f64 {
    1.0
}

/// One leg of a voyage sailed at constant speed and loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub speed_knots: f64,
    pub duration_h: f64,
    /// Cargo carried as a fraction of design deadweight.
    #[serde(default = "full_load")]
    pub load_factor: f64,
}

impl RouteSegment {
    pub fn distance_nm(&self) -> f64 {
        self.speed_knots * self.duration_h
    }
}

/// Ordered voyage segments plus time alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProfile {
    pub segments: Vec<RouteSegment>,
    #[serde(default)]
    pub port_days: f64,
}

/// Leg speeds as fractions of the cruise speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegSpeedFractions {
    pub open_ocean: f64,
    pub canal: f64,
    pub port_approach: f64,
}

impl Default for LegSpeedFractions {
    fn default() -> Self {
        Self {
            open_ocean: 1.0,
            canal: 0.2,
            port_approach: 0.1,
        }
    }
}

impl RouteProfile {
    /// Round trip over a route template: laden outbound, `return_load_factor` back.
    pub fn port_to_port(
        template: &RouteTemplate,
        cruise_speed_knots: f64,
        speeds: &LegSpeedFractions,
        return_load_factor: f64,
    ) -> Result<Self, FuelModelError> {
        if !(cruise_speed_knots > 0.0) {
            return Err(FuelModelError::InvalidRoute("cruise speed must be positive"));
        }
        for fraction in [speeds.open_ocean, speeds.canal, speeds.port_approach] {
            if !(fraction > 0.0 && fraction <= 1.5) {
                return Err(FuelModelError::InvalidRoute(
                    "leg speed fractions must lie in (0, 1.5]",
                ));
            }
        }
        let legs = [
            (template.port_approach_nm, speeds.port_approach),
            (template.canal_nm, speeds.canal),
            (template.open_ocean_nm, speeds.open_ocean),
        ];
        let mut segments = Vec::with_capacity(6);
        for load_factor in [1.0, return_load_factor] {
            for (distance, fraction) in legs {
                if distance <= 0.0 {
                    continue;
                }
                let speed_knots = cruise_speed_knots * fraction;
                segments.push(RouteSegment {
                    speed_knots,
                    duration_h: distance / speed_knots,
                    load_factor,
                });
            }
        }
        let profile = Self {
            segments,
            port_days: template.port_days(),
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn distance_nm(&self) -> f64 {
        self.segments.iter().map(RouteSegment::distance_nm).sum()
    }

    pub fn duration_h(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_h).sum()
    }

    /// Days per voyage including time in port.
    pub fn voyage_days(&self) -> f64 {
        self.duration_h() / HOURS_PER_DAY + self.port_days
    }

    pub fn validate(&self) -> Result<(), FuelModelError> {
        if self.segments.is_empty() {
            return Err(FuelModelError::InvalidRoute("route has no segments"));
        }
        for segment in &self.segments {
            if !(segment.speed_knots > 0.0 && segment.speed_knots.is_finite()) {
                return Err(FuelModelError::InvalidRoute("segment speed must be positive"));
            }
            if !(segment.duration_h > 0.0 && segment.duration_h.is_finite()) {
                return Err(FuelModelError::InvalidRoute(
                    "segment duration must be positive",
                ));
            }
            if !(0.0..=1.0).contains(&segment.load_factor) {
                return Err(FuelModelError::InvalidRoute(
                    "segment load factor must lie in [0, 1]",
                ));
            }
        }
        if !(self.port_days >= 0.0 && self.port_days.is_finite()) {
            return Err(FuelModelError::InvalidRoute("port days must be non-negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdes_config::Registries;

    #[test]
    fn round_trip_covers_route_twice() {
        let template = Registries::builtin()
            .routes
            .get("southampton_singapore")
            .expect("bundled route");
        let profile =
            RouteProfile::port_to_port(template, 15.0, &LegSpeedFractions::default(), 0.0)
                .expect("route builds");
        assert_eq!(profile.segments.len(), 6);
        assert!((profile.distance_nm() - 16_000.0).abs() < 1e-6);
        assert_eq!(profile.port_days, 4.0);
        // 7780 nm at 15 kn, 120 nm at 3 kn, 100 nm at 1.5 kn, each way.
        let expected_h = 2.0 * (7_780.0 / 15.0 + 120.0 / 3.0 + 100.0 / 1.5);
        assert!((profile.duration_h() - expected_h).abs() < 1e-9);
        assert_eq!(profile.segments[3].load_factor, 0.0);
    }

    #[test]
    fn routes_without_canal_skip_the_leg() {
        let template = Registries::builtin()
            .routes
            .get("houston_rotterdam")
            .expect("bundled route");
        let profile =
            RouteProfile::port_to_port(template, 14.0, &LegSpeedFractions::default(), 1.0)
                .expect("route builds");
        assert_eq!(profile.segments.len(), 4);
    }

    #[test]
    fn empty_route_is_invalid() {
        let profile = RouteProfile {
            segments: Vec::new(),
            port_days: 1.0,
        };
        assert!(matches!(
            profile.validate(),
            Err(FuelModelError::InvalidRoute(_))
        ));
    }
}
