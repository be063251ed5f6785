//! Calm-water resistance and propulsion power estimates.
//!
//! Total resistance is assembled from ITTC-1957 friction with a form factor,
//! a roughness allowance, a Froude-number wave-making regression and still-air
//! windage. A shallow-water speed-loss correction is applied below a
//! depth/draft threshold. Power follows from an actuator-disk propeller
//! estimate combined with hull efficiency, then energy saving devices and
//! service margins.

use serde::{Deserialize, Serialize};
use shipdes_core::constants::{AIR_DENSITY_KG_M3, G0, SEAWATER_DENSITY_KG_M3};
use shipdes_core::similarity::{froude_number, reynolds_number};
use shipdes_core::units::{knots_to_ms, w_to_kw};
use thiserror::Error;

/// Froude numbers outside this band are beyond the wave regression.
pub const FROUDE_RANGE: (f64, f64) = (0.05, 0.45);
/// Depth/draft ratio below which the shallow-water correction applies.
pub const SHALLOW_WATER_THRESHOLD: f64 = 4.0;
const WAVE_COEFFICIENT: f64 = 0.15;
const AIR_DRAG_COEFFICIENT: f64 = 0.8;
const PROPELLER_LOSS_FACTOR: f64 = 0.80;

/// Moulded hull geometry at the design waterline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HullGeometry {
    pub length_m: f64,
    pub breadth_m: f64,
    pub draft_m: f64,
    pub depth_m: f64,
    pub block_coefficient: f64,
}

impl HullGeometry {
    /// Displaced volume (m³).
    pub fn displaced_volume_m3(&self) -> f64 {
        self.length_m * self.breadth_m * self.draft_m * self.block_coefficient
    }

    /// Denny-Mumford wetted surface estimate (m²).
    pub fn wetted_surface_m2(&self) -> f64 {
        1.7 * self.length_m * self.draft_m + self.displaced_volume_m3() / self.draft_m
    }

    /// Midship section coefficient from the block coefficient (Kerlen).
    pub fn midship_coefficient(&self) -> f64 {
        (1.006 - 0.0056 * self.block_coefficient.powf(-3.56)).clamp(0.9, 1.0)
    }
}

/// Operating environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Water depth; `None` for deep water.
    pub water_depth_m: Option<f64>,
    /// Mean apparent hull roughness (µm).
    pub hull_roughness_um: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            water_depth_m: None,
            hull_roughness_um: 150.0,
        }
    }
}

/// Optional energy saving devices, each a fractional power reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergySavingDevices {
    pub air_lubrication: f64,
    pub wind_assist: f64,
    /// Upper bound on the combined reduction.
    pub ceiling: f64,
}

impl Default for EnergySavingDevices {
    fn default() -> Self {
        Self {
            air_lubrication: 0.0,
            wind_assist: 0.0,
            ceiling: 0.30,
        }
    }
}

impl EnergySavingDevices {
    /// Combined fractional reduction, clamped at the ceiling.
    pub fn total_reduction(&self) -> f64 {
        (self.air_lubrication + self.wind_assist).min(self.ceiling)
    }

    pub fn validate(&self) -> Result<(), ResistanceError> {
        for (device, value) in [
            ("air_lubrication", self.air_lubrication),
            ("wind_assist", self.wind_assist),
            ("ceiling", self.ceiling),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ResistanceError::InvalidDeviceFraction { device, value });
            }
        }
        Ok(())
    }
}

/// Propeller and powertrain assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropulsionContext {
    /// Brake power to delivered power.
    pub transmission_efficiency: f64,
    /// Propeller diameter as a fraction of draft.
    pub propeller_diameter_ratio: f64,
    /// Added power for weather and fouling in service.
    pub sea_margin: f64,
    /// Installed power margin over service power.
    pub engine_margin: f64,
}

impl Default for PropulsionContext {
    fn default() -> Self {
        Self {
            transmission_efficiency: 0.98,
            propeller_diameter_ratio: 0.65,
            sea_margin: 0.15,
            engine_margin: 0.15,
        }
    }
}

/// Request to estimate power at one speed.
#[derive(Debug, Clone)]
pub struct PowerRequest<'a> {
    pub hull: &'a HullGeometry,
    pub speed_knots: f64,
    /// Height of superstructure and deck cargo above the main deck (m).
    pub superstructure_height_m: f64,
    pub environment: &'a Environment,
    pub devices: &'a EnergySavingDevices,
    pub propulsion: &'a PropulsionContext,
}

/// Resistance components in newtons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResistanceBreakdown {
    pub frictional_n: f64,
    pub roughness_n: f64,
    pub wave_n: f64,
    pub air_n: f64,
    pub shallow_water_factor: f64,
    pub total_n: f64,
}

/// Power chain from effective to installed power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerEstimate {
    pub froude_number: f64,
    pub reynolds_number: f64,
    pub resistance: ResistanceBreakdown,
    pub effective_power_kw: f64,
    pub wake_fraction: f64,
    pub thrust_deduction: f64,
    pub open_water_efficiency: f64,
    pub hull_efficiency: f64,
    pub propulsive_efficiency: f64,
    pub device_reduction: f64,
    pub delivered_power_kw: f64,
    pub brake_power_kw: f64,
    pub service_power_kw: f64,
    pub installed_power_kw: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResistanceError {
    #[error("hull geometry must be finite and positive ({0})")]
    InvalidGeometry(&'static str),
    #[error("speed must be positive, got {0} kn")]
    InvalidSpeed(f64),
    #[error("Froude number {froude:.3} outside regression range {min}..{max}")]
    FroudeOutOfRange { froude: f64, min: f64, max: f64 },
    #[error("energy saving device `{device}` fraction {value} outside [0, 1)")]
    InvalidDeviceFraction { device: &'static str, value: f64 },
    #[error("transmission efficiency must lie in (0, 1], got {0}")]
    InvalidEfficiency(f64),
}

/// ITTC-1957 model-ship correlation line.
pub fn ittc_friction_coefficient(reynolds: f64) -> f64 {
    let log_re = reynolds.log10();
    0.075 / ((log_re - 2.0) * (log_re - 2.0))
}

/// Roughness allowance (Bowden-Davison) for a hull roughness in µm.
pub fn roughness_allowance(length_m: f64, reynolds: f64, roughness_um: f64) -> f64 {
    let ks = roughness_um * 1e-6;
    (0.044 * ((ks / length_m).cbrt() - 10.0 * reynolds.powf(-1.0 / 3.0)) + 0.000_125).max(0.0)
}

/// Form factor `1 + k` after Conn and Ferguson.
pub fn form_factor(hull: &HullGeometry) -> f64 {
    let phi =
        hull.block_coefficient / hull.length_m * (2.0 * hull.draft_m * hull.breadth_m).sqrt();
    1.0 + 0.6 * phi + 75.0 * phi.powi(3)
}

/// Taylor-type wake fraction regression on block coefficient.
pub fn wake_fraction(block_coefficient: f64) -> f64 {
    let cb = block_coefficient;
    (1.1 - 3.4 * cb + 3.1 * cb.powf(1.9)).clamp(0.05, 0.6)
}

/// Multiplier on hydrodynamic resistance for restricted depth (Lackenby speed loss).
pub fn shallow_water_factor(hull: &HullGeometry, speed_m_s: f64, water_depth_m: Option<f64>) -> f64 {
    let Some(depth) = water_depth_m else {
        return 1.0;
    };
    if depth / hull.draft_m >= SHALLOW_WATER_THRESHOLD {
        return 1.0;
    }
    let midship_area = hull.breadth_m * hull.draft_m * hull.midship_coefficient();
    let depth_froude_term = (G0 * depth / (speed_m_s * speed_m_s)).tanh().sqrt();
    let speed_loss =
        (0.1242 * (midship_area / (depth * depth) - 0.05) + 1.0 - depth_froude_term).clamp(0.0, 0.5);
    1.0 / ((1.0 - speed_loss) * (1.0 - speed_loss))
}

fn validate_hull(hull: &HullGeometry) -> Result<(), ResistanceError> {
    let checks = [
        (hull.length_m, "length"),
        (hull.breadth_m, "breadth"),
        (hull.draft_m, "draft"),
        (hull.depth_m, "depth"),
        (hull.block_coefficient, "block coefficient"),
    ];
    for (value, name) in checks {
        if !value.is_finite() || value <= 0.0 {
            return Err(ResistanceError::InvalidGeometry(name));
        }
    }
    if hull.block_coefficient >= 1.0 {
        return Err(ResistanceError::InvalidGeometry("block coefficient"));
    }
    Ok(())
}

/// Calm-water resistance at a speed.
pub fn calm_water_resistance(
    hull: &HullGeometry,
    speed_knots: f64,
    superstructure_height_m: f64,
    environment: &Environment,
) -> Result<ResistanceBreakdown, ResistanceError> {
    validate_hull(hull)?;
    if !speed_knots.is_finite() || speed_knots <= 0.0 {
        return Err(ResistanceError::InvalidSpeed(speed_knots));
    }
    let v = knots_to_ms(speed_knots);
    let froude = froude_number(v, hull.length_m);
    let (min, max) = FROUDE_RANGE;
    if !(min..=max).contains(&froude) {
        return Err(ResistanceError::FroudeOutOfRange { froude, min, max });
    }
    let reynolds = reynolds_number(v, hull.length_m);

    let dynamic_pressure = 0.5 * SEAWATER_DENSITY_KG_M3 * v * v;
    let wetted = hull.wetted_surface_m2();
    let frictional = dynamic_pressure * wetted * ittc_friction_coefficient(reynolds) * form_factor(hull);
    let roughness = dynamic_pressure
        * wetted
        * roughness_allowance(hull.length_m, reynolds, environment.hull_roughness_um);

    let cb = hull.block_coefficient;
    let wave_coefficient =
        WAVE_COEFFICIENT * cb * cb * froude.powi(4) * (1.0 + 20.0 * froude * froude);
    let wave = SEAWATER_DENSITY_KG_M3 * G0 * hull.displaced_volume_m3() * wave_coefficient;

    let freeboard = (hull.depth_m - hull.draft_m).max(0.0);
    let frontal_area = hull.breadth_m * (freeboard + superstructure_height_m.max(0.0));
    let air = 0.5 * AIR_DENSITY_KG_M3 * AIR_DRAG_COEFFICIENT * frontal_area * v * v;

    let shallow = shallow_water_factor(hull, v, environment.water_depth_m);
    let total = (frictional + roughness + wave) * shallow + air;

    Ok(ResistanceBreakdown {
        frictional_n: frictional,
        roughness_n: roughness,
        wave_n: wave,
        air_n: air,
        shallow_water_factor: shallow,
        total_n: total,
    })
}

/// Estimate effective, delivered, brake, service and installed power.
pub fn estimate_power(request: &PowerRequest<'_>) -> Result<PowerEstimate, ResistanceError> {
    request.devices.validate()?;
    let transmission = request.propulsion.transmission_efficiency;
    if !(transmission > 0.0 && transmission <= 1.0) {
        return Err(ResistanceError::InvalidEfficiency(transmission));
    }
    let hull = request.hull;
    let resistance = calm_water_resistance(
        hull,
        request.speed_knots,
        request.superstructure_height_m,
        request.environment,
    )?;

    let v = knots_to_ms(request.speed_knots);
    let effective_power_kw = w_to_kw(resistance.total_n * v);

    let wake = wake_fraction(hull.block_coefficient);
    let thrust_deduction = 0.6 * wake;
    let hull_efficiency = (1.0 - thrust_deduction) / (1.0 - wake);

    let thrust = resistance.total_n / (1.0 - thrust_deduction);
    let advance_speed = v * (1.0 - wake);
    let diameter = request.propulsion.propeller_diameter_ratio * hull.draft_m;
    let disk_area = std::f64::consts::FRAC_PI_4 * diameter * diameter;
    let thrust_loading =
        thrust / (0.5 * SEAWATER_DENSITY_KG_M3 * advance_speed * advance_speed * disk_area);
    let ideal_efficiency = 2.0 / (1.0 + (1.0 + thrust_loading).sqrt());
    let open_water_efficiency = PROPELLER_LOSS_FACTOR * ideal_efficiency;
    let propulsive_efficiency = open_water_efficiency * hull_efficiency;

    let device_reduction = request.devices.total_reduction();
    let delivered_power_kw = effective_power_kw / propulsive_efficiency * (1.0 - device_reduction);
    let brake_power_kw = delivered_power_kw / transmission;
    let service_power_kw = brake_power_kw * (1.0 + request.propulsion.sea_margin);
    let installed_power_kw = service_power_kw * (1.0 + request.propulsion.engine_margin);

    Ok(PowerEstimate {
        froude_number: froude_number(v, hull.length_m),
        reynolds_number: reynolds_number(v, hull.length_m),
        resistance,
        effective_power_kw,
        wake_fraction: wake,
        thrust_deduction,
        open_water_efficiency,
        hull_efficiency,
        propulsive_efficiency,
        device_reduction,
        delivered_power_kw,
        brake_power_kw,
        service_power_kw,
        installed_power_kw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tanker() -> HullGeometry {
        HullGeometry {
            length_m: 200.0,
            breadth_m: 31.0,
            draft_m: 11.5,
            depth_m: 14.8,
            block_coefficient: 0.82,
        }
    }

    fn request<'a>(
        hull: &'a HullGeometry,
        speed: f64,
        environment: &'a Environment,
        devices: &'a EnergySavingDevices,
        propulsion: &'a PropulsionContext,
    ) -> PowerRequest<'a> {
        PowerRequest {
            hull,
            speed_knots: speed,
            superstructure_height_m: 15.0,
            environment,
            devices,
            propulsion,
        }
    }

    #[test]
    fn ittc_line_at_one_billion() {
        let cf = ittc_friction_coefficient(1.0e9);
        assert!((cf - 0.075 / 49.0).abs() < 1e-12);
    }

    #[test]
    fn tanker_power_is_plausible() {
        let hull = tanker();
        let env = Environment::default();
        let devices = EnergySavingDevices::default();
        let prop = PropulsionContext::default();
        let estimate = estimate_power(&request(&hull, 14.0, &env, &devices, &prop))
            .expect("tanker at 14 kn is within range");
        assert!(
            (3_000.0..15_000.0).contains(&estimate.service_power_kw),
            "service power {} kW",
            estimate.service_power_kw
        );
        assert!(estimate.resistance.frictional_n > estimate.resistance.wave_n);
        assert!(
            (0.5..0.95).contains(&estimate.propulsive_efficiency),
            "QPC {}",
            estimate.propulsive_efficiency
        );
        assert!(estimate.installed_power_kw > estimate.service_power_kw);
    }

    #[test]
    fn power_rises_with_speed() {
        let hull = tanker();
        let env = Environment::default();
        let devices = EnergySavingDevices::default();
        let prop = PropulsionContext::default();
        let mut last = 0.0;
        for speed in [10.0, 12.0, 14.0, 16.0, 18.0] {
            let p = estimate_power(&request(&hull, speed, &env, &devices, &prop))
                .expect("in range")
                .brake_power_kw;
            assert!(p > last, "power at {speed} kn did not increase");
            last = p;
        }
    }

    #[test]
    fn froude_outside_regression_is_rejected() {
        let hull = tanker();
        let err = calm_water_resistance(&hull, 45.0, 15.0, &Environment::default())
            .expect_err("45 kn is far outside the regression");
        assert!(matches!(err, ResistanceError::FroudeOutOfRange { .. }));
    }

    #[test]
    fn device_reductions_are_clamped_at_ceiling() {
        let hull = tanker();
        let env = Environment::default();
        let prop = PropulsionContext::default();
        let none = EnergySavingDevices::default();
        let heavy = EnergySavingDevices {
            air_lubrication: 0.25,
            wind_assist: 0.25,
            ceiling: 0.30,
        };
        let base = estimate_power(&request(&hull, 14.0, &env, &none, &prop)).expect("base");
        let reduced = estimate_power(&request(&hull, 14.0, &env, &heavy, &prop)).expect("esd");
        assert!((reduced.device_reduction - 0.30).abs() < 1e-12);
        let ratio = reduced.delivered_power_kw / base.delivered_power_kw;
        assert!((ratio - 0.70).abs() < 1e-9, "ratio {ratio}");
    }

    #[test]
    fn device_fraction_of_one_is_invalid() {
        let devices = EnergySavingDevices {
            air_lubrication: 1.0,
            ..EnergySavingDevices::default()
        };
        assert!(matches!(
            devices.validate(),
            Err(ResistanceError::InvalidDeviceFraction { device: "air_lubrication", .. })
        ));
    }

    #[test]
    fn shallow_water_increases_resistance() {
        let hull = tanker();
        let deep = calm_water_resistance(&hull, 14.0, 15.0, &Environment::default())
            .expect("deep water");
        let shallow_env = Environment {
            water_depth_m: Some(25.0),
            ..Environment::default()
        };
        let shallow = calm_water_resistance(&hull, 14.0, 15.0, &shallow_env).expect("shallow");
        assert!(shallow.shallow_water_factor > 1.0);
        assert!(shallow.total_n > deep.total_n);
        assert_eq!(deep.shallow_water_factor, 1.0);
    }

    #[test]
    fn rougher_hull_needs_more_power() {
        let hull = tanker();
        let smooth = calm_water_resistance(&hull, 14.0, 15.0, &Environment::default())
            .expect("smooth");
        let fouled_env = Environment {
            hull_roughness_um: 600.0,
            ..Environment::default()
        };
        let fouled = calm_water_resistance(&hull, 14.0, 15.0, &fouled_env).expect("fouled");
        assert!(fouled.roughness_n > smooth.roughness_n);
    }

    #[test]
    fn invalid_geometry_is_named() {
        let mut hull = tanker();
        hull.draft_m = 0.0;
        let err = calm_water_resistance(&hull, 14.0, 15.0, &Environment::default())
            .expect_err("zero draft");
        assert_eq!(err, ResistanceError::InvalidGeometry("draft"));
    }
}
