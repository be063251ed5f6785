//! Core units, constants, and shared primitives for the Ship Design Calculator workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity (m/s²).
    pub const G0: f64 = 9.80665;
    /// Sea water density (kg/m³).
    pub const SEAWATER_DENSITY_KG_M3: f64 = 1_025.0;
    /// Sea water density (t/m³), used for displacement.
    pub const SEAWATER_DENSITY_T_M3: f64 = 1.025;
    /// Kinematic viscosity of sea water at 15 °C (m²/s).
    pub const SEAWATER_KINEMATIC_VISCOSITY_M2_S: f64 = 1.188_31e-6;
    /// Air density at sea level (kg/m³).
    pub const AIR_DENSITY_KG_M3: f64 = 1.225;
    /// Metres per nautical mile.
    pub const METRES_PER_NAUTICAL_MILE: f64 = 1_852.0;
    /// Hours per day.
    pub const HOURS_PER_DAY: f64 = 24.0;
    /// Megajoules per kilowatt-hour.
    pub const MJ_PER_KWH: f64 = 3.6;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{METRES_PER_NAUTICAL_MILE, MJ_PER_KWH};

    /// Convert knots to metres per second.
    #[inline]
    pub fn knots_to_ms(v: f64) -> f64 {
        v * METRES_PER_NAUTICAL_MILE / 3_600.0
    }

    /// Convert metres per second to knots.
    #[inline]
    pub fn ms_to_knots(v: f64) -> f64 {
        v * 3_600.0 / METRES_PER_NAUTICAL_MILE
    }

    /// Convert watts to kilowatts.
    #[inline]
    pub fn w_to_kw(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert kilowatt-hours to gigajoules.
    #[inline]
    pub fn kwh_to_gj(v: f64) -> f64 {
        v * MJ_PER_KWH / 1_000.0
    }
}

/// Hydrodynamic similarity numbers.
pub mod similarity {
    use super::constants::{G0, SEAWATER_KINEMATIC_VISCOSITY_M2_S};

    /// Froude number for a speed (m/s) and waterline length (m).
    #[inline]
    pub fn froude_number(speed_m_s: f64, length_m: f64) -> f64 {
        speed_m_s / (G0 * length_m).sqrt()
    }

    /// Reynolds number in sea water.
    #[inline]
    pub fn reynolds_number(speed_m_s: f64, length_m: f64) -> f64 {
        speed_m_s * length_m / SEAWATER_KINEMATIC_VISCOSITY_M2_S
    }
}

/// Time value of money helpers shared by the economic and fuel models.
pub mod finance {
    /// Capital recovery factor `i(1+i)^n / ((1+i)^n - 1)`.
    ///
    /// A zero rate degenerates to straight-line repayment `1/n`.
    pub fn capital_recovery_factor(rate: f64, years: u32) -> f64 {
        if years == 0 {
            return 1.0;
        }
        if rate.abs() < 1e-12 {
            return 1.0 / years as f64;
        }
        let growth = (1.0 + rate).powi(years as i32);
        rate * growth / (growth - 1.0)
    }

    /// Annual sinking-fund deposit that accumulates to one unit after `years`.
    pub fn sinking_fund_factor(rate: f64, years: u32) -> f64 {
        if years == 0 {
            return 1.0;
        }
        if rate.abs() < 1e-12 {
            return 1.0 / years as f64;
        }
        rate / ((1.0 + rate).powi(years as i32) - 1.0)
    }
}
