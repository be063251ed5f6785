//! Ship economics: building cost, running cost and the required freight rate.
//!
//! The required freight rate (RFR) is the revenue per cargo unit at which the
//! net present value of the ship over its loan term is zero. It is found with
//! a bracketed bisection so that non-linear cost terms can be added without
//! changing the solution method.

use serde::{Deserialize, Serialize};
use shipdes_config::FuelConfig;
use shipdes_core::finance::{capital_recovery_factor, sinking_fund_factor};
use thiserror::Error;
use tracing::debug;

/// Rate interval searched for the required freight rate (USD per unit).
pub const RFR_BRACKET: (f64, f64) = (0.0, 1.0e6);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomicsError {
    #[error("invalid financial assumption: {0}")]
    InvalidAssumption(&'static str),
    #[error("invalid cost basis: {0}")]
    InvalidBasis(&'static str),
    #[error("no freight rate in [{low}, {high}] USD/unit brings the NPV to zero")]
    RfrNotFound { low: f64, high: f64 },
}

/// Shipyard cost coefficients for hull steel and outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalCostFactors {
    pub steel_usd: f64,
    pub steel_usd_per_t: f64,
    pub outfit_usd: f64,
    pub outfit_usd_per_t: f64,
}

impl Default for CapitalCostFactors {
    fn default() -> Self {
        Self {
            steel_usd: 4_000.0,
            steel_usd_per_t: 900.0,
            outfit_usd: 40_000.0,
            outfit_usd_per_t: 6_000.0,
        }
    }
}

/// Fixed annual running costs (USD/yr) and CAPEX-proportional shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingCostFactors {
    pub crew_usd: f64,
    pub maintenance_fraction: f64,
    pub insurance_fraction: f64,
    pub port_and_admin_usd: f64,
    pub stores_usd: f64,
    pub overhead_usd: f64,
}

impl Default for OperatingCostFactors {
    fn default() -> Self {
        Self {
            crew_usd: 3.0e6,
            maintenance_fraction: 0.05,
            insurance_fraction: 0.01,
            port_and_admin_usd: 1.5e6,
            stores_usd: 0.5e6,
            overhead_usd: 1.25e6,
        }
    }
}

/// Financing and market assumptions for a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialAssumptions {
    pub interest_rate: f64,
    /// Loan term, also used as the evaluation horizon.
    pub loan_term_years: u32,
    /// Overrides the catalog energy price when set (USD/GJ).
    pub fuel_price_usd_per_gj: Option<f64>,
    pub carbon_price_usd_per_t: f64,
    pub scrap_value_usd_per_t: f64,
    pub capital: CapitalCostFactors,
    pub operating: OperatingCostFactors,
}

impl Default for FinancialAssumptions {
    fn default() -> Self {
        Self {
            interest_rate: 0.10,
            loan_term_years: 15,
            fuel_price_usd_per_gj: None,
            carbon_price_usd_per_t: 100.0,
            scrap_value_usd_per_t: 400.0,
            capital: CapitalCostFactors::default(),
            operating: OperatingCostFactors::default(),
        }
    }
}

impl FinancialAssumptions {
    pub fn validate(&self) -> Result<(), EconomicsError> {
        if !(self.interest_rate > -1.0 && self.interest_rate.is_finite()) {
            return Err(EconomicsError::InvalidAssumption(
                "interest rate must be finite and above -100 %",
            ));
        }
        if self.loan_term_years == 0 {
            return Err(EconomicsError::InvalidAssumption("loan term must be at least one year"));
        }
        if self
            .fuel_price_usd_per_gj
            .is_some_and(|price| !(price >= 0.0 && price.is_finite()))
        {
            return Err(EconomicsError::InvalidAssumption("fuel price must be non-negative"));
        }
        let capital = &self.capital;
        let operating = &self.operating;
        let amounts = [
            self.carbon_price_usd_per_t,
            self.scrap_value_usd_per_t,
            capital.steel_usd,
            capital.steel_usd_per_t,
            capital.outfit_usd,
            capital.outfit_usd_per_t,
            operating.crew_usd,
            operating.maintenance_fraction,
            operating.insurance_fraction,
            operating.port_and_admin_usd,
            operating.stores_usd,
            operating.overhead_usd,
        ];
        if amounts.iter().any(|v| !(*v >= 0.0 && v.is_finite())) {
            return Err(EconomicsError::InvalidAssumption(
                "cost factors and prices must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Price paid per GJ of fuel energy for a technology.
    pub fn energy_price_usd_per_gj(&self, fuel: &FuelConfig) -> f64 {
        self.fuel_price_usd_per_gj.unwrap_or(fuel.energy_price_usd_per_gj)
    }
}

/// Unit in which the freight rate is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightUnit {
    Tonne,
    Teu,
}

/// Design quantities the cost model prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBasis {
    pub length_m: f64,
    pub block_coefficient: f64,
    pub steel_t: f64,
    pub outfit_t: f64,
    pub lightship_t: f64,
    pub installed_power_kw: f64,
    pub tank_volume_m3: f64,
    pub annual_energy_gj: f64,
    pub annual_co2_t: f64,
    pub annual_voyages: f64,
    /// Revenue-earning cargo per voyage, in `unit`.
    pub cargo_units_per_voyage: f64,
    pub unit: FreightUnit,
}

impl CostBasis {
    fn validate(&self) -> Result<(), EconomicsError> {
        let positive = [
            self.length_m,
            self.block_coefficient,
            self.lightship_t,
            self.annual_voyages,
            self.cargo_units_per_voyage,
        ];
        if positive.iter().any(|v| !(*v > 0.0 && v.is_finite())) {
            return Err(EconomicsError::InvalidBasis(
                "length, block coefficient, lightship, voyages and cargo must be positive",
            ));
        }
        let non_negative = [
            self.steel_t,
            self.outfit_t,
            self.installed_power_kw,
            self.tank_volume_m3,
            self.annual_energy_gj,
            self.annual_co2_t,
        ];
        if non_negative.iter().any(|v| !(*v >= 0.0 && v.is_finite())) {
            return Err(EconomicsError::InvalidBasis(
                "weights, power, volumes and annual quantities must be non-negative",
            ));
        }
        Ok(())
    }

    pub fn annual_cargo_units(&self) -> f64 {
        self.cargo_units_per_voyage * self.annual_voyages
    }
}

/// Building cost (USD).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapexBreakdown {
    pub steel_usd: f64,
    pub outfit_usd: f64,
    pub machinery_usd: f64,
    pub fuel_storage_usd: f64,
    pub reactor_usd: f64,
    pub total_usd: f64,
}

/// Annual running cost (USD/yr).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpexBreakdown {
    pub crew_usd: f64,
    pub maintenance_usd: f64,
    pub insurance_usd: f64,
    pub port_and_admin_usd: f64,
    pub stores_usd: f64,
    pub overhead_usd: f64,
    pub fuel_usd: f64,
    pub carbon_tax_usd: f64,
    pub nuclear_core_usd: f64,
    pub decommissioning_fund_usd: f64,
    pub total_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EconomicSummary {
    pub capex: CapexBreakdown,
    pub opex: OpexBreakdown,
    pub capital_recovery_factor: f64,
    pub annualized_capital_usd: f64,
    pub scrap_value_usd: f64,
    pub annual_cargo_units: f64,
    pub required_freight_rate_usd: f64,
    pub unit: FreightUnit,
}

/// Steel, outfit, machinery, tankage and reactor cost.
pub fn capital_cost(
    basis: &CostBasis,
    fuel: &FuelConfig,
    assumptions: &FinancialAssumptions,
) -> CapexBreakdown {
    let factors = &assumptions.capital;
    let steel_usd = factors.steel_usd * basis.steel_t.powf(2.0 / 3.0) * basis.length_m.cbrt()
        / basis.block_coefficient
        + factors.steel_usd_per_t * basis.steel_t;
    let outfit_usd = factors.outfit_usd * basis.outfit_t.powf(2.0 / 3.0)
        + factors.outfit_usd_per_t * basis.outfit_t.powf(0.95);
    let machinery_usd = fuel.machinery_cost_usd_per_kw * basis.installed_power_kw;
    let fuel_storage_usd = fuel.storage_cost_usd_per_m3 * basis.tank_volume_m3;
    let reactor_usd = fuel
        .nuclear
        .as_ref()
        .map_or(0.0, |n| n.reactor_cost_usd_per_kw * basis.installed_power_kw);
    CapexBreakdown {
        steel_usd,
        outfit_usd,
        machinery_usd,
        fuel_storage_usd,
        reactor_usd,
        total_usd: steel_usd + outfit_usd + machinery_usd + fuel_storage_usd + reactor_usd,
    }
}

/// Annual operating cost for a given building cost.
pub fn operating_cost(
    basis: &CostBasis,
    fuel: &FuelConfig,
    assumptions: &FinancialAssumptions,
    capex_usd: f64,
) -> OpexBreakdown {
    let factors = &assumptions.operating;
    let maintenance_usd = factors.maintenance_fraction * capex_usd;
    let insurance_usd = factors.insurance_fraction * capex_usd;
    let fuel_usd = basis.annual_energy_gj * assumptions.energy_price_usd_per_gj(fuel);
    let carbon_tax_usd = basis.annual_co2_t * assumptions.carbon_price_usd_per_t;
    let (nuclear_core_usd, decommissioning_fund_usd) = match &fuel.nuclear {
        Some(nuclear) => {
            let core = nuclear.core_cost_usd_per_kw * basis.installed_power_kw
                / f64::from(nuclear.core_life_years);
            let fund = nuclear.decommissioning_cost_usd
                * sinking_fund_factor(nuclear.decommissioning_fund_rate, nuclear.core_life_years);
            (core, fund)
        }
        None => (0.0, 0.0),
    };
    let total_usd = factors.crew_usd
        + maintenance_usd
        + insurance_usd
        + factors.port_and_admin_usd
        + factors.stores_usd
        + factors.overhead_usd
        + fuel_usd
        + carbon_tax_usd
        + nuclear_core_usd
        + decommissioning_fund_usd;
    OpexBreakdown {
        crew_usd: factors.crew_usd,
        maintenance_usd,
        insurance_usd,
        port_and_admin_usd: factors.port_and_admin_usd,
        stores_usd: factors.stores_usd,
        overhead_usd: factors.overhead_usd,
        fuel_usd,
        carbon_tax_usd,
        nuclear_core_usd,
        decommissioning_fund_usd,
        total_usd,
    }
}

/// Discounted cash flows of one ship over its evaluation horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlowModel {
    pub capex_usd: f64,
    pub opex_usd: f64,
    pub annual_units: f64,
    pub scrap_value_usd: f64,
    pub interest_rate: f64,
    pub years: u32,
}

impl CashFlowModel {
    /// Net present value when every cargo unit earns `rate` USD.
    pub fn net_present_value(&self, rate: f64) -> f64 {
        let net = rate * self.annual_units - self.opex_usd;
        let mut discount = 1.0;
        let mut npv = -self.capex_usd;
        for _ in 0..self.years {
            discount /= 1.0 + self.interest_rate;
            npv += net * discount;
        }
        npv + self.scrap_value_usd * discount
    }
}

/// Bisection on a bracketing interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootFinder {
    pub max_iterations: usize,
    pub relative_tolerance: f64,
}

impl Default for RootFinder {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            relative_tolerance: 1e-10,
        }
    }
}

impl RootFinder {
    /// Root of `f` in `[low, high]`; fails when the end points share a sign.
    pub fn solve<F>(&self, f: F, low: f64, high: f64) -> Result<f64, EconomicsError>
    where
        F: Fn(f64) -> f64,
    {
        let not_found = EconomicsError::RfrNotFound { low, high };
        let (mut a, mut b) = (low, high);
        let (mut fa, fb) = (f(a), f(b));
        if !(fa.is_finite() && fb.is_finite()) {
            return Err(not_found);
        }
        if fa == 0.0 {
            return Ok(a);
        }
        if fb == 0.0 {
            return Ok(b);
        }
        if fa.signum() == fb.signum() {
            return Err(not_found);
        }
        for iteration in 0..self.max_iterations {
            let mid = 0.5 * (a + b);
            let fm = f(mid);
            if fm == 0.0 || (b - a) <= self.relative_tolerance * mid.abs().max(f64::MIN_POSITIVE) {
                debug!(iteration, root = mid, "bisection converged");
                return Ok(mid);
            }
            if fm.signum() == fa.signum() {
                a = mid;
                fa = fm;
            } else {
                b = mid;
            }
        }
        Ok(0.5 * (a + b))
    }
}

/// CAPEX, OPEX and the required freight rate for one design.
pub fn evaluate(
    basis: &CostBasis,
    fuel: &FuelConfig,
    assumptions: &FinancialAssumptions,
) -> Result<EconomicSummary, EconomicsError> {
    assumptions.validate()?;
    basis.validate()?;

    let capex = capital_cost(basis, fuel, assumptions);
    let opex = operating_cost(basis, fuel, assumptions, capex.total_usd);
    let scrap_value_usd = assumptions.scrap_value_usd_per_t * basis.lightship_t;
    let model = CashFlowModel {
        capex_usd: capex.total_usd,
        opex_usd: opex.total_usd,
        annual_units: basis.annual_cargo_units(),
        scrap_value_usd,
        interest_rate: assumptions.interest_rate,
        years: assumptions.loan_term_years,
    };
    let (low, high) = RFR_BRACKET;
    let rate = RootFinder::default().solve(|r| model.net_present_value(r), low, high)?;
    let crf = capital_recovery_factor(assumptions.interest_rate, assumptions.loan_term_years);
    debug!(
        capex_usd = capex.total_usd,
        opex_usd = opex.total_usd,
        rfr = rate,
        "economics evaluated"
    );

    Ok(EconomicSummary {
        capex,
        opex,
        capital_recovery_factor: crf,
        annualized_capital_usd: crf * capex.total_usd,
        scrap_value_usd,
        annual_cargo_units: basis.annual_cargo_units(),
        required_freight_rate_usd: rate,
        unit: basis.unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdes_config::Registries;

    fn fuel(key: &str) -> &'static FuelConfig {
        Registries::builtin().fuels.get(key).expect("bundled fuel")
    }

    fn tanker_basis() -> CostBasis {
        CostBasis {
            length_m: 205.0,
            block_coefficient: 0.82,
            steel_t: 8_500.0,
            outfit_t: 2_000.0,
            lightship_t: 11_500.0,
            installed_power_kw: 6_700.0,
            tank_volume_m3: 3_400.0,
            annual_energy_gj: 1.1e6,
            annual_co2_t: 85_000.0,
            annual_voyages: 12.0,
            cargo_units_per_voyage: 48_000.0,
            unit: FreightUnit::Tonne,
        }
    }

    #[test]
    fn rfr_zeroes_the_npv() {
        let assumptions = FinancialAssumptions::default();
        let summary = evaluate(&tanker_basis(), fuel("direct_diesel"), &assumptions)
            .expect("tanker economics");
        assert!(summary.capex.total_usd > 20.0e6 && summary.capex.total_usd < 80.0e6);
        assert!(summary.required_freight_rate_usd > 0.0);

        let model = CashFlowModel {
            capex_usd: summary.capex.total_usd,
            opex_usd: summary.opex.total_usd,
            annual_units: summary.annual_cargo_units,
            scrap_value_usd: summary.scrap_value_usd,
            interest_rate: 0.10,
            years: 15,
        };
        let npv = model.net_present_value(summary.required_freight_rate_usd);
        assert!(npv.abs() < 1.0, "NPV at RFR was {npv}");
    }

    #[test]
    fn rfr_matches_closed_form_without_scrap() {
        let mut assumptions = FinancialAssumptions::default();
        assumptions.scrap_value_usd_per_t = 0.0;
        let basis = tanker_basis();
        let summary = evaluate(&basis, fuel("direct_diesel"), &assumptions).expect("economics");
        let expected = (summary.annualized_capital_usd + summary.opex.total_usd)
            / basis.annual_cargo_units();
        let rel = (summary.required_freight_rate_usd - expected).abs() / expected;
        assert!(rel < 1e-8, "relative error {rel}");
    }

    #[test]
    fn carbon_tax_follows_emissions() {
        let assumptions = FinancialAssumptions::default();
        let basis = tanker_basis();
        let opex = operating_cost(&basis, fuel("direct_diesel"), &assumptions, 40.0e6);
        assert!((opex.carbon_tax_usd - 8.5e6).abs() < 1e-6);
        assert!((opex.maintenance_usd - 2.0e6).abs() < 1e-6);

        let clean = CostBasis {
            annual_co2_t: 0.0,
            ..basis
        };
        let opex = operating_cost(&clean, fuel("hydrogen_fuel_cell"), &assumptions, 40.0e6);
        assert_eq!(opex.carbon_tax_usd, 0.0);
    }

    #[test]
    fn nuclear_adds_reactor_core_and_decommissioning_costs() {
        let assumptions = FinancialAssumptions::default();
        let basis = CostBasis {
            annual_co2_t: 0.0,
            tank_volume_m3: 0.0,
            ..tanker_basis()
        };
        let nuclear = fuel("nuclear_steam_turbine");
        let capex = capital_cost(&basis, nuclear, &assumptions);
        assert!((capex.reactor_usd - 4_000.0 * 6_700.0).abs() < 1e-6);
        let opex = operating_cost(&basis, nuclear, &assumptions, capex.total_usd);
        assert!((opex.nuclear_core_usd - 800.0 * 6_700.0 / 20.0).abs() < 1e-6);
        let fund = 2.0e8 * 0.03 / (1.03_f64.powi(20) - 1.0);
        assert!((opex.decommissioning_fund_usd - fund).abs() < 1e-3);
        assert_eq!(opex.carbon_tax_usd, 0.0);

        let diesel = operating_cost(&basis, fuel("direct_diesel"), &assumptions, capex.total_usd);
        assert_eq!(diesel.decommissioning_fund_usd, 0.0);
    }

    #[test]
    fn fuel_price_override_replaces_catalog_price() {
        let assumptions = FinancialAssumptions {
            fuel_price_usd_per_gj: Some(20.0),
            ..FinancialAssumptions::default()
        };
        let opex = operating_cost(&tanker_basis(), fuel("direct_diesel"), &assumptions, 0.0);
        assert!((opex.fuel_usd - 22.0e6).abs() < 1e-3);
    }

    #[test]
    fn root_finder_reports_unbracketed_interval() {
        let err = RootFinder::default()
            .solve(|x| x * x + 1.0, 0.0, 10.0)
            .expect_err("no sign change");
        assert_eq!(err, EconomicsError::RfrNotFound { low: 0.0, high: 10.0 });
    }

    #[test]
    fn unprofitable_scrap_heavy_case_still_brackets() {
        let assumptions = FinancialAssumptions {
            loan_term_years: 1,
            ..FinancialAssumptions::default()
        };
        let summary = evaluate(&tanker_basis(), fuel("direct_diesel"), &assumptions)
            .expect("one year horizon");
        assert!(summary.required_freight_rate_usd > 0.0);
    }

    #[test]
    fn zero_loan_term_is_rejected() {
        let assumptions = FinancialAssumptions {
            loan_term_years: 0,
            ..FinancialAssumptions::default()
        };
        let err = evaluate(&tanker_basis(), fuel("direct_diesel"), &assumptions)
            .expect_err("zero term");
        assert!(matches!(err, EconomicsError::InvalidAssumption(_)));
    }
}
