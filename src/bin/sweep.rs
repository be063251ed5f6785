use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use clap::Parser;
use serde_json::{Value, json};
use ship_design_calculator::design::{
    CancellationToken, SweepOutcome, SweepParameter, SweepPoint, SweepRequest, run_sweep_with,
    values_from_range,
};
use ship_design_calculator::logging;
use ship_design_calculator::scenario::{CatalogOverrides, load_sweep, load_target};
use ship_design_calculator::{DesignResult, SolverSettings};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Sweep one design parameter over a range, for one or more fuels"
)]
struct Cli {
    /// Complete sweep request (base target, parameter, values, fuels) as YAML or TOML
    #[arg(long, conflicts_with_all = ["target", "parameter", "start", "end", "step"])]
    scenario: Option<PathBuf>,

    /// Base design target file (YAML, or TOML by extension)
    #[arg(long, required_unless_present = "scenario")]
    target: Option<PathBuf>,

    /// Parameter to vary: speed, deadweight, teu, lb, breadth, bt or cb
    #[arg(long, required_unless_present = "scenario")]
    parameter: Option<SweepParameter>,

    #[arg(long, required_unless_present = "scenario")]
    start: Option<f64>,

    #[arg(long, required_unless_present = "scenario")]
    end: Option<f64>,

    #[arg(long, required_unless_present = "scenario")]
    step: Option<f64>,

    /// Fuel keys to sweep (repeatable); defaults to the target's fuel
    #[arg(long = "fuel")]
    fuels: Vec<String>,

    /// Fuel catalog layered over the bundled one
    #[arg(long = "fuels")]
    fuel_catalog: Option<PathBuf>,

    /// Ship type catalog layered over the bundled one
    #[arg(long)]
    ships: Option<PathBuf>,

    /// Route catalog layered over the bundled one
    #[arg(long)]
    routes: Option<PathBuf>,

    /// Relative displacement tolerance of the mass loop
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,

    /// Cancel the remaining points after this many failures
    #[arg(long)]
    max_failures: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let registries = CatalogOverrides {
        fuels: cli.fuel_catalog.clone(),
        ships: cli.ships.clone(),
        routes: cli.routes.clone(),
    }
    .load()?;
    let mut request = build_request(&cli)?;
    if !cli.fuels.is_empty() {
        request.fuels = cli.fuels.clone();
    }
    let settings = SolverSettings {
        tolerance: cli.tolerance,
        ..SolverSettings::default()
    };

    let cancel = CancellationToken::new();
    let failures = AtomicUsize::new(0);
    let points = run_sweep_with(
        &request,
        &registries,
        &settings,
        &cancel,
        |point| {
            if matches!(point.outcome, SweepOutcome::Failed(_)) {
                let failed = failures.fetch_add(1, Ordering::Relaxed) + 1;
                if cli.max_failures.is_some_and(|limit| failed >= limit) {
                    cancel.cancel();
                }
            }
        },
    );

    for point in &points {
        println!("{}", serde_json::to_string(&point_json(request.parameter, point))?);
    }
    Ok(())
}

fn build_request(cli: &Cli) -> anyhow::Result<SweepRequest> {
    if let Some(path) = &cli.scenario {
        return Ok(load_sweep(path)?);
    }
    let (Some(target), Some(parameter), Some(start), Some(end), Some(step)) =
        (&cli.target, cli.parameter, cli.start, cli.end, cli.step)
    else {
        anyhow::bail!(
            "--target, --parameter, --start, --end and --step are required without --scenario"
        );
    };
    Ok(SweepRequest {
        base: load_target(target)?,
        parameter,
        values: values_from_range(start, end, step).context("invalid sweep range")?,
        fuels: Vec::new(),
    })
}

fn point_json(parameter: SweepParameter, point: &SweepPoint) -> Value {
    let mut line = json!({
        "fuel": point.fuel,
        "parameter": parameter.name(),
        "value": point.value,
    });
    let (status, detail) = match &point.outcome {
        SweepOutcome::Solved(result) => ("ok", summary(result)),
        SweepOutcome::Failed(err) => ("failed", json!(format!("CALCULATION FAILED: {err}"))),
        SweepOutcome::Cancelled => ("cancelled", Value::Null),
    };
    line["status"] = json!(status);
    if !detail.is_null() {
        let key = if status == "ok" { "result" } else { "error" };
        line[key] = detail;
    }
    line
}

fn summary(result: &DesignResult) -> Value {
    let dims = &result.hull.dimensions;
    json!({
        "length_m": dims.length_m,
        "breadth_m": dims.breadth_m,
        "draft_m": dims.draft_m,
        "depth_m": dims.depth_m,
        "block_coefficient": dims.block_coefficient,
        "displacement_t": result.hull.displacement_t,
        "deadweight_t": result.hull.deadweight_t,
        "installed_power_kw": result.power.installed_power_kw(),
        "bunker_t": result.hull.bunker_t,
        "annual_co2_t": result.power.fuel.annual.co2_t,
        "capex_usd": result.economics.capex.total_usd,
        "opex_usd": result.economics.opex.total_usd,
        "carbon_tax_usd": result.economics.opex.carbon_tax_usd,
        "required_freight_rate_usd": result.economics.required_freight_rate_usd,
        "eedi_attained": result.regulatory.eedi.attained,
        "eedi_required": result.regulatory.eedi.required,
        "cii_rating": result.regulatory.cii.rating.to_string(),
        "volume_expansions": result.volume_expansions,
    })
}
