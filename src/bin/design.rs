use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ship_design_calculator::logging;
use ship_design_calculator::scenario::{CatalogOverrides, load_target};
use ship_design_calculator::{SolverSettings, solve_with};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Size a merchant ship for a deadweight or TEU target and print the design as JSON"
)]
struct Cli {
    /// Design target file (YAML, or TOML by extension)
    #[arg(long)]
    target: PathBuf,

    /// Fuel catalog layered over the bundled one (YAML list, TOML file or directory)
    #[arg(long)]
    fuels: Option<PathBuf>,

    /// Ship type catalog layered over the bundled one
    #[arg(long)]
    ships: Option<PathBuf>,

    /// Route catalog layered over the bundled one
    #[arg(long)]
    routes: Option<PathBuf>,

    /// Relative displacement tolerance of the mass loop
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,

    /// Abort the solve after this many milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let target = load_target(&cli.target)?;
    let registries = CatalogOverrides {
        fuels: cli.fuels,
        ships: cli.ships,
        routes: cli.routes,
    }
    .load()?;
    let settings = SolverSettings {
        tolerance: cli.tolerance,
        deadline: cli.deadline_ms.map(Duration::from_millis),
        ..SolverSettings::default()
    };

    let result = solve_with(&target, &registries, &settings).with_context(|| {
        format!(
            "CALCULATION FAILED for {} / {}",
            target.ship_type, target.fuel
        )
    })?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
