use ship_design_calculator::config::Registries;
use ship_design_calculator::hull::CapacityTarget;
use ship_design_calculator::{DesignResult, DesignTarget, SolverSettings, solve, solve_with};

fn container_target(fuel: &str) -> DesignTarget {
    DesignTarget::new(
        "container",
        fuel,
        CapacityTarget::Teu {
            teu: 8_000.0,
            mean_teu_mass_t: 14.0,
        },
        18.0,
        12_000.0,
    )
}

fn container(fuel: &str) -> DesignResult {
    solve(&container_target(fuel)).unwrap_or_else(|err| panic!("{fuel} container failed: {err}"))
}

#[test]
fn hydrogen_container_needs_a_bigger_hull_than_diesel() {
    let diesel = container("direct_diesel");
    let hydrogen = container("hydrogen_fuel_cell");

    assert!(hydrogen.volume_expansions > 0, "hydrogen hull was not expanded");
    assert!(
        hydrogen.hull.expansion.depth > diesel.hull.expansion.depth,
        "depth factors {} vs {}",
        hydrogen.hull.expansion.depth,
        diesel.hull.expansion.depth
    );
    assert!(hydrogen.hull.dimensions.depth_m > diesel.hull.dimensions.depth_m);
    assert!(hydrogen.volume.tank_m3 > 5.0 * diesel.volume.tank_m3);
    assert!(
        hydrogen.economics.required_freight_rate_usd > diesel.economics.required_freight_rate_usd,
        "RFR hydrogen {:.1} vs diesel {:.1} USD/TEU",
        hydrogen.economics.required_freight_rate_usd,
        diesel.economics.required_freight_rate_usd
    );
}

#[test]
fn expanded_hull_holds_cargo_and_tanks_at_target_deadweight() {
    let result = container("hydrogen_fuel_cell");
    assert!(
        result.volume.available_m3 >= result.volume.required_m3,
        "available {:.0} m³ < required {:.0} m³",
        result.volume.available_m3,
        result.volume.required_m3
    );
    assert!((result.hull.available_volume_m3 - result.volume.available_m3).abs() < 1e-6);

    let target_t = 8_000.0 * 14.0;
    let tolerance = SolverSettings::default().tolerance * target_t;
    assert!(
        (result.hull.cargo_deadweight_t - target_t).abs() <= tolerance,
        "cargo deadweight {:.1} t",
        result.hull.cargo_deadweight_t
    );

    let dims = &result.hull.dimensions;
    let cb = dims.block_coefficient;
    let displacement = 1.025 * dims.length_m * dims.breadth_m * dims.draft_m * cb;
    assert!((displacement - result.hull.displacement_t).abs() < 1e-3 * result.hull.displacement_t);
}

#[test]
fn estimated_teu_capacity_tracks_the_target() {
    let result = container("direct_diesel");
    assert!(
        (6_000.0..13_000.0).contains(&result.estimated_teu_capacity),
        "estimated {:.0} TEU",
        result.estimated_teu_capacity
    );
}

#[test]
fn capped_depth_pushes_expansion_into_breadth() {
    let mut registries = Registries::builtin().clone();
    let mut ship = registries
        .ships
        .get("container")
        .expect("bundled container ship")
        .clone();
    ship.expansion.max_depth_factor = 1.05;
    registries.ships.merge(vec![ship]).expect("shallow-limit override");

    let result = solve_with(
        &container_target("hydrogen_fuel_cell"),
        &registries,
        &SolverSettings::default(),
    )
    .expect("hydrogen container ship with capped depth");

    let expansion = result.hull.expansion;
    assert!((expansion.depth - 1.05).abs() < 1e-12, "depth factor {}", expansion.depth);
    assert!(expansion.breadth > 1.0, "breadth factor {}", expansion.breadth);
    assert!(expansion.breadth <= 1.25);

    let dims = &result.hull.dimensions;
    assert!(
        (1.5..=7.0).contains(&dims.breadth_draft_ratio()),
        "B/T = {:.2}",
        dims.breadth_draft_ratio()
    );
    assert!(result.volume.available_m3 >= result.volume.required_m3);
}
