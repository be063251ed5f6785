use ship_design_calculator::config::Registries;
use ship_design_calculator::design::{ConvergenceReason, TargetIssue};
use ship_design_calculator::hull::{CapacityTarget, HullParticulars};
use ship_design_calculator::regulatory::CiiRating;
use ship_design_calculator::{DesignTarget, SolverError, SolverSettings, solve, solve_with};

fn tanker(deadweight_t: f64) -> DesignTarget {
    DesignTarget::new(
        "tanker",
        "direct_diesel",
        CapacityTarget::Deadweight {
            tonnes: deadweight_t,
        },
        14.0,
        10_000.0,
    )
}

#[test]
fn diesel_tanker_converges_with_positive_economics() {
    let result = solve(&tanker(50_000.0)).expect("tanker converges");
    let hull = &result.hull;
    let dims = &hull.dimensions;

    let tolerance = SolverSettings::default().tolerance * 50_000.0;
    assert!(
        (hull.cargo_deadweight_t - 50_000.0).abs() <= tolerance,
        "cargo deadweight {} t",
        hull.cargo_deadweight_t
    );
    assert!(
        (hull.displacement_t - hull.lightship.total_t - hull.deadweight_t).abs() < 1e-6,
        "displacement must equal lightship plus deadweight"
    );
    assert!((170.0..240.0).contains(&dims.length_m), "L = {:.1} m", dims.length_m);
    assert!(dims.breadth_m > 0.0 && dims.draft_m > 0.0 && dims.depth_m > dims.draft_m);
    assert!(
        (0.70..=0.87).contains(&dims.block_coefficient),
        "Cb = {:.3}",
        dims.block_coefficient
    );
    assert!(
        (2_000.0..15_000.0).contains(&result.power.service_power_kw()),
        "service power {:.0} kW",
        result.power.service_power_kw()
    );
    assert!(result.volume.required_m3 <= result.volume.available_m3);
    assert_eq!(result.volume_expansions, 0);

    let economics = &result.economics;
    assert!(economics.capex.total_usd > 0.0);
    assert!(economics.opex.total_usd > 0.0);
    assert!(economics.opex.carbon_tax_usd > 0.0);
    assert!(economics.required_freight_rate_usd > 0.0);

    let eedi = &result.regulatory.eedi;
    assert!(
        eedi.attained < eedi.reference,
        "EEDI attained {:.2} vs reference {:.2}",
        eedi.attained,
        eedi.reference
    );
}

#[test]
fn solve_is_repeatable() {
    let target = tanker(50_000.0);
    let first = solve(&target).expect("first solve");
    let second = solve(&target).expect("second solve");
    assert_eq!(first, second);
}

#[test]
fn displacement_grows_with_deadweight() {
    let displacements: Vec<f64> = [30_000.0, 50_000.0, 80_000.0, 120_000.0]
        .into_iter()
        .map(|dw| solve(&tanker(dw)).expect("tanker converges").hull.displacement_t)
        .collect();
    assert!(
        displacements.windows(2).all(|pair| pair[1] > pair[0]),
        "displacements {displacements:?}"
    );
}

#[test]
fn zero_carbon_fuels_emit_nothing_and_rate_a() {
    for fuel in ["hydrogen_fuel_cell", "battery_electric", "nuclear_steam_turbine"] {
        let target = DesignTarget::new(
            "general_cargo",
            fuel,
            CapacityTarget::Deadweight { tonnes: 5_000.0 },
            12.0,
            200.0,
        );
        let result = solve(&target).unwrap_or_else(|err| panic!("{fuel} failed: {err}"));
        assert_eq!(result.power.fuel.annual.co2_t, 0.0, "{fuel}");
        assert_eq!(result.economics.opex.carbon_tax_usd, 0.0, "{fuel}");
        assert_eq!(result.regulatory.eedi.attained, 0.0, "{fuel}");
        assert_eq!(result.regulatory.cii.rating, CiiRating::A, "{fuel}");
    }
}

#[test]
fn nuclear_design_carries_no_bunker_but_pays_for_decommissioning() {
    let target = DesignTarget::new(
        "bulk_carrier",
        "nuclear_steam_turbine",
        CapacityTarget::Deadweight { tonnes: 60_000.0 },
        16.0,
        20_000.0,
    );
    let result = solve(&target).expect("nuclear bulk carrier");
    assert_eq!(result.hull.bunker_t, 0.0);
    assert!(result.economics.opex.decommissioning_fund_usd > 0.0);
    assert!(result.economics.capex.reactor_usd > 0.0);
    assert!(result.hull.lightship.machinery_t > 2_500.0);
}

#[test]
fn teu_target_on_tanker_is_invalid() {
    let target = DesignTarget {
        capacity: CapacityTarget::Teu {
            teu: 3_000.0,
            mean_teu_mass_t: 14.0,
        },
        ..tanker(50_000.0)
    };
    let err = solve(&target).expect_err("tankers carry no containers");
    assert_eq!(
        err,
        SolverError::InvalidTarget(TargetIssue::TeuNotSupported("tanker".into()))
    );
}

#[test]
fn expired_deadline_stops_the_solve() {
    let settings = SolverSettings {
        deadline: Some(std::time::Duration::ZERO),
        ..SolverSettings::default()
    };
    let err = solve_with(&tanker(50_000.0), Registries::builtin(), &settings)
        .expect_err("zero deadline");
    assert!(matches!(
        err,
        SolverError::ConvergenceFailure {
            reason: ConvergenceReason::DeadlineExceeded,
            ..
        }
    ));
}

#[test]
fn slow_ballast_route_lowers_annual_fuel() {
    let yaml = r#"
ship_type: tanker
fuel: direct_diesel
capacity: { kind: deadweight, tonnes: 50000 }
speed_knots: 14
range_nm: 10000
route:
  kind: port_to_port
  route: houston_rotterdam
  speeds: { open_ocean: 1.0, canal: 0.2, port_approach: 0.1 }
  return_load_factor: 0.0
"#;
    let routed: DesignTarget = serde_yaml::from_str(yaml).expect("target parses");
    let with_route = solve(&routed).expect("routed tanker");
    let cruise = solve(&tanker(50_000.0)).expect("cruise tanker");

    let routed_per_nm =
        with_route.power.fuel.annual.fuel_mass_t / with_route.power.fuel.annual.distance_nm;
    let cruise_per_nm = cruise.power.fuel.annual.fuel_mass_t / cruise.power.fuel.annual.distance_nm;
    assert!(routed_per_nm < cruise_per_nm);
    assert!(with_route.power.fuel.annual.voyages > 0.0);
    // Bunker covers the design range either way.
    assert!((with_route.hull.bunker_t - cruise.hull.bunker_t).abs() < 1e-6 * cruise.hull.bunker_t);
}

#[test]
fn given_dimensions_reproduce_the_sized_design() {
    let sized = solve(&tanker(50_000.0)).expect("tanker converges");
    let dims = sized.hull.dimensions;
    let target = DesignTarget {
        capacity: CapacityTarget::Dimensions(HullParticulars {
            length_m: dims.length_m,
            breadth_m: dims.breadth_m,
            draft_m: dims.draft_m,
            depth_m: dims.depth_m,
            block_coefficient: dims.block_coefficient,
        }),
        ..tanker(50_000.0)
    };
    let given = solve(&target).expect("given hull evaluates");

    assert_eq!(given.iterations, 1);
    assert_eq!(given.volume_expansions, 0);
    let relative = |a: f64, b: f64| ((a - b) / b).abs();
    assert!(relative(given.hull.cargo_deadweight_t, sized.hull.cargo_deadweight_t) < 1e-6);
    assert!(relative(given.power.installed_power_kw(), sized.power.installed_power_kw()) < 1e-9);
    assert!(
        relative(
            given.economics.required_freight_rate_usd,
            sized.economics.required_freight_rate_usd
        ) < 1e-3,
        "RFR {:.3} vs {:.3}",
        given.economics.required_freight_rate_usd,
        sized.economics.required_freight_rate_usd
    );
}

#[test]
fn given_hull_too_light_for_its_machinery_is_invalid() {
    let target = DesignTarget {
        capacity: CapacityTarget::Dimensions(HullParticulars {
            length_m: 60.0,
            breadth_m: 10.0,
            draft_m: 1.0,
            depth_m: 6.0,
            block_coefficient: 0.6,
        }),
        ..tanker(50_000.0)
    };
    let err = solve(&target).expect_err("a 369 t hull cannot carry its own lightship and bunker");
    assert!(matches!(
        err,
        SolverError::InvalidTarget(TargetIssue::NoCargoCapacity { .. })
    ));
}
