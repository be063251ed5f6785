use ship_design_calculator::config::Registries;
use ship_design_calculator::design::{
    CancellationToken, SweepOutcome, SweepParameter, SweepRequest, run_sweep, run_sweep_with,
    values_from_range,
};
use ship_design_calculator::hull::CapacityTarget;
use ship_design_calculator::{DesignTarget, SolverError, SolverSettings};

fn nuclear_bulk_speeds() -> SweepRequest {
    SweepRequest {
        base: DesignTarget::new(
            "bulk_carrier",
            "nuclear_steam_turbine",
            CapacityTarget::Deadweight { tonnes: 60_000.0 },
            15.0,
            10_000.0,
        ),
        parameter: SweepParameter::Speed,
        values: values_from_range(10.0, 25.0, 5.0).expect("valid range"),
        fuels: Vec::new(),
    }
}

#[test]
fn nuclear_speed_sweep_pays_no_carbon_tax() {
    let request = nuclear_bulk_speeds();
    let points = run_sweep(
        &request,
        Registries::builtin(),
        &SolverSettings::default(),
        &CancellationToken::new(),
    );

    assert_eq!(points.len(), 4);
    let speeds: Vec<f64> = points.iter().map(|point| point.value).collect();
    assert_eq!(speeds, vec![10.0, 15.0, 20.0, 25.0]);

    let mut previous_power = 0.0;
    for point in &points {
        let result = point
            .result()
            .unwrap_or_else(|| panic!("{} kn did not solve: {:?}", point.value, point.outcome));
        assert_eq!(result.economics.opex.carbon_tax_usd, 0.0);
        assert_eq!(result.hull.bunker_t, 0.0);
        assert!(result.economics.opex.nuclear_core_usd > 0.0);
        assert!(result.power.installed_power_kw() > previous_power);
        previous_power = result.power.installed_power_kw();
    }
}

#[test]
fn cancelling_mid_sweep_skips_remaining_points() {
    let request = SweepRequest {
        fuels: vec!["direct_diesel".into(), "methanol".into()],
        ..nuclear_bulk_speeds()
    };
    let cancel = CancellationToken::new();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .expect("single-thread pool");

    let points = pool.install(|| {
        run_sweep_with(
            &request,
            Registries::builtin(),
            &SolverSettings::default(),
            &cancel,
            |_| cancel.cancel(),
        )
    });

    assert_eq!(points.len(), 8);
    assert!(points[0].result().is_some(), "{:?}", points[0].outcome);
    assert!(
        points[1..]
            .iter()
            .all(|point| point.outcome == SweepOutcome::Cancelled)
    );
}

#[test]
fn failed_points_do_not_stop_the_sweep() {
    let request = SweepRequest {
        base: DesignTarget::new(
            "tanker",
            "direct_diesel",
            CapacityTarget::Deadweight { tonnes: 50_000.0 },
            14.0,
            8_000.0,
        ),
        parameter: SweepParameter::Deadweight,
        values: vec![50_000.0, 900_000.0, 80_000.0],
        fuels: Vec::new(),
    };
    let points = run_sweep(
        &request,
        Registries::builtin(),
        &SolverSettings::default(),
        &CancellationToken::new(),
    );

    assert_eq!(points.len(), 3);
    assert!(points[0].result().is_some());
    assert!(matches!(
        points[1].outcome,
        SweepOutcome::Failed(SolverError::InvalidTarget(_))
    ));
    let small = points[0].result().expect("50 kt tanker");
    let large = points[2].result().expect("80 kt tanker");
    assert!(large.hull.displacement_t > small.hull.displacement_t);
}
