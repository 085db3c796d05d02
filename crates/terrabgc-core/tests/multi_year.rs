mod common;

use terrabgc_core::config::HydrologyMode;
use terrabgc_core::error::Domain;
use terrabgc_core::outputs::DailyOutputsTimeseries;
use terrabgc_core::params::PhenologyType;
use terrabgc_core::phenology::SeasonalSchedule;
use terrabgc_core::restart::RestartData;
use terrabgc_core::simulation::ManagementSchedule;
use terrabgc_core::{BgcError, Simulation, SimulationConfig};

fn config(hydrology: HydrologyMode, phenology: PhenologyType) -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.control.hydrology = hydrology;
    cfg.epc.phenology = phenology;
    cfg
}

fn run(cfg: &SimulationConfig, years: usize) -> (Simulation, DailyOutputsTimeseries) {
    let mut sim = Simulation::new(cfg).unwrap();
    let ts = sim
        .run(
            &common::temperate(years),
            &mut SeasonalSchedule::default(),
            &ManagementSchedule::new(),
        )
        .unwrap();
    (sim, ts)
}

#[test]
fn balances_close_for_every_scheme_and_phenology() {
    for hydrology in [HydrologyMode::Tipping, HydrologyMode::Richards] {
        for phenology in [PhenologyType::Deciduous, PhenologyType::Evergreen] {
            let cfg = config(hydrology, phenology);
            let (sim, ts) = run(&cfg, 3);
            let [water, carbon, nitrogen] = sim.max_balance_errors();
            let tol = &cfg.control.tolerances;
            assert!(water <= tol.water, "{hydrology:?} {phenology:?}: water {water:e}");
            assert!(carbon <= tol.carbon, "{hydrology:?} {phenology:?}: carbon {carbon:e}");
            assert!(
                nitrogen <= tol.nitrogen,
                "{hydrology:?} {phenology:?}: nitrogen {nitrogen:e}"
            );
            assert_eq!(ts.len(), 3 * 365);
        }
    }
}

#[test]
fn pools_stay_non_negative() {
    let (sim, ts) = run(&config(HydrologyMode::Tipping, PhenologyType::Deciduous), 2);
    let ws = sim.water_state();
    assert!(ws.soilw.iter().all(|&w| w >= 0.0));
    assert!(ws.snoww >= 0.0 && ws.pondw >= 0.0 && ws.canopyw >= 0.0);
    let ns = sim.nitrogen_state();
    assert!(ns.soil.iter().all(|s| s.nh4 >= 0.0 && s.no3 >= 0.0));
    for col in ["soilw", "snoww", "vegetation_c", "soil_c", "mineral_n", "lai"] {
        let values = ts.column(col).unwrap();
        assert!(values.iter().all(|&v| v >= 0.0), "{col} went negative");
    }
}

#[test]
fn deciduous_canopy_follows_the_season() {
    let (_, ts) = run(&config(HydrologyMode::Tipping, PhenologyType::Deciduous), 2);
    let lai = ts.column("lai").unwrap();
    // mid-winter bare, mid-summer leafed out
    assert_eq!(lai[365 + 20], 0.0);
    assert!(lai[365 + 200] > 0.0, "summer LAI {}", lai[365 + 200]);
    let gpp = common::annual_sum(&ts.gpp, 1);
    assert!(gpp > 0.0, "annual GPP {gpp}");
    assert!(common::annual_sum(&ts.hr, 1) > 0.0);
}

#[test]
fn tipping_and_richards_agree_on_annual_totals() {
    let (_, tipping) = run(&config(HydrologyMode::Tipping, PhenologyType::Evergreen), 2);
    let (_, richards) = run(&config(HydrologyMode::Richards, PhenologyType::Evergreen), 2);
    let et_t = common::annual_sum(&tipping.et, 1);
    let et_r = common::annual_sum(&richards.et, 1);
    assert!(et_t > 0.0 && et_r > 0.0);
    assert!((et_t - et_r).abs() / et_t < 0.5, "ET tipping {et_t} richards {et_r}");
    assert!(common::annual_sum(&tipping.gpp, 1) > 0.0);
    assert!(common::annual_sum(&richards.gpp, 1) > 0.0);
}

#[test]
fn strict_balance_aborts_on_drift() {
    // a tolerance below rounding turns the first nonzero drift into an
    // error; early return is the intended behaviour
    let mut cfg = config(HydrologyMode::Tipping, PhenologyType::Deciduous);
    cfg.control.strict_balance = true;
    cfg.control.tolerances.water = 1e-300;
    let mut sim = Simulation::new(&cfg).unwrap();
    let err = sim
        .run(
            &common::temperate(1),
            &mut SeasonalSchedule::default(),
            &ManagementSchedule::new(),
        )
        .unwrap_err();
    match err {
        BgcError::InvariantViolation {
            domain: Domain::Water,
            ref pool,
            day: Some(d),
            ..
        } => {
            assert_eq!(pool, "balance");
            assert_eq!(sim.day(), d);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn negative_restart_pool_is_refused() {
    // a corrupt restart never reaches the daily loop; early return is the
    // intended behaviour
    let cfg = SimulationConfig::default();
    let (sim, _) = run(&cfg, 1);
    let mut restart = sim.restart_output();
    restart.water[2] = -5.0;
    let err = Simulation::from_restart(&cfg, &restart).unwrap_err();
    assert!(matches!(
        err,
        BgcError::InvariantViolation {
            domain: Domain::Water,
            layer: Some(2),
            ..
        }
    ));
}

#[test]
fn restart_record_survives_json() {
    let cfg = config(HydrologyMode::Tipping, PhenologyType::Deciduous);
    let (sim, _) = run(&cfg, 1);
    let restart = sim.restart_output();
    let text = restart.to_json_string().unwrap();
    let back = RestartData::from_json_str(&text).unwrap();
    assert_eq!(back, restart);
    let resumed = Simulation::from_restart(&cfg, &back).unwrap();
    assert_eq!(resumed.nitrogen_state(), sim.nitrogen_state());
}

#[test]
fn drainage_output_matches_the_water_sink() {
    let (sim, ts) = run(&config(HydrologyMode::Tipping, PhenologyType::Deciduous), 2);
    let drained: f64 = ts.deep_percolation.iter().sum();
    let sink = sim.water_state().snk.deep_percolation;
    assert!(sink > 0.0);
    assert!(
        (drained - sink).abs() <= 1e-9 * sink,
        "output {drained} sink {sink}"
    );
}
