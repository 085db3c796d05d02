use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use terrabgc_core::forcing::ForcingData;
use terrabgc_core::outputs::DailyOutputsTimeseries;
use terrabgc_core::phenology::SeasonalSchedule;
use terrabgc_core::simulation::ManagementSchedule;
use terrabgc_core::{Simulation, SimulationConfig};

use crate::convert::{to_py_err, to_vec};

define_timeseries_result! {
    /// Daily outputs of a run as typed numpy array attributes.
    pub struct SimulationResult from DailyOutputsTimeseries {
        gpp, mr, gr, npp, hr, nee, fire_c, export_c, ch4,
        prcp, canopy_evap, snow_subl, pond_evap, soil_evap, transpiration, et,
        runoff, deep_percolation,
        n_uptake, n_mineralization, n_immobilization, n_leached, doc_leached, n2o,
        lai, rooting_depth, soilw, snoww, vegetation_c, litter_c, soil_c, mineral_n,
        water_balance_delta, carbon_balance_delta, nitrogen_balance_delta, cn_drift,
    }
}

struct RunArgs<'py> {
    config_json: Option<&'py str>,
    management_json: Option<&'py str>,
    season: Option<(usize, usize, usize, usize)>,
    forcing: ForcingData,
}

#[allow(clippy::too_many_arguments)]
fn forcing<'py>(
    tmax: PyReadonlyArray1<'py, f64>,
    tmin: PyReadonlyArray1<'py, f64>,
    prcp: PyReadonlyArray1<'py, f64>,
    vpd: PyReadonlyArray1<'py, f64>,
    swavgfd: PyReadonlyArray1<'py, f64>,
    dayl: PyReadonlyArray1<'py, f64>,
    par: Option<PyReadonlyArray1<'py, f64>>,
) -> PyResult<ForcingData> {
    let par = par.map(|p| to_vec(&p, "par")).transpose()?;
    ForcingData::new(
        to_vec(&tmax, "tmax")?,
        to_vec(&tmin, "tmin")?,
        to_vec(&prcp, "prcp")?,
        to_vec(&vpd, "vpd")?,
        to_vec(&swavgfd, "swavgfd")?,
        to_vec(&dayl, "dayl")?,
        par,
    )
    .map_err(to_py_err)
}

fn simulate(args: RunArgs<'_>) -> PyResult<DailyOutputsTimeseries> {
    let config = match args.config_json {
        Some(s) => SimulationConfig::from_json_str(s).map_err(to_py_err)?,
        None => SimulationConfig::default(),
    };
    let management: ManagementSchedule = match args.management_json {
        Some(s) => serde_json::from_str(s)
            .map_err(|e| PyValueError::new_err(format!("invalid management: {e}")))?,
        None => ManagementSchedule::new(),
    };
    let mut schedule = match args.season {
        Some((onset_doy, transfer_days, litfall_end_doy, litfall_days)) => SeasonalSchedule {
            onset_doy,
            transfer_days,
            litfall_end_doy,
            litfall_days,
        },
        None => SeasonalSchedule::default(),
    };
    let mut sim = Simulation::new(&config).map_err(to_py_err)?;
    sim.run(&args.forcing, &mut schedule, &management)
        .map_err(to_py_err)
}

/// Run the engine over a daily forcing series.
///
/// `config_json` and `management_json` (day index to events) are JSON
/// documents; omitted sections take their defaults. `season` is
/// `(onset_doy, transfer_days, litfall_end_doy, litfall_days)`.
/// Returns a dict of numpy arrays keyed by output name.
#[pyfunction]
#[pyo3(signature = (tmax, tmin, prcp, vpd, swavgfd, dayl, par=None, config_json=None, management_json=None, season=None))]
#[allow(clippy::too_many_arguments)]
fn run<'py>(
    py: Python<'py>,
    tmax: PyReadonlyArray1<'py, f64>,
    tmin: PyReadonlyArray1<'py, f64>,
    prcp: PyReadonlyArray1<'py, f64>,
    vpd: PyReadonlyArray1<'py, f64>,
    swavgfd: PyReadonlyArray1<'py, f64>,
    dayl: PyReadonlyArray1<'py, f64>,
    par: Option<PyReadonlyArray1<'py, f64>>,
    config_json: Option<&'py str>,
    management_json: Option<&'py str>,
    season: Option<(usize, usize, usize, usize)>,
) -> PyResult<Bound<'py, PyDict>> {
    let ts = simulate(RunArgs {
        config_json,
        management_json,
        season,
        forcing: forcing(tmax, tmin, prcp, vpd, swavgfd, dayl, par)?,
    })?;
    let dict = PyDict::new(py);
    for (name, values) in ts.columns() {
        dict.set_item(name, PyArray1::from_slice(py, values))?;
    }
    Ok(dict)
}

/// Same as `run`, returning a `SimulationResult`.
#[pyfunction]
#[pyo3(signature = (tmax, tmin, prcp, vpd, swavgfd, dayl, par=None, config_json=None, management_json=None, season=None))]
#[allow(clippy::too_many_arguments)]
fn run_typed<'py>(
    py: Python<'py>,
    tmax: PyReadonlyArray1<'py, f64>,
    tmin: PyReadonlyArray1<'py, f64>,
    prcp: PyReadonlyArray1<'py, f64>,
    vpd: PyReadonlyArray1<'py, f64>,
    swavgfd: PyReadonlyArray1<'py, f64>,
    dayl: PyReadonlyArray1<'py, f64>,
    par: Option<PyReadonlyArray1<'py, f64>>,
    config_json: Option<&'py str>,
    management_json: Option<&'py str>,
    season: Option<(usize, usize, usize, usize)>,
) -> PyResult<SimulationResult> {
    let ts = simulate(RunArgs {
        config_json,
        management_json,
        season,
        forcing: forcing(tmax, tmin, prcp, vpd, swavgfd, dayl, par)?,
    })?;
    Ok(SimulationResult::from_timeseries(py, ts))
}

/// The default configuration as a JSON document.
#[pyfunction]
fn default_config() -> PyResult<String> {
    SimulationConfig::default()
        .to_json_string()
        .map_err(to_py_err)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "engine")?;
    m.add_function(wrap_pyfunction!(run, &m)?)?;
    m.add_function(wrap_pyfunction!(run_typed, &m)?)?;
    m.add_function(wrap_pyfunction!(default_config, &m)?)?;
    m.add_class::<SimulationResult>()?;
    parent.add_submodule(&m)?;
    Ok(())
}
