//! Actual evaporation from the pond and the bare soil surface.

use crate::epv::EcophysVariables;
use crate::error::{Advisory, AdvisoryFlags};
use crate::flux::WaterFlux;
use crate::params::SoilLayer;

/// Share of potential evaporation realized on a wetting day.
const WET_DAY_RATIO: f64 = 0.6;
/// Drying coefficient: ratio = DRY_COEF / days_since_rain^2.
const DRY_COEF: f64 = 0.3;

/// Limit potential evaporation by the pond, surface dryness and the water
/// held in the top layer.
///
/// The pond evaporates first at the potential rate. The soil then loses a
/// share of the remaining potential that falls with the square of the days
/// since the surface was last wetted, capped at the top layer's water above
/// hygroscopic content. Returns the soil evaporation demand.
pub fn actual_evaporation(
    pondw: f64,
    soilw_top: f64,
    top: &SoilLayer,
    epv: &mut EcophysVariables,
    wf: &mut WaterFlux,
    flags: &mut AdvisoryFlags,
) -> f64 {
    let pot = wf.pot_evap;
    wf.pondw_evap = pot.min(pondw);
    let remaining = pot - wf.pondw_evap;

    let wetting = wf.prcp_to_soilw + wf.snoww_to_soilw + wf.canopyw_to_soilw;
    let ratio = if wetting > pot || wf.pondw_evap > 0.0 {
        epv.days_since_rain = 0.0;
        WET_DAY_RATIO
    } else {
        epv.days_since_rain += 1.0;
        DRY_COEF / epv.days_since_rain.powi(2)
    };
    let demand = remaining * ratio;

    let available = (soilw_top - top.hw_water()).max(0.0) + (wetting - wf.prcp_to_runoff).max(0.0);
    if demand > available {
        flags.raise(Advisory::EvaporationLimited);
        available
    } else {
        demand
    }
}
