//! Surface runoff and ponding.

use crate::flux::WaterFlux;
use crate::params::SoilProfile;

/// SCS curve-number runoff (kg/m2) from water reaching the surface.
pub fn scs_runoff(water: f64, curve_number: f64) -> f64 {
    if curve_number <= 0.0 || water <= 0.0 {
        return 0.0;
    }
    let s = 25_400.0 / curve_number - 254.0;
    let ia = 0.2 * s;
    if water <= ia {
        0.0
    } else {
        (water - ia).powi(2) / (water - ia + s)
    }
}

/// Runoff of rain, melt and drip before infiltration.
pub fn surface_runoff(soil: &SoilProfile, wf: &mut WaterFlux) {
    let surface = wf.prcp_to_soilw + wf.snoww_to_soilw + wf.canopyw_to_soilw;
    wf.prcp_to_runoff = scs_runoff(surface, soil.curve_number).min(surface);
}

/// Release what is left of the standing pond into the soil.
///
/// Must run after pond evaporation has been set.
pub fn pond_infiltration(pondw: f64, wf: &mut WaterFlux) {
    wf.pondw_to_soilw = (pondw - wf.pondw_evap).max(0.0);
}

/// Spill pond water above the maximum pond depth as runoff.
///
/// Must run after the soil scheme has reported its saturation excess.
pub fn pond_and_runoff(pondw: f64, soil: &SoilProfile, wf: &mut WaterFlux) {
    let pond = pondw - wf.pondw_evap - wf.pondw_to_soilw + wf.soilw_to_pondw;
    wf.pondw_to_runoff = (pond - soil.pond_max).max(0.0);
}
