//! Canopy interception and the snowpack.

use crate::epv::EcophysVariables;
use crate::flux::WaterFlux;
use crate::forcing::MetVariables;
use crate::params::EcophysConstants;

/// Temperature melt coefficient (kg/m2/C/day).
pub const SNOW_TCOEF: f64 = 0.65;
/// Snowpack absorptivity for shortwave.
pub const SNOW_ABS: f64 = 0.6;
/// Latent heat of fusion (kJ/kg).
pub const LH_FUS: f64 = 335.0;
/// Latent heat of sublimation (kJ/kg).
pub const LH_SUB: f64 = 2845.0;

/// Split precipitation into canopy interception, throughfall and snow.
///
/// Below freezing everything accumulates as snow. Otherwise the canopy
/// intercepts up to `int_coef * prcp * all_lai`.
pub fn prcp_route(met: &MetVariables, epc: &EcophysConstants, epv: &EcophysVariables, wf: &mut WaterFlux) {
    let prcp = met.prcp;
    if met.tavg > 0.0 {
        let max_int = epc.int_coef * prcp * epv.all_lai;
        if prcp <= max_int {
            wf.prcp_to_canopyw = prcp;
            wf.prcp_to_soilw = 0.0;
        } else {
            wf.prcp_to_canopyw = max_int;
            wf.prcp_to_soilw = prcp - max_int;
        }
    } else {
        wf.prcp_to_snoww = prcp;
    }
}

/// Snowmelt above freezing, sublimation below.
///
/// Both are capped by the snowpack. Radiation is the shortwave
/// transmitted through the canopy.
pub fn snowmelt(met: &MetVariables, swtrans: f64, snoww: f64, wf: &mut WaterFlux) {
    let incident = swtrans * SNOW_ABS * met.dayl * 0.001;
    if met.tavg > 0.0 {
        let melt = SNOW_TCOEF * met.tavg + incident / LH_FUS;
        wf.snoww_to_soilw = melt.min(snoww);
    } else {
        wf.snoww_subl = (incident / LH_SUB).min(snoww);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn met(tavg: f64, prcp_cm: f64, dayl: f64) -> MetVariables {
        MetVariables::from_daily(tavg, tavg, prcp_cm, 0.0, 0.0, 0.0, dayl, tavg, tavg, 1e5, 380.0)
    }

    #[test]
    fn warm_snowmelt_is_capped_by_pack() {
        let mut wf = WaterFlux::new(1);
        snowmelt(&met(5.0, 0.0, 43_200.0), 100.0, 2.0, &mut wf);
        // 0.65 * 5 + 100 * 0.6 * 43200 * 0.001 / 335 > 2.0
        assert_eq!(wf.snoww_to_soilw, 2.0);
        assert_eq!(wf.snoww_subl, 0.0);
    }

    #[test]
    fn partial_melt_below_cap() {
        let mut wf = WaterFlux::new(1);
        snowmelt(&met(1.0, 0.0, 43_200.0), 100.0, 50.0, &mut wf);
        let expected = 0.65 + 2592.0 / 335.0;
        assert_relative_eq!(wf.snoww_to_soilw, expected, epsilon = 1e-12);
    }

    #[test]
    fn cold_days_sublimate() {
        let mut wf = WaterFlux::new(1);
        snowmelt(&met(-3.0, 0.0, 36_000.0), 200.0, 10.0, &mut wf);
        assert_eq!(wf.snoww_to_soilw, 0.0);
        assert_relative_eq!(wf.snoww_subl, 200.0 * 0.6 * 36.0 / 2845.0, epsilon = 1e-12);
    }

    #[test]
    fn interception_caps_at_lai_capacity() {
        let mut epv = EcophysVariables::new(1);
        epv.all_lai = 4.0;
        let mut wf = WaterFlux::new(1);
        prcp_route(&met(10.0, 2.0, 0.0), &EcophysConstants::default(), &epv, &mut wf);
        // 20 kg/m2, capacity 0.045 * 20 * 4 = 3.6
        assert_relative_eq!(wf.prcp_to_canopyw, 3.6, epsilon = 1e-12);
        assert_relative_eq!(wf.prcp_to_soilw, 16.4, epsilon = 1e-12);
    }

    #[test]
    fn freezing_precipitation_is_snow() {
        let epv = EcophysVariables::new(1);
        let mut wf = WaterFlux::new(1);
        prcp_route(&met(-1.0, 1.0, 0.0), &EcophysConstants::default(), &epv, &mut wf);
        assert_eq!(wf.prcp_to_snoww, 10.0);
        assert_eq!(wf.prcp_to_canopyw + wf.prcp_to_soilw, 0.0);
    }
}
