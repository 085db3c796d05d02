//! Penman-Monteith evaporation: canopy interception loss, transpiration
//! and potential bare-soil evaporation.

use super::conductance::gcorr;
use crate::constants::{CP, EPS, SBC, TK_OFFSET};
use crate::epv::EcophysVariables;
use crate::error::{BgcError, BgcResult};
use crate::flux::WaterFlux;
use crate::forcing::MetVariables;

/// Soil surface boundary-layer resistance at 20 C and standard pressure (s/m).
const RBL_SOIL: f64 = 107.0;

#[derive(Debug, Clone, Copy)]
pub struct PmInput {
    /// Air temperature (C).
    pub ta: f64,
    /// Air pressure (Pa).
    pub pa: f64,
    /// Vapour pressure deficit (Pa).
    pub vpd: f64,
    /// Absorbed radiation (W/m2).
    pub irad: f64,
    /// Resistance to water vapour (s/m).
    pub rv: f64,
    /// Resistance to sensible heat (s/m).
    pub rh: f64,
}

/// Evaporation rate from the Penman-Monteith combination equation (kg/m2/s).
pub fn penmon(input: &PmInput) -> BgcResult<f64> {
    let PmInput { ta, pa, vpd, irad, rv, rh } = *input;
    if !(rv > 0.0 && rh > 0.0) || !rv.is_finite() || !rh.is_finite() {
        return Err(BgcError::numerical(
            "penmon",
            format!("resistances must be positive and finite (rv {rv}, rh {rh})"),
        ));
    }
    let tk = ta + TK_OFFSET;
    let rho = 1.292 - 0.00428 * ta;
    let lhvap = 2.5023e6 - 2430.54 * ta;

    // radiative and sensible heat resistances in parallel
    let rr = rho * CP / (4.0 * SBC * tk.powi(3));
    let rhr = rh * rr / (rh + rr);

    let dt = 0.2;
    let t1 = ta + dt;
    let t2 = ta - dt;
    let pvs1 = 610.7 * (17.38 * t1 / (239.0 + t1)).exp();
    let pvs2 = 610.7 * (17.38 * t2 / (239.0 + t2)).exp();
    let slope = (pvs1 - pvs2) / (t1 - t2);

    let e = (slope * irad + rho * CP * vpd / rhr)
        / (pa * CP * rv / (lhvap * EPS * rhr) + slope)
        / lhvap;
    Ok(e.max(0.0))
}

/// Evaporation of intercepted water, then transpiration for the rest of
/// the daylight period.
///
/// Sets `canopyw_evap`, drops the canopy store to the soil when there are
/// no leaves, and sets the potential transpiration.
pub fn canopy_et(
    met: &MetVariables,
    canopyw: f64,
    epv: &EcophysVariables,
    wf: &mut WaterFlux,
) -> BgcResult<()> {
    let store = canopyw + wf.prcp_to_canopyw;
    if epv.all_lai <= 0.0 {
        wf.canopyw_to_soilw = store;
        wf.pot_trans = 0.0;
        return Ok(());
    }

    let mut dayl_trans = met.dayl;
    if store > 0.0 && met.dayl > 0.0 {
        let e = penmon(&PmInput {
            ta: met.tday,
            pa: met.pa,
            vpd: met.vpd,
            irad: epv.swabs,
            rv: 1.0 / (epv.gl_e_wv * epv.all_lai),
            rh: 1.0 / (epv.gl_sh * epv.all_lai),
        })?;
        let time_to_dry = if e > 0.0 { store / e } else { f64::INFINITY };
        if time_to_dry >= met.dayl {
            wf.canopyw_evap = e * met.dayl;
            dayl_trans = 0.0;
        } else {
            wf.canopyw_evap = store;
            dayl_trans = met.dayl - time_to_dry;
        }
    }

    wf.pot_trans = 0.0;
    if dayl_trans > 0.0 {
        let fractions = [
            (epv.plaisun, epv.swabs_per_plaisun, epv.gl_t_wv_sun),
            (epv.plaishade, epv.swabs_per_plaishade, epv.gl_t_wv_shade),
        ];
        for (plai, irad, gl) in fractions {
            if plai <= 0.0 {
                continue;
            }
            let e = penmon(&PmInput {
                ta: met.tday,
                pa: met.pa,
                vpd: met.vpd,
                irad,
                rv: 1.0 / gl,
                rh: 1.0 / epv.gl_sh,
            })?;
            wf.pot_trans += e * dayl_trans * plai;
        }
    }
    Ok(())
}

/// Potential evaporation from the soil surface below the canopy.
///
/// Zero under snow.
pub fn potential_evap(
    met: &MetVariables,
    snoww: f64,
    epv: &EcophysVariables,
    wf: &mut WaterFlux,
) -> BgcResult<()> {
    if snoww > 0.0 || wf.prcp_to_snoww > 0.0 {
        wf.pot_evap = 0.0;
        return Ok(());
    }
    let rbl = RBL_SOIL / gcorr(met.tavg, met.pa);
    let e = penmon(&PmInput {
        ta: met.tavg,
        pa: met.pa,
        vpd: met.vpd,
        irad: epv.swtrans,
        rv: rbl,
        rh: rbl,
    })?;
    wf.pot_evap = e * met.dayl;
    Ok(())
}
