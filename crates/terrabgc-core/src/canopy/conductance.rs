use crate::constants::{P_STD, TK_OFFSET};
use crate::epv::EcophysVariables;
use crate::forcing::MetVariables;
use crate::params::EcophysConstants;

/// PPFD at which the light multiplier reaches one half (umol/m2/s).
const PPFD50: f64 = 75.0;
/// Lower bound of the combined stomatal multiplier.
const M_FINAL_MIN: f64 = 1e-8;

/// Temperature and pressure correction for conductances.
pub fn gcorr(tday: f64, pa: f64) -> f64 {
    ((tday + TK_OFFSET) / 293.15).powf(1.75) * P_STD / pa
}

/// Night frost multiplier: linear from 1 at 0 C to 0 at -8 C.
pub fn m_tmin(tmin: f64) -> f64 {
    if tmin >= 0.0 {
        1.0
    } else if tmin > -8.0 {
        1.0 + 0.125 * tmin
    } else {
        0.0
    }
}

/// VPD multiplier: linear from full opening to full closure.
pub fn m_vpd(vpd: f64, open: f64, close: f64) -> f64 {
    if vpd <= open {
        1.0
    } else if vpd < close {
        (close - vpd) / (close - open)
    } else {
        0.0
    }
}

/// Leaf-scale stomatal, cuticular and boundary-layer conductances for
/// the sunlit and shaded canopy.
///
/// Expects radiation and the root-zone soil stress multiplier to be set.
pub fn conduct_calc(met: &MetVariables, epc: &EcophysConstants, epv: &mut EcophysVariables) {
    let corr = gcorr(met.tday, met.pa);

    epv.gl_bl = epc.gl_bl * corr;
    let gl_c = epc.gl_c * corr;

    epv.m_ppfd_sun = epv.ppfd_per_plaisun / (PPFD50 + epv.ppfd_per_plaisun);
    epv.m_ppfd_shade = epv.ppfd_per_plaishade / (PPFD50 + epv.ppfd_per_plaishade);
    epv.m_tmin = m_tmin(met.tmin);
    epv.m_vpd = m_vpd(met.vpd, epc.vpd_open, epc.vpd_close);

    let common = epv.m_soilstress * epv.m_tmin * epv.m_vpd;
    epv.m_final_sun = (epv.m_ppfd_sun * common).max(M_FINAL_MIN);
    epv.m_final_shade = (epv.m_ppfd_shade * common).max(M_FINAL_MIN);

    epv.gl_s_sun = epc.gl_smax * epv.m_final_sun * corr;
    epv.gl_s_shade = epc.gl_smax * epv.m_final_shade * corr;

    // stomata and cuticle in parallel, in series with the boundary layer
    epv.gl_t_wv_sun = epv.gl_bl * (epv.gl_s_sun + gl_c) / (epv.gl_bl + epv.gl_s_sun + gl_c);
    epv.gl_t_wv_shade =
        epv.gl_bl * (epv.gl_s_shade + gl_c) / (epv.gl_bl + epv.gl_s_shade + gl_c);

    epv.gl_e_wv = epv.gl_bl;
    epv.gl_sh = epv.gl_bl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_conditions_have_unit_correction() {
        assert_relative_eq!(gcorr(20.0, P_STD), 1.0, epsilon = 1e-12);
        assert!(gcorr(30.0, P_STD) > 1.0);
    }

    #[test]
    fn frost_and_vpd_ramps() {
        assert_eq!(m_tmin(2.0), 1.0);
        assert_relative_eq!(m_tmin(-4.0), 0.5);
        assert_eq!(m_tmin(-9.0), 0.0);
        assert_eq!(m_vpd(900.0, 1100.0, 3600.0), 1.0);
        assert_relative_eq!(m_vpd(2350.0, 1100.0, 3600.0), 0.5);
        assert_eq!(m_vpd(4000.0, 1100.0, 3600.0), 0.0);
    }

    #[test]
    fn closed_stomata_keep_floor_conductance() {
        let epc = EcophysConstants::default();
        let mut epv = EcophysVariables::new(1);
        epv.ppfd_per_plaisun = 800.0;
        epv.m_soilstress = 0.0;
        let met = MetVariables::from_daily(25.0, 15.0, 0.0, 1000.0, 500.0, 225.0, 43_200.0, 20.0, 10.0, P_STD, 380.0);
        conduct_calc(&met, &epc, &mut epv);
        assert_eq!(epv.m_final_sun, 1e-8);
        assert!(epv.gl_t_wv_sun > 0.0);
        assert!(epv.gl_t_wv_sun < epv.gl_bl);
    }
}
