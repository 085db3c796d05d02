//! Nitrogen inputs and soil mineral-N transformations.
//!
//! Transformations run after allocation and only draw on the NH4 and NO3
//! left once plant uptake and immobilization have taken their share, so
//! they can never drive a pool negative.

use std::f64::consts::PI;

use crate::constants::DAYS_PER_YEAR;
use crate::epv::EcophysVariables;
use crate::flux::NitrogenFlux;
use crate::params::{SiteConstants, SoilProfile};
use crate::state::NitrogenState;

/// Daily deposition and fixation into the surface layer.
pub fn n_inputs(site: &SiteConstants, nf: &mut NitrogenFlux) {
    let ndep = site.ndep / DAYS_PER_YEAR;
    nf.ndep_to_nh4 = ndep * site.ndep_nh4_share;
    nf.ndep_to_no3 = ndep * (1.0 - site.ndep_nh4_share);
    nf.nfix_to_nh4 = site.nfix / DAYS_PER_YEAR;
}

/// Nitrification response to soil pH, near 1 at neutral and falling
/// toward 0 in acid soil.
pub fn ph_scalar(ph: f64) -> f64 {
    (0.56 + (PI * 0.45 * (ph - 5.0)).atan() / PI).clamp(0.0, 1.0)
}

/// Nitrification, denitrification and volatilization of every layer.
pub fn n_transformations(
    ns: &NitrogenState,
    soil: &SoilProfile,
    epv: &EcophysVariables,
    nf: &mut NitrogenFlux,
) {
    let bgc = &soil.bgc;
    for (l, layer) in soil.layers.iter().enumerate() {
        let (surface_nh4, surface_no3) = if l == 0 {
            (nf.ndep_to_nh4 + nf.nfix_to_nh4, nf.ndep_to_no3)
        } else {
            (0.0, 0.0)
        };
        let gross_min = nf.decomp[l].gross_mineralization();
        let mut nh4 = (ns.soil[l].nh4 + surface_nh4 + gross_min
            - nf.nh4_uptake[l]
            - nf.nh4_immob[l])
            .max(0.0);
        let no3 = (ns.soil[l].no3 + surface_no3 - nf.no3_uptake[l] - nf.no3_immob[l]).max(0.0);

        let vol = (bgc.nvol_prop * gross_min).min(nh4);
        nf.volatilization[l] = vol;
        nh4 -= vol;

        let tscalar = epv.decomp_tscalar[l];
        let nitrified = (bgc.nitrif_rate * nh4 * tscalar * epv.decomp_wscalar[l] * ph_scalar(layer.ph))
            .clamp(0.0, nh4);
        nf.nitrif_n2o[l] = nitrified * bgc.nitrif_n2o;
        nf.nitrification[l] = nitrified - nf.nitrif_n2o[l];

        let wfps = epv.wfps[l];
        nf.denitrification[l] = if wfps > bgc.denit_wfps && bgc.denit_wfps < 1.0 {
            let wet = ((wfps - bgc.denit_wfps) / (1.0 - bgc.denit_wfps)).min(1.0);
            (bgc.denit_rate * no3 * tscalar * wet).clamp(0.0, no3)
        } else {
            0.0
        };
    }
}
