//! Vertical movement of mobile solutes with the day's water fluxes.
//!
//! Runs on the pools left by the main update. Each layer exports a share
//! of its mobile solute equal to the share of its water that left it, split
//! between downward (percolation plus downward diffusion) and upward
//! (upward diffusion) flow. Downward flow out of the bottom layer leaves
//! the column as leaching.

use crate::error::{Advisory, AdvisoryFlags};
use crate::flux::{CarbonFlux, NitrogenFlux, SoluteFlux, SoluteProfile, WaterFlux};
use crate::params::SoilProfile;
use crate::state::{CarbonState, NitrogenState, WaterState};

/// Water leaving each layer downward and upward (kg/m2).
fn water_out(wf: &WaterFlux, l: usize) -> (f64, f64) {
    let down = wf.soilw_percolation[l] + wf.soilw_diffusion[l].max(0.0);
    let up = if l > 0 {
        (-wf.soilw_diffusion[l - 1]).max(0.0)
    } else {
        0.0
    };
    (down, up)
}

/// Solute carried out of every layer for one pool profile.
///
/// Returns `true` if any layer hit its mobile-pool cap.
pub fn solute_flux(
    pools: &[f64],
    mobile: f64,
    soilw: &[f64],
    wf: &WaterFlux,
    out: &mut SoluteProfile,
) -> bool {
    let mut capped = false;
    for (l, (&pool, &w)) in pools.iter().zip(soilw).enumerate() {
        let (down, up) = water_out(wf, l);
        let moved = down + up;
        let mobile_pool = pool.max(0.0) * mobile;
        out[l] = SoluteFlux::default();
        if moved <= 0.0 || mobile_pool <= 0.0 {
            continue;
        }
        let wanted = if w > 0.0 {
            mobile_pool * moved / w
        } else {
            f64::INFINITY
        };
        let total = if wanted > mobile_pool {
            capped = true;
            mobile_pool
        } else {
            wanted
        };
        out[l] = SoluteFlux {
            down: total * down / moved,
            up: total * up / moved,
        };
    }
    capped
}

/// Leaching of NH4, NO3, DON and DOC.
#[allow(clippy::too_many_arguments)]
pub fn multilayer_leaching(
    ws: &WaterState,
    cs: &CarbonState,
    ns: &NitrogenState,
    soil: &SoilProfile,
    wf: &WaterFlux,
    cf: &mut CarbonFlux,
    nf: &mut NitrogenFlux,
    flags: &mut AdvisoryFlags,
) {
    let bgc = &soil.bgc;
    let nh4: Vec<f64> = ns.soil.iter().map(|s| s.nh4).collect();
    let no3: Vec<f64> = ns.soil.iter().map(|s| s.no3).collect();
    let don: Vec<f64> = ns.soil.iter().map(|s| s.don).collect();
    let doc: Vec<f64> = cs.soil.iter().map(|s| s.doc).collect();

    let mut capped = solute_flux(&nh4, bgc.mobile_nh4, &ws.soilw, wf, &mut nf.transport_nh4);
    capped |= solute_flux(&no3, bgc.mobile_no3, &ws.soilw, wf, &mut nf.transport_no3);
    capped |= solute_flux(&don, bgc.mobile_dom, &ws.soilw, wf, &mut nf.transport_don);
    capped |= solute_flux(&doc, bgc.mobile_dom, &ws.soilw, wf, &mut cf.doc_transport);
    if capped {
        flags.raise(Advisory::LeachingLimited);
    }
}

/// Net change of each layer's pool implied by a transport profile, and the
/// amount leaving the bottom of the column.
pub fn transport_delta(profile: &SoluteProfile) -> (Vec<f64>, f64) {
    let n = profile.len();
    let mut delta = vec![0.0; n];
    let mut leached = 0.0;
    for (l, f) in profile.iter().enumerate() {
        delta[l] -= f.total();
        if l + 1 < n {
            delta[l + 1] += f.down;
        } else {
            leached += f.down;
        }
        if l > 0 {
            delta[l - 1] += f.up;
        }
    }
    (delta, leached)
}
