//! Maintenance and growth respiration.
//!
//! Maintenance respiration scales with tissue nitrogen and a Q10
//! temperature response referenced to 20 C. Growth respiration is a fixed
//! share of new tissue carbon, paid now or held in the growth-respiration
//! reserve until the stored growth is displayed.

use log::debug;

use crate::constants::{SECONDS_PER_DAY, UMOL_C_TO_KG};
use crate::epv::EcophysVariables;
use crate::error::{Advisory, AdvisoryFlags};
use crate::flux::{CarbonFlux, NitrogenFlux};
use crate::forcing::MetVariables;
use crate::params::EcophysConstants;
use crate::state::{PlantPools, SubPool, Tissue, TissuePools};

/// Daily maintenance respiration per unit N at temperature `t` (kgC/kgN/day).
pub fn mr_rate(t: f64, epc: &EcophysConstants) -> f64 {
    epc.mrpern * epc.q10_mr.powf((t - 20.0) / 10.0)
}

/// Maintenance respiration of every living tissue.
///
/// Leaves respire at the daylight temperature for the daylight share of the
/// day and at night temperature for the rest. Fine and live coarse roots
/// follow root-zone soil temperature; everything else follows air
/// temperature. Also sets the daytime leaf respiration per leaf area that
/// photosynthesis needs.
pub fn maint_resp(
    met: &MetVariables,
    epc: &EcophysConstants,
    plant_n: &PlantPools,
    epv: &mut EcophysVariables,
    cf: &mut CarbonFlux,
) {
    let day_share = (met.dayl / SECONDS_PER_DAY).clamp(0.0, 1.0);
    let leaf_n = plant_n[Tissue::Leaf].active;
    cf.leaf_day_mr = leaf_n * mr_rate(met.tday, epc) * day_share;
    cf.leaf_night_mr = leaf_n * mr_rate(met.tnight, epc) * (1.0 - day_share);
    cf.mr[Tissue::Leaf.index()] = cf.leaf_day_mr + cf.leaf_night_mr;

    let troot = if epv.n_rootlayers > 0 {
        epv.root_zone_tsoil()
    } else {
        epv.tsoil.first().copied().unwrap_or(met.tavg)
    };
    for t in Tissue::ALL {
        if t == Tissue::Leaf || !t.respires() {
            continue;
        }
        let temp = if t.is_belowground() { troot } else { met.tavg };
        cf.mr[t.index()] = plant_n[t].active * mr_rate(temp, epc);
    }

    // kgC/kgN/day to umol/kgN/s
    let per_area = mr_rate(met.tday, epc) / SECONDS_PER_DAY / UMOL_C_TO_KG;
    epv.dlmr_area_sun = area_rate(epv.sun_proj_sla, epc.leaf_cn, per_area);
    epv.dlmr_area_shade = area_rate(epv.shade_proj_sla, epc.leaf_cn, per_area);
}

fn area_rate(sla: f64, leaf_cn: f64, per_n: f64) -> f64 {
    if sla > 0.0 {
        per_n / (sla * leaf_cn)
    } else {
        0.0
    }
}

/// Cover a maintenance deficit (MR above GPP) from plant carbon.
///
/// The non-structural pool pays first, then storage and transfer reserves,
/// then displayed living tissue, each spread over tissues in proportion to
/// their size. `carbon` and `nitrogen` are the pools as they stand after
/// today's phenology. Mobilized nitrogen goes to retranslocation. Whatever
/// cannot be covered is taken off maintenance respiration itself.
pub fn cover_mr_deficit(
    deficit: f64,
    cpool: f64,
    carbon: &PlantPools,
    nitrogen: &PlantPools,
    cf: &mut CarbonFlux,
    nf: &mut NitrogenFlux,
    flags: &mut AdvisoryFlags,
) {
    let mut rest = deficit - cpool.max(0.0).min(deficit);

    rest = mobilize(rest, carbon, nitrogen, cf, nf, |p| TissuePools {
        active: 0.0,
        ..*p
    });
    rest = mobilize(rest, carbon, nitrogen, cf, nf, |p| TissuePools {
        active: p.active,
        storage: 0.0,
        transfer: 0.0,
    });

    if rest > 0.0 {
        let mr = cf.mr_total();
        let scale = if mr > 0.0 { ((mr - rest) / mr).max(0.0) } else { 0.0 };
        cf.mr.iter_mut().for_each(|m| *m *= scale);
        cf.leaf_day_mr *= scale;
        cf.leaf_night_mr *= scale;
        debug!("maintenance respiration scaled by {scale:.4}, {rest:e} kgC/m2 unmet");
        flags.raise(Advisory::MrDeficitUnmet);
    }
}

/// Take up to `need` carbon from the sub-pools `select` picks out of each
/// respiring tissue. Returns what is still uncovered.
fn mobilize(
    need: f64,
    carbon: &PlantPools,
    nitrogen: &PlantPools,
    cf: &mut CarbonFlux,
    nf: &mut NitrogenFlux,
    select: impl Fn(&TissuePools) -> TissuePools,
) -> f64 {
    if need <= 0.0 {
        return 0.0;
    }
    let picked: [TissuePools; Tissue::COUNT] = std::array::from_fn(|i| {
        let t = Tissue::ALL[i];
        if !t.respires() {
            return TissuePools::default();
        }
        let (c, m) = (&carbon[t], &cf.plant.mobilized[i]);
        select(&TissuePools {
            active: (c.active - m.active).max(0.0),
            storage: (c.storage - m.storage).max(0.0),
            transfer: (c.transfer - m.transfer).max(0.0),
        })
    });
    let available: f64 = picked.iter().map(TissuePools::total).sum();
    if available <= 0.0 {
        return need;
    }
    let take = need.min(available);
    let frac = take / available;
    for (t, p) in carbon.iter() {
        let i = t.index();
        for sub in SubPool::ALL {
            let dc = frac * picked[i].get(sub);
            let pool_c = p.get(sub);
            if dc > 0.0 && pool_c > 0.0 {
                *cf.plant.mobilized[i].get_mut(sub) += dc;
                *nf.plant.mobilized[i].get_mut(sub) += nitrogen[t].get(sub).max(0.0) * dc / pool_c;
            }
        }
    }
    need - take
}

/// Growth respiration on today's allocation and on stored growth being
/// displayed.
///
/// `gresp_available` is the growth-respiration reserve able to pay for
/// displayed transfer growth today.
pub fn growth_resp(epc: &EcophysConstants, gresp_available: f64, cf: &mut CarbonFlux) {
    let g1 = epc.gr_perc;
    let g2 = epc.gr_prop_now;
    let mut deferred = 0.0;
    for i in 0..Tissue::COUNT {
        cf.gr[i] = cf.plant.pool_to_active[i] * g1;
        cf.storage_gr[i] = cf.plant.pool_to_storage[i] * g1 * g2;
        deferred += cf.plant.pool_to_storage[i] * g1 * (1.0 - g2);
    }
    cf.cpool_to_gresp_storage = deferred;

    let displayed: f64 = cf.plant.transfer_to_active.iter().sum();
    cf.transfer_gr = (displayed * g1 * (1.0 - g2)).min(gresp_available.max(0.0));
}
