//! End-of-day clean-up: tiny pools are zeroed into a sink, fixed-ratio
//! nitrogen pools are re-derived from their carbon, and nothing may be
//! left materially negative.

use log::debug;

use crate::constants::{CN_DRIFT_WARN, CRIT_PREC, CRIT_PREC_C, CRIT_PREC_N, CRIT_PREC_WATER};
use crate::decomp::SOM_CN;
use crate::disturbance::litter_classes;
use crate::error::{Advisory, AdvisoryFlags, BgcError, BgcResult, Domain};
use crate::params::EcophysConstants;
use crate::state::{CarbonState, NitrogenState, SubPool, Tissue, WaterState, N_CUTDOWN, N_LITTER};

/// Zero `pool` if it is below `eps` in magnitude and return what it held.
fn take_if_tiny(pool: &mut f64, eps: f64) -> f64 {
    if *pool != 0.0 && pool.abs() < eps {
        std::mem::take(pool)
    } else {
        0.0
    }
}

/// Zero a C pool below `CRIT_PREC_C` together with its N partner. Returns
/// the removed `(c, n)`.
fn take_pair(c: &mut f64, n: &mut f64) -> (f64, f64) {
    if *c != 0.0 && c.abs() < CRIT_PREC_C {
        (std::mem::take(c), std::mem::take(n))
    } else {
        (0.0, 0.0)
    }
}

/// Zero pools too small to matter and book their residue.
///
/// Living tissue drops into surface litter. Dead organic matter is
/// respired, its nitrogen mineralized to NH4. Mineral N is volatilized and
/// surface water evaporates. Returns the carbon moved.
pub fn precision_control(
    epc: &EcophysConstants,
    ws: &mut WaterState,
    cs: &mut CarbonState,
    ns: &mut NitrogenState,
) -> f64 {
    let mut moved = 0.0;
    let mut to_litter = [0.0; N_CUTDOWN];
    let mut to_litter_n = [0.0; N_CUTDOWN];

    for t in Tissue::ALL {
        for sub in SubPool::ALL {
            let (c, n) = take_pair(cs.plant[t].get_mut(sub), ns.plant[t].get_mut(sub));
            if c == 0.0 && n == 0.0 {
                continue;
            }
            moved += c.abs();
            if c > 0.0 && n >= 0.0 {
                for (k, share) in litter_classes(epc, t, sub).iter().enumerate() {
                    to_litter[k] += c * share;
                    to_litter_n[k] += n * share;
                }
            } else {
                // overdrawn by rounding: settle against respiration
                cs.snk.maintenance_resp += c;
                ns.snk.precision += n;
            }
        }
    }
    let mr = take_if_tiny(&mut cs.cpool, CRIT_PREC_C);
    let gr = take_if_tiny(&mut cs.gresp_storage, CRIT_PREC_C)
        + take_if_tiny(&mut cs.gresp_transfer, CRIT_PREC_C);
    cs.snk.maintenance_resp += mr;
    cs.snk.growth_resp += gr;
    moved += mr.abs() + gr.abs();

    let mut hr = 0.0;
    let mut released = take_if_tiny(&mut ns.npool, CRIT_PREC_N)
        + take_if_tiny(&mut ns.retransn, CRIT_PREC_N);
    for k in 0..N_LITTER {
        let (c, n) = take_pair(&mut cs.standing_dead[k], &mut ns.standing_dead[k]);
        hr += c;
        released += n;
    }
    for k in 0..cs.cutdown.len() {
        let (c, n) = take_pair(&mut cs.cutdown[k], &mut ns.cutdown[k]);
        hr += c;
        released += n;
    }
    ns.soil[0].nh4 += released;

    for (sc, sn) in cs.soil.iter_mut().zip(ns.soil.iter_mut()) {
        let mut layer_n = 0.0;
        for k in 0..N_LITTER {
            let (c, n) = take_pair(&mut sc.litter[k], &mut sn.litter[k]);
            hr += c;
            layer_n += n;
        }
        for k in 0..sc.som.len() {
            let (c, n) = take_pair(&mut sc.som[k], &mut sn.som[k]);
            hr += c;
            layer_n += n;
        }
        let (c, n) = take_pair(&mut sc.cwd, &mut sn.cwd);
        hr += c;
        layer_n += n;
        hr += take_if_tiny(&mut sc.doc, CRIT_PREC_C);
        layer_n += take_if_tiny(&mut sn.don, CRIT_PREC_N);
        sn.nh4 += layer_n;

        ns.snk.volatilization +=
            take_if_tiny(&mut sn.nh4, CRIT_PREC_N) + take_if_tiny(&mut sn.no3, CRIT_PREC_N);
    }
    cs.snk.heterotrophic_resp += hr;
    moved += hr.abs();

    // tissue residue joins the litter after the sweep
    let (sc, sn) = (&mut cs.soil[0], &mut ns.soil[0]);
    for k in 0..N_LITTER {
        sc.litter[k] += to_litter[k];
        sn.litter[k] += to_litter_n[k];
    }
    sc.cwd += to_litter[N_LITTER];
    sn.cwd += to_litter_n[N_LITTER];

    ws.snk.canopy_evaporation += take_if_tiny(&mut ws.canopyw, CRIT_PREC_WATER);
    ws.snk.snow_sublimation += take_if_tiny(&mut ws.snoww, CRIT_PREC_WATER);
    ws.snk.pond_evaporation += take_if_tiny(&mut ws.pondw, CRIT_PREC_WATER);

    if moved > 0.0 {
        debug!("precision control zeroed {moved:e} kgC/m2");
    }
    moved
}

/// Re-derive `n` from `c` at the nominal ratio. Returns the ratio drift
/// found and adds the N taken out to `removed`.
fn repair(c: f64, n: &mut f64, cn: f64, removed: &mut f64) -> f64 {
    if c <= 0.0 || *n <= 0.0 || cn <= 0.0 {
        return 0.0;
    }
    let drift = (c / *n - cn).abs();
    let target = c / cn;
    *removed += *n - target;
    *n = target;
    drift
}

/// Hold every fixed-ratio pool at its nominal C:N, carbon leading.
///
/// Nitrogen added or removed is booked against the precision sink.
/// Returns the largest ratio drift repaired today.
pub fn cn_ratio_control(
    epc: &EcophysConstants,
    cs: &CarbonState,
    ns: &mut NitrogenState,
    flags: &mut AdvisoryFlags,
) -> f64 {
    let mut removed = 0.0;
    let mut max_drift: f64 = 0.0;
    for t in Tissue::ALL {
        let cn = epc.tissue_cn(t);
        for sub in SubPool::ALL {
            let c = cs.plant[t].get(sub);
            let drift = repair(c, ns.plant[t].get_mut(sub), cn, &mut removed);
            max_drift = max_drift.max(drift);
        }
    }
    for (sc, sn) in cs.soil.iter().zip(ns.soil.iter_mut()) {
        for (k, &cn) in SOM_CN.iter().enumerate() {
            let drift = repair(sc.som[k], &mut sn.som[k], cn, &mut removed);
            max_drift = max_drift.max(drift);
        }
    }
    ns.snk.precision += removed;
    if max_drift > CN_DRIFT_WARN {
        debug!("C:N drift {max_drift:e} repaired, {removed:e} kgN/m2 booked");
        flags.raise(Advisory::CnDrift);
    }
    max_drift
}

fn check(
    domain: Domain,
    value: f64,
    layer: Option<usize>,
    name: impl FnOnce() -> String,
) -> BgcResult<()> {
    if value < -CRIT_PREC || value.is_nan() {
        return Err(BgcError::invariant(domain, name(), layer, value));
    }
    Ok(())
}

/// Fail on the first pool left below `-CRIT_PREC`.
pub fn check_non_negative(ws: &WaterState, cs: &CarbonState, ns: &NitrogenState) -> BgcResult<()> {
    for (l, &w) in ws.soilw.iter().enumerate() {
        check(Domain::Water, w, Some(l), || "soilw".into())?;
    }
    check(Domain::Water, ws.snoww, None, || "snoww".into())?;
    check(Domain::Water, ws.canopyw, None, || "canopyw".into())?;
    check(Domain::Water, ws.pondw, None, || "pondw".into())?;

    for (domain, plant) in [(Domain::Carbon, &cs.plant), (Domain::Nitrogen, &ns.plant)] {
        for (t, p) in plant.iter() {
            for sub in SubPool::ALL {
                check(domain, p.get(sub), None, || format!("{}_{}", t.name(), sub.name()))?;
            }
        }
    }
    check(Domain::Carbon, cs.cpool, None, || "cpool".into())?;
    check(Domain::Carbon, cs.gresp_storage, None, || "gresp_storage".into())?;
    check(Domain::Carbon, cs.gresp_transfer, None, || "gresp_transfer".into())?;
    check(Domain::Nitrogen, ns.npool, None, || "npool".into())?;
    check(Domain::Nitrogen, ns.retransn, None, || "retransn".into())?;
    for k in 0..N_LITTER {
        check(Domain::Carbon, cs.standing_dead[k], None, || format!("standing_dead[{k}]"))?;
        check(Domain::Nitrogen, ns.standing_dead[k], None, || format!("standing_dead[{k}]"))?;
    }
    for (k, (&c, &n)) in cs.cutdown.iter().zip(&ns.cutdown).enumerate() {
        check(Domain::Carbon, c, None, || format!("cutdown[{k}]"))?;
        check(Domain::Nitrogen, n, None, || format!("cutdown[{k}]"))?;
    }

    for (l, (sc, sn)) in cs.soil.iter().zip(&ns.soil).enumerate() {
        for k in 0..N_LITTER {
            check(Domain::Carbon, sc.litter[k], Some(l), || format!("litter[{k}]"))?;
            check(Domain::Nitrogen, sn.litter[k], Some(l), || format!("litter[{k}]"))?;
        }
        for k in 0..sc.som.len() {
            check(Domain::Carbon, sc.som[k], Some(l), || format!("som[{k}]"))?;
            check(Domain::Nitrogen, sn.som[k], Some(l), || format!("som[{k}]"))?;
        }
        check(Domain::Carbon, sc.cwd, Some(l), || "cwd".into())?;
        check(Domain::Carbon, sc.doc, Some(l), || "doc".into())?;
        check(Domain::Nitrogen, sn.cwd, Some(l), || "cwd".into())?;
        check(Domain::Nitrogen, sn.don, Some(l), || "don".into())?;
        check(Domain::Nitrogen, sn.nh4, Some(l), || "nh4".into())?;
        check(Domain::Nitrogen, sn.no3, Some(l), || "no3".into())?;
    }
    Ok(())
}
