use super::{add_dead_by_layer, DeadOrganic};
use crate::decomp::{DomPool, Pathway};
use crate::flux::{
    CarbonFlux, DecompCarbon, DecompNitrogen, DisturbanceFlux, DisturbanceFluxes, NitrogenFlux,
    PlantFlux,
};
use crate::phenology::after_phenology;
use crate::state::{CarbonState, NitrogenState, PlantPools, N_CUTDOWN, N_LITTER, N_SOM};
use crate::transport::transport_delta;

fn dom_pool<'a>(
    pool: DomPool,
    litter: &'a mut [f64; N_LITTER],
    som: &'a mut [f64; N_SOM],
) -> &'a mut f64 {
    match pool {
        DomPool::Litter(i) => &mut litter[i],
        DomPool::Som(i) => &mut som[i],
    }
}

/// Phenology, turnover, new growth and mobilization of one element.
fn update_plant(flux: &PlantFlux, pools: &mut PlantPools) {
    *pools = after_phenology(pools, flux);
    for (t, p) in pools.iter_mut() {
        let i = t.index();
        let m = &flux.mobilized[i];
        p.active += flux.pool_to_active[i] - m.active;
        p.storage += flux.pool_to_storage[i] - m.storage;
        p.transfer -= m.transfer;
    }
}

fn decomp_carbon(
    d: &DecompCarbon,
    litter: &mut [f64; N_LITTER],
    som: &mut [f64; N_SOM],
    cwd: &mut f64,
    doc: &mut f64,
) {
    for pw in Pathway::ALL {
        let i = pw.index();
        *dom_pool(pw.source(), litter, som) -= d.loss[i];
        if let Some(target) = pw.target() {
            *dom_pool(target, litter, som) += d.transfer[i];
        }
        *doc += d.to_doc[i];
    }
    for (k, &frag) in d.cwd_to_litter.iter().enumerate() {
        litter[k] += frag;
        *cwd -= frag;
    }
    *doc -= d.doc_hr;
}

/// Organic side of one layer's decomposition. Returns the NH4 released.
fn decomp_nitrogen(
    d: &DecompNitrogen,
    litter: &mut [f64; N_LITTER],
    som: &mut [f64; N_SOM],
    cwd: &mut f64,
    don: &mut f64,
) -> f64 {
    let mut released = 0.0;
    for pw in Pathway::ALL {
        let i = pw.index();
        *dom_pool(pw.source(), litter, som) -= d.loss[i];
        if let Some(target) = pw.target() {
            *dom_pool(target, litter, som) += d.transfer[i];
        }
        *don += d.to_don[i];
        if d.mineral[i] < 0.0 {
            released -= d.mineral[i];
        }
    }
    for (k, &frag) in d.cwd_to_litter.iter().enumerate() {
        litter[k] += frag;
        *cwd -= frag;
    }
    *don -= d.don_mineralized;
    released + d.don_mineralized
}

/// Commit the day's plant and soil carbon and nitrogen fluxes.
///
/// Phenology and turnover come first, then new growth and respiration
/// out of the non-structural pools, then litter input, decomposition and
/// the mineral N cycle.
pub fn daily_cn_state_update(
    cf: &CarbonFlux,
    nf: &NitrogenFlux,
    cs: &mut CarbonState,
    ns: &mut NitrogenState,
) {
    update_plant(&cf.plant, &mut cs.plant);
    update_plant(&nf.plant, &mut ns.plant);

    let gr_now: f64 = cf.gr.iter().sum::<f64>() + cf.storage_gr.iter().sum::<f64>();
    cs.cpool += cf.gpp() + cf.plant.mobilized_total()
        - cf.mr_total()
        - cf.plant.allocation_total()
        - gr_now
        - cf.cpool_to_gresp_storage;
    cs.gresp_storage += cf.cpool_to_gresp_storage - cf.gresp_storage_to_transfer;
    cs.gresp_transfer += cf.gresp_storage_to_transfer - cf.transfer_gr;

    ns.retransn += nf.plant.retrans_total() + nf.plant.mobilized_total() - nf.retrans_to_npool;
    ns.npool += nf.retrans_to_npool + nf.uptake_total() - nf.plant.allocation_total();

    add_dead_by_layer(&mut cs.soil, &cf.plant.litter_in);
    add_dead_by_layer(&mut ns.soil, &nf.plant.litter_in);

    for (l, (sc, sn)) in cs.soil.iter_mut().zip(ns.soil.iter_mut()).enumerate() {
        decomp_carbon(&cf.decomp[l], &mut sc.litter, &mut sc.som, &mut sc.cwd, &mut sc.doc);
        let released =
            decomp_nitrogen(&nf.decomp[l], &mut sn.litter, &mut sn.som, &mut sn.cwd, &mut sn.don);

        sn.nh4 += released
            - nf.nh4_immob[l]
            - nf.nh4_uptake[l]
            - nf.volatilization[l]
            - nf.nitrification[l]
            - nf.nitrif_n2o[l];
        sn.no3 += nf.nitrification[l] - nf.no3_immob[l] - nf.no3_uptake[l] - nf.denitrification[l];
    }
    ns.soil[0].nh4 += nf.ndep_to_nh4 + nf.nfix_to_nh4;
    ns.soil[0].no3 += nf.ndep_to_no3;

    cs.src.photosynthesis += cf.gpp();
    cs.snk.maintenance_resp += cf.mr_total();
    cs.snk.growth_resp += cf.gr_total();
    cs.snk.heterotrophic_resp += cf.hr_total();
    cs.ch4_flux += cf.ch4;

    ns.src.deposition += nf.ndep_to_nh4 + nf.ndep_to_no3;
    ns.src.fixation += nf.nfix_to_nh4;
    ns.snk.volatilization += nf.volatilization.iter().sum::<f64>();
    ns.snk.nitrif_n2o += nf.nitrif_n2o.iter().sum::<f64>();
    ns.snk.denitrification += nf.denitrification.iter().sum::<f64>();
}

/// Dead material reaching the surface from standing dead, cut-down
/// biomass and organic fertilizer, net of what burnt.
fn surface_input(flux: &DisturbanceFlux) -> [f64; N_CUTDOWN] {
    let mut out = [0.0; N_CUTDOWN];
    for (k, o) in out.iter_mut().enumerate() {
        *o = flux.cutdown_to_litter[k] - flux.litter_to_fire[k];
        if k < N_LITTER {
            *o += flux.standing_dead_to_litter[k] + flux.fert_litter[k];
        }
    }
    out
}

fn apply_dead_pools(
    flux: &DisturbanceFlux,
    standing_dead: &mut [f64; N_LITTER],
    cutdown: &mut [f64; N_CUTDOWN],
) {
    for (k, p) in standing_dead.iter_mut().enumerate() {
        *p += flux.to_standing_dead[k] - flux.standing_dead_to_litter[k];
    }
    for (k, p) in cutdown.iter_mut().enumerate() {
        *p += flux.to_cutdown[k] - flux.cutdown_to_litter[k];
    }
}

fn apply_removal(flux: &DisturbanceFlux, plant: &mut PlantPools) {
    for (t, p) in plant.iter_mut() {
        let i = t.index();
        let r = &flux.removal[i];
        p.active -= r.active;
        p.storage -= r.storage;
        p.transfer += flux.planting[i] - r.transfer;
    }
}

fn apply_soil<T: DeadOrganic>(flux: &DisturbanceFlux, soil: &mut [T]) {
    add_dead_by_layer(soil, &flux.litter_in);
    add_dead_by_layer(soil, &flux.litter_mixing);
    if let Some(top) = soil.first_mut() {
        top.add_dead(&surface_input(flux));
    }
}

/// Commit mortality, fire, senescence and management.
pub fn apply_disturbance(df: &DisturbanceFluxes, cs: &mut CarbonState, ns: &mut NitrogenState) {
    let (dc, dn) = (&df.carbon, &df.nitrogen);

    apply_removal(dc, &mut cs.plant);
    cs.cpool -= dc.pool_removal;
    cs.gresp_storage -= dc.gresp_storage_removal;
    cs.gresp_transfer -= dc.gresp_transfer_removal;
    apply_dead_pools(dc, &mut cs.standing_dead, &mut cs.cutdown);
    apply_soil(dc, &mut cs.soil);
    cs.src.planting += dc.planting_total();
    cs.src.fertilizer += dc.fertilizer_total();
    cs.snk.fire += dc.fire_total();
    cs.snk.export += dc.to_export;

    apply_removal(dn, &mut ns.plant);
    ns.npool -= dn.pool_removal;
    ns.retransn -= dn.retrans_removal;
    apply_dead_pools(dn, &mut ns.standing_dead, &mut ns.cutdown);
    apply_soil(dn, &mut ns.soil);
    ns.soil[0].nh4 += dn.fert_nh4 + dn.excreta_nh4;
    ns.soil[0].no3 += dn.fert_no3;
    ns.src.planting += dn.planting_total();
    ns.src.fertilizer += dn.fertilizer_total();
    ns.snk.fire += dn.fire_total();
    ns.snk.export += dn.to_export;
}

/// Commit solute movement with water; what leaves the bottom layer is
/// leached.
pub fn apply_transport(
    cf: &CarbonFlux,
    nf: &NitrogenFlux,
    cs: &mut CarbonState,
    ns: &mut NitrogenState,
) {
    let (delta, leached) = transport_delta(&cf.doc_transport);
    for (s, d) in cs.soil.iter_mut().zip(delta) {
        s.doc += d;
    }
    cs.snk.leaching += leached;

    let (nh4, nh4_out) = transport_delta(&nf.transport_nh4);
    let (no3, no3_out) = transport_delta(&nf.transport_no3);
    let (don, don_out) = transport_delta(&nf.transport_don);
    for (l, s) in ns.soil.iter_mut().enumerate() {
        s.nh4 += nh4[l];
        s.no3 += no3[l];
        s.don += don[l];
    }
    ns.snk.leaching += nh4_out + no3_out + don_out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flux::SoluteFlux;
    use crate::state::{Tissue, TissuePools};
    use approx::assert_relative_eq;

    fn c_balance(cs: &CarbonState) -> f64 {
        cs.src.total() - cs.snk.total() - cs.storage_total()
    }

    fn n_balance(ns: &NitrogenState) -> f64 {
        ns.src.total() - ns.snk.total() - ns.storage_total()
    }

    fn stocked() -> (CarbonState, NitrogenState) {
        let mut cs = CarbonState::new(2);
        let mut ns = NitrogenState::new(2);
        for t in Tissue::ALL {
            cs.plant[t] = TissuePools {
                active: 1.0,
                storage: 0.2,
                transfer: 0.1,
            };
            ns.plant[t] = TissuePools {
                active: 0.02,
                storage: 0.004,
                transfer: 0.002,
            };
        }
        cs.cpool = 0.05;
        ns.npool = 0.001;
        ns.retransn = 0.002;
        for l in 0..2 {
            cs.soil[l].litter = [0.1, 0.2, 0.1, 0.3];
            cs.soil[l].som = [0.5, 1.0, 2.0, 4.0];
            cs.soil[l].cwd = 0.4;
            cs.soil[l].doc = 0.01;
            ns.soil[l].litter = [0.004, 0.004, 0.002, 0.006];
            ns.soil[l].som = [0.04, 0.08, 0.2, 0.4];
            ns.soil[l].cwd = 0.001;
            ns.soil[l].don = 0.0005;
            ns.soil[l].nh4 = 0.003;
            ns.soil[l].no3 = 0.002;
        }
        (cs, ns)
    }

    #[test]
    fn plant_and_soil_fluxes_close_both_balances() {
        let (mut cs, mut ns) = stocked();
        let (c0, n0) = (c_balance(&cs), n_balance(&ns));

        let mut cf = CarbonFlux::new(2);
        let mut nf = NitrogenFlux::new(2);
        cf.psnsun_to_cpool = 0.01;
        cf.psnshade_to_cpool = 0.004;
        cf.mr[0] = 0.003;
        cf.plant.pool_to_active[0] = 0.004;
        cf.plant.pool_to_storage[1] = 0.002;
        cf.gr[0] = 0.0012;
        cf.storage_gr[1] = 0.0003;
        cf.cpool_to_gresp_storage = 0.0003;
        cf.plant.litterfall[0] = 0.05;
        cf.plant.litter_in[0] = [0.02, 0.02, 0.005, 0.005, 0.0];
        cf.plant.mobilized[2].storage = 0.001;
        nf.plant.litterfall[0] = 0.002;
        nf.plant.to_retrans = 0.001;
        nf.plant.litter_in[0] = [0.0005, 0.0003, 0.0001, 0.0001, 0.0];
        nf.plant.pool_to_active[0] = 0.0002;
        nf.plant.pool_to_storage[1] = 0.0001;
        nf.plant.mobilized[2].storage = 0.00002;
        nf.retrans_to_npool = 0.0005;
        nf.nh4_uptake[0] = 0.0003;
        nf.no3_uptake[1] = 0.0002;

        cf.decomp[0].loss[0] = 0.01;
        cf.decomp[0].hr[0] = 0.0039;
        cf.decomp[0].to_doc[0] = 0.001;
        cf.decomp[0].transfer[0] = 0.0051;
        cf.decomp[0].cwd_to_litter = [0.0, 0.002, 0.001, 0.001];
        cf.decomp[0].doc_hr = 0.0005;
        nf.decomp[0].loss[0] = 0.0004;
        nf.decomp[0].mineral[0] = -0.00005;
        nf.decomp[0].to_don[0] = 0.00005;
        nf.decomp[0].transfer[0] = 0.0003;
        nf.decomp[1].loss[3] = 0.0001;
        nf.decomp[1].mineral[3] = 0.00002;
        nf.decomp[1].transfer[3] = 0.00012;
        nf.no3_immob[1] = 0.00002;
        nf.decomp[0].don_mineralized = 0.00001;
        nf.ndep_to_nh4 = 1e-6;
        nf.nfix_to_nh4 = 1e-6;
        nf.nitrification[0] = 0.0001;
        nf.nitrif_n2o[0] = 0.000002;
        nf.denitrification[1] = 0.00001;
        nf.volatilization[0] = 0.000001;
        cf.ch4 = 1e-5;

        daily_cn_state_update(&cf, &nf, &mut cs, &mut ns);

        assert_relative_eq!(c_balance(&cs), c0, epsilon = 1e-12);
        assert_relative_eq!(n_balance(&ns), n0, epsilon = 1e-12);
        assert_relative_eq!(cs.plant[Tissue::Leaf].active, 1.0 - 0.05 + 0.004);
        assert_relative_eq!(cs.soil[0].som[0], 0.5 + 0.0051);
        assert_relative_eq!(ns.retransn, 0.002 + 0.001 + 0.00002 - 0.0005, epsilon = 1e-15);
        // CH4 is tracked outside the carbon balance
        assert_relative_eq!(cs.ch4_flux, 1e-5);
    }

    #[test]
    fn disturbance_closes_both_balances() {
        let (mut cs, mut ns) = stocked();
        let (c0, n0) = (c_balance(&cs), n_balance(&ns));
        let mut df = DisturbanceFluxes::new(2);
        for (flux, scale) in [(&mut df.carbon, 1.0), (&mut df.nitrogen, 0.02)] {
            flux.removal[0].active = 0.5 * scale;
            flux.removal[1].storage = 0.1 * scale;
            flux.pool_removal = 0.01 * scale;
            flux.litter_in[1] = [0.05 * scale, 0.0, 0.0, 0.0, 0.06 * scale];
            flux.to_standing_dead = [0.1 * scale, 0.0, 0.0, 0.0];
            flux.to_export = 0.2 * scale;
            flux.to_fire = 0.2 * scale;
            flux.standing_dead_to_litter[0] = 0.01 * scale;
            flux.litter_to_fire[4] = 0.02 * scale;
            flux.planting[2] = 0.003 * scale;
            flux.fert_litter[0] = 0.004 * scale;
            flux.litter_mixing[0] = [-0.01 * scale, 0.0, 0.0, 0.0, 0.0];
            flux.litter_mixing[1] = [0.01 * scale, 0.0, 0.0, 0.0, 0.0];
        }
        df.nitrogen.fert_nh4 = 0.001;
        df.nitrogen.excreta_nh4 = 0.0002;
        df.nitrogen.to_export -= 0.0002;

        apply_disturbance(&df, &mut cs, &mut ns);

        assert_relative_eq!(c_balance(&cs), c0, epsilon = 1e-12);
        assert_relative_eq!(n_balance(&ns), n0, epsilon = 1e-12);
        assert_relative_eq!(cs.standing_dead[0], 0.09);
        assert_relative_eq!(cs.soil[0].cwd, 0.4 - 0.02);
        assert_relative_eq!(ns.soil[0].nh4, 0.003 + 0.0012);
    }

    #[test]
    fn leached_solutes_leave_through_the_bottom() {
        let (mut cs, mut ns) = stocked();
        let (c0, n0) = (c_balance(&cs), n_balance(&ns));
        let mut cf = CarbonFlux::new(2);
        let mut nf = NitrogenFlux::new(2);
        cf.doc_transport[0] = SoluteFlux { down: 0.002, up: 0.0 };
        cf.doc_transport[1] = SoluteFlux { down: 0.001, up: 0.0005 };
        nf.transport_no3[1] = SoluteFlux { down: 0.0004, up: 0.0 };
        apply_transport(&cf, &nf, &mut cs, &mut ns);
        assert_relative_eq!(cs.soil[0].doc, 0.01 - 0.002 + 0.0005);
        assert_relative_eq!(cs.snk.leaching, 0.001);
        assert_relative_eq!(ns.snk.leaching, 0.0004);
        assert_relative_eq!(c_balance(&cs), c0, epsilon = 1e-12);
        assert_relative_eq!(n_balance(&ns), n0, epsilon = 1e-12);
    }
}
