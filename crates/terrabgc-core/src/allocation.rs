//! Daily carbon and nitrogen allocation with plant/microbe competition for
//! mineral nitrogen.
//!
//! Order within the day:
//!
//! 1. A maintenance deficit (MR above GPP) is covered from plant carbon.
//! 2. Plant N demand follows from the carbon left over and the allometry.
//! 3. Each layer's mineral N supply is shared between root uptake and
//!    microbial immobilization; an over-demanded layer scales both by the
//!    same fraction, applied pathway by pathway to the staged decomposition.
//! 4. Uptake shortfall falls back on retranslocated N; if that is short as
//!    well, carbon allocation shrinks and the unused photosynthate is taken
//!    back off sunlit and shaded GPP.

use log::debug;

use crate::decomp::{realize, DecompPotential};
use crate::epv::EcophysVariables;
use crate::error::{AdvisoryFlags, BgcError, BgcResult};
use crate::flux::{CarbonFlux, NitrogenFlux};
use crate::forcing::MetVariables;
use crate::layers::{self, LayerVec};
use crate::params::{EcophysConstants, SoilProfile};
use crate::phenology::after_phenology;
use crate::respiration::cover_mr_deficit;
use crate::state::{CarbonState, NitrogenState, Tissue};

const NT: usize = Tissue::COUNT;

/// Normalised allocation weights for a phase. Non-woody plants never
/// allocate to wood.
pub fn allocation_weights(epc: &EcophysConstants, phase: usize) -> [f64; NT] {
    let ratios = epc.allocation_for(phase);
    let mut w: [f64; NT] = std::array::from_fn(|i| {
        let t = Tissue::ALL[i];
        if t.is_wood() && !epc.is_woody() {
            0.0
        } else {
            ratios.get(t)
        }
    });
    let total: f64 = w.iter().sum();
    if total > 0.0 {
        w.iter_mut().for_each(|x| *x /= total);
    } else {
        w = std::array::from_fn(|i| ratios.fraction(Tissue::ALL[i]));
    }
    w
}

/// Mineral N one layer can supply today: the mobile parts of NH4 and NO3
/// plus potential gross mineralization. Returns `(supply, nh4_share)`.
fn layer_supply(nh4: f64, no3: f64, p: &DecompPotential, soil: &SoilProfile) -> (f64, f64) {
    let from_nh4 = nh4.max(0.0) * soil.bgc.mobile_nh4 + p.mineralization();
    let from_no3 = no3.max(0.0) * soil.bgc.mobile_no3;
    let supply = from_nh4 + from_no3;
    let share = if supply > 0.0 { from_nh4 / supply } else { 1.0 };
    (supply, share)
}

#[allow(clippy::too_many_arguments)]
pub fn daily_allocation(
    met: &MetVariables,
    epc: &EcophysConstants,
    soil: &SoilProfile,
    cs: &CarbonState,
    ns: &NitrogenState,
    potentials: &[DecompPotential],
    epv: &mut EcophysVariables,
    cf: &mut CarbonFlux,
    nf: &mut NitrogenFlux,
    flags: &mut AdvisoryFlags,
) -> BgcResult<()> {
    let gpp = cf.gpp();
    let mr = cf.mr_total();
    if mr > gpp {
        let carbon = after_phenology(&cs.plant, &cf.plant);
        let nitrogen = after_phenology(&ns.plant, &nf.plant);
        cover_mr_deficit(mr - gpp, cs.cpool, &carbon, &nitrogen, cf, nf, flags);
    }
    let availc = (gpp - cf.mr_total()).max(0.0);

    epv.pnow = epc.alloc_prop_curgrowth * epc.curgrowth_temps.ramp(met.tavg);
    let weights = allocation_weights(epc, epv.phase);
    let c_allom = 1.0 + epc.gr_perc;
    let n_allom: f64 = Tissue::ALL
        .iter()
        .map(|&t| weights[t.index()] / epc.tissue_cn(t))
        .sum();
    if !n_allom.is_finite() || n_allom <= 0.0 {
        return Err(BgcError::numerical(
            "daily_allocation",
            format!("allometric N per unit C is {n_allom}"),
        ));
    }
    let demand = availc * n_allom / c_allom;

    let n_layers = soil.n_layers();
    let supplies: Vec<(f64, f64)> = (0..n_layers)
        .map(|l| layer_supply(ns.soil[l].nh4, ns.soil[l].no3, &potentials[l], soil))
        .collect();
    let soil_supply: f64 = supplies.iter().map(|s| s.0).sum();
    let retransn = ns.retransn.max(0.0);
    let retrans_part = if demand > 0.0 && retransn + soil_supply > 0.0 {
        (demand * retransn / (retransn + soil_supply)).min(retransn)
    } else {
        0.0
    };
    let soil_part = demand - retrans_part;

    let mut root_weights: LayerVec = layers::zeros(n_layers);
    if epv.n_rootlayers > 0 {
        root_weights.copy_from_slice(&epv.rootlength_prop);
    } else {
        root_weights[0] = 1.0;
    }

    let mut uptake_total = 0.0;
    for (l, &(supply, nh4_share)) in supplies.iter().enumerate() {
        let plant = soil_part * root_weights[l];
        let immob = potentials[l].immobilization_demand();
        let wanted = plant + immob;
        let fpi = if wanted > supply && wanted > 0.0 {
            supply / wanted
        } else {
            1.0
        };
        if fpi < 1.0 {
            debug!("layer {l}: mineral N covers {:.3} of demand", fpi);
        }

        let (dc, dn) = realize(&potentials[l], fpi, epc, &soil.bgc);
        let uptake = plant * fpi;
        let immobilized = dn.immobilization();
        nf.nh4_uptake[l] = uptake * nh4_share;
        nf.no3_uptake[l] = uptake * (1.0 - nh4_share);
        nf.nh4_immob[l] = immobilized * nh4_share;
        nf.no3_immob[l] = immobilized * (1.0 - nh4_share);
        cf.decomp[l] = dc;
        nf.decomp[l] = dn;
        uptake_total += uptake;
    }

    let shortfall = (soil_part - uptake_total).max(0.0);
    let retrans_used = retrans_part + shortfall.min(retransn - retrans_part).max(0.0);
    let nalloc = retrans_used + uptake_total;
    nf.retrans_to_npool = retrans_used;

    let new_c = (availc / c_allom).min(nalloc / n_allom);
    let excess = availc - new_c * c_allom;
    if excess > 0.0 && gpp > 0.0 {
        // N-limited: photosynthate that cannot be built into tissue is not fixed
        let keep = 1.0 - excess / gpp;
        cf.psnsun_to_cpool *= keep;
        cf.psnshade_to_cpool *= keep;
    }

    let pnow = epv.pnow;
    for t in Tissue::ALL {
        let i = t.index();
        let c = new_c * weights[i];
        let n = c / epc.tissue_cn(t);
        cf.plant.pool_to_active[i] = c * pnow;
        cf.plant.pool_to_storage[i] = c * (1.0 - pnow);
        nf.plant.pool_to_active[i] = n * pnow;
        nf.plant.pool_to_storage[i] = n * (1.0 - pnow);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::soil::{SoilConfig, SoilLayerConfig};
    use approx::assert_relative_eq;

    fn profile() -> SoilProfile {
        SoilProfile::build(&SoilConfig {
            layers: vec![SoilLayerConfig::default(); 2],
            ..SoilConfig::default()
        })
        .unwrap()
    }

    fn warm_day() -> MetVariables {
        MetVariables::from_daily(20.0, 10.0, 0.0, 800.0, 400.0, 180.0, 50_000.0, 15.0, 10.0, 101_325.0, 380.0)
    }

    struct Case {
        cs: CarbonState,
        ns: NitrogenState,
        epv: EcophysVariables,
        cf: CarbonFlux,
        nf: NitrogenFlux,
        potentials: Vec<DecompPotential>,
    }

    fn case(nh4: f64, retransn: f64, gpp: f64) -> Case {
        let mut ns = NitrogenState::new(2);
        ns.soil[0].nh4 = nh4;
        ns.retransn = retransn;
        let mut epv = EcophysVariables::new(2);
        epv.n_rootlayers = 1;
        epv.rootlength_prop[0] = 1.0;
        let mut cf = CarbonFlux::new(2);
        cf.psnsun_to_cpool = 0.75 * gpp;
        cf.psnshade_to_cpool = 0.25 * gpp;
        cf.mr[0] = 0.001;
        Case {
            cs: CarbonState::new(2),
            ns,
            epv,
            cf,
            nf: NitrogenFlux::new(2),
            potentials: vec![DecompPotential::default(); 2],
        }
    }

    fn run(c: &mut Case) {
        let mut flags = AdvisoryFlags::default();
        daily_allocation(
            &warm_day(),
            &EcophysConstants::default(),
            &profile(),
            &c.cs,
            &c.ns,
            &c.potentials,
            &mut c.epv,
            &mut c.cf,
            &mut c.nf,
            &mut flags,
        )
        .unwrap();
    }

    #[test]
    fn unlimited_growth_uses_all_carbon() {
        let mut c = case(1.0, 0.0, 0.011);
        run(&mut c);
        let epc = EcophysConstants::default();
        let alloc = c.cf.plant.allocation_total();
        assert_relative_eq!(alloc * (1.0 + epc.gr_perc), 0.01, epsilon = 1e-15);
        let n_alloc = c.nf.plant.allocation_total();
        assert_relative_eq!(n_alloc, c.nf.uptake_total() + c.nf.retrans_to_npool, epsilon = 1e-15);
        assert_relative_eq!(c.cf.gpp(), 0.011);
    }

    #[test]
    fn nitrogen_shortage_gives_back_photosynthate() {
        let mut c = case(0.0, 0.0, 0.011);
        run(&mut c);
        assert_eq!(c.cf.plant.allocation_total(), 0.0);
        assert_relative_eq!(c.cf.gpp(), c.cf.mr_total(), epsilon = 1e-15);
        // sun/shade proportions survive the reduction
        assert_relative_eq!(c.cf.psnsun_to_cpool, 3.0 * c.cf.psnshade_to_cpool, epsilon = 1e-15);
    }

    #[test]
    fn retranslocated_nitrogen_covers_missing_uptake() {
        let mut c = case(0.0, 1.0, 0.011);
        run(&mut c);
        assert_relative_eq!(c.cf.gpp(), 0.011);
        assert_eq!(c.nf.uptake_total(), 0.0);
        assert_relative_eq!(c.nf.retrans_to_npool, c.nf.plant.allocation_total(), epsilon = 1e-15);
    }

    #[test]
    fn competition_scales_each_immobilizing_pathway() {
        let mut c = case(0.0, 0.0, 0.001);
        let p = &mut c.potentials[0];
        p.ploss[1] = 0.01;
        p.nc_src[1] = 0.01;
        p.pmnf[1] = 0.0004;
        p.ploss[4] = 0.002;
        p.nc_src[4] = 1.0 / 12.0;
        p.pmnf[4] = -0.0001;
        run(&mut c);
        // supply is the 1e-4 mineralized by S1S2, demand the 4e-4 of L2S2
        let dn = &c.nf.decomp[0];
        assert_relative_eq!(dn.mineral[1], 0.0001, epsilon = 1e-15);
        assert_relative_eq!(c.cf.decomp[0].loss[1], 0.0025, epsilon = 1e-15);
        assert_relative_eq!(dn.mineral[4], -0.0001, epsilon = 1e-15);
        assert_relative_eq!(c.nf.nh4_immob[0], 0.0001, epsilon = 1e-15);
    }

    #[test]
    fn maintenance_deficit_is_mobilized() {
        let mut c = case(1.0, 0.0, 0.0);
        c.cs.plant[Tissue::Leaf].storage = 0.1;
        c.ns.plant[Tissue::Leaf].storage = 0.1 / 24.0;
        run(&mut c);
        assert_relative_eq!(c.cf.plant.mobilized_total(), 0.001, epsilon = 1e-15);
        assert_eq!(c.cf.plant.allocation_total(), 0.0);
    }

    #[test]
    fn herbs_do_not_grow_wood() {
        let epc = EcophysConstants {
            plant_form: crate::params::PlantForm::NonWoody,
            ..EcophysConstants::default()
        };
        let w = allocation_weights(&epc, 0);
        assert_eq!(w[Tissue::Deadstem.index()], 0.0);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
}
