//! Mortality, fire, senescence and management.
//!
//! All of these act on the state left by the main daily update. Removals
//! are taken from what an earlier process of the same day has not already
//! removed, so several events on one day never take more than a pool holds.

pub mod cutdown;
pub mod management;
pub mod mortality;
pub mod senescence;

pub use management::{Fertilizer, Grazing, ManagementEvents, Planting, Ploughing, Removal};

use crate::epv::EcophysVariables;
use crate::flux::{DisturbanceFlux, DisturbanceFluxes};
use crate::layers::{self, LayerVec};
use crate::params::{EcophysConstants, SoilProfile};
use crate::state::{CarbonState, NitrogenState, SubPool, Tissue, N_CUTDOWN, N_LITTER};

/// Where removed plant material ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Litter,
    StandingDead,
    Cutdown,
    Fire,
    Export,
}

/// Litter classes plus coarse debris that dead material of one sub-pool
/// decomposes as. Reserves are labile; wood is debris.
pub fn litter_classes(epc: &EcophysConstants, t: Tissue, sub: SubPool) -> [f64; N_CUTDOWN] {
    let mut out = [0.0; N_CUTDOWN];
    match sub {
        SubPool::Active if t.is_wood() => out[N_LITTER] = 1.0,
        SubPool::Active => out[..N_LITTER].copy_from_slice(&epc.tissue_litter(t).as_array()),
        SubPool::Storage | SubPool::Transfer => out[0] = 1.0,
    }
    out
}

/// Carbon and nitrogen removed in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Taken {
    pub c: f64,
    pub n: f64,
    pub classes: [f64; N_CUTDOWN],
    pub belowground: bool,
}

/// Books removals against the day's state and routes them to their
/// destination.
pub struct Disturber<'a> {
    pub epc: &'a EcophysConstants,
    pub cs: &'a CarbonState,
    pub ns: &'a NitrogenState,
    pub df: &'a mut DisturbanceFluxes,
    surface: LayerVec,
    roots: LayerVec,
}

impl<'a> Disturber<'a> {
    pub fn new(
        epc: &'a EcophysConstants,
        cs: &'a CarbonState,
        ns: &'a NitrogenState,
        epv: &EcophysVariables,
        df: &'a mut DisturbanceFluxes,
    ) -> Self {
        let n = cs.soil.len();
        let mut surface = layers::zeros(n);
        surface[0] = 1.0;
        let roots = if epv.n_rootlayers > 0 {
            epv.rootlength_prop.clone()
        } else {
            surface.clone()
        };
        Self {
            epc,
            cs,
            ns,
            df,
            surface,
            roots,
        }
    }

    /// What is left of a sub-pool after today's earlier removals.
    pub fn remaining(&self, t: Tissue, sub: SubPool) -> (f64, f64) {
        let i = t.index();
        let c = self.cs.plant[t].get(sub) - self.df.carbon.removal[i].get(sub);
        let n = self.ns.plant[t].get(sub) - self.df.nitrogen.removal[i].get(sub);
        (c.max(0.0), n.max(0.0))
    }

    /// Book the removal of `frac` of what is left of a sub-pool without
    /// routing it anywhere.
    pub fn take(&mut self, t: Tissue, sub: SubPool, frac: f64) -> Taken {
        let frac = frac.clamp(0.0, 1.0);
        let (c, n) = self.remaining(t, sub);
        let taken = Taken {
            c: c * frac,
            n: n * frac,
            classes: litter_classes(self.epc, t, sub),
            belowground: t.is_belowground(),
        };
        let i = t.index();
        *self.df.carbon.removal[i].get_mut(sub) += taken.c;
        *self.df.nitrogen.removal[i].get_mut(sub) += taken.n;
        taken
    }

    pub fn remove(&mut self, t: Tissue, sub: SubPool, frac: f64, dest: Destination) {
        if frac <= 0.0 {
            return;
        }
        let taken = self.take(t, sub, frac);
        self.route(&taken, dest);
    }

    /// Remove `frac` of every sub-pool of the listed tissues.
    pub fn remove_tissues(&mut self, tissues: &[Tissue], frac: f64, dest: Destination) {
        for &t in tissues {
            for sub in SubPool::ALL {
                self.remove(t, sub, frac, dest);
            }
        }
    }

    pub fn route(&mut self, taken: &Taken, dest: Destination) {
        let weights = if taken.belowground {
            &self.roots
        } else {
            &self.surface
        };
        route(&mut self.df.carbon, dest, &taken.classes, weights, taken.c);
        route(&mut self.df.nitrogen, dest, &taken.classes, weights, taken.n);
    }

    /// Remove `frac` of the non-structural and growth-respiration pools and
    /// of retranslocated N, all as labile material.
    pub fn remove_nonstructural(&mut self, frac: f64, dest: Destination) {
        let frac = frac.clamp(0.0, 1.0);
        if frac <= 0.0 {
            return;
        }
        let (cs, ns) = (self.cs, self.ns);
        let dc = &mut self.df.carbon;
        let pool = (cs.cpool - dc.pool_removal).max(0.0) * frac;
        let gs = (cs.gresp_storage - dc.gresp_storage_removal).max(0.0) * frac;
        let gt = (cs.gresp_transfer - dc.gresp_transfer_removal).max(0.0) * frac;
        dc.pool_removal += pool;
        dc.gresp_storage_removal += gs;
        dc.gresp_transfer_removal += gt;

        let dn = &mut self.df.nitrogen;
        let npool = (ns.npool - dn.pool_removal).max(0.0) * frac;
        let retrans = (ns.retransn - dn.retrans_removal).max(0.0) * frac;
        dn.pool_removal += npool;
        dn.retrans_removal += retrans;

        let mut labile = [0.0; N_CUTDOWN];
        labile[0] = 1.0;
        route(&mut self.df.carbon, dest, &labile, &self.surface, pool + gs + gt);
        route(&mut self.df.nitrogen, dest, &labile, &self.surface, npool + retrans);
    }
}

fn route(
    flux: &mut DisturbanceFlux,
    dest: Destination,
    classes: &[f64; N_CUTDOWN],
    weights: &[f64],
    amount: f64,
) {
    if amount <= 0.0 {
        return;
    }
    match dest {
        Destination::Litter => {
            for (l, &w) in weights.iter().enumerate() {
                if w > 0.0 {
                    for (d, share) in flux.litter_in[l].iter_mut().zip(classes) {
                        *d += amount * w * share;
                    }
                }
            }
        }
        Destination::StandingDead => {
            for (d, share) in flux.to_standing_dead.iter_mut().zip(classes) {
                *d += amount * share;
            }
            // wood falls straight to the ground as debris
            flux.to_cutdown[N_LITTER] += amount * classes[N_LITTER];
        }
        Destination::Cutdown => {
            for (d, share) in flux.to_cutdown.iter_mut().zip(classes) {
                *d += amount * share;
            }
        }
        Destination::Fire => flux.to_fire += amount,
        Destination::Export => flux.to_export += amount,
    }
}

/// All disturbance and management flows of the day.
pub fn disturbance_fluxes(
    epc: &EcophysConstants,
    soil: &SoilProfile,
    epv: &EcophysVariables,
    cs: &CarbonState,
    ns: &NitrogenState,
    events: &ManagementEvents,
    df: &mut DisturbanceFluxes,
) {
    let mut d = Disturber::new(epc, cs, ns, epv, df);
    mortality::whole_plant_mortality(&mut d);
    mortality::fire_mortality(&mut d);
    senescence::senescence(&mut d, epv.m_soilstress);
    management::management(events, soil, &mut d);
    cutdown::dead_biomass_to_litter(epc, cs, ns, df);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    pub(crate) fn stocked(n_layers: usize) -> (CarbonState, NitrogenState, EcophysVariables) {
        let mut cs = CarbonState::new(n_layers);
        let mut ns = NitrogenState::new(n_layers);
        let epc = EcophysConstants::default();
        for t in Tissue::ALL {
            cs.plant[t].active = 0.5;
            cs.plant[t].storage = 0.05;
            cs.plant[t].transfer = 0.02;
            let cn = epc.tissue_cn(t);
            ns.plant[t].active = 0.5 / cn;
            ns.plant[t].storage = 0.05 / cn;
            ns.plant[t].transfer = 0.02 / cn;
        }
        cs.cpool = 0.01;
        cs.gresp_storage = 0.002;
        ns.npool = 0.0001;
        ns.retransn = 0.001;
        cs.soil[0].litter = [0.1, 0.2, 0.05, 0.1];
        cs.soil[0].cwd = 1.0;
        ns.soil[0].litter = [0.004, 0.004, 0.001, 0.002];
        ns.soil[0].cwd = 0.002;
        let mut epv = EcophysVariables::new(n_layers);
        epv.n_rootlayers = 2;
        epv.rootlength_prop[0] = 0.7;
        epv.rootlength_prop[1] = 0.3;
        epv.m_soilstress = 0.5;
        (cs, ns, epv)
    }

    #[test]
    fn wood_becomes_debris() {
        let epc = EcophysConstants::default();
        let c = litter_classes(&epc, Tissue::Deadstem, SubPool::Active);
        assert_eq!(c, [0.0, 0.0, 0.0, 0.0, 1.0]);
        let r = litter_classes(&epc, Tissue::Deadstem, SubPool::Storage);
        assert_eq!(r[0], 1.0);
        let leaf = litter_classes(&epc, Tissue::Leaf, SubPool::Active);
        assert_relative_eq!(leaf.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn repeated_removal_never_exceeds_pool() {
        let epc = EcophysConstants::default();
        let (cs, ns, epv) = stocked(2);
        let mut df = DisturbanceFluxes::new(2);
        let mut d = Disturber::new(&epc, &cs, &ns, &epv, &mut df);
        d.remove(Tissue::Leaf, SubPool::Active, 0.8, Destination::Export);
        d.remove(Tissue::Leaf, SubPool::Active, 0.8, Destination::Export);
        d.remove(Tissue::Leaf, SubPool::Active, 1.0, Destination::Litter);
        assert_relative_eq!(df.carbon.removal[0].active, 0.5, epsilon = 1e-15);
        assert_relative_eq!(df.carbon.to_export, 0.5 * 0.96, epsilon = 1e-15);
    }

    #[test]
    fn every_removal_has_a_destination() {
        let epc = EcophysConstants {
            fire_mortality: 0.5,
            whole_plant_mortality: 0.1,
            ..EcophysConstants::default()
        };
        let soil = crate::params::SoilProfile::build(&crate::params::soil::SoilConfig {
            layers: vec![crate::params::soil::SoilLayerConfig::default(); 2],
            ..Default::default()
        })
        .unwrap();
        let (cs, ns, epv) = stocked(2);
        let events = ManagementEvents {
            thinning: Some(Removal {
                fraction: 0.2,
                export: 0.6,
            }),
            grazing: Some(Grazing {
                fraction: 0.1,
                excreta_c: 0.3,
                urine_n: 0.4,
            }),
            ..ManagementEvents::default()
        };
        let mut df = DisturbanceFluxes::new(2);
        disturbance_fluxes(&epc, &soil, &epv, &cs, &ns, &events, &mut df);
        for flux in [&df.carbon, &df.nitrogen] {
            assert!(flux.removal_total() > 0.0);
            assert_relative_eq!(
                flux.removal_total(),
                flux.removal_destinations(),
                max_relative = 1e-12
            );
        }
        assert!(df.carbon.to_fire > 0.0);
        assert!(df.carbon.litter_to_fire[N_LITTER] > 0.0);
        assert!(df.nitrogen.excreta_nh4 > 0.0);
        // roots die into the rooted layers
        assert!(df.carbon.litter_in[1].iter().sum::<f64>() > 0.0);
    }
}
