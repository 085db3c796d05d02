//! Phenological transfer growth, litterfall, live-wood turnover and the
//! routing of shed material into the litter of each layer.
//!
//! Season timing comes from a [`PhenologyProvider`]; this module only turns
//! the day counts it hands over into fluxes.

use crate::constants::DAYS_PER_YEAR;
use crate::epv::EcophysVariables;
use crate::flux::{CarbonFlux, NitrogenFlux, PlantFlux};
use crate::params::EcophysConstants;
use crate::state::{CarbonState, NitrogenState, PlantPools, Tissue};

/// Season position handed to the engine for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhenologyInputs {
    /// Days left in the transfer-growth period, today included.
    pub remdays_transfer: usize,
    pub transfer_days_elapsed: usize,
    /// Days left in the litterfall period, today included.
    pub remdays_litfall: usize,
    pub litfall_days_elapsed: usize,
    /// Index into the per-phase allocation table.
    pub phase: usize,
}

impl PhenologyInputs {
    pub fn onset_day(&self) -> bool {
        self.remdays_transfer > 0 && self.transfer_days_elapsed == 0
    }
}

/// Supplies the season position for each simulated day.
pub trait PhenologyProvider {
    fn inputs(&mut self, day: usize) -> PhenologyInputs;
}

/// A precomputed day-by-day schedule. Days past its end are dormant.
impl PhenologyProvider for Vec<PhenologyInputs> {
    fn inputs(&mut self, day: usize) -> PhenologyInputs {
        self.get(day).copied().unwrap_or_default()
    }
}

/// Fixed yearly calendar: transfer growth from `onset_doy`, litterfall
/// ending on `litfall_end_doy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalSchedule {
    pub onset_doy: usize,
    pub transfer_days: usize,
    pub litfall_end_doy: usize,
    pub litfall_days: usize,
}

impl Default for SeasonalSchedule {
    fn default() -> Self {
        Self {
            onset_doy: 120,
            transfer_days: 30,
            litfall_end_doy: 300,
            litfall_days: 30,
        }
    }
}

impl PhenologyProvider for SeasonalSchedule {
    fn inputs(&mut self, day: usize) -> PhenologyInputs {
        let doy = day % DAYS_PER_YEAR as usize;
        let mut out = PhenologyInputs::default();
        let transfer_end = self.onset_doy + self.transfer_days;
        if (self.onset_doy..transfer_end).contains(&doy) {
            out.transfer_days_elapsed = doy - self.onset_doy;
            out.remdays_transfer = transfer_end - doy;
        }
        let litfall_start = self.litfall_end_doy.saturating_sub(self.litfall_days);
        if (litfall_start..self.litfall_end_doy).contains(&doy) {
            out.litfall_days_elapsed = doy - litfall_start;
            out.remdays_litfall = self.litfall_end_doy - doy;
        }
        out.phase = usize::from((self.onset_doy..self.litfall_end_doy).contains(&doy));
        out
    }
}

/// Daily rate emptying a pool over the remaining days on a linear ramp.
pub fn ramp_rate(remdays: usize) -> f64 {
    match remdays {
        0 => 0.0,
        1 => 1.0,
        n => (2.0 / n as f64).min(1.0),
    }
}

const SHED: [Tissue; 4] = [Tissue::Leaf, Tissue::Froot, Tissue::Fruit, Tissue::Softstem];

/// Transfer growth, litterfall and live-wood turnover for one day.
///
/// Litter is routed to layers: above-ground tissue to the surface layer,
/// fine roots by root-length share.
pub fn phenology_fluxes(
    phen: &PhenologyInputs,
    epc: &EcophysConstants,
    cs: &CarbonState,
    ns: &NitrogenState,
    epv: &EcophysVariables,
    cf: &mut CarbonFlux,
    nf: &mut NitrogenFlux,
) {
    let cp = &mut cf.plant;
    let np = &mut nf.plant;

    if phen.onset_day() {
        for t in Tissue::ALL {
            cp.storage_to_transfer[t.index()] = cs.plant[t].storage;
            np.storage_to_transfer[t.index()] = ns.plant[t].storage;
        }
        cf.gresp_storage_to_transfer = cs.gresp_storage;
    }

    let t_transfer = ramp_rate(phen.remdays_transfer);
    if t_transfer > 0.0 {
        for t in Tissue::ALL {
            let i = t.index();
            cp.transfer_to_active[i] =
                t_transfer * (cs.plant[t].transfer + cp.storage_to_transfer[i]);
            np.transfer_to_active[i] =
                t_transfer * (ns.plant[t].transfer + np.storage_to_transfer[i]);
        }
    }

    let t_litfall = ramp_rate(phen.remdays_litfall);
    for t in SHED {
        let active = cs.plant[t].active;
        let rate = if epc.is_evergreen() {
            match t {
                Tissue::Leaf => epc.leaf_turnover / DAYS_PER_YEAR,
                Tissue::Froot => epc.froot_turnover / DAYS_PER_YEAR,
                _ => t_litfall,
            }
        } else {
            t_litfall
        };
        if rate > 0.0 && active > 0.0 {
            cp.litterfall[t.index()] = rate * active;
        }
    }
    route_litterfall(epc, epv, cp, np);

    if epc.is_woody() {
        let rate = epc.livewood_turnover / DAYS_PER_YEAR;
        let stem = rate * cs.plant[Tissue::Livestem].active;
        let croot = rate * cs.plant[Tissue::Livecroot].active;
        cp.livestem_to_deadstem = stem;
        cp.livecroot_to_deadcroot = croot;
        np.livestem_to_deadstem = stem / epc.deadwood_cn;
        np.livestem_to_retrans = stem / epc.livewood_cn - stem / epc.deadwood_cn;
        np.livecroot_to_deadcroot = croot / epc.deadwood_cn;
        np.livecroot_to_retrans = croot / epc.livewood_cn - croot / epc.deadwood_cn;
    }
}

/// Turn litterfall carbon into matching nitrogen, withdrawing leaf N
/// down to the leaf-litter C:N, and spread both over the litter pools.
fn route_litterfall(
    epc: &EcophysConstants,
    epv: &EcophysVariables,
    cp: &mut PlantFlux,
    np: &mut PlantFlux,
) {
    for t in SHED {
        let c = cp.litterfall[t.index()];
        if c <= 0.0 {
            continue;
        }
        let n_out = c / epc.tissue_cn(t);
        let n_litter = if t == Tissue::Leaf {
            let n = c / epc.leaflitr_cn;
            np.to_retrans += n_out - n;
            n
        } else {
            n_out
        };
        np.litterfall[t.index()] = n_out;

        let partition = epc.tissue_litter(t).as_array();
        if t.is_belowground() && epv.n_rootlayers > 0 {
            cp.add_litter_by_layer(&epv.rootlength_prop, partition, c);
            np.add_litter_by_layer(&epv.rootlength_prop, partition, n_litter);
        } else {
            cp.add_litter(0, partition, c);
            np.add_litter(0, partition, n_litter);
        }
    }
}

/// Plant pools of one element as they will stand once today's phenology
/// is applied.
pub fn after_phenology(pools: &PlantPools, flux: &PlantFlux) -> PlantPools {
    let mut out = *pools;
    for (t, p) in out.iter_mut() {
        let i = t.index();
        p.storage -= flux.storage_to_transfer[i];
        p.transfer += flux.storage_to_transfer[i] - flux.transfer_to_active[i];
        p.active += flux.transfer_to_active[i] - flux.litterfall[i];
    }
    out[Tissue::Livestem].active -= flux.livestem_to_deadstem + flux.livestem_to_retrans;
    out[Tissue::Deadstem].active += flux.livestem_to_deadstem;
    out[Tissue::Livecroot].active -= flux.livecroot_to_deadcroot + flux.livecroot_to_retrans;
    out[Tissue::Deadcroot].active += flux.livecroot_to_deadcroot;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn deciduous_state() -> (CarbonState, NitrogenState) {
        let mut cs = CarbonState::new(3);
        let mut ns = NitrogenState::new(3);
        cs.plant[Tissue::Leaf].active = 0.2;
        cs.plant[Tissue::Leaf].storage = 0.1;
        cs.plant[Tissue::Froot].active = 0.3;
        cs.plant[Tissue::Livestem].active = 1.0;
        ns.plant[Tissue::Leaf].active = 0.2 / 24.0;
        ns.plant[Tissue::Leaf].storage = 0.1 / 24.0;
        ns.plant[Tissue::Livestem].active = 1.0 / 50.0;
        (cs, ns)
    }

    fn epv3() -> EcophysVariables {
        let mut epv = EcophysVariables::new(3);
        epv.n_rootlayers = 2;
        epv.rootlength_prop[0] = 0.6;
        epv.rootlength_prop[1] = 0.4;
        epv
    }

    #[test]
    fn ramp_empties_pool_on_last_day() {
        assert_eq!(ramp_rate(0), 0.0);
        assert_eq!(ramp_rate(1), 1.0);
        assert_eq!(ramp_rate(2), 1.0);
        assert_relative_eq!(ramp_rate(10), 0.2);
    }

    #[test]
    fn onset_moves_storage_then_displays_part_of_it() {
        let (cs, ns) = deciduous_state();
        let epc = EcophysConstants::default();
        let phen = PhenologyInputs {
            remdays_transfer: 10,
            ..PhenologyInputs::default()
        };
        let mut cf = CarbonFlux::new(3);
        let mut nf = NitrogenFlux::new(3);
        phenology_fluxes(&phen, &epc, &cs, &ns, &epv3(), &mut cf, &mut nf);
        assert_relative_eq!(cf.plant.storage_to_transfer[0], 0.1);
        assert_relative_eq!(cf.plant.transfer_to_active[0], 0.02);
        let after = after_phenology(&cs.plant, &cf.plant);
        assert_relative_eq!(after[Tissue::Leaf].storage, 0.0);
        assert_relative_eq!(after[Tissue::Leaf].transfer, 0.08);
        assert_relative_eq!(after[Tissue::Leaf].active, 0.22);
    }

    #[test]
    fn leaf_litterfall_retranslocates_nitrogen() {
        let (cs, ns) = deciduous_state();
        let epc = EcophysConstants::default();
        let phen = PhenologyInputs {
            remdays_litfall: 1,
            ..PhenologyInputs::default()
        };
        let mut cf = CarbonFlux::new(3);
        let mut nf = NitrogenFlux::new(3);
        phenology_fluxes(&phen, &epc, &cs, &ns, &epv3(), &mut cf, &mut nf);
        assert_relative_eq!(cf.plant.litterfall[0], 0.2);
        assert_relative_eq!(nf.plant.litterfall[0], 0.2 / 24.0);
        assert_relative_eq!(nf.plant.to_retrans, 0.2 / 24.0 - 0.2 / 49.0, epsilon = 1e-15);
        // litter N is what is shed minus what is withdrawn
        let shed_n = nf.plant.litterfall_total() - nf.plant.to_retrans;
        assert_relative_eq!(nf.plant.litter_in_total(), shed_n, epsilon = 1e-15);
        assert_relative_eq!(cf.plant.litter_in_total(), cf.plant.litterfall_total(), epsilon = 1e-15);
        // fine roots follow the root profile
        assert!(cf.plant.litter_in[1].iter().sum::<f64>() > 0.0);
        assert_eq!(cf.plant.litter_in[2].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn live_wood_turnover_releases_excess_nitrogen() {
        let (cs, ns) = deciduous_state();
        let epc = EcophysConstants::default();
        let mut cf = CarbonFlux::new(3);
        let mut nf = NitrogenFlux::new(3);
        phenology_fluxes(&PhenologyInputs::default(), &epc, &cs, &ns, &epv3(), &mut cf, &mut nf);
        let c = cf.plant.livestem_to_deadstem;
        assert_relative_eq!(c, 0.7 / 365.0);
        assert_relative_eq!(nf.plant.livestem_to_deadstem + nf.plant.livestem_to_retrans, c / 50.0);
    }

    #[test]
    fn evergreen_sheds_continuously() {
        let (cs, ns) = deciduous_state();
        let epc = EcophysConstants {
            phenology: crate::params::PhenologyType::Evergreen,
            leaf_turnover: 0.5,
            ..EcophysConstants::default()
        };
        let mut cf = CarbonFlux::new(3);
        let mut nf = NitrogenFlux::new(3);
        phenology_fluxes(&PhenologyInputs::default(), &epc, &cs, &ns, &epv3(), &mut cf, &mut nf);
        assert_relative_eq!(cf.plant.litterfall[0], 0.2 * 0.5 / 365.0);
    }

    #[test]
    fn seasonal_schedule_counts_down() {
        let mut s = SeasonalSchedule::default();
        let first = s.inputs(120);
        assert!(first.onset_day());
        assert_eq!(first.remdays_transfer, 30);
        assert_eq!(s.inputs(149).remdays_transfer, 1);
        assert_eq!(s.inputs(150).remdays_transfer, 0);
        assert_eq!(s.inputs(299).remdays_litfall, 1);
        assert_eq!(s.inputs(270).remdays_litfall, 30);
        assert_eq!(s.inputs(365 + 120).transfer_days_elapsed, 0);
        assert_eq!(s.inputs(10).phase, 0);
        assert_eq!(s.inputs(200).phase, 1);
    }
}
