//! Standing dead and cut-down biomass falling into surface litter.

use crate::flux::DisturbanceFluxes;
use crate::params::EcophysConstants;
use crate::state::{CarbonState, NitrogenState};

/// Move standing dead and cut-down material to the surface litter at their
/// daily rates.
pub fn dead_biomass_to_litter(
    epc: &EcophysConstants,
    cs: &CarbonState,
    ns: &NitrogenState,
    df: &mut DisturbanceFluxes,
) {
    let sd = epc.standing_dead_rate.clamp(0.0, 1.0);
    let cd = epc.cutdown_rate.clamp(0.0, 1.0);
    for (k, (&c, &n)) in cs.standing_dead.iter().zip(&ns.standing_dead).enumerate() {
        df.carbon.standing_dead_to_litter[k] = sd * c.max(0.0);
        df.nitrogen.standing_dead_to_litter[k] = sd * n.max(0.0);
    }
    for (k, (&c, &n)) in cs.cutdown.iter().zip(&ns.cutdown).enumerate() {
        df.carbon.cutdown_to_litter[k] = cd * c.max(0.0);
        df.nitrogen.cutdown_to_litter[k] = cd * n.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dead_biomass_decays_at_its_rate() {
        let epc = EcophysConstants::default();
        let mut cs = CarbonState::new(1);
        let mut ns = NitrogenState::new(1);
        cs.standing_dead[1] = 1.0;
        ns.standing_dead[1] = 0.02;
        cs.cutdown[4] = 2.0;
        let mut df = DisturbanceFluxes::new(1);
        dead_biomass_to_litter(&epc, &cs, &ns, &mut df);
        assert_relative_eq!(df.carbon.standing_dead_to_litter[1], epc.standing_dead_rate);
        assert_relative_eq!(df.nitrogen.standing_dead_to_litter[1], 0.02 * epc.standing_dead_rate);
        assert_relative_eq!(df.carbon.cutdown_to_litter[4], 2.0 * epc.cutdown_rate);
    }
}
