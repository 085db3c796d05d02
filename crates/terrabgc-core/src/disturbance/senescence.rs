//! Drought senescence of green above-ground tissue.

use super::{Destination, Disturber};
use crate::state::{SubPool, Tissue};

/// Under soil water stress a share of displayed leaves, fruit and soft
/// stems dies and stays standing. `m_soilstress` is 1 when unstressed.
pub fn senescence(d: &mut Disturber<'_>, m_soilstress: f64) {
    let rate = d.epc.senescence_rate * (1.0 - m_soilstress.clamp(0.0, 1.0));
    if rate <= 0.0 {
        return;
    }
    for t in Tissue::ALL.into_iter().filter(|t| t.is_green_aboveground()) {
        d.remove(t, SubPool::Active, rate, Destination::StandingDead);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disturbance::tests::stocked;
    use crate::flux::DisturbanceFluxes;
    use crate::params::EcophysConstants;
    use approx::assert_relative_eq;

    #[test]
    fn stress_kills_green_tissue_only() {
        let epc = EcophysConstants::default();
        let (cs, ns, epv) = stocked(2);
        let mut df = DisturbanceFluxes::new(2);
        let mut d = Disturber::new(&epc, &cs, &ns, &epv, &mut df);
        senescence(&mut d, 0.5);
        let rate = epc.senescence_rate * 0.5;
        assert_relative_eq!(df.carbon.removal[Tissue::Leaf.index()].active, 0.5 * rate);
        assert_eq!(df.carbon.removal[Tissue::Froot.index()].active, 0.0);
        assert_relative_eq!(
            df.carbon.to_standing_dead.iter().sum::<f64>(),
            3.0 * 0.5 * rate,
            epsilon = 1e-15
        );
    }

    #[test]
    fn unstressed_plants_do_not_senesce() {
        let epc = EcophysConstants::default();
        let (cs, ns, epv) = stocked(2);
        let mut df = DisturbanceFluxes::new(2);
        let mut d = Disturber::new(&epc, &cs, &ns, &epv, &mut df);
        senescence(&mut d, 1.0);
        assert_eq!(df.carbon.removal_total(), 0.0);
    }
}
