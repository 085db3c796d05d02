//! Distribution of canopy transpiration over the rooted layers.

use crate::epv::EcophysVariables;
use crate::error::{Advisory, AdvisoryFlags};
use crate::layers::{self, LayerVec};
use crate::params::SoilProfile;

/// Per-layer transpiration demand (kg/m2).
///
/// Demand is weighted by root-length share times the layer's water stress
/// and capped at the water held above wilting point. Capped demand is not
/// moved to other layers.
pub fn multilayer_transpiration(
    pot_trans: f64,
    soilw: &[f64],
    soil: &SoilProfile,
    epv: &EcophysVariables,
    flags: &mut AdvisoryFlags,
) -> LayerVec {
    let n = soil.n_layers();
    let mut demand = layers::zeros(n);
    if pot_trans <= 0.0 {
        return demand;
    }
    let weights: LayerVec = epv
        .rootlength_prop
        .iter()
        .zip(&epv.soil_stress)
        .map(|(r, s)| r * s)
        .collect();
    let total = layers::sum(&weights);
    if total <= 0.0 {
        flags.raise(Advisory::TranspirationLimited);
        return demand;
    }
    for (l, layer) in soil.layers.iter().enumerate() {
        let want = pot_trans * weights[l] / total;
        let available = (soilw[l] - layer.wp_water()).max(0.0);
        if want > available {
            flags.raise(Advisory::TranspirationLimited);
        }
        demand[l] = want.min(available);
    }
    demand
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::soil::SoilConfig;
    use approx::assert_relative_eq;

    fn setup() -> (SoilProfile, EcophysVariables, LayerVec) {
        let soil = SoilProfile::build(&SoilConfig::default()).unwrap();
        let mut epv = EcophysVariables::new(soil.n_layers());
        epv.rootlength_prop[0] = 0.25;
        epv.rootlength_prop[1] = 0.75;
        epv.n_rootlayers = 2;
        let w = soil.layers.iter().map(|l| l.fc_water()).collect();
        (soil, epv, w)
    }

    #[test]
    fn demand_follows_root_shares() {
        let (soil, epv, w) = setup();
        let mut flags = AdvisoryFlags::default();
        let d = multilayer_transpiration(2.0, &w, &soil, &epv, &mut flags);
        assert_relative_eq!(d[0], 0.5);
        assert_relative_eq!(d[1], 1.5);
        assert_eq!(layers::sum(&d[2..]), 0.0);
        assert!(!flags.transpiration_limited);
    }

    #[test]
    fn dry_layer_is_capped() {
        let (soil, epv, mut w) = setup();
        w[1] = soil.layers[1].wp_water() + 0.2;
        let mut flags = AdvisoryFlags::default();
        let d = multilayer_transpiration(2.0, &w, &soil, &epv, &mut flags);
        assert_relative_eq!(d[1], 0.2, epsilon = 1e-12);
        assert!(flags.transpiration_limited);
    }

    #[test]
    fn stressed_layers_get_no_demand() {
        let (soil, mut epv, w) = setup();
        epv.soil_stress[1] = 0.0;
        let mut flags = AdvisoryFlags::default();
        let d = multilayer_transpiration(2.0, &w, &soil, &epv, &mut flags);
        assert_relative_eq!(d[0], 2.0);
        assert_eq!(d[1], 0.0);
    }
}
