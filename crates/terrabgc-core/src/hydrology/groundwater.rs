//! Shallow groundwater: saturated layers below the table and capillary
//! rise into the layer above it.

use crate::flux::WaterFlux;
use crate::params::SoilProfile;

/// Top up layers below the water table to saturation and feed capillary
/// rise into the first unsaturated layer. Works on the redistributed
/// scratch profile `w` and records the inflow in `wf`.
pub fn groundwater(soil: &SoilProfile, w: &mut [f64], wf: &mut WaterFlux) {
    let Some(g) = soil.groundwater_layer() else {
        return;
    };
    for l in g..w.len() {
        let deficit = (soil.layers[l].sat_water() - w[l]).max(0.0);
        w[l] += deficit;
        wf.soilw_from_groundwater[l] += deficit;
    }
    if g > 0 {
        let above = &soil.layers[g - 1];
        let rise = soil.capillary_rise * (above.fc_water() - w[g - 1]).max(0.0);
        w[g - 1] += rise;
        wf.soilw_from_groundwater[g - 1] += rise;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers;
    use crate::params::soil::SoilConfig;
    use approx::assert_relative_eq;

    #[test]
    fn layers_below_table_are_saturated() {
        let cfg = SoilConfig {
            groundwater_depth: Some(1.5),
            capillary_rise: 0.5,
            ..SoilConfig::default()
        };
        let soil = SoilProfile::build(&cfg).unwrap();
        let mut w: Vec<f64> = soil.layers.iter().map(|l| l.wp_water()).collect();
        let mut wf = WaterFlux::new(soil.n_layers());
        groundwater(&soil, &mut w, &mut wf);
        for l in 7..10 {
            assert_relative_eq!(w[l], soil.layers[l].sat_water(), epsilon = 1e-9);
        }
        let l6 = &soil.layers[6];
        assert_relative_eq!(
            wf.soilw_from_groundwater[6],
            0.5 * (l6.fc_water() - l6.wp_water()),
            epsilon = 1e-9
        );
        assert_eq!(layers::sum(&wf.soilw_from_groundwater[..6]), 0.0);
    }

    #[test]
    fn no_table_no_flux() {
        let soil = SoilProfile::build(&SoilConfig::default()).unwrap();
        let mut w: Vec<f64> = soil.layers.iter().map(|l| l.wp_water()).collect();
        let mut wf = WaterFlux::new(soil.n_layers());
        groundwater(&soil, &mut w, &mut wf);
        assert_eq!(layers::sum(&wf.soilw_from_groundwater), 0.0);
    }
}
