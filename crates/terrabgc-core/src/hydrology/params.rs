//! Per-layer hydraulic state derived from soil water content.

use crate::epv::EcophysVariables;
use crate::params::{EcophysConstants, SoilLayer, SoilProfile};

/// Soil water stress multiplier of one layer.
///
/// Zero at or below wilting point, rising linearly to one at the critical
/// content between wilting point and field capacity. Above field capacity
/// the multiplier optionally falls toward `waterlog_floor` at saturation.
pub fn soil_stress(vwc: f64, layer: &SoilLayer, epc: &EcophysConstants) -> f64 {
    let crit = layer.vwc_wp + epc.vwc_ratio_crit * (layer.vwc_fc - layer.vwc_wp);
    if vwc <= layer.vwc_wp {
        0.0
    } else if vwc < crit {
        (vwc - layer.vwc_wp) / (crit - layer.vwc_wp)
    } else if epc.waterlog_floor < 1.0 && vwc > layer.vwc_fc {
        let wet = ((vwc - layer.vwc_fc) / (layer.vwc_sat - layer.vwc_fc)).clamp(0.0, 1.0);
        1.0 - (1.0 - epc.waterlog_floor) * wet
    } else {
        1.0
    }
}

/// Refresh VWC, matric potential, WFPS, conductivity, diffusivity and
/// water stress for every layer, plus the root-weighted stress multiplier.
pub fn multilayer_hydrolparams(
    soilw: &[f64],
    soil: &SoilProfile,
    epc: &EcophysConstants,
    epv: &mut EcophysVariables,
) {
    for (l, layer) in soil.layers.iter().enumerate() {
        let vwc = layer.vwc(soilw[l]);
        epv.vwc[l] = vwc;
        epv.psi[l] = layer.psi(vwc);
        epv.wfps[l] = vwc / layer.vwc_sat;
        epv.conductivity[l] = layer.conductivity(vwc);
        epv.diffusivity[l] = layer.diffusivity(vwc);
        epv.soil_stress[l] = soil_stress(vwc, layer, epc);
    }
    epv.m_soilstress = if epv.n_rootlayers > 0 {
        epv.rootlength_prop
            .iter()
            .zip(&epv.soil_stress)
            .map(|(w, s)| w * s)
            .sum()
    } else {
        epv.soil_stress[0]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::soil::SoilConfig;
    use approx::assert_relative_eq;

    #[test]
    fn stress_ramps_between_wilting_and_critical() {
        let soil = SoilProfile::build(&SoilConfig::default()).unwrap();
        let l = &soil.layers[0];
        let epc = EcophysConstants::default();
        assert_eq!(soil_stress(l.vwc_wp, l, &epc), 0.0);
        assert_eq!(soil_stress(l.vwc_fc, l, &epc), 1.0);
        let crit = l.vwc_wp + 0.6 * (l.vwc_fc - l.vwc_wp);
        assert_relative_eq!(soil_stress(0.5 * (l.vwc_wp + crit), l, &epc), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn waterlogging_floor_applies_at_saturation() {
        let soil = SoilProfile::build(&SoilConfig::default()).unwrap();
        let l = &soil.layers[0];
        let epc = EcophysConstants {
            waterlog_floor: 0.4,
            ..EcophysConstants::default()
        };
        assert_relative_eq!(soil_stress(l.vwc_sat, l, &epc), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn params_follow_water_content() {
        let soil = SoilProfile::build(&SoilConfig::default()).unwrap();
        let mut epv = EcophysVariables::new(soil.n_layers());
        let soilw: Vec<f64> = soil.layers.iter().map(|l| l.fc_water()).collect();
        multilayer_hydrolparams(&soilw, &soil, &EcophysConstants::default(), &mut epv);
        for (l, layer) in soil.layers.iter().enumerate() {
            assert_relative_eq!(epv.vwc[l], layer.vwc_fc, epsilon = 1e-12);
            assert_relative_eq!(epv.psi[l], -0.015, epsilon = 1e-9);
        }
        assert_eq!(epv.m_soilstress, 1.0);
    }
}
