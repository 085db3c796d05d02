//! Tipping-bucket redistribution.
//!
//! Water above field capacity drains to the next layer at a
//! conductivity-limited rate; anything pushed above saturation flows back
//! up toward the pond. A second pass exchanges water between neighbouring
//! layers along the moisture gradient.

use super::{
    diffusive_exchange, push_back_saturation_excess, withdraw, ColumnDemand, HydrologyScheme,
    SchemeReport,
};
use crate::constants::SECONDS_PER_DAY;
use crate::error::BgcResult;
use crate::flux::WaterFlux;
use crate::layers::LayerVec;
use crate::params::{SoilLayer, SoilProfile};

/// Daily gravitational drainage out of one layer (kg/m2).
///
/// Zero at or below field capacity, otherwise a texture-dependent share of
/// the excess, capped by saturated conductivity.
pub fn outflow(soilw: f64, layer: &SoilLayer) -> f64 {
    let excess = soilw - layer.fc_water();
    if excess <= 0.0 {
        return 0.0;
    }
    (excess * layer.drain_coef).min(layer.max_daily_drainage())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tipping;

impl HydrologyScheme for Tipping {
    fn name(&self) -> &'static str {
        "tipping"
    }

    fn redistribute(
        &self,
        soil: &SoilProfile,
        demand: &ColumnDemand<'_>,
        w: &mut LayerVec,
        wf: &mut WaterFlux,
    ) -> BgcResult<SchemeReport> {
        let n = w.len();

        w[0] += demand.infiltration;
        wf.soilw_evap = withdraw(&mut w[0], demand.evaporation, soil.layers[0].hw_water());
        for (l, layer) in soil.layers.iter().enumerate() {
            wf.soilw_trans[l] = withdraw(&mut w[l], demand.transpiration[l], layer.hw_water());
        }

        for l in 0..n {
            let drain = outflow(w[l], &soil.layers[l]);
            w[l] -= drain;
            wf.soilw_percolation[l] = drain;
            if l + 1 < n {
                w[l + 1] += drain;
            }
        }

        wf.soilw_to_pondw += push_back_saturation_excess(
            soil,
            w,
            &mut wf.soilw_percolation,
            &mut wf.soilw_diffusion,
        );

        for l in 0..n.saturating_sub(1) {
            let q = diffusive_exchange(
                w[l],
                w[l + 1],
                &soil.layers[l],
                &soil.layers[l + 1],
                SECONDS_PER_DAY,
            );
            w[l] -= q;
            w[l + 1] += q;
            wf.soilw_diffusion[l] += q;
        }

        Ok(SchemeReport {
            substeps: 1,
            min_step_limited: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers;
    use crate::params::soil::SoilConfig;
    use approx::assert_relative_eq;

    fn profile() -> SoilProfile {
        SoilProfile::build(&SoilConfig::default()).unwrap()
    }

    #[test]
    fn no_outflow_below_field_capacity() {
        let soil = profile();
        let layer = &soil.layers[2];
        let mut wf = WaterFlux::new(1);
        wf.soilw_percolation[0] = outflow(layer.fc_water() - 1.0, layer);
        assert_eq!(wf.soilw_percolation[0], 0.0);
        assert_eq!(outflow(layer.fc_water(), layer), 0.0);
    }

    #[test]
    fn outflow_is_capped_by_conductivity() {
        let soil = profile();
        let layer = &soil.layers[9];
        let drain = outflow(layer.sat_water(), layer);
        let excess = layer.sat_water() - layer.fc_water();
        assert!(drain <= layer.max_daily_drainage());
        assert!(drain <= excess * layer.drain_coef + 1e-12);
    }

    #[test]
    fn redistribution_conserves_water() {
        let soil = profile();
        let n = soil.n_layers();
        let mut w: LayerVec = soil.layers.iter().map(|l| l.fc_water()).collect();
        let start = layers::sum(&w);
        let trans = layers::zeros(n);
        let demand = ColumnDemand {
            infiltration: 40.0,
            evaporation: 1.0,
            transpiration: &trans,
        };
        let mut wf = WaterFlux::new(n);
        Tipping.redistribute(&soil, &demand, &mut w, &mut wf).unwrap();
        let end = layers::sum(&w);
        let out = wf.soilw_evap + wf.soilw_to_pondw + wf.soilw_percolation[n - 1];
        assert_relative_eq!(start + 40.0, end + out, epsilon = 1e-9);
        for (l, layer) in soil.layers.iter().enumerate() {
            assert!(w[l] <= layer.sat_water() + 1e-9);
            assert!(w[l] >= layer.hw_water() - 1e-9);
        }
    }

    #[test]
    fn heavy_rain_on_saturated_top_ponds() {
        let soil = profile();
        let n = soil.n_layers();
        let mut w: LayerVec = soil.layers.iter().map(|l| l.sat_water()).collect();
        let trans = layers::zeros(n);
        let demand = ColumnDemand {
            infiltration: 500.0,
            evaporation: 0.0,
            transpiration: &trans,
        };
        let mut wf = WaterFlux::new(n);
        Tipping.redistribute(&soil, &demand, &mut w, &mut wf).unwrap();
        assert!(wf.soilw_to_pondw > 0.0);
        assert!(w[0] <= soil.layers[0].sat_water() + 1e-9);
    }
}
