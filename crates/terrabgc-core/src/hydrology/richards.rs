//! Finite-difference Richards-type redistribution with adaptive sub-steps.
//!
//! The day is split into sub-steps between `min_step` and `max_step`
//! seconds. Each sub-step applies infiltration, evaporation and
//! transpiration at their mean daily rates, Darcy percolation from the
//! unsaturated conductivity and gradient diffusion between neighbours. A
//! sub-step is retried ten times shorter while any layer's VWC would change
//! by more than `max_dvwc`, and the next one grows tenfold once changes
//! fall an order of magnitude below it.

use super::{
    diffusive_exchange, push_back_saturation_excess, withdraw, ColumnDemand, HydrologyScheme,
    SchemeReport,
};
use crate::config::RichardsControl;
use crate::constants::{SECONDS_PER_DAY, WATER_DENSITY};
use crate::error::{BgcError, BgcResult};
use crate::flux::WaterFlux;
use crate::layers::{self, LayerVec};
use crate::params::SoilProfile;

/// Hard cap on sub-steps per day.
const MAX_SUBSTEPS: usize = 200_000;

#[derive(Debug, Clone)]
pub struct Richards {
    control: RichardsControl,
}

/// Fluxes accumulated over one sub-step.
struct SubStep {
    w: LayerVec,
    evap: f64,
    trans: LayerVec,
    percolation: LayerVec,
    diffusion: LayerVec,
    to_pond: f64,
    max_dvwc: f64,
}

impl Richards {
    pub fn new(control: RichardsControl) -> Self {
        Self { control }
    }

    fn trial(
        &self,
        soil: &SoilProfile,
        demand: &ColumnDemand<'_>,
        w0: &LayerVec,
        dt: f64,
    ) -> SubStep {
        let n = w0.len();
        let frac = dt / SECONDS_PER_DAY;
        let mut w = w0.clone();
        let mut trans = layers::zeros(n);
        let mut percolation = layers::zeros(n);
        let mut diffusion = layers::zeros(n);

        w[0] += demand.infiltration * frac;
        let evap = withdraw(&mut w[0], demand.evaporation * frac, soil.layers[0].hw_water());
        for (l, layer) in soil.layers.iter().enumerate() {
            trans[l] = withdraw(&mut w[l], demand.transpiration[l] * frac, layer.hw_water());
        }

        for l in 0..n {
            let layer = &soil.layers[l];
            if w[l] <= layer.fc_water() {
                continue;
            }
            let q = (layer.conductivity(layer.vwc(w[l])) * dt * WATER_DENSITY)
                .min(w[l] - layer.fc_water());
            w[l] -= q;
            percolation[l] = q;
            if l + 1 < n {
                w[l + 1] += q;
            }
        }

        let to_pond = push_back_saturation_excess(soil, &mut w, &mut percolation, &mut diffusion);

        for l in 0..n.saturating_sub(1) {
            let q = diffusive_exchange(w[l], w[l + 1], &soil.layers[l], &soil.layers[l + 1], dt);
            w[l] -= q;
            w[l + 1] += q;
            diffusion[l] += q;
        }

        let max_dvwc = soil
            .layers
            .iter()
            .enumerate()
            .map(|(l, layer)| (layer.vwc(w[l]) - layer.vwc(w0[l])).abs())
            .fold(0.0, f64::max);

        SubStep {
            w,
            evap,
            trans,
            percolation,
            diffusion,
            to_pond,
            max_dvwc,
        }
    }
}

impl HydrologyScheme for Richards {
    fn name(&self) -> &'static str {
        "richards"
    }

    fn redistribute(
        &self,
        soil: &SoilProfile,
        demand: &ColumnDemand<'_>,
        w: &mut LayerVec,
        wf: &mut WaterFlux,
    ) -> BgcResult<SchemeReport> {
        let ctl = &self.control;
        let mut report = SchemeReport::default();
        let mut elapsed = 0.0;
        let mut dt = ctl.max_step;

        while elapsed < SECONDS_PER_DAY {
            if report.substeps >= MAX_SUBSTEPS {
                return Err(BgcError::numerical(
                    "richards",
                    format!("no convergence after {MAX_SUBSTEPS} sub-steps"),
                ));
            }
            let remaining = SECONDS_PER_DAY - elapsed;
            let mut step_dt = dt.min(remaining);
            let mut step = self.trial(soil, demand, w, step_dt);
            while step.max_dvwc > ctl.max_dvwc && step_dt > ctl.min_step {
                step_dt = (step_dt / 10.0).max(ctl.min_step);
                step = self.trial(soil, demand, w, step_dt);
            }
            if step.max_dvwc > ctl.max_dvwc {
                report.min_step_limited = true;
            }

            *w = step.w;
            wf.soilw_evap += step.evap;
            wf.soilw_to_pondw += step.to_pond;
            for l in 0..w.len() {
                wf.soilw_trans[l] += step.trans[l];
                wf.soilw_percolation[l] += step.percolation[l];
                wf.soilw_diffusion[l] += step.diffusion[l];
            }
            elapsed += step_dt;
            report.substeps += 1;

            dt = if step.max_dvwc < 0.1 * ctl.max_dvwc {
                (step_dt * 10.0).min(ctl.max_step)
            } else {
                step_dt
            };
        }
        log::debug!("richards: {} sub-steps", report.substeps);
        Ok(report)
    }
}
