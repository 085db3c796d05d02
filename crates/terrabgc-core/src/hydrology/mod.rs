//! Hydrology engine: routes precipitation, canopy drip and snowmelt
//! through the soil column.
//!
//! Vertical transport is delegated to a [`HydrologyScheme`] resolved once
//! when the simulation is built. Schemes work on a scratch copy of the
//! layer contents and report what they moved through [`WaterFlux`]; the
//! state itself is only written by the water update.

pub mod evaporation;
pub mod groundwater;
pub mod params;
pub mod pond;
pub mod process;
pub mod richards;
pub mod surface;
pub mod tipping;
pub mod transpiration;

pub use process::multilayer_hydrolprocess;
pub use richards::Richards;
pub use tipping::Tipping;

use std::fmt::Debug;

use crate::config::{HydrologyMode, RichardsControl};
use crate::error::BgcResult;
use crate::flux::WaterFlux;
use crate::layers::LayerVec;
use crate::params::{SoilLayer, SoilProfile};

/// Water a scheme has to move in one day (kg/m2).
#[derive(Debug, Clone, Copy)]
pub struct ColumnDemand<'a> {
    /// Water entering the top layer from the surface.
    pub infiltration: f64,
    /// Evaporation demand on the top layer.
    pub evaporation: f64,
    /// Transpiration demand per layer.
    pub transpiration: &'a [f64],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemeReport {
    pub substeps: usize,
    /// The smallest sub-step was used without meeting the VWC tolerance.
    pub min_step_limited: bool,
}

pub trait HydrologyScheme: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Move one day's water through the column.
    ///
    /// On return `soilw` holds the redistributed profile, and `wf` carries
    /// actual evaporation and transpiration, percolation, diffusion and
    /// the saturation excess pushed to the pond.
    fn redistribute(
        &self,
        soil: &SoilProfile,
        demand: &ColumnDemand<'_>,
        soilw: &mut LayerVec,
        wf: &mut WaterFlux,
    ) -> BgcResult<SchemeReport>;
}

pub fn resolve_scheme(mode: HydrologyMode, richards: &RichardsControl) -> Box<dyn HydrologyScheme> {
    match mode {
        HydrologyMode::Tipping => Box::new(Tipping),
        HydrologyMode::Richards => Box::new(Richards::new(richards.clone())),
    }
}

/// Take up to `demand` out of `w` without dropping it below `floor`.
pub(crate) fn withdraw(w: &mut f64, demand: f64, floor: f64) -> f64 {
    let taken = demand.min((*w - floor).max(0.0)).max(0.0);
    *w -= taken;
    taken
}

/// Diffusive exchange between two adjacent layers over `dt` seconds (kg/m2,
/// positive downward).
///
/// The gradient flux is bounded so that the pair cannot overshoot equal
/// water content, the donor stays above hygroscopic water and the receiver
/// stays below saturation.
pub(crate) fn diffusive_exchange(
    w_up: f64,
    w_down: f64,
    up: &SoilLayer,
    down: &SoilLayer,
    dt: f64,
) -> f64 {
    let theta_up = up.vwc(w_up);
    let theta_down = down.vwc(w_down);
    let d = 0.5 * (up.diffusivity(theta_up) + down.diffusivity(theta_down));
    let dz = 0.5 * (up.thickness + down.thickness);
    let q = d * (theta_up - theta_down) / dz * dt * crate::constants::WATER_DENSITY;

    let theta_eq = (w_up + w_down) / (up.water_at(1.0) + down.water_at(1.0));
    let limit = w_up - up.water_at(theta_eq);
    if q > 0.0 {
        q.min(limit.max(0.0))
            .min((w_up - up.hw_water()).max(0.0))
            .min((down.sat_water() - w_down).max(0.0))
    } else if q < 0.0 {
        -(-q)
            .min((-limit).max(0.0))
            .min((w_down - down.hw_water()).max(0.0))
            .min((up.sat_water() - w_up).max(0.0))
    } else {
        0.0
    }
}

/// Push water above saturation back up the column.
///
/// Excess is first charged against the drainage that delivered it, then
/// recorded as upward diffusion. Returns what overflows the top layer.
pub(crate) fn push_back_saturation_excess(
    soil: &SoilProfile,
    w: &mut [f64],
    percolation: &mut [f64],
    diffusion: &mut [f64],
) -> f64 {
    for l in (1..w.len()).rev() {
        let excess = w[l] - soil.layers[l].sat_water();
        if excess > 0.0 {
            w[l] -= excess;
            w[l - 1] += excess;
            let back = excess.min(percolation[l - 1]);
            percolation[l - 1] -= back;
            diffusion[l - 1] -= excess - back;
        }
    }
    let excess = w[0] - soil.layers[0].sat_water();
    if excess > 0.0 {
        w[0] -= excess;
        excess
    } else {
        0.0
    }
}
