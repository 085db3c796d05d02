//! Daily flux aggregates.
//!
//! Every process module writes its results here and nowhere else. The
//! update routines consume the aggregates once per day, after which they are
//! reset to zero.

pub mod carbon;
pub mod disturbance;
pub mod nitrogen;
pub mod plant;
pub mod water;

pub use carbon::{CarbonFlux, DecompCarbon};
pub use disturbance::{DisturbanceFlux, DisturbanceFluxes};
pub use nitrogen::{DecompNitrogen, NitrogenFlux};
pub use plant::PlantFlux;
pub use water::WaterFlux;

use crate::layers::LayerArray;

/// Solute moved out of one layer by water flow (mass per m2).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoluteFlux {
    /// Carried down into the next layer, or out of the column from the bottom.
    pub down: f64,
    /// Carried up into the layer above.
    pub up: f64,
}

impl SoluteFlux {
    pub fn total(&self) -> f64 {
        self.down + self.up
    }
}

pub type SoluteProfile = LayerArray<SoluteFlux>;

pub fn solute_profile(n: usize) -> SoluteProfile {
    smallvec::smallvec![SoluteFlux::default(); n]
}

/// The flux aggregates of one simulated day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyFluxes {
    pub water: WaterFlux,
    pub carbon: CarbonFlux,
    pub nitrogen: NitrogenFlux,
    pub disturbance: DisturbanceFluxes,
}

impl DailyFluxes {
    pub fn new(n_layers: usize) -> Self {
        Self {
            water: WaterFlux::new(n_layers),
            carbon: CarbonFlux::new(n_layers),
            nitrogen: NitrogenFlux::new(n_layers),
            disturbance: DisturbanceFluxes::new(n_layers),
        }
    }

    /// Zero every flux, keeping the layer count.
    pub fn reset(&mut self) {
        self.water.reset();
        self.carbon.reset();
        self.nitrogen.reset();
        self.disturbance.reset();
    }
}
