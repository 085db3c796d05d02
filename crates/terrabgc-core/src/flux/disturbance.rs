use super::plant::litter_total;
use crate::layers::LayerArray;
use crate::state::{Tissue, TissuePools, N_CUTDOWN, N_LITTER};

const NT: usize = Tissue::COUNT;

/// Disturbance and management flows of one element.
///
/// Computed on the state left by the main daily update and applied after
/// it, so they never compete with allocation for the same pools.
#[derive(Debug, Clone, PartialEq)]
pub struct DisturbanceFlux {
    /// Losses to mortality, fire, senescence and management, per sub-pool.
    pub removal: [TissuePools; NT],
    /// Share of the non-structural pool lost with whole plants.
    pub pool_removal: f64,
    pub retrans_removal: f64,
    pub gresp_storage_removal: f64,
    pub gresp_transfer_removal: f64,
    /// Dead plant material entering the soil, per layer.
    pub litter_in: LayerArray<[f64; N_CUTDOWN]>,
    pub to_standing_dead: [f64; N_LITTER],
    pub standing_dead_to_litter: [f64; N_LITTER],
    pub to_cutdown: [f64; N_CUTDOWN],
    pub cutdown_to_litter: [f64; N_CUTDOWN],
    /// Surface litter and debris consumed by fire.
    pub litter_to_fire: [f64; N_CUTDOWN],
    pub to_fire: f64,
    pub to_export: f64,
    /// Seed material placed in the transfer pools.
    pub planting: [f64; NT],
    /// Organic fertilizer entering surface litter.
    pub fert_litter: [f64; N_LITTER],
    pub fert_nh4: f64,
    pub fert_no3: f64,
    /// Urine N returned by grazing animals.
    pub excreta_nh4: f64,
    /// Net change of litter and debris from ploughing; sums to zero.
    pub litter_mixing: LayerArray<[f64; N_CUTDOWN]>,
}

impl DisturbanceFlux {
    pub fn new(n_layers: usize) -> Self {
        Self {
            removal: [TissuePools::default(); NT],
            pool_removal: 0.0,
            retrans_removal: 0.0,
            gresp_storage_removal: 0.0,
            gresp_transfer_removal: 0.0,
            litter_in: smallvec::smallvec![[0.0; N_CUTDOWN]; n_layers],
            to_standing_dead: [0.0; N_LITTER],
            standing_dead_to_litter: [0.0; N_LITTER],
            to_cutdown: [0.0; N_CUTDOWN],
            cutdown_to_litter: [0.0; N_CUTDOWN],
            litter_to_fire: [0.0; N_CUTDOWN],
            to_fire: 0.0,
            to_export: 0.0,
            planting: [0.0; NT],
            fert_litter: [0.0; N_LITTER],
            fert_nh4: 0.0,
            fert_no3: 0.0,
            excreta_nh4: 0.0,
            litter_mixing: smallvec::smallvec![[0.0; N_CUTDOWN]; n_layers],
        }
    }

    /// Everything taken out of living plant pools.
    pub fn removal_total(&self) -> f64 {
        self.removal.iter().map(TissuePools::total).sum::<f64>()
            + self.pool_removal
            + self.retrans_removal
            + self.gresp_storage_removal
            + self.gresp_transfer_removal
    }

    /// Where the removed plant material went.
    pub fn removal_destinations(&self) -> f64 {
        litter_total(&self.litter_in)
            + self.to_standing_dead.iter().sum::<f64>()
            + self.to_cutdown.iter().sum::<f64>()
            + self.to_fire
            + self.to_export
            + self.excreta_nh4
    }

    pub fn fire_total(&self) -> f64 {
        self.to_fire + self.litter_to_fire.iter().sum::<f64>()
    }

    pub fn planting_total(&self) -> f64 {
        self.planting.iter().sum()
    }

    pub fn fertilizer_total(&self) -> f64 {
        self.fert_litter.iter().sum::<f64>() + self.fert_nh4 + self.fert_no3
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisturbanceFluxes {
    pub carbon: DisturbanceFlux,
    pub nitrogen: DisturbanceFlux,
}

impl DisturbanceFluxes {
    pub fn new(n_layers: usize) -> Self {
        Self {
            carbon: DisturbanceFlux::new(n_layers),
            nitrogen: DisturbanceFlux::new(n_layers),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.carbon.litter_in.len());
    }
}
