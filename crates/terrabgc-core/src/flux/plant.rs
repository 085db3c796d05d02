use crate::layers::LayerArray;
use crate::state::{Tissue, TissuePools, N_CUTDOWN, N_LITTER};

const NT: usize = Tissue::COUNT;

/// Movements of one element through the plant and into dead organic
/// matter. Carbon and nitrogen each carry their own instance; flows that
/// only exist for nitrogen stay zero on the carbon side.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantFlux {
    pub storage_to_transfer: [f64; NT],
    pub transfer_to_active: [f64; NT],
    /// Phenological litterfall and fine-root turnover out of active pools.
    pub litterfall: [f64; NT],
    /// Live wood turned over to dead wood, as received by the dead pool.
    pub livestem_to_deadstem: f64,
    pub livecroot_to_deadcroot: f64,
    /// Part of litterfall withdrawn before shedding.
    pub to_retrans: f64,
    /// N surplus of live wood over dead wood released at turnover.
    pub livestem_to_retrans: f64,
    pub livecroot_to_retrans: f64,
    /// New growth out of the non-structural pool.
    pub pool_to_active: [f64; NT],
    pub pool_to_storage: [f64; NT],
    /// Reserves and tissue consumed to cover a maintenance deficit.
    pub mobilized: [TissuePools; NT],
    /// Inputs to the four litter classes and coarse woody debris, per layer.
    pub litter_in: LayerArray<[f64; N_CUTDOWN]>,
}

impl PlantFlux {
    pub fn new(n_layers: usize) -> Self {
        Self {
            storage_to_transfer: [0.0; NT],
            transfer_to_active: [0.0; NT],
            litterfall: [0.0; NT],
            livestem_to_deadstem: 0.0,
            livecroot_to_deadcroot: 0.0,
            to_retrans: 0.0,
            livestem_to_retrans: 0.0,
            livecroot_to_retrans: 0.0,
            pool_to_active: [0.0; NT],
            pool_to_storage: [0.0; NT],
            mobilized: [TissuePools::default(); NT],
            litter_in: smallvec::smallvec![[0.0; N_CUTDOWN]; n_layers],
        }
    }

    pub fn litterfall_total(&self) -> f64 {
        self.litterfall.iter().sum()
    }

    pub fn allocation_total(&self) -> f64 {
        self.pool_to_active.iter().sum::<f64>() + self.pool_to_storage.iter().sum::<f64>()
    }

    pub fn litter_in_total(&self) -> f64 {
        litter_total(&self.litter_in)
    }

    pub fn mobilized_total(&self) -> f64 {
        self.mobilized.iter().map(TissuePools::total).sum()
    }

    pub fn retrans_total(&self) -> f64 {
        self.to_retrans + self.livestem_to_retrans + self.livecroot_to_retrans
    }

    /// Spread `amount` of tissue material over the litter classes of one layer.
    pub fn add_litter(&mut self, layer: usize, partition: [f64; N_LITTER], amount: f64) {
        add_litter(&mut self.litter_in, layer, partition, amount);
    }

    /// Spread `amount` over layers by `weights`, then over litter classes.
    pub fn add_litter_by_layer(&mut self, weights: &[f64], partition: [f64; N_LITTER], amount: f64) {
        for (layer, &w) in weights.iter().enumerate() {
            if w > 0.0 {
                self.add_litter(layer, partition, amount * w);
            }
        }
    }
}

pub(crate) fn litter_total(litter: &[[f64; N_CUTDOWN]]) -> f64 {
    litter.iter().flat_map(|l| l.iter()).sum()
}

pub(crate) fn add_litter(
    litter: &mut [[f64; N_CUTDOWN]],
    layer: usize,
    partition: [f64; N_LITTER],
    amount: f64,
) {
    for (d, p) in litter[layer].iter_mut().zip(partition) {
        *d += amount * p;
    }
}
