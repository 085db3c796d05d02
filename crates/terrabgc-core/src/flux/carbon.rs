use super::{solute_profile, PlantFlux, SoluteProfile};
use crate::decomp::N_PATHWAYS;
use crate::layers::LayerArray;
use crate::state::{Tissue, N_LITTER};

const NT: usize = Tissue::COUNT;

/// Realized decomposition carbon flows in one layer (kgC/m2/day).
///
/// For every pathway `loss == hr + transfer + to_doc`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecompCarbon {
    pub loss: [f64; N_PATHWAYS],
    pub hr: [f64; N_PATHWAYS],
    pub transfer: [f64; N_PATHWAYS],
    pub to_doc: [f64; N_PATHWAYS],
    pub cwd_to_litter: [f64; N_LITTER],
    pub doc_hr: f64,
}

impl DecompCarbon {
    pub fn hr_total(&self) -> f64 {
        self.hr.iter().sum::<f64>() + self.doc_hr
    }
}

/// Daily carbon fluxes (kgC/m2/day).
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonFlux {
    pub plant: PlantFlux,
    pub psnsun_to_cpool: f64,
    pub psnshade_to_cpool: f64,
    pub leaf_day_mr: f64,
    pub leaf_night_mr: f64,
    /// Maintenance respiration per tissue; the leaf entry is day plus night.
    pub mr: [f64; NT],
    /// Growth respiration paid now for displayed growth.
    pub gr: [f64; NT],
    /// Growth respiration paid now for storage growth.
    pub storage_gr: [f64; NT],
    /// Growth respiration paid from the transfer reserve as transfer growth displays.
    pub transfer_gr: f64,
    pub cpool_to_gresp_storage: f64,
    pub gresp_storage_to_transfer: f64,
    pub decomp: LayerArray<DecompCarbon>,
    pub doc_transport: SoluteProfile,
    /// Net soil CH4 exchange (kgC/m2/day), positive for emission.
    pub ch4: f64,
}

impl CarbonFlux {
    pub fn new(n_layers: usize) -> Self {
        Self {
            plant: PlantFlux::new(n_layers),
            psnsun_to_cpool: 0.0,
            psnshade_to_cpool: 0.0,
            leaf_day_mr: 0.0,
            leaf_night_mr: 0.0,
            mr: [0.0; NT],
            gr: [0.0; NT],
            storage_gr: [0.0; NT],
            transfer_gr: 0.0,
            cpool_to_gresp_storage: 0.0,
            gresp_storage_to_transfer: 0.0,
            decomp: smallvec::smallvec![DecompCarbon::default(); n_layers],
            doc_transport: solute_profile(n_layers),
            ch4: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.decomp.len());
    }

    pub fn gpp(&self) -> f64 {
        self.psnsun_to_cpool + self.psnshade_to_cpool
    }

    pub fn mr_total(&self) -> f64 {
        self.mr.iter().sum()
    }

    pub fn gr_total(&self) -> f64 {
        self.gr.iter().sum::<f64>() + self.storage_gr.iter().sum::<f64>() + self.transfer_gr
    }

    pub fn hr_total(&self) -> f64 {
        self.decomp.iter().map(DecompCarbon::hr_total).sum()
    }

    pub fn doc_leached(&self) -> f64 {
        self.doc_transport.last().map(|f| f.down).unwrap_or(0.0)
    }
}
