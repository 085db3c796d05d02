use super::{solute_profile, PlantFlux, SoluteProfile};
use crate::decomp::N_PATHWAYS;
use crate::layers::{self, LayerArray, LayerVec};
use crate::state::N_LITTER;

/// Realized decomposition nitrogen flows in one layer (kgN/m2/day).
///
/// For every pathway `loss + mineral == transfer + to_don`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecompNitrogen {
    pub loss: [f64; N_PATHWAYS],
    pub transfer: [f64; N_PATHWAYS],
    pub to_don: [f64; N_PATHWAYS],
    /// Positive: immobilized from mineral N. Negative: released as NH4.
    pub mineral: [f64; N_PATHWAYS],
    pub cwd_to_litter: [f64; N_LITTER],
    pub don_mineralized: f64,
}

impl DecompNitrogen {
    pub fn immobilization(&self) -> f64 {
        self.mineral.iter().filter(|&&m| m > 0.0).sum()
    }

    pub fn gross_mineralization(&self) -> f64 {
        -self.mineral.iter().filter(|&&m| m < 0.0).sum::<f64>() + self.don_mineralized
    }
}

/// Daily nitrogen fluxes (kgN/m2/day).
#[derive(Debug, Clone, PartialEq)]
pub struct NitrogenFlux {
    pub plant: PlantFlux,
    pub retrans_to_npool: f64,
    pub nh4_uptake: LayerVec,
    pub no3_uptake: LayerVec,
    pub decomp: LayerArray<DecompNitrogen>,
    /// Mineral N consumed by immobilization, by form.
    pub nh4_immob: LayerVec,
    pub no3_immob: LayerVec,
    pub ndep_to_nh4: f64,
    pub ndep_to_no3: f64,
    pub nfix_to_nh4: f64,
    pub nitrification: LayerVec,
    pub nitrif_n2o: LayerVec,
    pub denitrification: LayerVec,
    pub volatilization: LayerVec,
    pub transport_nh4: SoluteProfile,
    pub transport_no3: SoluteProfile,
    pub transport_don: SoluteProfile,
}

impl NitrogenFlux {
    pub fn new(n_layers: usize) -> Self {
        Self {
            plant: PlantFlux::new(n_layers),
            retrans_to_npool: 0.0,
            nh4_uptake: layers::zeros(n_layers),
            no3_uptake: layers::zeros(n_layers),
            decomp: smallvec::smallvec![DecompNitrogen::default(); n_layers],
            nh4_immob: layers::zeros(n_layers),
            no3_immob: layers::zeros(n_layers),
            ndep_to_nh4: 0.0,
            ndep_to_no3: 0.0,
            nfix_to_nh4: 0.0,
            nitrification: layers::zeros(n_layers),
            nitrif_n2o: layers::zeros(n_layers),
            denitrification: layers::zeros(n_layers),
            volatilization: layers::zeros(n_layers),
            transport_nh4: solute_profile(n_layers),
            transport_no3: solute_profile(n_layers),
            transport_don: solute_profile(n_layers),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.decomp.len());
    }

    pub fn uptake_total(&self) -> f64 {
        layers::sum(&self.nh4_uptake) + layers::sum(&self.no3_uptake)
    }

    pub fn gross_mineralization(&self) -> f64 {
        self.decomp.iter().map(DecompNitrogen::gross_mineralization).sum()
    }

    pub fn immobilization(&self) -> f64 {
        self.decomp.iter().map(DecompNitrogen::immobilization).sum()
    }

    pub fn leached(&self) -> f64 {
        [&self.transport_nh4, &self.transport_no3, &self.transport_don]
            .iter()
            .filter_map(|p| p.last())
            .map(|f| f.down)
            .sum()
    }
}
