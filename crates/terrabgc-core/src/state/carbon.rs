use super::{PlantPools, N_CUTDOWN, N_LITTER, N_SOM};
use crate::layers::LayerArray;

/// Carbon held in one soil layer (kgC/m2).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoilCarbon {
    pub litter: [f64; N_LITTER],
    pub cwd: f64,
    pub som: [f64; N_SOM],
    pub doc: f64,
}

impl SoilCarbon {
    pub fn total(&self) -> f64 {
        self.litter.iter().sum::<f64>() + self.cwd + self.som.iter().sum::<f64>() + self.doc
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarbonSources {
    pub photosynthesis: f64,
    pub planting: f64,
    pub fertilizer: f64,
}

impl CarbonSources {
    pub fn total(&self) -> f64 {
        self.photosynthesis + self.planting + self.fertilizer
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarbonSinks {
    pub maintenance_resp: f64,
    pub growth_resp: f64,
    pub heterotrophic_resp: f64,
    pub fire: f64,
    pub export: f64,
    pub leaching: f64,
}

impl CarbonSinks {
    pub fn total(&self) -> f64 {
        self.maintenance_resp
            + self.growth_resp
            + self.heterotrophic_resp
            + self.fire
            + self.export
            + self.leaching
    }
}

/// All carbon pools of the column (kgC/m2).
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonState {
    pub plant: PlantPools,
    /// Growth respiration reserved for storage growth.
    pub gresp_storage: f64,
    pub gresp_transfer: f64,
    /// Non-structural pool receiving photosynthate before allocation.
    pub cpool: f64,
    pub soil: LayerArray<SoilCarbon>,
    pub standing_dead: [f64; N_LITTER],
    pub cutdown: [f64; N_CUTDOWN],
    /// Cumulative net soil CH4 exchange, outside the carbon balance.
    pub ch4_flux: f64,
    pub src: CarbonSources,
    pub snk: CarbonSinks,
}

impl CarbonState {
    pub fn new(n_layers: usize) -> Self {
        Self {
            plant: PlantPools::default(),
            gresp_storage: 0.0,
            gresp_transfer: 0.0,
            cpool: 0.0,
            soil: smallvec::smallvec![SoilCarbon::default(); n_layers],
            standing_dead: [0.0; N_LITTER],
            cutdown: [0.0; N_CUTDOWN],
            ch4_flux: 0.0,
            src: CarbonSources::default(),
            snk: CarbonSinks::default(),
        }
    }

    pub fn vegetation_total(&self) -> f64 {
        self.plant.total() + self.gresp_storage + self.gresp_transfer + self.cpool
    }

    pub fn soil_total(&self) -> f64 {
        self.soil.iter().map(SoilCarbon::total).sum()
    }

    pub fn storage_total(&self) -> f64 {
        self.vegetation_total()
            + self.soil_total()
            + self.standing_dead.iter().sum::<f64>()
            + self.cutdown.iter().sum::<f64>()
    }
}
