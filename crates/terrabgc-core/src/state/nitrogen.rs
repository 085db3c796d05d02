use super::{PlantPools, N_CUTDOWN, N_LITTER, N_SOM};
use crate::layers::LayerArray;

/// Nitrogen held in one soil layer (kgN/m2).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoilNitrogen {
    pub litter: [f64; N_LITTER],
    pub cwd: f64,
    pub som: [f64; N_SOM],
    pub don: f64,
    pub nh4: f64,
    pub no3: f64,
}

impl SoilNitrogen {
    pub fn organic(&self) -> f64 {
        self.litter.iter().sum::<f64>() + self.cwd + self.som.iter().sum::<f64>() + self.don
    }

    pub fn mineral(&self) -> f64 {
        self.nh4 + self.no3
    }

    pub fn total(&self) -> f64 {
        self.organic() + self.mineral()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NitrogenSources {
    pub deposition: f64,
    pub fixation: f64,
    pub fertilizer: f64,
    pub planting: f64,
}

impl NitrogenSources {
    pub fn total(&self) -> f64 {
        self.deposition + self.fixation + self.fertilizer + self.planting
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NitrogenSinks {
    pub volatilization: f64,
    pub nitrif_n2o: f64,
    pub denitrification: f64,
    pub leaching: f64,
    pub fire: f64,
    pub export: f64,
    /// Net N removed by C:N repair; negative when N was added.
    pub precision: f64,
}

impl NitrogenSinks {
    pub fn total(&self) -> f64 {
        self.volatilization
            + self.nitrif_n2o
            + self.denitrification
            + self.leaching
            + self.fire
            + self.export
            + self.precision
    }
}

/// All nitrogen pools of the column (kgN/m2).
#[derive(Debug, Clone, PartialEq)]
pub struct NitrogenState {
    pub plant: PlantPools,
    /// Non-structural pool receiving uptake before allocation.
    pub npool: f64,
    pub retransn: f64,
    pub soil: LayerArray<SoilNitrogen>,
    pub standing_dead: [f64; N_LITTER],
    pub cutdown: [f64; N_CUTDOWN],
    pub src: NitrogenSources,
    pub snk: NitrogenSinks,
}

impl NitrogenState {
    pub fn new(n_layers: usize) -> Self {
        Self {
            plant: PlantPools::default(),
            npool: 0.0,
            retransn: 0.0,
            soil: smallvec::smallvec![SoilNitrogen::default(); n_layers],
            standing_dead: [0.0; N_LITTER],
            cutdown: [0.0; N_CUTDOWN],
            src: NitrogenSources::default(),
            snk: NitrogenSinks::default(),
        }
    }

    pub fn vegetation_total(&self) -> f64 {
        self.plant.total() + self.npool + self.retransn
    }

    pub fn soil_total(&self) -> f64 {
        self.soil.iter().map(SoilNitrogen::total).sum()
    }

    pub fn mineral_total(&self) -> f64 {
        self.soil.iter().map(SoilNitrogen::mineral).sum()
    }

    pub fn storage_total(&self) -> f64 {
        self.vegetation_total()
            + self.soil_total()
            + self.standing_dead.iter().sum::<f64>()
            + self.cutdown.iter().sum::<f64>()
    }
}
