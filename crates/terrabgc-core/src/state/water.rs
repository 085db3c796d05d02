use crate::layers::{self, LayerVec};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaterSources {
    pub precipitation: f64,
    pub groundwater: f64,
    /// Water added to hold the bottom layer at field capacity.
    pub boundary: f64,
}

impl WaterSources {
    pub fn total(&self) -> f64 {
        self.precipitation + self.groundwater + self.boundary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaterSinks {
    pub soil_evaporation: f64,
    pub snow_sublimation: f64,
    pub canopy_evaporation: f64,
    pub pond_evaporation: f64,
    pub transpiration: f64,
    pub runoff: f64,
    pub deep_percolation: f64,
}

impl WaterSinks {
    pub fn total(&self) -> f64 {
        self.soil_evaporation
            + self.snow_sublimation
            + self.canopy_evaporation
            + self.pond_evaporation
            + self.transpiration
            + self.runoff
            + self.deep_percolation
    }
}

/// Water stores (kg/m2) and cumulative boundary counters.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterState {
    pub soilw: LayerVec,
    pub snoww: f64,
    pub canopyw: f64,
    pub pondw: f64,
    pub src: WaterSources,
    pub snk: WaterSinks,
}

impl WaterState {
    pub fn new(n_layers: usize) -> Self {
        Self {
            soilw: layers::zeros(n_layers),
            snoww: 0.0,
            canopyw: 0.0,
            pondw: 0.0,
            src: WaterSources::default(),
            snk: WaterSinks::default(),
        }
    }

    pub fn storage_total(&self) -> f64 {
        layers::sum(&self.soilw) + self.snoww + self.canopyw + self.pondw
    }
}
