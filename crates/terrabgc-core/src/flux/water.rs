use crate::layers::{self, LayerVec};

/// Daily water fluxes (kg/m2/day).
#[derive(Debug, Clone, PartialEq)]
pub struct WaterFlux {
    pub prcp_to_canopyw: f64,
    pub prcp_to_soilw: f64,
    pub prcp_to_snoww: f64,
    pub canopyw_evap: f64,
    /// Canopy store dropped to the ground when no leaves remain.
    pub canopyw_to_soilw: f64,
    pub snoww_to_soilw: f64,
    pub snoww_subl: f64,
    /// Surface runoff of rain and melt before infiltration.
    pub prcp_to_runoff: f64,
    pub pondw_evap: f64,
    pub pondw_to_soilw: f64,
    pub soilw_to_pondw: f64,
    pub pondw_to_runoff: f64,
    pub soilw_evap: f64,
    /// Potential bare-soil evaporation, before soil limitation.
    pub pot_evap: f64,
    /// Potential transpiration from the canopy energy balance.
    pub pot_trans: f64,
    pub soilw_trans: LayerVec,
    /// Gravitational drainage out of the bottom of each layer.
    pub soilw_percolation: LayerVec,
    /// Diffusive exchange between layer `l` and `l + 1`, positive downward.
    pub soilw_diffusion: LayerVec,
    pub soilw_from_groundwater: LayerVec,
    /// Water added to hold the bottom layer at field capacity. Drainage
    /// down to field capacity is booked as bottom-layer percolation.
    pub soilw_from_boundary: f64,
}

impl WaterFlux {
    pub fn new(n_layers: usize) -> Self {
        Self {
            prcp_to_canopyw: 0.0,
            prcp_to_soilw: 0.0,
            prcp_to_snoww: 0.0,
            canopyw_evap: 0.0,
            canopyw_to_soilw: 0.0,
            snoww_to_soilw: 0.0,
            snoww_subl: 0.0,
            prcp_to_runoff: 0.0,
            pondw_evap: 0.0,
            pondw_to_soilw: 0.0,
            soilw_to_pondw: 0.0,
            pondw_to_runoff: 0.0,
            soilw_evap: 0.0,
            pot_evap: 0.0,
            pot_trans: 0.0,
            soilw_trans: layers::zeros(n_layers),
            soilw_percolation: layers::zeros(n_layers),
            soilw_diffusion: layers::zeros(n_layers),
            soilw_from_groundwater: layers::zeros(n_layers),
            soilw_from_boundary: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.soilw_trans.len());
    }

    pub fn n_layers(&self) -> usize {
        self.soilw_trans.len()
    }

    /// Water entering the top layer from the surface.
    pub fn infiltration(&self) -> f64 {
        self.prcp_to_soilw + self.snoww_to_soilw + self.canopyw_to_soilw - self.prcp_to_runoff
            + self.pondw_to_soilw
    }

    pub fn transpiration(&self) -> f64 {
        layers::sum(&self.soilw_trans)
    }

    /// Water leaving the bottom of the column.
    pub fn deep_percolation(&self) -> f64 {
        let last = self.n_layers() - 1;
        self.soilw_percolation[last] + self.soilw_diffusion[last].max(0.0)
    }
}
