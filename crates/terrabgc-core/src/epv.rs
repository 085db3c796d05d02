//! Derived, non-conserved ecophysiological variables.
//!
//! Rebuilt or advanced every day by the process modules. Unlike the flux
//! aggregates they are not reset, so values such as days since rain and
//! the root profile carry over.

use crate::layers::{self, LayerVec};

#[derive(Debug, Clone, PartialEq)]
pub struct EcophysVariables {
    pub proj_lai: f64,
    pub all_lai: f64,
    pub plaisun: f64,
    pub plaishade: f64,
    pub sun_proj_sla: f64,
    pub shade_proj_sla: f64,

    pub swabs: f64,
    /// Shortwave reaching the ground below the canopy (W/m2).
    pub swtrans: f64,
    pub swabs_per_plaisun: f64,
    pub swabs_per_plaishade: f64,
    pub parabs: f64,
    pub ppfd_per_plaisun: f64,
    pub ppfd_per_plaishade: f64,

    pub m_ppfd_sun: f64,
    pub m_ppfd_shade: f64,
    pub m_soilstress: f64,
    pub m_tmin: f64,
    pub m_vpd: f64,
    pub m_final_sun: f64,
    pub m_final_shade: f64,
    /// Leaf-scale conductances (m/s).
    pub gl_bl: f64,
    pub gl_s_sun: f64,
    pub gl_s_shade: f64,
    pub gl_t_wv_sun: f64,
    pub gl_t_wv_shade: f64,
    pub gl_e_wv: f64,
    pub gl_sh: f64,

    /// Daytime leaf maintenance respiration per projected leaf area (umol/m2/s).
    pub dlmr_area_sun: f64,
    pub dlmr_area_shade: f64,
    /// Net assimilation per projected leaf area (umol/m2/s).
    pub assim_sun: f64,
    pub assim_shade: f64,

    pub rooting_depth: f64,
    pub n_rootlayers: usize,
    pub rootlength_prop: LayerVec,

    pub tsoil: LayerVec,
    pub vwc: LayerVec,
    pub psi: LayerVec,
    pub wfps: LayerVec,
    pub conductivity: LayerVec,
    pub diffusivity: LayerVec,
    /// Per-layer soil water stress, 1 meaning unstressed.
    pub soil_stress: LayerVec,

    pub decomp_tscalar: LayerVec,
    pub decomp_wscalar: LayerVec,
    pub decomp_depth_scalar: LayerVec,

    /// Days since the soil surface was last wetted.
    pub days_since_rain: f64,
    pub phase: usize,
    /// Share of today's new growth displayed immediately.
    pub pnow: f64,
    pub richards_substeps: usize,
}

impl EcophysVariables {
    pub fn new(n_layers: usize) -> Self {
        Self {
            proj_lai: 0.0,
            all_lai: 0.0,
            plaisun: 0.0,
            plaishade: 0.0,
            sun_proj_sla: 0.0,
            shade_proj_sla: 0.0,
            swabs: 0.0,
            swtrans: 0.0,
            swabs_per_plaisun: 0.0,
            swabs_per_plaishade: 0.0,
            parabs: 0.0,
            ppfd_per_plaisun: 0.0,
            ppfd_per_plaishade: 0.0,
            m_ppfd_sun: 0.0,
            m_ppfd_shade: 0.0,
            m_soilstress: 1.0,
            m_tmin: 1.0,
            m_vpd: 1.0,
            m_final_sun: 0.0,
            m_final_shade: 0.0,
            gl_bl: 0.0,
            gl_s_sun: 0.0,
            gl_s_shade: 0.0,
            gl_t_wv_sun: 0.0,
            gl_t_wv_shade: 0.0,
            gl_e_wv: 0.0,
            gl_sh: 0.0,
            dlmr_area_sun: 0.0,
            dlmr_area_shade: 0.0,
            assim_sun: 0.0,
            assim_shade: 0.0,
            rooting_depth: 0.0,
            n_rootlayers: 0,
            rootlength_prop: layers::zeros(n_layers),
            tsoil: layers::zeros(n_layers),
            vwc: layers::zeros(n_layers),
            psi: layers::zeros(n_layers),
            wfps: layers::zeros(n_layers),
            conductivity: layers::zeros(n_layers),
            diffusivity: layers::zeros(n_layers),
            soil_stress: smallvec::smallvec![1.0; n_layers],
            decomp_tscalar: layers::zeros(n_layers),
            decomp_wscalar: layers::zeros(n_layers),
            decomp_depth_scalar: layers::zeros(n_layers),
            days_since_rain: 0.0,
            phase: 0,
            pnow: 0.0,
            richards_substeps: 0,
        }
    }

    pub fn n_layers(&self) -> usize {
        self.vwc.len()
    }

    /// Root-weighted soil temperature (C).
    pub fn root_zone_tsoil(&self) -> f64 {
        self.rootlength_prop
            .iter()
            .zip(&self.tsoil)
            .map(|(w, t)| w * t)
            .sum()
    }
}
