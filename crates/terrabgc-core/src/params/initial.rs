//! Starting pools of a fresh run.

use serde::{Deserialize, Serialize};

use super::{check_range, EcophysConstants, SoilProfile};
use crate::decomp::SOM_CN;
use crate::error::BgcResult;
use crate::state::{CarbonState, NitrogenState, Tissue, WaterState, N_LITTER, N_SOM};

/// Depth (m) over which initial SOM and mineral N decay by 1/e.
const SOIL_PROFILE_DEPTH: f64 = 0.3;

/// Initial carbon stocks (kgC/m2) and soil moisture.
///
/// Leaf and fine-root carbon of deciduous plants starts in storage so the
/// first onset displays it; evergreen plants start with it displayed.
/// Nitrogen follows from the tissue, litter and SOM C:N ratios. Soil
/// stocks are column totals spread over layers with depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    pub leafc: f64,
    pub frootc: f64,
    pub livestemc: f64,
    pub deadstemc: f64,
    pub livecrootc: f64,
    pub deadcrootc: f64,
    /// Surface litter by quality class.
    pub litter_c: [f64; N_LITTER],
    pub cwdc: f64,
    pub som_c: [f64; N_SOM],
    pub nh4: f64,
    pub no3: f64,
    /// Soil water as a fraction of field capacity.
    pub soilw_fc_fraction: f64,
    pub snoww: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            leafc: 0.2,
            frootc: 0.2,
            livestemc: 1.0,
            deadstemc: 8.0,
            livecrootc: 0.3,
            deadcrootc: 2.5,
            litter_c: [0.02, 0.1, 0.05, 0.08],
            cwdc: 1.0,
            som_c: [0.01, 0.5, 4.0, 8.0],
            nh4: 0.002,
            no3: 0.002,
            soilw_fc_fraction: 1.0,
            snoww: 0.0,
        }
    }
}

impl InitialConditions {
    pub fn validate(&self) -> BgcResult<()> {
        let plant = [
            ("initial.leafc", self.leafc),
            ("initial.frootc", self.frootc),
            ("initial.livestemc", self.livestemc),
            ("initial.deadstemc", self.deadstemc),
            ("initial.livecrootc", self.livecrootc),
            ("initial.deadcrootc", self.deadcrootc),
            ("initial.cwdc", self.cwdc),
            ("initial.nh4", self.nh4),
            ("initial.no3", self.no3),
            ("initial.snoww", self.snoww),
        ];
        for (name, v) in plant {
            check_range(name, v, 0.0, f64::MAX)?;
        }
        for v in self.litter_c.iter().chain(&self.som_c) {
            check_range("initial.soil_c", *v, 0.0, f64::MAX)?;
        }
        check_range("initial.soilw_fc_fraction", self.soilw_fc_fraction, 0.0, 1.0)
    }

    /// Build the three conserved states on `soil`.
    pub fn states(
        &self,
        soil: &SoilProfile,
        epc: &EcophysConstants,
    ) -> (WaterState, CarbonState, NitrogenState) {
        let n = soil.n_layers();
        let mut ws = WaterState::new(n);
        let mut cs = CarbonState::new(n);
        let mut ns = NitrogenState::new(n);

        for (w, layer) in ws.soilw.iter_mut().zip(&soil.layers) {
            *w = layer.wp_water() + self.soilw_fc_fraction * (layer.fc_water() - layer.wp_water());
        }
        ws.snoww = self.snoww;

        let green = [(Tissue::Leaf, self.leafc), (Tissue::Froot, self.frootc)];
        for (t, c) in green {
            if epc.is_evergreen() {
                cs.plant[t].active = c;
            } else {
                cs.plant[t].storage = c;
            }
        }
        if epc.is_woody() {
            cs.plant[Tissue::Livestem].active = self.livestemc;
            cs.plant[Tissue::Deadstem].active = self.deadstemc;
            cs.plant[Tissue::Livecroot].active = self.livecrootc;
            cs.plant[Tissue::Deadcroot].active = self.deadcrootc;
        }
        for ((t, c), (_, n)) in cs.plant.iter().zip(ns.plant.iter_mut()) {
            let cn = epc.tissue_cn(t);
            n.active = c.active / cn;
            n.storage = c.storage / cn;
            n.transfer = c.transfer / cn;
        }

        cs.soil[0].litter = self.litter_c;
        cs.soil[0].cwd = self.cwdc;
        for k in 0..N_LITTER {
            ns.soil[0].litter[k] = self.litter_c[k] / epc.leaflitr_cn;
        }
        ns.soil[0].cwd = self.cwdc / epc.deadwood_cn;

        let weights: Vec<f64> = soil
            .layers
            .iter()
            .map(|l| l.thickness * (-l.depth_mid / SOIL_PROFILE_DEPTH).exp())
            .collect();
        let total: f64 = weights.iter().sum();
        for (l, w) in weights.iter().enumerate() {
            let share = w / total;
            for k in 0..N_SOM {
                cs.soil[l].som[k] = self.som_c[k] * share;
                ns.soil[l].som[k] = self.som_c[k] * share / SOM_CN[k];
            }
            ns.soil[l].nh4 = self.nh4 * share;
            ns.soil[l].no3 = self.no3 * share;
        }
        (ws, cs, ns)
    }
}
