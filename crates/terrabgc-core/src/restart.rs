//! Flat restart vectors for the three conserved states.
//!
//! Each state is written field by field in declaration order, layer
//! arrays layer by layer. The layer count is not stored; the reader is
//! told how many layers to expect.

use serde::{Deserialize, Serialize};

use crate::error::{BgcError, BgcResult};
use crate::state::{
    CarbonState, NitrogenState, PlantPools, SubPool, Tissue, WaterState, N_CUTDOWN, N_LITTER,
    N_SOM,
};

const PLANT_LEN: usize = Tissue::COUNT * 3;

/// Conversion between a state and its flat restart vector.
pub trait RestartState: Sized {
    fn to_vec(&self) -> Vec<f64>;

    fn from_slice(data: &[f64], n_layers: usize) -> BgcResult<Self>;

    fn array_len(&self) -> usize;
}

/// Everything needed to continue a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartData {
    pub n_layers: usize,
    pub water: Vec<f64>,
    pub carbon: Vec<f64>,
    pub nitrogen: Vec<f64>,
}

impl RestartData {
    pub fn from_json_str(s: &str) -> BgcResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> BgcResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn check_len(name: &str, data: &[f64], expected: usize) -> BgcResult<()> {
    if data.len() != expected {
        return Err(BgcError::invalid_param(
            name,
            data.len() as f64,
            format!("expected {expected} restart values"),
        ));
    }
    Ok(())
}

struct Reader<'a> {
    data: &'a [f64],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [f64]) -> Self {
        Self { data, pos: 0 }
    }

    fn next(&mut self) -> f64 {
        let v = self.data[self.pos];
        self.pos += 1;
        v
    }

    fn fill(&mut self, out: &mut [f64]) {
        out.copy_from_slice(&self.data[self.pos..self.pos + out.len()]);
        self.pos += out.len();
    }
}

fn write_plant(out: &mut Vec<f64>, plant: &PlantPools) {
    for (_, p) in plant.iter() {
        out.extend(SubPool::ALL.iter().map(|&s| p.get(s)));
    }
}

fn read_plant(r: &mut Reader<'_>, plant: &mut PlantPools) {
    for (_, p) in plant.iter_mut() {
        for s in SubPool::ALL {
            *p.get_mut(s) = r.next();
        }
    }
}

impl RestartState for WaterState {
    fn to_vec(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.array_len());
        v.extend_from_slice(&self.soilw);
        v.extend([self.snoww, self.canopyw, self.pondw]);
        let (src, snk) = (&self.src, &self.snk);
        v.extend([src.precipitation, src.groundwater, src.boundary]);
        v.extend([
            snk.soil_evaporation,
            snk.snow_sublimation,
            snk.canopy_evaporation,
            snk.pond_evaporation,
            snk.transpiration,
            snk.runoff,
            snk.deep_percolation,
        ]);
        v
    }

    fn from_slice(data: &[f64], n_layers: usize) -> BgcResult<Self> {
        check_len("restart.water", data, n_layers + 13)?;
        let mut ws = WaterState::new(n_layers);
        let mut r = Reader::new(data);
        r.fill(&mut ws.soilw);
        ws.snoww = r.next();
        ws.canopyw = r.next();
        ws.pondw = r.next();
        ws.src.precipitation = r.next();
        ws.src.groundwater = r.next();
        ws.src.boundary = r.next();
        let snk = &mut ws.snk;
        snk.soil_evaporation = r.next();
        snk.snow_sublimation = r.next();
        snk.canopy_evaporation = r.next();
        snk.pond_evaporation = r.next();
        snk.transpiration = r.next();
        snk.runoff = r.next();
        snk.deep_percolation = r.next();
        Ok(ws)
    }

    fn array_len(&self) -> usize {
        self.soilw.len() + 13
    }
}

const CARBON_LAYER: usize = N_LITTER + 1 + N_SOM + 1;
const CARBON_FIXED: usize = PLANT_LEN + 3 + N_LITTER + N_CUTDOWN + 1 + 3 + 6;

impl RestartState for CarbonState {
    fn to_vec(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.array_len());
        write_plant(&mut v, &self.plant);
        v.extend([self.gresp_storage, self.gresp_transfer, self.cpool]);
        for s in &self.soil {
            v.extend_from_slice(&s.litter);
            v.push(s.cwd);
            v.extend_from_slice(&s.som);
            v.push(s.doc);
        }
        v.extend_from_slice(&self.standing_dead);
        v.extend_from_slice(&self.cutdown);
        v.push(self.ch4_flux);
        let (src, snk) = (&self.src, &self.snk);
        v.extend([src.photosynthesis, src.planting, src.fertilizer]);
        v.extend([
            snk.maintenance_resp,
            snk.growth_resp,
            snk.heterotrophic_resp,
            snk.fire,
            snk.export,
            snk.leaching,
        ]);
        v
    }

    fn from_slice(data: &[f64], n_layers: usize) -> BgcResult<Self> {
        check_len("restart.carbon", data, CARBON_FIXED + CARBON_LAYER * n_layers)?;
        let mut cs = CarbonState::new(n_layers);
        let mut r = Reader::new(data);
        read_plant(&mut r, &mut cs.plant);
        cs.gresp_storage = r.next();
        cs.gresp_transfer = r.next();
        cs.cpool = r.next();
        for s in cs.soil.iter_mut() {
            r.fill(&mut s.litter);
            s.cwd = r.next();
            r.fill(&mut s.som);
            s.doc = r.next();
        }
        r.fill(&mut cs.standing_dead);
        r.fill(&mut cs.cutdown);
        cs.ch4_flux = r.next();
        cs.src.photosynthesis = r.next();
        cs.src.planting = r.next();
        cs.src.fertilizer = r.next();
        let snk = &mut cs.snk;
        snk.maintenance_resp = r.next();
        snk.growth_resp = r.next();
        snk.heterotrophic_resp = r.next();
        snk.fire = r.next();
        snk.export = r.next();
        snk.leaching = r.next();
        Ok(cs)
    }

    fn array_len(&self) -> usize {
        CARBON_FIXED + CARBON_LAYER * self.soil.len()
    }
}

const NITROGEN_LAYER: usize = N_LITTER + 1 + N_SOM + 3;
const NITROGEN_FIXED: usize = PLANT_LEN + 2 + N_LITTER + N_CUTDOWN + 4 + 7;

impl RestartState for NitrogenState {
    fn to_vec(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.array_len());
        write_plant(&mut v, &self.plant);
        v.extend([self.npool, self.retransn]);
        for s in &self.soil {
            v.extend_from_slice(&s.litter);
            v.push(s.cwd);
            v.extend_from_slice(&s.som);
            v.extend([s.don, s.nh4, s.no3]);
        }
        v.extend_from_slice(&self.standing_dead);
        v.extend_from_slice(&self.cutdown);
        let (src, snk) = (&self.src, &self.snk);
        v.extend([src.deposition, src.fixation, src.fertilizer, src.planting]);
        v.extend([
            snk.volatilization,
            snk.nitrif_n2o,
            snk.denitrification,
            snk.leaching,
            snk.fire,
            snk.export,
            snk.precision,
        ]);
        v
    }

    fn from_slice(data: &[f64], n_layers: usize) -> BgcResult<Self> {
        check_len("restart.nitrogen", data, NITROGEN_FIXED + NITROGEN_LAYER * n_layers)?;
        let mut ns = NitrogenState::new(n_layers);
        let mut r = Reader::new(data);
        read_plant(&mut r, &mut ns.plant);
        ns.npool = r.next();
        ns.retransn = r.next();
        for s in ns.soil.iter_mut() {
            r.fill(&mut s.litter);
            s.cwd = r.next();
            r.fill(&mut s.som);
            s.don = r.next();
            s.nh4 = r.next();
            s.no3 = r.next();
        }
        r.fill(&mut ns.standing_dead);
        r.fill(&mut ns.cutdown);
        ns.src.deposition = r.next();
        ns.src.fixation = r.next();
        ns.src.fertilizer = r.next();
        ns.src.planting = r.next();
        let snk = &mut ns.snk;
        snk.volatilization = r.next();
        snk.nitrif_n2o = r.next();
        snk.denitrification = r.next();
        snk.leaching = r.next();
        snk.fire = r.next();
        snk.export = r.next();
        snk.precision = r.next();
        Ok(ns)
    }

    fn array_len(&self) -> usize {
        NITROGEN_FIXED + NITROGEN_LAYER * self.soil.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_length_matches_layout() {
        let cs = CarbonState::new(3);
        assert_eq!(cs.to_vec().len(), cs.array_len());
        let ns = NitrogenState::new(5);
        assert_eq!(ns.to_vec().len(), ns.array_len());
        let ws = WaterState::new(2);
        assert_eq!(ws.to_vec().len(), 15);
    }

    #[test]
    fn state_survives_a_restart() {
        let mut ns = NitrogenState::new(2);
        ns.plant[Tissue::Deadcroot].transfer = 0.003;
        ns.soil[1].no3 = 0.0021;
        ns.soil[0].don = 1e-5;
        ns.cutdown[4] = 0.2;
        ns.snk.precision = -3e-9;
        let back = NitrogenState::from_slice(&ns.to_vec(), 2).unwrap();
        assert_eq!(back, ns);

        let mut ws = WaterState::new(3);
        ws.soilw[2] = 88.0;
        ws.snk.deep_percolation = 412.5;
        assert_eq!(WaterState::from_slice(&ws.to_vec(), 3).unwrap(), ws);
    }

    #[test]
    fn wrong_layer_count_is_rejected() {
        let cs = CarbonState::new(4);
        let err = CarbonState::from_slice(&cs.to_vec(), 3).unwrap_err();
        assert!(matches!(err, BgcError::InvalidParameter { .. }));
    }
}
