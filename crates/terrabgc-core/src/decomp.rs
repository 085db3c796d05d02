//! Litter and soil organic matter decomposition.
//!
//! Each layer runs a one-way cascade: labile litter to S1, unshielded
//! cellulose to S2, shielded cellulose to unshielded cellulose, lignin to
//! S3, then S1 to S2 to S3 to S4, with S4 fully respired. Potential losses
//! and mineral N fluxes are staged per pathway and only realized once
//! allocation has arbitrated nitrogen between plants and microbes.

use crate::epv::EcophysVariables;
use crate::flux::{CarbonFlux, DecompCarbon, DecompNitrogen};
use crate::params::{EcophysConstants, SoilBgcParams, SoilLayer, SoilProfile};
use crate::state::{SoilCarbon, SoilNitrogen, N_LITTER};

pub const N_PATHWAYS: usize = 8;

/// C:N ratios of the four SOM pools.
pub const SOM_CN: [f64; 4] = [12.0, 12.0, 10.0, 10.0];

/// Lloyd-Taylor temperature response is zero below this soil temperature (C).
const TSOIL_MIN: f64 = -10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pathway {
    L1S1,
    L2S2,
    L3L2,
    L4S3,
    S1S2,
    S2S3,
    S3S4,
    S4,
}

/// A decomposing or receiving pool within one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomPool {
    Litter(usize),
    Som(usize),
}

impl Pathway {
    pub const ALL: [Pathway; N_PATHWAYS] = [
        Pathway::L1S1,
        Pathway::L2S2,
        Pathway::L3L2,
        Pathway::L4S3,
        Pathway::S1S2,
        Pathway::S2S3,
        Pathway::S3S4,
        Pathway::S4,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Base decay rate at optimal conditions (1/day).
    pub fn base_rate(self) -> f64 {
        match self {
            Pathway::L1S1 => 0.7,
            Pathway::L2S2 => 0.07,
            Pathway::L3L2 | Pathway::L4S3 => 0.014,
            Pathway::S1S2 => 0.07,
            Pathway::S2S3 => 0.014,
            Pathway::S3S4 => 0.0014,
            Pathway::S4 => 0.0001,
        }
    }

    /// Share of the carbon loss respired as CO2.
    pub fn respired_fraction(self) -> f64 {
        match self {
            Pathway::L1S1 => 0.39,
            Pathway::L2S2 => 0.55,
            Pathway::L3L2 => 0.0,
            Pathway::L4S3 => 0.29,
            Pathway::S1S2 => 0.28,
            Pathway::S2S3 => 0.46,
            Pathway::S3S4 => 0.55,
            Pathway::S4 => 1.0,
        }
    }

    pub fn source(self) -> DomPool {
        match self {
            Pathway::L1S1 => DomPool::Litter(0),
            Pathway::L2S2 => DomPool::Litter(1),
            Pathway::L3L2 => DomPool::Litter(2),
            Pathway::L4S3 => DomPool::Litter(3),
            Pathway::S1S2 => DomPool::Som(0),
            Pathway::S2S3 => DomPool::Som(1),
            Pathway::S3S4 => DomPool::Som(2),
            Pathway::S4 => DomPool::Som(3),
        }
    }

    pub fn target(self) -> Option<DomPool> {
        match self {
            Pathway::L1S1 => Some(DomPool::Som(0)),
            Pathway::L2S2 => Some(DomPool::Som(1)),
            Pathway::L3L2 => Some(DomPool::Litter(1)),
            Pathway::L4S3 => Some(DomPool::Som(2)),
            Pathway::S1S2 => Some(DomPool::Som(1)),
            Pathway::S2S3 => Some(DomPool::Som(2)),
            Pathway::S3S4 => Some(DomPool::Som(3)),
            Pathway::S4 => None,
        }
    }

    /// Litter to SOM transfers shed part of their product as DOC/DON.
    pub fn releases_dom(self) -> bool {
        matches!(self, Pathway::L1S1 | Pathway::L2S2 | Pathway::L4S3)
    }
}

fn pool_value(pool: DomPool, litter: &[f64; N_LITTER], som: &[f64; 4]) -> f64 {
    match pool {
        DomPool::Litter(i) => litter[i],
        DomPool::Som(i) => som[i],
    }
}

/// Staged decomposition of one layer, before N competition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecompPotential {
    /// Potential carbon loss per pathway (kgC/m2/day).
    pub ploss: [f64; N_PATHWAYS],
    /// Potential mineral N flux per pathway; positive immobilizes.
    pub pmnf: [f64; N_PATHWAYS],
    /// Source N:C ratio per pathway.
    pub nc_src: [f64; N_PATHWAYS],
    pub cwd_frag: f64,
    pub cwd_nc: f64,
    pub doc_decay: f64,
    pub don_decay: f64,
}

impl DecompPotential {
    /// Mineral N microbes would take up at potential rates.
    pub fn immobilization_demand(&self) -> f64 {
        self.pmnf.iter().filter(|&&m| m > 0.0).sum()
    }

    /// Mineral N released at potential rates, DON mineralization included.
    pub fn mineralization(&self) -> f64 {
        -self.pmnf.iter().filter(|&&m| m < 0.0).sum::<f64>() + self.don_decay
    }
}

/// Lloyd-Taylor temperature response normalized to one at 25 C.
pub fn temperature_scalar(tsoil: f64) -> f64 {
    if tsoil < TSOIL_MIN {
        return 0.0;
    }
    (308.56 * (1.0 / 71.02 - 1.0 / (tsoil + 46.02)))
        .exp()
        .clamp(0.0, 1.0)
}

/// Moisture response: ramps from wilting point to field capacity, then
/// declines toward `wet_floor` at saturation.
pub fn moisture_scalar(vwc: f64, layer: &SoilLayer, wet_floor: f64) -> f64 {
    if vwc <= layer.vwc_wp {
        0.0
    } else if vwc < layer.vwc_fc {
        (vwc - layer.vwc_wp) / (layer.vwc_fc - layer.vwc_wp)
    } else if vwc < layer.vwc_sat {
        let wet = (vwc - layer.vwc_fc) / (layer.vwc_sat - layer.vwc_fc);
        1.0 - (1.0 - wet_floor) * wet
    } else {
        wet_floor
    }
}

pub fn depth_scalar(depth_mid: f64, coeff: f64) -> f64 {
    (-coeff * depth_mid).exp().clamp(0.0, 1.0)
}

/// Refresh the three rate scalars of every layer from soil temperature and
/// moisture.
pub fn decomp_scalars(soil: &SoilProfile, epv: &mut EcophysVariables) {
    for (l, layer) in soil.layers.iter().enumerate() {
        epv.decomp_tscalar[l] = temperature_scalar(epv.tsoil[l]);
        epv.decomp_wscalar[l] = moisture_scalar(epv.vwc[l], layer, soil.bgc.decomp_wet_floor);
        epv.decomp_depth_scalar[l] = depth_scalar(layer.depth_mid, soil.bgc.decomp_depth_coeff);
    }
}

fn ratio(n: f64, c: f64) -> f64 {
    if c > 0.0 {
        n / c
    } else {
        0.0
    }
}

/// Potential decomposition of one layer at environmental rate scalar `scalar`.
pub fn decomp_potential(
    sc: &SoilCarbon,
    sn: &SoilNitrogen,
    scalar: f64,
    bgc: &SoilBgcParams,
) -> DecompPotential {
    let mut p = DecompPotential::default();
    for pw in Pathway::ALL {
        let i = pw.index();
        let src_c = pool_value(pw.source(), &sc.litter, &sc.som);
        let src_n = pool_value(pw.source(), &sn.litter, &sn.som);
        if src_c <= 0.0 {
            continue;
        }
        let nc = ratio(src_n, src_c);
        let ploss = (pw.base_rate() * scalar * src_c).min(src_c);
        p.ploss[i] = ploss;
        p.nc_src[i] = nc;
        p.pmnf[i] = match pw.target() {
            Some(DomPool::Som(t)) => {
                (1.0 - pw.respired_fraction()) * ploss / SOM_CN[t] - ploss * nc
            }
            Some(DomPool::Litter(_)) => 0.0,
            None => -ploss * nc,
        };
    }

    let frag_rate = (bgc.kfrag * scalar).min(1.0);
    p.cwd_frag = frag_rate * sc.cwd;
    p.cwd_nc = ratio(sn.cwd, sc.cwd);

    let dom_rate = (Pathway::S1S2.base_rate() * scalar).min(1.0);
    p.doc_decay = dom_rate * sc.doc;
    p.don_decay = dom_rate * sn.don;
    p
}

/// Stage potential decomposition for every layer.
pub fn decomp(
    soilc: &[SoilCarbon],
    soiln: &[SoilNitrogen],
    soil: &SoilProfile,
    epv: &EcophysVariables,
    potentials: &mut [DecompPotential],
) {
    for l in 0..soil.n_layers() {
        let scalar = epv.decomp_tscalar[l] * epv.decomp_wscalar[l] * epv.decomp_depth_scalar[l];
        potentials[l] = decomp_potential(&soilc[l], &soiln[l], scalar, &soil.bgc);
    }
}

/// Turn staged potentials into realized flows, scaling immobilizing
/// pathways by `fpi`, the fraction of their N demand that was met.
pub fn realize(
    p: &DecompPotential,
    fpi: f64,
    epc: &EcophysConstants,
    bgc: &SoilBgcParams,
) -> (DecompCarbon, DecompNitrogen) {
    let mut c = DecompCarbon::default();
    let mut n = DecompNitrogen::default();
    for pw in Pathway::ALL {
        let i = pw.index();
        let scale = if p.pmnf[i] > 0.0 { fpi } else { 1.0 };
        let loss = p.ploss[i] * scale;
        let mineral = p.pmnf[i] * scale;
        let hr = loss * pw.respired_fraction();
        let product = loss - hr;
        let to_doc = if pw.releases_dom() { bgc.dom_share * product } else { 0.0 };

        c.loss[i] = loss;
        c.hr[i] = hr;
        c.to_doc[i] = to_doc;
        c.transfer[i] = product - to_doc;

        let loss_n = loss * p.nc_src[i];
        let product_n = (loss_n + mineral).max(0.0);
        let to_don = if pw.releases_dom() { bgc.dom_share * product_n } else { 0.0 };
        n.loss[i] = loss_n;
        n.mineral[i] = product_n - loss_n;
        n.to_don[i] = to_don;
        n.transfer[i] = product_n - to_don;
    }

    let wood = epc.deadwood_litter.partition().as_array();
    for (k, share) in wood.iter().enumerate() {
        c.cwd_to_litter[k] = p.cwd_frag * share;
        n.cwd_to_litter[k] = p.cwd_frag * p.cwd_nc * share;
    }
    c.doc_hr = p.doc_decay;
    n.don_mineralized = p.don_decay;
    (c, n)
}

/// Net CH4 exchange of the upper soil (kgC/m2/day, positive for emission).
///
/// Methanotrophic uptake dominates in aerated soil and falls with bulk
/// density; emission starts above a WFPS threshold.
pub fn ch4_flux(soil: &SoilProfile, epv: &EcophysVariables, cf: &mut CarbonFlux) {
    let params = &soil.bgc.ch4;
    let mut flux = 0.0;
    for (l, layer) in soil.layers.iter().enumerate() {
        if layer.depth_top >= params.depth {
            break;
        }
        let share = (params.depth.min(layer.depth_bottom) - layer.depth_top) / params.depth;
        let tcorr = params.q10.powf((epv.tsoil[l] - 20.0) / 10.0).min(params.q10);
        let wfps = epv.wfps[l].clamp(0.0, 1.0);
        let f = if wfps < params.emission_wfps {
            let bd = ((params.bd_max - layer.bulk_density) / (params.bd_max - params.bd_min))
                .clamp(0.0, 1.0);
            -params.uptake_max * bd * (1.0 - wfps) * tcorr
        } else {
            let wet = (wfps - params.emission_wfps) / (1.0 - params.emission_wfps).max(1e-9);
            params.emission_max * wet * tcorr
        };
        flux += f * share;
    }
    cf.ch4 = if epv.tsoil.first().is_some_and(|&t| t > 0.0) {
        flux
    } else {
        0.0
    };
}
