//! Farquhar-type leaf photosynthesis for C3 and C4 canopies.
//!
//! Both pathways solve a quadratic for the carboxylation-limited rate
//! (`av`) and one for the light-limited rate (`aj`). Net assimilation is
//! the smaller of the two and the intercellular CO2 follows from
//! `A = g (Ca - Ci)`.
//!
//! C3 leaves eliminate Ci inside the quadratics. C4 leaves use the
//! mesophyll/bundle-sheath model of von Caemmerer (2000) as applied by
//! Di Vittorio et al. (2010): PEP carboxylase pumps CO2 from the
//! mesophyll into the bundle sheath, part of it leaks back through the
//! bundle-sheath conductance, and Rubisco works on the enriched pool. The
//! mesophyll CO2 is then found by bisection on `A(Cm) = g (Ca - Cm)`.

use crate::constants::{O2_FRACTION, R_GAS, TK_OFFSET, UMOL_C_TO_KG};
use crate::epv::EcophysVariables;
use crate::error::{BgcError, BgcResult};
use crate::flux::CarbonFlux;
use crate::forcing::MetVariables;
use crate::params::{EcophysConstants, PhotosyntheticPathway};

/// Michaelis-Menten constant for CO2 at 25 C (ubar).
const KC25: f64 = 404.0;
/// Michaelis-Menten constant for O2 at 25 C (mbar).
const KO25: f64 = 248.0;
/// Rubisco specific activity at 25 C (umol/mg/min).
const ACT25: f64 = 3.6;
const Q10_KC: f64 = 2.1;
const Q10_KO: f64 = 1.2;
const Q10_ACT: f64 = 2.4;
/// Rubisco mass per unit Rubisco N (kg/kg).
const FNR: f64 = 7.16;
/// Jmax:Vmax ratio.
const JMAX_RATIO: f64 = 2.1;
/// Absorbed photons per electron transported.
const PPE: f64 = 2.6;
/// Ratio of maximum oxygenation to carboxylation.
const VO_VC: f64 = 0.21;

/// Bundle-sheath Rubisco constants at 25 C (Pa).
const KC25_C4: f64 = 65.0;
const KO25_C4: f64 = 45_000.0;
/// Half the reciprocal of Rubisco specificity.
const GAMMA_STAR_C4: f64 = 0.000_193;
/// PEP carboxylase Michaelis constant for CO2 at 25 C (Pa).
const KP25_C4: f64 = 8.0;
const Q10_KP: f64 = 2.0;
/// PEP carboxylase capacity per unit Rubisco capacity.
const VPMAX_RATIO: f64 = 2.0;
/// PEP regeneration limit (umol/m2/s).
const VPR_C4: f64 = 80.0;
/// Share of electron transport serving the C4 cycle.
const X_C4: f64 = 0.4;
/// Mesophyll share of day respiration.
const RM_SHARE: f64 = 0.5;
const BISECT_ITERS: usize = 200;

/// Inputs for one canopy fraction.
#[derive(Debug, Clone, Copy)]
pub struct PsnInput {
    pub pathway: PhotosyntheticPathway,
    /// Leaf temperature (C).
    pub t: f64,
    /// Atmospheric pressure (Pa).
    pub pa: f64,
    /// Atmospheric CO2 (ppm).
    pub co2: f64,
    /// Leaf N per unit projected area (kgN/m2).
    pub lnc: f64,
    pub flnr: f64,
    /// Absorbed PPFD per unit projected leaf area (umol/m2/s).
    pub ppfd: f64,
    /// Total leaf conductance to CO2 (umol/m2/s/Pa).
    pub g: f64,
    /// Daytime leaf maintenance respiration (umol/m2/s).
    pub rd: f64,
    /// Bundle-sheath conductance to CO2, C4 only (mol/m2/s).
    pub gbs: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PsnOutput {
    /// Carboxylation-limited net assimilation (umol/m2/s).
    pub av: f64,
    /// Light-limited net assimilation (umol/m2/s).
    pub aj: f64,
    /// Net assimilation, the smaller of the two.
    pub a: f64,
    /// Intercellular CO2 partial pressure (Pa).
    pub ci: f64,
    pub vmax: f64,
    pub jmax: f64,
    pub j: f64,
}

/// Smaller root of `a x^2 + b x + c = 0`.
fn lower_root(a: f64, b: f64, c: f64, routine: &'static str, what: &str) -> BgcResult<f64> {
    let det = b * b - 4.0 * a * c;
    if det < 0.0 || !det.is_finite() {
        return Err(BgcError::numerical(
            routine,
            format!("negative discriminant {det:e} in the {what} quadratic"),
        ));
    }
    // For a < 0 this is the smaller root; for a > 0 take the minus branch.
    if a < 0.0 {
        Ok((-b + det.sqrt()) / (2.0 * a))
    } else {
        Ok((-b - det.sqrt()) / (2.0 * a))
    }
}

fn q10_split(t: f64, q10: f64) -> f64 {
    if t > 15.0 {
        q10.powf((t - 25.0) / 10.0)
    } else {
        (1.8 * q10).powf((t - 15.0) / 10.0) / q10
    }
}

/// Potential electron transport (umol/m2/s):
/// 0.7 J^2 - (Jmax + I/ppe) J + Jmax I/ppe = 0.
fn electron_transport(jmax: f64, ppfd: f64) -> BgcResult<f64> {
    let pabs = ppfd / PPE;
    lower_root(0.7, -jmax - pabs, jmax * pabs, "photosynthesis", "electron transport")
}

/// Rubisco capacity from leaf N (umol/m2/s).
fn vmax(input: &PsnInput) -> f64 {
    let act = ACT25 * q10_split(input.t, Q10_ACT) * 1e6 / 60.0;
    input.lnc * input.flnr * FNR * act
}

pub fn photosynthesis(input: &PsnInput) -> BgcResult<PsnOutput> {
    if input.g <= 0.0 || !input.g.is_finite() {
        return Err(BgcError::numerical(
            "photosynthesis",
            format!("leaf conductance to CO2 must be positive, got {}", input.g),
        ));
    }
    match input.pathway {
        PhotosyntheticPathway::C3 => c3(input),
        PhotosyntheticPathway::C4 => c4(input),
    }
}

fn c3(input: &PsnInput) -> BgcResult<PsnOutput> {
    let PsnInput { t, pa, co2, g, rd, ppfd, .. } = *input;
    let ca = co2 * 1e-6 * pa;
    let o2 = O2_FRACTION * pa;

    let kc = KC25 * q10_split(t, Q10_KC) * 0.1;
    let ko = KO25 * Q10_KO.powf((t - 25.0) / 10.0) * 100.0;
    let gamma = 0.5 * VO_VC * kc * o2 / ko;
    let kc_eff = kc * (1.0 + o2 / ko);

    let vmax = vmax(input);
    let jmax = JMAX_RATIO * vmax;

    let j = electron_transport(jmax, ppfd)?;

    let a = -1.0 / g;
    let b = ca + (vmax - rd) / g + kc_eff;
    let c = vmax * (gamma - ca) + rd * (ca + kc_eff);
    let av = lower_root(a, b, c, "photosynthesis", "Rubisco-limited")?;

    let a = -4.5 / g;
    let b = 4.5 * ca + 10.5 * gamma + j / g - 4.5 * rd / g;
    let c = j * (gamma - ca) + rd * (4.5 * ca + 10.5 * gamma);
    let aj = lower_root(a, b, c, "photosynthesis", "RuBP-limited")?;

    let a = av.min(aj);
    Ok(PsnOutput {
        av,
        aj,
        a,
        ci: ca - a / g,
        vmax,
        jmax,
        j,
    })
}

/// C4 leaf at fixed temperature and light; rates are functions of the
/// mesophyll CO2 partial pressure `cm` (Pa).
#[derive(Debug, Clone, Copy)]
struct C4Leaf {
    vcmax: f64,
    vpmax: f64,
    kp: f64,
    /// Kc (1 + O / Ko) of bundle-sheath Rubisco (Pa).
    kco: f64,
    /// Mesophyll O2 (Pa).
    om: f64,
    /// Bundle-sheath conductance (umol/m2/s/Pa).
    gbs: f64,
    j: f64,
    rd: f64,
    rm: f64,
}

impl C4Leaf {
    fn new(input: &PsnInput, vcmax: f64, j: f64) -> Self {
        let t = input.t;
        let om = O2_FRACTION * input.pa;
        let kc = KC25_C4 * q10_split(t, Q10_KC);
        let ko = KO25_C4 * Q10_KO.powf((t - 25.0) / 10.0);
        Self {
            vcmax,
            vpmax: VPMAX_RATIO * vcmax,
            kp: KP25_C4 * Q10_KP.powf((t - 25.0) / 10.0),
            kco: kc * (1.0 + om / ko),
            om,
            gbs: input.gbs * 1e6 / input.pa,
            j,
            rd: input.rd,
            rm: RM_SHARE * input.rd,
        }
    }

    /// PEP carboxylation, limited by regeneration.
    fn vp(&self, cm: f64) -> f64 {
        (cm * self.vpmax / (cm + self.kp)).min(VPR_C4)
    }

    /// Enzyme-limited net assimilation (umol/m2/s).
    fn enzyme(&self, cm: f64) -> BgcResult<f64> {
        let supply = self.vp(cm) - self.rm + self.gbs * cm;
        let rubisco = self.vcmax - self.rd;
        let b = -(supply + rubisco + self.gbs * self.kco);
        let c = supply * rubisco
            - self.gbs * (self.vcmax * GAMMA_STAR_C4 * self.om + self.rd * self.kco);
        lower_root(1.0, b, c, "photosynthesis", "C4 carboxylation-limited")
    }

    /// Electron-transport-limited net assimilation (umol/m2/s).
    fn light(&self, cm: f64) -> BgcResult<f64> {
        let supply = X_C4 * self.j / 2.0 - self.rm + self.gbs * cm;
        let calvin = (1.0 - X_C4) * self.j / 3.0;
        let b = -(supply + calvin - self.rd + self.gbs * 7.0 * GAMMA_STAR_C4 * self.om / 3.0);
        let c = supply * (calvin - self.rd)
            - self.gbs * GAMMA_STAR_C4 * self.om * (calvin + 7.0 * self.rd / 3.0);
        lower_root(1.0, b, c, "photosynthesis", "C4 light-limited")
    }
}

/// Find `cm` where `rate(cm) = g (ca - cm)`; `rate` rises with `cm`.
/// Returns the assimilation at that point.
fn c4_supply_demand<F>(rate: F, ca: f64, g: f64) -> BgcResult<f64>
where
    F: Fn(f64) -> BgcResult<f64>,
{
    let excess = |cm: f64| -> BgcResult<f64> { Ok(rate(cm)? - g * (ca - cm)) };
    let mut lo = 0.0;
    if excess(lo)? >= 0.0 {
        return rate(lo);
    }
    let mut hi = ca.max(1.0);
    let mut widen = 0;
    while excess(hi)? < 0.0 {
        widen += 1;
        if widen > 60 {
            return Err(BgcError::numerical(
                "photosynthesis",
                "no mesophyll CO2 balances C4 supply and demand",
            ));
        }
        lo = hi;
        hi *= 2.0;
    }
    for _ in 0..BISECT_ITERS {
        let mid = 0.5 * (lo + hi);
        if excess(mid)? < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-12 * hi {
            break;
        }
    }
    rate(0.5 * (lo + hi))
}

fn c4(input: &PsnInput) -> BgcResult<PsnOutput> {
    let PsnInput { pa, co2, g, ppfd, .. } = *input;
    let ca = co2 * 1e-6 * pa;
    let vmax = vmax(input);
    let jmax = JMAX_RATIO * vmax;
    let j = electron_transport(jmax, ppfd)?;
    let leaf = C4Leaf::new(input, vmax, j);

    let av = c4_supply_demand(|cm| leaf.enzyme(cm), ca, g)?;
    let aj = c4_supply_demand(|cm| leaf.light(cm), ca, g)?;

    let a = av.min(aj);
    Ok(PsnOutput {
        av,
        aj,
        a,
        ci: ca - a / g,
        vmax,
        jmax,
        j,
    })
}

/// Convert a leaf conductance to water vapour (m/s) into a conductance
/// to CO2 (umol/m2/s/Pa).
pub fn co2_conductance(gl_t_wv: f64, t: f64) -> f64 {
    gl_t_wv * 1e6 / (1.6 * R_GAS * (t + TK_OFFSET))
}

/// Sunlit and shaded canopy assimilation for the day.
///
/// Writes net assimilation per leaf area into `epv` and gross
/// photosynthesis, net assimilation plus day leaf respiration, into `cf`.
pub fn total_photosynthesis(
    met: &MetVariables,
    epc: &EcophysConstants,
    epv: &mut EcophysVariables,
    cf: &mut CarbonFlux,
) -> BgcResult<()> {
    epv.assim_sun = 0.0;
    epv.assim_shade = 0.0;
    if epv.proj_lai <= 0.0 || met.dayl <= 0.0 {
        return Ok(());
    }

    let fractions = [
        (epv.plaisun, epv.sun_proj_sla, epv.ppfd_per_plaisun, epv.gl_t_wv_sun, epv.dlmr_area_sun),
        (
            epv.plaishade,
            epv.shade_proj_sla,
            epv.ppfd_per_plaishade,
            epv.gl_t_wv_shade,
            epv.dlmr_area_shade,
        ),
    ];
    let mut gross = [0.0; 2];
    let mut assim = [0.0; 2];
    for (i, &(plai, sla, ppfd, gl, rd)) in fractions.iter().enumerate() {
        if plai <= 0.0 || sla <= 0.0 {
            continue;
        }
        let out = photosynthesis(&PsnInput {
            pathway: epc.pathway,
            t: met.tday,
            pa: met.pa,
            co2: met.co2,
            lnc: 1.0 / (sla * epc.leaf_cn),
            flnr: epc.flnr,
            ppfd,
            g: co2_conductance(gl, met.tday),
            rd,
            gbs: epc.gbs,
        })?;
        assim[i] = out.a;
        gross[i] = ((out.a + rd) * plai * met.dayl * UMOL_C_TO_KG).max(0.0);
    }
    epv.assim_sun = assim[0];
    epv.assim_shade = assim[1];
    cf.psnsun_to_cpool = gross[0];
    cf.psnshade_to_cpool = gross[1];
    Ok(())
}
