//! Management events of one day.
//!
//! Scheduling lives with the caller; the engine only turns the events it is
//! handed into flows.

use serde::{Deserialize, Serialize};

use super::{Destination, Disturber};
use crate::error::{BgcError, BgcResult};
use crate::params::{check_range, LitterFractions, SoilProfile};
use crate::state::{SubPool, Tissue, N_CUTDOWN, N_LITTER};

/// Seed material placed in the transfer pools (kgC/m2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planting {
    pub seed_c: f64,
    /// Shares of leaf, fine root, fruit and soft stem.
    pub shares: [f64; 4],
}

impl Default for Planting {
    fn default() -> Self {
        Self {
            seed_c: 0.001,
            shares: [0.5, 0.3, 0.0, 0.2],
        }
    }
}

/// Fractional removal of biomass; the exported share leaves the site, the
/// rest is left lying as cut-down material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Removal {
    pub fraction: f64,
    pub export: f64,
}

impl Default for Removal {
    fn default() -> Self {
        Self {
            fraction: 0.5,
            export: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grazing {
    /// Share of green above-ground biomass eaten.
    pub fraction: f64,
    /// Share of eaten C and N returned as dung.
    pub excreta_c: f64,
    /// Share of eaten N returned as urine.
    pub urine_n: f64,
}

impl Default for Grazing {
    fn default() -> Self {
        Self {
            fraction: 0.05,
            excreta_c: 0.3,
            urine_n: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fertilizer {
    /// Mineral N (kgN/m2).
    pub nh4: f64,
    pub no3: f64,
    /// Organic matter (kgC/m2) and its C:N ratio.
    pub organic_c: f64,
    pub organic_cn: f64,
    pub organic_litter: LitterFractions,
}

impl Default for Fertilizer {
    fn default() -> Self {
        Self {
            nh4: 0.0,
            no3: 0.0,
            organic_c: 0.0,
            organic_cn: 20.0,
            organic_litter: LitterFractions::new(0.5, 0.3, 0.2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ploughing {
    /// Depth of the mixed soil (m).
    pub depth: f64,
}

impl Default for Ploughing {
    fn default() -> Self {
        Self { depth: 0.3 }
    }
}

/// Events falling on one day. Everything is off by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementEvents {
    pub planting: Option<Planting>,
    /// Whole-plant removal, wood included.
    pub thinning: Option<Removal>,
    /// Displayed green above-ground biomass.
    pub mowing: Option<Removal>,
    /// All green above-ground biomass, reserves included.
    pub harvest: Option<Removal>,
    pub grazing: Option<Grazing>,
    pub fertilizer: Option<Fertilizer>,
    pub ploughing: Option<Ploughing>,
}

const GREEN: [Tissue; 3] = [Tissue::Leaf, Tissue::Fruit, Tissue::Softstem];
const SEEDED: [Tissue; 4] = [Tissue::Leaf, Tissue::Froot, Tissue::Fruit, Tissue::Softstem];

impl ManagementEvents {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> BgcResult<()> {
        if let Some(p) = &self.planting {
            check_range("planting.seed_c", p.seed_c, 0.0, 1.0)?;
            for s in p.shares {
                check_range("planting.shares", s, 0.0, 1.0)?;
            }
        }
        for (name, r) in [
            ("thinning", &self.thinning),
            ("mowing", &self.mowing),
            ("harvest", &self.harvest),
        ] {
            if let Some(r) = r {
                check_range(&format!("{name}.fraction"), r.fraction, 0.0, 1.0)?;
                check_range(&format!("{name}.export"), r.export, 0.0, 1.0)?;
            }
        }
        if let Some(g) = &self.grazing {
            check_range("grazing.fraction", g.fraction, 0.0, 1.0)?;
            check_range("grazing.excreta_c", g.excreta_c, 0.0, 1.0)?;
            check_range("grazing.urine_n", g.urine_n, 0.0, 1.0)?;
            if g.excreta_c + g.urine_n > 1.0 {
                return Err(BgcError::invalid_param(
                    "grazing.urine_n",
                    g.urine_n,
                    "dung and urine cannot return more N than was eaten",
                ));
            }
        }
        if let Some(f) = &self.fertilizer {
            check_range("fertilizer.nh4", f.nh4, 0.0, 1.0)?;
            check_range("fertilizer.no3", f.no3, 0.0, 1.0)?;
            check_range("fertilizer.organic_c", f.organic_c, 0.0, 10.0)?;
            check_range("fertilizer.organic_cn", f.organic_cn, 1.0, 1000.0)?;
        }
        if let Some(p) = &self.ploughing {
            check_range("ploughing.depth", p.depth, 0.0, 5.0)?;
        }
        Ok(())
    }
}

/// Turn the day's events into disturbance flows.
pub fn management(events: &ManagementEvents, soil: &SoilProfile, d: &mut Disturber<'_>) {
    if let Some(p) = &events.planting {
        plant(p, d);
    }
    if let Some(r) = &events.thinning {
        cut(d, &Tissue::ALL, &SubPool::ALL, r);
        d.remove_nonstructural(r.fraction, Destination::Litter);
    }
    if let Some(r) = &events.harvest {
        cut(d, &GREEN, &SubPool::ALL, r);
    }
    if let Some(r) = &events.mowing {
        cut(d, &GREEN, &[SubPool::Active], r);
    }
    if let Some(g) = &events.grazing {
        graze(g, d);
    }
    if let Some(f) = &events.fertilizer {
        fertilize(f, d);
    }
    if let Some(p) = &events.ploughing {
        plough(p, soil, d);
    }
}

fn plant(p: &Planting, d: &mut Disturber<'_>) {
    let total: f64 = p.shares.iter().sum();
    if total <= 0.0 {
        return;
    }
    for (t, share) in SEEDED.into_iter().zip(p.shares) {
        let c = p.seed_c * share / total;
        d.df.carbon.planting[t.index()] += c;
        d.df.nitrogen.planting[t.index()] += c / d.epc.tissue_cn(t);
    }
}

/// Above-ground parts are exported or left lying; below-ground parts of
/// removed plants die in place.
fn cut(d: &mut Disturber<'_>, tissues: &[Tissue], subs: &[SubPool], r: &Removal) {
    for &t in tissues {
        for &sub in subs {
            let taken = d.take(t, sub, r.fraction);
            if t.is_belowground() {
                d.route(&taken, Destination::Litter);
                continue;
            }
            let exported = super::Taken {
                c: taken.c * r.export,
                n: taken.n * r.export,
                ..taken
            };
            let left = super::Taken {
                c: taken.c - exported.c,
                n: taken.n - exported.n,
                ..taken
            };
            d.route(&exported, Destination::Export);
            d.route(&left, Destination::Cutdown);
        }
    }
}

fn graze(g: &Grazing, d: &mut Disturber<'_>) {
    for t in GREEN {
        let taken = d.take(t, SubPool::Active, g.fraction);
        let dung = super::Taken {
            c: taken.c * g.excreta_c,
            n: taken.n * g.excreta_c,
            ..taken
        };
        let urine = taken.n * g.urine_n;
        let eaten = super::Taken {
            c: taken.c - dung.c,
            n: taken.n - dung.n - urine,
            ..taken
        };
        d.route(&dung, Destination::Litter);
        d.route(&eaten, Destination::Export);
        d.df.nitrogen.excreta_nh4 += urine;
    }
}

fn fertilize(f: &Fertilizer, d: &mut Disturber<'_>) {
    d.df.nitrogen.fert_nh4 += f.nh4;
    d.df.nitrogen.fert_no3 += f.no3;
    if f.organic_c > 0.0 {
        let partition = f.organic_litter.partition().as_array();
        let n = f.organic_c / f.organic_cn;
        for k in 0..N_LITTER {
            d.df.carbon.fert_litter[k] += f.organic_c * partition[k];
            d.df.nitrogen.fert_litter[k] += n * partition[k];
        }
    }
}

/// Even out litter and debris over the ploughed layers, in proportion to
/// layer thickness. Works on the pools net of today's litter burning so the
/// surface layer cannot be overdrawn.
fn plough(p: &Ploughing, soil: &SoilProfile, d: &mut Disturber<'_>) {
    let mixed: Vec<usize> = soil
        .layers
        .iter()
        .enumerate()
        .take_while(|(_, layer)| layer.depth_top < p.depth)
        .map(|(l, _)| l)
        .collect();
    if mixed.len() < 2 {
        return;
    }
    let depth: f64 = mixed.iter().map(|&l| soil.layers[l].thickness).sum();
    let (cs, ns) = (d.cs, d.ns);
    for (flux, pools) in [
        (
            &mut d.df.carbon,
            mixed
                .iter()
                .map(|&l| carbon_pools(&cs.soil[l]))
                .collect::<Vec<_>>(),
        ),
        (
            &mut d.df.nitrogen,
            mixed
                .iter()
                .map(|&l| nitrogen_pools(&ns.soil[l]))
                .collect::<Vec<_>>(),
        ),
    ] {
        let mut net = pools;
        for (k, v) in net[0].iter_mut().enumerate() {
            *v -= flux.litter_to_fire[k];
        }
        for k in 0..N_CUTDOWN {
            let total: f64 = net.iter().map(|p| p[k]).sum();
            for (i, &l) in mixed.iter().enumerate() {
                let share = soil.layers[l].thickness / depth;
                flux.litter_mixing[l][k] = total * share - net[i][k];
            }
        }
    }
}

fn carbon_pools(s: &crate::state::SoilCarbon) -> [f64; N_CUTDOWN] {
    [s.litter[0], s.litter[1], s.litter[2], s.litter[3], s.cwd]
}

fn nitrogen_pools(s: &crate::state::SoilNitrogen) -> [f64; N_CUTDOWN] {
    [s.litter[0], s.litter[1], s.litter[2], s.litter[3], s.cwd]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disturbance::tests::stocked;
    use crate::flux::DisturbanceFluxes;
    use crate::params::soil::{SoilConfig, SoilLayerConfig};
    use crate::params::EcophysConstants;
    use approx::assert_relative_eq;

    fn profile() -> SoilProfile {
        SoilProfile::build(&SoilConfig {
            layers: vec![
                SoilLayerConfig {
                    thickness: 0.1,
                    ..SoilLayerConfig::default()
                },
                SoilLayerConfig {
                    thickness: 0.2,
                    ..SoilLayerConfig::default()
                },
                SoilLayerConfig::default(),
            ],
            ..SoilConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_day_does_nothing() {
        let events = ManagementEvents::default();
        assert!(events.is_empty());
        let epc = EcophysConstants::default();
        let (cs, ns, epv) = stocked(3);
        let mut df = DisturbanceFluxes::new(3);
        let mut d = Disturber::new(&epc, &cs, &ns, &epv, &mut df);
        management(&events, &profile(), &mut d);
        assert_eq!(df, DisturbanceFluxes::new(3));
    }

    #[test]
    fn mowing_leaves_the_unexported_share_lying() {
        let events = ManagementEvents {
            mowing: Some(Removal {
                fraction: 0.4,
                export: 0.75,
            }),
            ..ManagementEvents::default()
        };
        let epc = EcophysConstants::default();
        let (cs, ns, epv) = stocked(3);
        let mut df = DisturbanceFluxes::new(3);
        let mut d = Disturber::new(&epc, &cs, &ns, &epv, &mut df);
        management(&events, &profile(), &mut d);
        let removed = 3.0 * 0.5 * 0.4;
        assert_relative_eq!(df.carbon.to_export, 0.75 * removed, epsilon = 1e-15);
        assert_relative_eq!(df.carbon.to_cutdown.iter().sum::<f64>(), 0.25 * removed, epsilon = 1e-15);
        assert_eq!(df.carbon.removal[Tissue::Leaf.index()].storage, 0.0);
    }

    #[test]
    fn planting_and_fertilizer_are_sources() {
        let events = ManagementEvents {
            planting: Some(Planting::default()),
            fertilizer: Some(Fertilizer {
                nh4: 0.002,
                organic_c: 0.1,
                ..Fertilizer::default()
            }),
            ..ManagementEvents::default()
        };
        events.validate().unwrap();
        let epc = EcophysConstants::default();
        let (cs, ns, epv) = stocked(3);
        let mut df = DisturbanceFluxes::new(3);
        let mut d = Disturber::new(&epc, &cs, &ns, &epv, &mut df);
        management(&events, &profile(), &mut d);
        assert_relative_eq!(df.carbon.planting_total(), 0.001, epsilon = 1e-15);
        assert_relative_eq!(df.carbon.fertilizer_total(), 0.1, epsilon = 1e-15);
        assert_relative_eq!(df.nitrogen.fertilizer_total(), 0.002 + 0.1 / 20.0, epsilon = 1e-15);
        assert_eq!(df.carbon.removal_total(), 0.0);
    }

    #[test]
    fn ploughing_evens_out_litter_without_changing_totals() {
        let events = ManagementEvents {
            ploughing: Some(Ploughing { depth: 0.3 }),
            ..ManagementEvents::default()
        };
        let epc = EcophysConstants::default();
        let (cs, ns, epv) = stocked(3);
        let mut df = DisturbanceFluxes::new(3);
        let mut d = Disturber::new(&epc, &cs, &ns, &epv, &mut df);
        management(&events, &profile(), &mut d);
        for k in 0..N_CUTDOWN {
            let net: f64 = df.carbon.litter_mixing.iter().map(|l| l[k]).sum();
            assert_relative_eq!(net, 0.0, epsilon = 1e-15);
        }
        // one third of the surface debris stays in the 0.1 m top layer
        assert_relative_eq!(df.carbon.litter_mixing[0][4], 1.0 / 3.0 - 1.0, epsilon = 1e-12);
        assert_eq!(df.carbon.litter_mixing[2], [0.0; N_CUTDOWN]);
    }

    #[test]
    fn grazing_cannot_return_more_than_eaten() {
        let events = ManagementEvents {
            grazing: Some(Grazing {
                fraction: 0.1,
                excreta_c: 0.6,
                urine_n: 0.6,
            }),
            ..ManagementEvents::default()
        };
        assert!(events.validate().is_err());
    }
}
