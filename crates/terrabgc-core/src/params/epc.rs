//! Ecophysiological constants of one plant functional type.
//!
//! Defaults describe a temperate deciduous broadleaf forest.

use serde::{Deserialize, Serialize};

use super::{check_positive, check_range};
use crate::constants::{GRPERC, GRPNOW};
use crate::error::{BgcError, BgcResult};
use crate::state::Tissue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantForm {
    Woody,
    NonWoody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhenologyType {
    Evergreen,
    Deciduous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotosyntheticPathway {
    C3,
    C4,
}

/// Allocation fractions of new growth per tissue.
///
/// Fractions are normalised on use, so they only need to be non-negative
/// with a positive sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationRatios {
    pub leaf: f64,
    pub froot: f64,
    pub fruit: f64,
    pub softstem: f64,
    pub livestem: f64,
    pub deadstem: f64,
    pub livecroot: f64,
    pub deadcroot: f64,
}

impl Default for AllocationRatios {
    fn default() -> Self {
        Self {
            leaf: 0.205,
            froot: 0.246,
            fruit: 0.0,
            softstem: 0.0,
            livestem: 0.072,
            deadstem: 0.378,
            livecroot: 0.016,
            deadcroot: 0.083,
        }
    }
}

impl AllocationRatios {
    pub fn get(&self, tissue: Tissue) -> f64 {
        match tissue {
            Tissue::Leaf => self.leaf,
            Tissue::Froot => self.froot,
            Tissue::Fruit => self.fruit,
            Tissue::Softstem => self.softstem,
            Tissue::Livestem => self.livestem,
            Tissue::Deadstem => self.deadstem,
            Tissue::Livecroot => self.livecroot,
            Tissue::Deadcroot => self.deadcroot,
        }
    }

    pub fn total(&self) -> f64 {
        Tissue::ALL.iter().map(|&t| self.get(t)).sum()
    }

    /// Fraction of new growth going to `tissue`, normalised to sum to one.
    pub fn fraction(&self, tissue: Tissue) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.get(tissue) / total
        } else {
            0.0
        }
    }

    fn validate(&self, phase: usize) -> BgcResult<()> {
        for &t in &Tissue::ALL {
            let v = self.get(t);
            if !v.is_finite() || v < 0.0 {
                return Err(BgcError::invalid_param(
                    format!("allocation[{phase}].{}", t.name()),
                    v,
                    "must be non-negative",
                ));
            }
        }
        check_positive(&format!("allocation[{phase}] total"), self.total())
    }
}

/// Chemical composition of a litter stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LitterFractions {
    pub labile: f64,
    pub cellulose: f64,
    pub lignin: f64,
}

impl LitterFractions {
    pub const fn new(labile: f64, cellulose: f64, lignin: f64) -> Self {
        Self {
            labile,
            cellulose,
            lignin,
        }
    }

    fn validate(&self, name: &str) -> BgcResult<()> {
        for (field, v) in [
            ("labile", self.labile),
            ("cellulose", self.cellulose),
            ("lignin", self.lignin),
        ] {
            check_range(&format!("{name}.{field}"), v, 0.0, 1.0)?;
        }
        let total = self.labile + self.cellulose + self.lignin;
        if (total - 1.0).abs() > 1e-3 {
            return Err(BgcError::invalid_param(
                format!("{name} total"),
                total,
                "litter fractions must sum to 1",
            ));
        }
        Ok(())
    }

    /// Split cellulose into unshielded and lignin-shielded parts.
    ///
    /// The shielded share grows with the lignin:cellulose ratio.
    pub fn partition(&self) -> LitterPartition {
        let ratio = if self.cellulose > 0.0 {
            self.lignin / self.cellulose
        } else {
            f64::INFINITY
        };
        let shielded_share = if ratio <= 0.45 {
            0.0
        } else if ratio < 0.7 {
            (ratio - 0.45) * 3.2
        } else {
            0.8
        };
        let total = self.labile + self.cellulose + self.lignin;
        let norm = if total > 0.0 { 1.0 / total } else { 0.0 };
        LitterPartition {
            labile: self.labile * norm,
            unshielded: self.cellulose * (1.0 - shielded_share) * norm,
            shielded: self.cellulose * shielded_share * norm,
            lignin: self.lignin * norm,
        }
    }
}

/// Litter fractions resolved onto the four litter pools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitterPartition {
    pub labile: f64,
    pub unshielded: f64,
    pub shielded: f64,
    pub lignin: f64,
}

impl LitterPartition {
    pub fn as_array(&self) -> [f64; 4] {
        [self.labile, self.unshielded, self.shielded, self.lignin]
    }
}

/// Minimum, optimum and maximum temperatures of a linear response ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardinalTemps {
    pub min: f64,
    pub opt: f64,
    pub max: f64,
}

impl CardinalTemps {
    /// 0 outside (min, max), 1 at opt, linear in between.
    pub fn ramp(&self, t: f64) -> f64 {
        if t <= self.min || t >= self.max {
            0.0
        } else if t <= self.opt {
            if self.opt > self.min {
                (t - self.min) / (self.opt - self.min)
            } else {
                1.0
            }
        } else if self.max > self.opt {
            (self.max - t) / (self.max - self.opt)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcophysConstants {
    pub plant_form: PlantForm,
    pub phenology: PhenologyType,
    pub pathway: PhotosyntheticPathway,

    /// Annual leaf and fine-root turnover of evergreens (1/yr).
    pub leaf_turnover: f64,
    pub froot_turnover: f64,
    /// Annual live-wood to dead-wood turnover (1/yr).
    pub livewood_turnover: f64,
    /// Whole-plant mortality (1/yr).
    pub whole_plant_mortality: f64,
    /// Fire mortality (1/yr).
    pub fire_mortality: f64,

    /// Allocation fractions, one entry per phenological phase.
    pub allocation: Vec<AllocationRatios>,
    /// Share of new growth displayed immediately at optimum temperature.
    pub alloc_prop_curgrowth: f64,
    pub curgrowth_temps: CardinalTemps,

    pub leaf_cn: f64,
    pub leaflitr_cn: f64,
    pub froot_cn: f64,
    pub fruit_cn: f64,
    pub softstem_cn: f64,
    pub livewood_cn: f64,
    pub deadwood_cn: f64,

    pub leaf_litter: LitterFractions,
    pub froot_litter: LitterFractions,
    pub fruit_litter: LitterFractions,
    pub softstem_litter: LitterFractions,
    /// Dead wood composition; the labile share is ignored.
    pub deadwood_litter: LitterFractions,

    /// Canopy interception coefficient (1/LAI/day).
    pub int_coef: f64,
    pub ext_coef: f64,
    /// All-sided to projected leaf area ratio.
    pub lai_ratio: f64,
    /// Canopy average projected specific leaf area (m2/kgC).
    pub avg_proj_sla: f64,
    /// Shaded to sunlit SLA ratio.
    pub sla_ratio: f64,
    /// Fraction of leaf N in Rubisco.
    pub flnr: f64,
    /// Bundle-sheath conductance to CO2 of C4 leaves (mol/m2/s).
    pub gbs: f64,

    /// Maximum stomatal conductance (m/s).
    pub gl_smax: f64,
    /// Cuticular conductance (m/s).
    pub gl_c: f64,
    /// Leaf boundary-layer conductance (m/s).
    pub gl_bl: f64,
    /// VPD at stomatal closure onset and full closure (Pa).
    pub vpd_open: f64,
    pub vpd_close: f64,
    /// Relative position between wilting point and field capacity above
    /// which there is no drought stress.
    pub vwc_ratio_crit: f64,
    /// Stress multiplier floor at saturation; 1 disables waterlogging stress.
    pub waterlog_floor: f64,

    pub q10_mr: f64,
    /// Maintenance respiration per unit N at 20 C (kgC/kgN/day).
    pub mrpern: f64,
    pub gr_perc: f64,
    pub gr_prop_now: f64,

    /// Rooting depth bounds (m).
    pub min_rootdepth: f64,
    pub max_rootdepth: f64,
    /// Exponential root distribution shape (1/m).
    pub root_distribution: f64,
    /// Fine-root carbon at which herbaceous rooting depth reaches half its range (kgC/m2).
    pub froot_half_depth_c: f64,

    /// Maximum daily senescence rate under full drought stress (1/day).
    pub senescence_rate: f64,
    /// Standing dead to litter rate (1/day).
    pub standing_dead_rate: f64,
    /// Cut-down dead biomass to litter rate (1/day).
    pub cutdown_rate: f64,
}

impl Default for EcophysConstants {
    fn default() -> Self {
        Self {
            plant_form: PlantForm::Woody,
            phenology: PhenologyType::Deciduous,
            pathway: PhotosyntheticPathway::C3,
            leaf_turnover: 1.0,
            froot_turnover: 1.0,
            livewood_turnover: 0.7,
            whole_plant_mortality: 0.005,
            fire_mortality: 0.0,
            allocation: vec![AllocationRatios::default()],
            alloc_prop_curgrowth: 0.5,
            curgrowth_temps: CardinalTemps {
                min: 0.0,
                opt: 15.0,
                max: 40.0,
            },
            leaf_cn: 24.0,
            leaflitr_cn: 49.0,
            froot_cn: 42.0,
            fruit_cn: 50.0,
            softstem_cn: 50.0,
            livewood_cn: 50.0,
            deadwood_cn: 550.0,
            leaf_litter: LitterFractions::new(0.38, 0.44, 0.18),
            froot_litter: LitterFractions::new(0.34, 0.44, 0.22),
            fruit_litter: LitterFractions::new(0.5, 0.3, 0.2),
            softstem_litter: LitterFractions::new(0.3, 0.45, 0.25),
            deadwood_litter: LitterFractions::new(0.0, 0.76, 0.24),
            int_coef: 0.045,
            ext_coef: 0.54,
            lai_ratio: 2.0,
            avg_proj_sla: 32.0,
            sla_ratio: 2.0,
            flnr: 0.08,
            gbs: 0.003,
            gl_smax: 0.006,
            gl_c: 0.00006,
            gl_bl: 0.01,
            vpd_open: 1100.0,
            vpd_close: 3600.0,
            vwc_ratio_crit: 0.6,
            waterlog_floor: 1.0,
            q10_mr: 2.0,
            mrpern: 0.218,
            gr_perc: GRPERC,
            gr_prop_now: GRPNOW,
            min_rootdepth: 0.1,
            max_rootdepth: 1.0,
            root_distribution: 3.67,
            froot_half_depth_c: 0.05,
            senescence_rate: 0.02,
            standing_dead_rate: 0.01,
            cutdown_rate: 0.01,
        }
    }
}

impl EcophysConstants {
    pub fn is_woody(&self) -> bool {
        self.plant_form == PlantForm::Woody
    }

    pub fn is_evergreen(&self) -> bool {
        self.phenology == PhenologyType::Evergreen
    }

    /// Nominal C:N ratio of a tissue pool.
    pub fn tissue_cn(&self, tissue: Tissue) -> f64 {
        match tissue {
            Tissue::Leaf => self.leaf_cn,
            Tissue::Froot => self.froot_cn,
            Tissue::Fruit => self.fruit_cn,
            Tissue::Softstem => self.softstem_cn,
            Tissue::Livestem | Tissue::Livecroot => self.livewood_cn,
            Tissue::Deadstem | Tissue::Deadcroot => self.deadwood_cn,
        }
    }

    /// Litter composition a senescing or dying tissue decomposes as.
    pub fn tissue_litter(&self, tissue: Tissue) -> LitterPartition {
        match tissue {
            Tissue::Leaf => self.leaf_litter.partition(),
            Tissue::Froot => self.froot_litter.partition(),
            Tissue::Fruit => self.fruit_litter.partition(),
            Tissue::Softstem => self.softstem_litter.partition(),
            _ => self.deadwood_litter.partition(),
        }
    }

    /// Allocation fractions for a phenological phase, clamped to the last entry.
    pub fn allocation_for(&self, phase: usize) -> AllocationRatios {
        self.allocation
            .get(phase)
            .or_else(|| self.allocation.last())
            .copied()
            .unwrap_or_default()
    }

    pub fn validate(&self) -> BgcResult<()> {
        for (name, v) in [
            ("leaf_turnover", self.leaf_turnover),
            ("froot_turnover", self.froot_turnover),
            ("livewood_turnover", self.livewood_turnover),
            ("whole_plant_mortality", self.whole_plant_mortality),
            ("fire_mortality", self.fire_mortality),
        ] {
            check_range(name, v, 0.0, 365.0)?;
        }
        if self.allocation.is_empty() {
            return Err(BgcError::invalid_param(
                "allocation",
                0.0,
                "at least one phase is required",
            ));
        }
        for (phase, ratios) in self.allocation.iter().enumerate() {
            ratios.validate(phase)?;
        }
        check_range("alloc_prop_curgrowth", self.alloc_prop_curgrowth, 0.0, 1.0)?;
        if !(self.curgrowth_temps.min <= self.curgrowth_temps.opt
            && self.curgrowth_temps.opt <= self.curgrowth_temps.max)
        {
            return Err(BgcError::invalid_param(
                "curgrowth_temps.opt",
                self.curgrowth_temps.opt,
                "cardinal temperatures must satisfy min <= opt <= max",
            ));
        }
        for (name, v) in [
            ("leaf_cn", self.leaf_cn),
            ("leaflitr_cn", self.leaflitr_cn),
            ("froot_cn", self.froot_cn),
            ("fruit_cn", self.fruit_cn),
            ("softstem_cn", self.softstem_cn),
            ("livewood_cn", self.livewood_cn),
            ("deadwood_cn", self.deadwood_cn),
        ] {
            check_positive(name, v)?;
        }
        if self.leaflitr_cn < self.leaf_cn {
            return Err(BgcError::invalid_param(
                "leaflitr_cn",
                self.leaflitr_cn,
                "leaf litter cannot be richer in N than live leaves",
            ));
        }
        if self.deadwood_cn < self.livewood_cn {
            return Err(BgcError::invalid_param(
                "deadwood_cn",
                self.deadwood_cn,
                "dead wood cannot be richer in N than live wood",
            ));
        }
        self.leaf_litter.validate("leaf_litter")?;
        self.froot_litter.validate("froot_litter")?;
        self.fruit_litter.validate("fruit_litter")?;
        self.softstem_litter.validate("softstem_litter")?;
        self.deadwood_litter.validate("deadwood_litter")?;

        check_range("int_coef", self.int_coef, 0.0, 1.0)?;
        check_range("ext_coef", self.ext_coef, 0.01, 2.0)?;
        check_positive("lai_ratio", self.lai_ratio)?;
        check_positive("avg_proj_sla", self.avg_proj_sla)?;
        check_positive("sla_ratio", self.sla_ratio)?;
        check_range("flnr", self.flnr, 0.0, 1.0)?;
        check_range("gbs", self.gbs, 0.0, 1.0)?;
        check_positive("gl_smax", self.gl_smax)?;
        check_range("gl_c", self.gl_c, 0.0, 1.0)?;
        check_positive("gl_bl", self.gl_bl)?;
        if self.vpd_close <= self.vpd_open {
            return Err(BgcError::invalid_param(
                "vpd_close",
                self.vpd_close,
                "must exceed vpd_open",
            ));
        }
        check_range("vwc_ratio_crit", self.vwc_ratio_crit, 0.0, 1.0)?;
        check_range("waterlog_floor", self.waterlog_floor, 0.0, 1.0)?;
        check_positive("q10_mr", self.q10_mr)?;
        check_range("mrpern", self.mrpern, 0.0, 10.0)?;
        check_range("gr_perc", self.gr_perc, 0.0, 1.0)?;
        check_range("gr_prop_now", self.gr_prop_now, 0.0, 1.0)?;
        check_positive("min_rootdepth", self.min_rootdepth)?;
        if self.max_rootdepth < self.min_rootdepth {
            return Err(BgcError::invalid_param(
                "max_rootdepth",
                self.max_rootdepth,
                "must not be shallower than min_rootdepth",
            ));
        }
        check_range("root_distribution", self.root_distribution, 0.0, 100.0)?;
        check_positive("froot_half_depth_c", self.froot_half_depth_c)?;
        check_range("senescence_rate", self.senescence_rate, 0.0, 1.0)?;
        check_range("standing_dead_rate", self.standing_dead_rate, 0.0, 1.0)?;
        check_range("cutdown_rate", self.cutdown_rate, 0.0, 1.0)?;
        Ok(())
    }
}
