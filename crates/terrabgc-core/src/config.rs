//! Simulation configuration.
//!
//! Every section falls back to its defaults, so a config file only needs to
//! name what differs from a temperate deciduous forest on loam.

use serde::{Deserialize, Serialize};

use crate::constants::{CN_BALANCE_TOL, WATER_BALANCE_TOL};
use crate::error::{BgcError, BgcResult};
use crate::params::soil::SoilConfig;
use crate::params::{check_positive, EcophysConstants, InitialConditions, SiteConstants, SoilProfile};

/// Vertical soil-water transport scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrologyMode {
    #[default]
    Tipping,
    Richards,
}

/// Sub-daily stepping controls for the Richards scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichardsControl {
    /// Smallest sub-step (s).
    pub min_step: f64,
    /// Largest sub-step (s).
    pub max_step: f64,
    /// Largest VWC change any layer may see in one sub-step.
    pub max_dvwc: f64,
}

impl Default for RichardsControl {
    fn default() -> Self {
        Self {
            min_step: 1.0,
            max_step: 86_400.0,
            max_dvwc: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceTolerances {
    pub water: f64,
    pub carbon: f64,
    pub nitrogen: f64,
}

impl Default for BalanceTolerances {
    fn default() -> Self {
        Self {
            water: WATER_BALANCE_TOL,
            carbon: CN_BALANCE_TOL,
            nitrogen: CN_BALANCE_TOL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub hydrology: HydrologyMode,
    /// Turn balance drift beyond tolerance into an error instead of a warning.
    pub strict_balance: bool,
    pub richards: RichardsControl,
    pub tolerances: BalanceTolerances,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub site: SiteConstants,
    pub soil: SoilConfig,
    pub epc: EcophysConstants,
    pub initial: InitialConditions,
    pub control: ControlConfig,
}

impl SimulationConfig {
    pub fn from_json_str(s: &str) -> BgcResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> BgcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> BgcResult<()> {
        self.site.validate()?;
        self.epc.validate()?;
        SoilProfile::build(&self.soil)?;
        self.initial.validate()?;
        let r = &self.control.richards;
        check_positive("control.richards.min_step", r.min_step)?;
        if r.max_step < r.min_step || r.max_step > 86_400.0 {
            return Err(BgcError::invalid_param(
                "control.richards.max_step",
                r.max_step,
                "must lie in [min_step, 86400]",
            ));
        }
        check_positive("control.richards.max_dvwc", r.max_dvwc)?;
        let t = &self.control.tolerances;
        check_positive("control.tolerances.water", t.water)?;
        check_positive("control.tolerances.carbon", t.carbon)?;
        check_positive("control.tolerances.nitrogen", t.nitrogen)?;
        Ok(())
    }
}
