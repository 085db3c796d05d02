//! Error taxonomy for the daily engine.
//!
//! Soft limiting (a demand capped to what a layer can supply) is not an
//! error; it is reported once per run through [`AdvisoryFlags`].

use std::fmt;

use thiserror::Error;

/// Mass domain a pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Water,
    Carbon,
    Nitrogen,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Water => "water",
            Domain::Carbon => "carbon",
            Domain::Nitrogen => "nitrogen",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum BgcError {
    /// A pool went negative, a layer exceeded saturation or a balance drifted.
    #[error(
        "{domain} invariant violated in `{pool}`{}{}: value {value:e}",
        layer_suffix(.layer),
        day_suffix(.day)
    )]
    InvariantViolation {
        domain: Domain,
        pool: String,
        layer: Option<usize>,
        value: f64,
        day: Option<usize>,
    },

    /// A solver was asked to work outside its valid domain.
    #[error("numerical domain failure in {routine}{}: {detail}", day_suffix(.day))]
    NumericalDomain {
        routine: &'static str,
        detail: String,
        day: Option<usize>,
    },

    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    #[error("invalid forcing: {0}")]
    Forcing(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type BgcResult<T> = Result<T, BgcError>;

fn layer_suffix(layer: &Option<usize>) -> String {
    layer.map(|l| format!(" (layer {l})")).unwrap_or_default()
}

fn day_suffix(day: &Option<usize>) -> String {
    day.map(|d| format!(" on day {d}")).unwrap_or_default()
}

impl BgcError {
    pub fn invariant(domain: Domain, pool: impl Into<String>, layer: Option<usize>, value: f64) -> Self {
        BgcError::InvariantViolation {
            domain,
            pool: pool.into(),
            layer,
            value,
            day: None,
        }
    }

    pub fn numerical(routine: &'static str, detail: impl Into<String>) -> Self {
        BgcError::NumericalDomain {
            routine,
            detail: detail.into(),
            day: None,
        }
    }

    pub fn invalid_param(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        BgcError::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Attach the simulation day to errors raised inside a daily routine.
    pub fn on_day(self, d: usize) -> Self {
        match self {
            BgcError::InvariantViolation {
                domain,
                pool,
                layer,
                value,
                ..
            } => BgcError::InvariantViolation {
                domain,
                pool,
                layer,
                value,
                day: Some(d),
            },
            BgcError::NumericalDomain { routine, detail, .. } => BgcError::NumericalDomain {
                routine,
                detail,
                day: Some(d),
            },
            other => other,
        }
    }
}

/// One-shot advisories for soft limiting.
///
/// Each flag is raised at most once per run; the first raise logs a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvisoryFlags {
    pub evaporation_limited: bool,
    pub transpiration_limited: bool,
    pub leaching_limited: bool,
    pub mr_deficit_unmet: bool,
    pub richards_min_step: bool,
    pub cn_drift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    EvaporationLimited,
    TranspirationLimited,
    LeachingLimited,
    MrDeficitUnmet,
    RichardsMinStep,
    CnDrift,
}

impl AdvisoryFlags {
    /// Raise an advisory. Returns `true` only the first time.
    pub fn raise(&mut self, advisory: Advisory) -> bool {
        let (flag, message) = match advisory {
            Advisory::EvaporationLimited => (
                &mut self.evaporation_limited,
                "soil evaporation demand capped by available water",
            ),
            Advisory::TranspirationLimited => (
                &mut self.transpiration_limited,
                "transpiration demand capped by available water",
            ),
            Advisory::LeachingLimited => (
                &mut self.leaching_limited,
                "solute leaching capped by mobile pool",
            ),
            Advisory::MrDeficitUnmet => (
                &mut self.mr_deficit_unmet,
                "maintenance respiration reduced: no plant carbon left to cover the deficit",
            ),
            Advisory::RichardsMinStep => (
                &mut self.richards_min_step,
                "Richards sub-step reached its lower bound before meeting the VWC tolerance",
            ),
            Advisory::CnDrift => (
                &mut self.cn_drift,
                "C:N drift repaired in a fixed-ratio pool",
            ),
        };
        if *flag {
            return false;
        }
        *flag = true;
        log::warn!("{message} (further occurrences suppressed)");
        true
    }
}
