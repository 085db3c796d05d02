//! Day-to-day mass balance diagnostics.
//!
//! The balance of a domain is `sources - sinks - storage`. With every flux
//! booked, it only changes by rounding, so the day-to-day change measures
//! how complete the flux accounting is. The first day only records a
//! reference value.

use log::warn;

use crate::error::{BgcError, BgcResult, Domain};
use crate::state::{CarbonState, NitrogenState, WaterState};

pub fn water_balance(ws: &WaterState) -> f64 {
    ws.src.total() - ws.snk.total() - ws.storage_total()
}

pub fn carbon_balance(cs: &CarbonState) -> f64 {
    cs.src.total() - cs.snk.total() - cs.storage_total()
}

pub fn nitrogen_balance(ns: &NitrogenState) -> f64 {
    ns.src.total() - ns.snk.total() - ns.storage_total()
}

/// Carried balance state of one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceTracker {
    pub domain: Domain,
    pub tolerance: f64,
    previous: Option<f64>,
    max_error: f64,
    warned: bool,
}

impl BalanceTracker {
    pub fn new(domain: Domain, tolerance: f64) -> Self {
        Self {
            domain,
            tolerance,
            previous: None,
            max_error: 0.0,
            warned: false,
        }
    }

    /// Record today's balance and return its change since yesterday.
    ///
    /// Drift beyond the tolerance is an error when `strict` is set and a
    /// one-time warning otherwise.
    pub fn check(&mut self, balance: f64, strict: bool) -> BgcResult<f64> {
        let Some(previous) = self.previous.replace(balance) else {
            return Ok(0.0);
        };
        let delta = balance - previous;
        self.max_error = self.max_error.max(delta.abs());
        if delta.abs() > self.tolerance || delta.is_nan() {
            if strict {
                return Err(BgcError::invariant(self.domain, "balance", None, delta));
            }
            if !self.warned {
                self.warned = true;
                warn!(
                    "{} balance drifted by {delta:e} (tolerance {:e}); further drift suppressed",
                    self.domain, self.tolerance
                );
            }
        }
        Ok(delta)
    }

    pub fn is_first_day(&self) -> bool {
        self.previous.is_none()
    }

    /// Largest day-to-day change seen so far.
    pub fn max_error(&self) -> f64 {
        self.max_error
    }
}
