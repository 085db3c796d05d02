//! The only code that writes state.
//!
//! Each routine consumes one group of daily flux aggregates and commits
//! it to the pools together with the matching source and sink counters,
//! so that `sources - sinks - storage` stays constant.

pub mod carbon_nitrogen;
pub mod precision;
pub mod water;

pub use carbon_nitrogen::{apply_disturbance, apply_transport, daily_cn_state_update};
pub use precision::{check_non_negative, cn_ratio_control, precision_control};
pub use water::daily_water_state_update;

use crate::state::{SoilCarbon, SoilNitrogen, N_CUTDOWN, N_LITTER};

/// Litter and coarse debris of one soil layer, for either element.
pub(crate) trait DeadOrganic {
    fn litter_mut(&mut self) -> &mut [f64; N_LITTER];
    fn cwd_mut(&mut self) -> &mut f64;

    /// Add four litter classes plus debris.
    fn add_dead(&mut self, amounts: &[f64; N_CUTDOWN]) {
        for (p, a) in self.litter_mut().iter_mut().zip(amounts) {
            *p += a;
        }
        *self.cwd_mut() += amounts[N_LITTER];
    }
}

impl DeadOrganic for SoilCarbon {
    fn litter_mut(&mut self) -> &mut [f64; N_LITTER] {
        &mut self.litter
    }

    fn cwd_mut(&mut self) -> &mut f64 {
        &mut self.cwd
    }
}

impl DeadOrganic for SoilNitrogen {
    fn litter_mut(&mut self) -> &mut [f64; N_LITTER] {
        &mut self.litter
    }

    fn cwd_mut(&mut self) -> &mut f64 {
        &mut self.cwd
    }
}

pub(crate) fn add_dead_by_layer<T: DeadOrganic>(layers: &mut [T], inputs: &[[f64; N_CUTDOWN]]) {
    for (layer, amounts) in layers.iter_mut().zip(inputs) {
        layer.add_dead(amounts);
    }
}
