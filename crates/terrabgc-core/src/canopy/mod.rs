//! Canopy radiation, stomatal conductance, photosynthesis and the
//! Penman-Monteith energy balance.

pub mod conductance;
pub mod penmon;
pub mod photosynthesis;
pub mod radtrans;

pub use conductance::conduct_calc;
pub use penmon::{canopy_et, penmon, potential_evap, PmInput};
pub use photosynthesis::{photosynthesis, total_photosynthesis, PsnInput, PsnOutput};
pub use radtrans::{radtrans, sunshade_lai};
