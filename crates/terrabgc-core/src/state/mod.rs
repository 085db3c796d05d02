//! Conserved state pools, owned by the simulation and written only by
//! the update routines.

pub mod carbon;
pub mod nitrogen;
pub mod tissue;
pub mod water;

pub use carbon::{CarbonSinks, CarbonSources, CarbonState, SoilCarbon};
pub use nitrogen::{NitrogenSinks, NitrogenSources, NitrogenState, SoilNitrogen};
pub use tissue::{PlantPools, SubPool, Tissue, TissuePools};
pub use water::{WaterSinks, WaterSources, WaterState};

/// Number of litter quality classes: labile, unshielded cellulose,
/// shielded cellulose, lignin.
pub const N_LITTER: usize = 4;
/// Number of SOM pools: labile, fast, slow, stable.
pub const N_SOM: usize = 4;
/// Cut-down dead biomass: four litter classes plus coarse woody debris.
pub const N_CUTDOWN: usize = N_LITTER + 1;
