//! terrabgc: daily-timestep ecosystem biogeochemistry.
//!
//! Re-exports the engine from `terrabgc-core`.

pub use terrabgc_core::*;
