//! Run-constant parameters: plant functional type, site and soil profile.

pub mod epc;
pub mod initial;
pub mod site;
pub mod soil;

pub use epc::{
    AllocationRatios, CardinalTemps, EcophysConstants, LitterFractions, LitterPartition,
    PhenologyType, PhotosyntheticPathway, PlantForm,
};
pub use initial::InitialConditions;
pub use site::SiteConstants;
pub use soil::{SoilBgcParams, SoilLayer, SoilProfile};

use crate::error::{BgcError, BgcResult};

/// Check that `value` lies in `[min, max]`.
pub(crate) fn check_range(name: &str, value: f64, min: f64, max: f64) -> BgcResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(BgcError::invalid_param(
            name,
            value,
            format!("out of bounds [{min}, {max}]"),
        ));
    }
    Ok(())
}

pub(crate) fn check_positive(name: &str, value: f64) -> BgcResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BgcError::invalid_param(name, value, "must be positive"));
    }
    Ok(())
}
