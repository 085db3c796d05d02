//! Site-level constants that do not vary by soil layer.

use serde::{Deserialize, Serialize};

use super::{check_positive, check_range};
use crate::constants::{G_STD, LR_STD, MA, P_STD, R_GAS, T_STD};
use crate::error::BgcResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConstants {
    /// Elevation (m).
    pub elevation: f64,
    /// Shortwave albedo.
    pub sw_albedo: f64,
    /// Atmospheric CO2 (ppm).
    pub co2: f64,
    /// Annual N deposition (kgN/m2/yr).
    pub ndep: f64,
    /// Share of deposition arriving as NH4.
    pub ndep_nh4_share: f64,
    /// Annual symbiotic plus asymbiotic N fixation (kgN/m2/yr).
    pub nfix: f64,
}

impl Default for SiteConstants {
    fn default() -> Self {
        Self {
            elevation: 250.0,
            sw_albedo: 0.2,
            co2: 380.0,
            ndep: 0.0008,
            ndep_nh4_share: 0.5,
            nfix: 0.0004,
        }
    }
}

impl SiteConstants {
    /// Air pressure (Pa) from elevation with the standard atmosphere.
    pub fn air_pressure(&self) -> f64 {
        let t1 = 1.0 - (LR_STD * self.elevation) / T_STD;
        let t2 = G_STD / (LR_STD * (R_GAS / MA));
        P_STD * t1.powf(t2)
    }

    pub fn validate(&self) -> BgcResult<()> {
        check_range("elevation", self.elevation, -500.0, 9000.0)?;
        check_range("sw_albedo", self.sw_albedo, 0.0, 1.0)?;
        check_positive("co2", self.co2)?;
        check_range("ndep", self.ndep, 0.0, 1.0)?;
        check_range("ndep_nh4_share", self.ndep_nh4_share, 0.0, 1.0)?;
        check_range("nfix", self.nfix, 0.0, 1.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sea_level_pressure_is_standard() {
        let site = SiteConstants {
            elevation: 0.0,
            ..SiteConstants::default()
        };
        assert_relative_eq!(site.air_pressure(), P_STD, epsilon = 1e-9);
    }

    #[test]
    fn pressure_drops_with_elevation() {
        let low = SiteConstants::default();
        let high = SiteConstants {
            elevation: 2000.0,
            ..SiteConstants::default()
        };
        assert!(high.air_pressure() < low.air_pressure());
        // roughly 79.5 kPa at 2000 m
        assert!((high.air_pressure() - 79_500.0).abs() < 500.0);
    }

    #[test]
    fn rejects_albedo_above_one() {
        let site = SiteConstants {
            sw_albedo: 1.5,
            ..SiteConstants::default()
        };
        assert!(site.validate().is_err());
    }
}
