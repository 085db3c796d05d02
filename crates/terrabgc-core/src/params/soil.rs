//! Soil profile: per-layer geometry, texture-derived hydraulics and
//! soil biogeochemistry constants.
//!
//! Hydraulic properties follow the Campbell water-retention curve with
//! Cosby-style pedotransfer functions from sand, silt and clay content.

use serde::{Deserialize, Serialize};

use super::{check_positive, check_range};
use crate::constants::{G_STD, SECONDS_PER_DAY, WATER_DENSITY};
use crate::error::{BgcError, BgcResult};
use crate::layers::LayerArray;

/// Matric potential at field capacity (MPa).
pub const PSI_FC: f64 = -0.015;
/// Matric potential at wilting point (MPa).
pub const PSI_WP: f64 = -1.5;
/// Matric potential of hygroscopic water (MPa).
pub const PSI_HW: f64 = -10.0;

/// Default layer thicknesses (m), 10 m total.
pub const DEFAULT_THICKNESS: [f64; 10] = [0.03, 0.07, 0.2, 0.3, 0.3, 0.3, 0.3, 0.5, 2.0, 6.0];

/// One layer as configured. Texture is in percent; any derived
/// retention point can be overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilLayerConfig {
    pub thickness: f64,
    pub sand: f64,
    pub silt: f64,
    pub clay: f64,
    pub ph: f64,
    pub bulk_density: Option<f64>,
    pub vwc_sat: Option<f64>,
    pub vwc_fc: Option<f64>,
    pub vwc_wp: Option<f64>,
    pub vwc_hw: Option<f64>,
}

impl Default for SoilLayerConfig {
    fn default() -> Self {
        Self {
            thickness: 0.3,
            sand: 40.0,
            silt: 40.0,
            clay: 20.0,
            ph: 6.5,
            bulk_density: None,
            vwc_sat: None,
            vwc_fc: None,
            vwc_wp: None,
            vwc_hw: None,
        }
    }
}

/// Biogeochemical constants of the soil column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilBgcParams {
    /// Plant-available and leachable shares of mineral and dissolved N.
    pub mobile_nh4: f64,
    pub mobile_no3: f64,
    pub mobile_dom: f64,
    /// Nitrification rate at optimum (1/day).
    pub nitrif_rate: f64,
    /// Nitrified N lost as N2O.
    pub nitrif_n2o: f64,
    /// Denitrification rate at saturation (1/day).
    pub denit_rate: f64,
    /// WFPS above which denitrification starts.
    pub denit_wfps: f64,
    /// Share of gross mineralization volatilized.
    pub nvol_prop: f64,
    /// Share of litter and SOM transfers released as dissolved organic matter.
    pub dom_share: f64,
    /// Depth attenuation of decomposition rates (1/m).
    pub decomp_depth_coeff: f64,
    /// Moisture scalar at saturation.
    pub decomp_wet_floor: f64,
    /// Fragmentation rate of coarse woody debris (1/day).
    pub kfrag: f64,
    pub ch4: Ch4Params,
}

impl Default for SoilBgcParams {
    fn default() -> Self {
        Self {
            mobile_nh4: 0.1,
            mobile_no3: 1.0,
            mobile_dom: 1.0,
            nitrif_rate: 0.1,
            nitrif_n2o: 0.02,
            denit_rate: 0.05,
            denit_wfps: 0.55,
            nvol_prop: 0.01,
            dom_share: 0.02,
            decomp_depth_coeff: 0.8,
            decomp_wet_floor: 0.3,
            kfrag: 0.001,
            ch4: Ch4Params::default(),
        }
    }
}

/// Empirical soil CH4 exchange constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ch4Params {
    /// Maximum methanotrophic uptake (kgC/m2/day).
    pub uptake_max: f64,
    /// Maximum methanogenic emission (kgC/m2/day).
    pub emission_max: f64,
    /// WFPS above which emission starts.
    pub emission_wfps: f64,
    /// Bulk density range over which uptake falls to zero (g/cm3).
    pub bd_min: f64,
    pub bd_max: f64,
    pub q10: f64,
    /// Depth of the exchanging soil (m).
    pub depth: f64,
}

impl Default for Ch4Params {
    fn default() -> Self {
        Self {
            uptake_max: 2e-6,
            emission_max: 5e-5,
            emission_wfps: 0.85,
            bd_min: 0.8,
            bd_max: 1.8,
            q10: 2.0,
            depth: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilConfig {
    pub layers: Vec<SoilLayerConfig>,
    /// SCS curve number; 0 disables surface runoff generation.
    pub curve_number: f64,
    /// Maximum pond depth (kg/m2).
    pub pond_max: f64,
    /// Groundwater table depth (m); `None` keeps the free-drainage bottom.
    pub groundwater_depth: Option<f64>,
    /// Daily capillary rise as a share of the field-capacity deficit.
    pub capillary_rise: f64,
    /// Damping depth of the soil temperature wave (m).
    pub temp_damping_depth: f64,
    pub bgc: SoilBgcParams,
}

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            layers: DEFAULT_THICKNESS
                .iter()
                .map(|&thickness| SoilLayerConfig {
                    thickness,
                    ..SoilLayerConfig::default()
                })
                .collect(),
            curve_number: 70.0,
            pond_max: 10.0,
            groundwater_depth: None,
            capillary_rise: 0.1,
            temp_damping_depth: 2.0,
            bgc: SoilBgcParams::default(),
        }
    }
}

/// A fully resolved soil layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilLayer {
    pub thickness: f64,
    pub depth_top: f64,
    pub depth_mid: f64,
    pub depth_bottom: f64,
    pub sand: f64,
    pub silt: f64,
    pub clay: f64,
    pub ph: f64,
    /// Bulk density (g/cm3).
    pub bulk_density: f64,
    pub vwc_sat: f64,
    pub vwc_fc: f64,
    pub vwc_wp: f64,
    pub vwc_hw: f64,
    /// Saturated matric potential (MPa, negative).
    pub psi_sat: f64,
    /// Campbell retention exponent.
    pub soil_b: f64,
    /// Saturated hydraulic conductivity (m/s).
    pub ksat: f64,
    /// Share of water above field capacity that drains in one day.
    pub drain_coef: f64,
}

impl SoilLayer {
    fn from_config(cfg: &SoilLayerConfig, depth_top: f64, index: usize) -> BgcResult<Self> {
        let name = |field: &str| format!("soil.layers[{index}].{field}");
        check_positive(&name("thickness"), cfg.thickness)?;
        check_range(&name("sand"), cfg.sand, 0.0, 100.0)?;
        check_range(&name("silt"), cfg.silt, 0.0, 100.0)?;
        check_range(&name("clay"), cfg.clay, 0.0, 100.0)?;
        check_range(&name("ph"), cfg.ph, 2.0, 11.0)?;
        let texture = cfg.sand + cfg.silt + cfg.clay;
        if (texture - 100.0).abs() > 1.0 {
            return Err(BgcError::invalid_param(
                name("texture"),
                texture,
                "sand, silt and clay must sum to 100",
            ));
        }

        let psi_sat = -((1.54 - 0.0095 * cfg.sand + 0.0063 * cfg.silt) * std::f64::consts::LN_10)
            .exp()
            * 9.8e-5;
        let soil_b = 3.10 + 0.157 * cfg.clay - 0.003 * cfg.sand;
        let ksat = 7.05556e-6 * 10f64.powf(-0.6 + 0.0126 * cfg.sand - 0.0064 * cfg.clay);
        let vwc_sat = cfg
            .vwc_sat
            .unwrap_or((50.5 - 0.142 * cfg.sand - 0.037 * cfg.clay) / 100.0);
        let at = |psi: f64| vwc_sat * (psi / psi_sat).powf(-1.0 / soil_b);
        let vwc_fc = cfg.vwc_fc.unwrap_or_else(|| at(PSI_FC));
        let vwc_wp = cfg.vwc_wp.unwrap_or_else(|| at(PSI_WP));
        let vwc_hw = cfg.vwc_hw.unwrap_or_else(|| at(PSI_HW));
        if !(0.0 < vwc_hw && vwc_hw < vwc_wp && vwc_wp < vwc_fc && vwc_fc < vwc_sat && vwc_sat < 1.0)
        {
            return Err(BgcError::invalid_param(
                name("vwc_fc"),
                vwc_fc,
                format!(
                    "retention points must satisfy 0 < hw ({vwc_hw:.3}) < wp ({vwc_wp:.3}) \
                     < fc < sat ({vwc_sat:.3}) < 1"
                ),
            ));
        }
        let bulk_density = cfg.bulk_density.unwrap_or((1.0 - vwc_sat) * 2.65);
        check_range(&name("bulk_density"), bulk_density, 0.1, 2.65)?;
        let drain_coef = (0.15 + 0.005 * cfg.sand).clamp(0.1, 0.85);

        Ok(Self {
            thickness: cfg.thickness,
            depth_top,
            depth_mid: depth_top + 0.5 * cfg.thickness,
            depth_bottom: depth_top + cfg.thickness,
            sand: cfg.sand,
            silt: cfg.silt,
            clay: cfg.clay,
            ph: cfg.ph,
            bulk_density,
            vwc_sat,
            vwc_fc,
            vwc_wp,
            vwc_hw,
            psi_sat,
            soil_b,
            ksat,
            drain_coef,
        })
    }

    /// Water mass (kg/m2) held at a given VWC.
    pub fn water_at(&self, vwc: f64) -> f64 {
        vwc * self.thickness * WATER_DENSITY
    }

    pub fn sat_water(&self) -> f64 {
        self.water_at(self.vwc_sat)
    }

    pub fn fc_water(&self) -> f64 {
        self.water_at(self.vwc_fc)
    }

    pub fn wp_water(&self) -> f64 {
        self.water_at(self.vwc_wp)
    }

    pub fn hw_water(&self) -> f64 {
        self.water_at(self.vwc_hw)
    }

    pub fn vwc(&self, soilw: f64) -> f64 {
        soilw / (self.thickness * WATER_DENSITY)
    }

    fn relative(&self, vwc: f64) -> f64 {
        (vwc / self.vwc_sat).clamp(1e-6, 1.0)
    }

    /// Matric potential (MPa) at a given VWC.
    pub fn psi(&self, vwc: f64) -> f64 {
        self.psi_sat * self.relative(vwc).powf(-self.soil_b)
    }

    /// Unsaturated hydraulic conductivity (m/s).
    pub fn conductivity(&self, vwc: f64) -> f64 {
        self.ksat * self.relative(vwc).powf(2.0 * self.soil_b + 3.0)
    }

    /// Soil water diffusivity (m2/s).
    pub fn diffusivity(&self, vwc: f64) -> f64 {
        let psi_sat_head = self.psi_sat.abs() * 1e6 / (WATER_DENSITY * G_STD);
        self.soil_b * self.ksat * psi_sat_head / self.vwc_sat
            * self.relative(vwc).powf(self.soil_b + 2.0)
    }

    /// Largest daily drainage the saturated conductivity allows (kg/m2).
    pub fn max_daily_drainage(&self) -> f64 {
        self.ksat * SECONDS_PER_DAY * WATER_DENSITY
    }
}

/// The resolved soil column.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilProfile {
    pub layers: LayerArray<SoilLayer>,
    pub curve_number: f64,
    pub pond_max: f64,
    pub groundwater_depth: Option<f64>,
    pub capillary_rise: f64,
    pub temp_damping_depth: f64,
    pub bgc: SoilBgcParams,
}

impl SoilProfile {
    pub fn build(cfg: &SoilConfig) -> BgcResult<Self> {
        if cfg.layers.is_empty() {
            return Err(BgcError::invalid_param(
                "soil.layers",
                0.0,
                "at least one layer is required",
            ));
        }
        let mut layers = LayerArray::with_capacity(cfg.layers.len());
        let mut depth = 0.0;
        for (i, lc) in cfg.layers.iter().enumerate() {
            let layer = SoilLayer::from_config(lc, depth, i)?;
            depth = layer.depth_bottom;
            layers.push(layer);
        }
        check_range("soil.curve_number", cfg.curve_number, 0.0, 100.0)?;
        check_range("soil.pond_max", cfg.pond_max, 0.0, 1000.0)?;
        check_range("soil.capillary_rise", cfg.capillary_rise, 0.0, 1.0)?;
        check_positive("soil.temp_damping_depth", cfg.temp_damping_depth)?;
        if let Some(gw) = cfg.groundwater_depth {
            check_range("soil.groundwater_depth", gw, 0.0, f64::MAX)?;
        }
        let b = &cfg.bgc;
        for (name, v) in [
            ("mobile_nh4", b.mobile_nh4),
            ("mobile_no3", b.mobile_no3),
            ("mobile_dom", b.mobile_dom),
            ("nitrif_rate", b.nitrif_rate),
            ("nitrif_n2o", b.nitrif_n2o),
            ("denit_rate", b.denit_rate),
            ("denit_wfps", b.denit_wfps),
            ("nvol_prop", b.nvol_prop),
            ("dom_share", b.dom_share),
            ("decomp_wet_floor", b.decomp_wet_floor),
            ("kfrag", b.kfrag),
        ] {
            check_range(&format!("soil.bgc.{name}"), v, 0.0, 1.0)?;
        }
        check_range("soil.bgc.decomp_depth_coeff", b.decomp_depth_coeff, 0.0, 50.0)?;
        if b.ch4.bd_max <= b.ch4.bd_min {
            return Err(BgcError::invalid_param(
                "soil.bgc.ch4.bd_max",
                b.ch4.bd_max,
                "must exceed bd_min",
            ));
        }
        Ok(Self {
            layers,
            curve_number: cfg.curve_number,
            pond_max: cfg.pond_max,
            groundwater_depth: cfg.groundwater_depth,
            capillary_rise: cfg.capillary_rise,
            temp_damping_depth: cfg.temp_damping_depth,
            bgc: cfg.bgc.clone(),
        })
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn total_depth(&self) -> f64 {
        self.layers.last().map(|l| l.depth_bottom).unwrap_or(0.0)
    }

    /// Index of the first layer held saturated by groundwater, if any.
    pub fn groundwater_layer(&self) -> Option<usize> {
        let gw = self.groundwater_depth?;
        self.layers.iter().position(|l| l.depth_mid >= gw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn loam() -> SoilLayer {
        SoilLayer::from_config(&SoilLayerConfig::default(), 0.0, 0).unwrap()
    }

    #[test]
    fn loam_retention_points_are_ordered() {
        let l = loam();
        assert!(l.vwc_hw < l.vwc_wp);
        assert!(l.vwc_wp < l.vwc_fc);
        assert!(l.vwc_fc < l.vwc_sat);
        assert_relative_eq!(l.vwc_sat, 0.4408, epsilon = 1e-4);
        assert!((l.vwc_fc - 0.33).abs() < 0.01);
        assert!((l.vwc_wp - 0.155).abs() < 0.01);
    }

    #[test]
    fn psi_round_trips_retention_points() {
        let l = loam();
        assert_relative_eq!(l.psi(l.vwc_fc), PSI_FC, epsilon = 1e-9);
        assert_relative_eq!(l.psi(l.vwc_wp), PSI_WP, epsilon = 1e-9);
    }

    #[test]
    fn conductivity_is_ksat_at_saturation() {
        let l = loam();
        assert_relative_eq!(l.conductivity(l.vwc_sat), l.ksat);
        assert!(l.conductivity(l.vwc_fc) < 1e-2 * l.ksat);
    }

    #[test]
    fn default_profile_is_ten_meters() {
        let p = SoilProfile::build(&SoilConfig::default()).unwrap();
        assert_eq!(p.n_layers(), 10);
        assert_relative_eq!(p.total_depth(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(p.layers[2].depth_top, 0.1, epsilon = 1e-12);
        assert_relative_eq!(p.layers[2].depth_mid, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn override_replaces_derived_value() {
        let cfg = SoilLayerConfig {
            vwc_fc: Some(0.3),
            ..SoilLayerConfig::default()
        };
        let l = SoilLayer::from_config(&cfg, 0.0, 0).unwrap();
        assert_eq!(l.vwc_fc, 0.3);
    }

    #[test]
    fn rejects_unordered_overrides() {
        let cfg = SoilLayerConfig {
            vwc_wp: Some(0.4),
            ..SoilLayerConfig::default()
        };
        assert!(SoilLayer::from_config(&cfg, 0.0, 0).is_err());
    }

    #[test]
    fn rejects_bad_texture() {
        let cfg = SoilLayerConfig {
            sand: 60.0,
            ..SoilLayerConfig::default()
        };
        assert!(SoilLayer::from_config(&cfg, 0.0, 0).is_err());
    }

    #[test]
    fn groundwater_layer_lookup() {
        let cfg = SoilConfig {
            groundwater_depth: Some(1.5),
            ..SoilConfig::default()
        };
        let p = SoilProfile::build(&cfg).unwrap();
        // mid-depths: ..., layer 7 at 1.75
        assert_eq!(p.groundwater_layer(), Some(7));
    }
}
