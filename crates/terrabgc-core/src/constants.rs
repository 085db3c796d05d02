//! Physical constants, unit conversions and numerical thresholds.

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Standard gravitational acceleration (m/s2).
pub const G_STD: f64 = 9.80665;
/// Standard sea-level pressure (Pa).
pub const P_STD: f64 = 101_325.0;
/// Standard sea-level temperature (K).
pub const T_STD: f64 = 288.15;
/// Standard temperature lapse rate (K/m).
pub const LR_STD: f64 = 0.0065;
/// Molecular weight of air (kg/mol).
pub const MA: f64 = 28.9644e-3;
/// Gas law constant (m3 Pa / mol K).
pub const R_GAS: f64 = 8.3143;
/// Specific heat of air (J/kg K).
pub const CP: f64 = 1010.0;
/// Stefan-Boltzmann constant (W/m2 K4).
pub const SBC: f64 = 5.67e-8;
/// Ratio of molecular weights, water over dry air.
pub const EPS: f64 = 0.6219;
/// Density of liquid water (kg/m3).
pub const WATER_DENSITY: f64 = 1000.0;
pub const TK_OFFSET: f64 = 273.15;

/// PAR share of incident shortwave.
pub const RAD2PAR: f64 = 0.45;
/// PAR photon content (umol/J).
pub const EPAR: f64 = 4.55;
/// Mass of one umol of carbon (kg).
pub const UMOL_C_TO_KG: f64 = 12.011e-9;
/// Incoming precipitation is in cm; state works in kg/m2.
pub const PRCP_CM_TO_KG: f64 = 10.0;
/// Atmospheric O2 mole fraction.
pub const O2_FRACTION: f64 = 0.21;

/// Lower bound below which a pool counts as negative.
pub const CRIT_PREC: f64 = 1e-12;
/// Carbon pools below this are zeroed by precision control.
pub const CRIT_PREC_C: f64 = 1e-7;
/// Nitrogen-only pools below this are zeroed by precision control.
pub const CRIT_PREC_N: f64 = 1e-8;
/// Surface water stores below this are zeroed by precision control.
pub const CRIT_PREC_WATER: f64 = 1e-14;
/// Allowed overshoot above saturation (kg/m2).
pub const SAT_PREC: f64 = 1e-6;

pub const WATER_BALANCE_TOL: f64 = 1e-4;
pub const CN_BALANCE_TOL: f64 = 1e-8;

/// Drift beyond which a fixed-ratio pool is reported as repaired.
pub const CN_DRIFT_WARN: f64 = 1e-6;

/// Growth respiration per unit of new tissue carbon.
pub const GRPERC: f64 = 0.3;
/// Share of growth respiration paid on the day of allocation.
pub const GRPNOW: f64 = 1.0;
