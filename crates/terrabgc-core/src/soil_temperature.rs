//! Daily soil temperature profile.
//!
//! The surface follows the trailing mean air temperature, damped under
//! snow; deeper layers relax exponentially toward the annual mean.

use crate::epv::EcophysVariables;
use crate::forcing::MetVariables;
use crate::params::SoilProfile;

/// Snow water (kg/m2) at which the surface is fully insulated.
const SNOW_FULL_INSULATION: f64 = 100.0;

pub fn soil_temperature(
    met: &MetVariables,
    snoww: f64,
    soil: &SoilProfile,
    epv: &mut EcophysVariables,
) {
    let insulation = (snoww / SNOW_FULL_INSULATION).clamp(0.0, 1.0);
    let mut surface = met.tavg_ra;
    if surface < 0.0 {
        surface *= 1.0 - insulation;
    }
    for (t, layer) in epv.tsoil.iter_mut().zip(&soil.layers) {
        let damping = (-layer.depth_mid / soil.temp_damping_depth).exp();
        *t = met.tannual + (surface - met.tannual) * damping;
    }
}
