use super::evaporation::actual_evaporation;
use super::groundwater::groundwater;
use super::pond::{pond_and_runoff, pond_infiltration, surface_runoff};
use super::transpiration::multilayer_transpiration;
use super::{ColumnDemand, HydrologyScheme};
use crate::constants::{CRIT_PREC, SAT_PREC};
use crate::epv::EcophysVariables;
use crate::error::{Advisory, AdvisoryFlags, BgcError, BgcResult, Domain};
use crate::flux::WaterFlux;
use crate::params::SoilProfile;
use crate::state::WaterState;

/// Soil-side hydrology for one day.
///
/// Expects interception, snow, canopy evaporation and the potential
/// evaporation and transpiration to be set in `wf` already. Resolves pond
/// evaporation, runoff, soil evaporation and transpiration, runs the
/// transport scheme, spills the pond, adds groundwater and finally holds
/// the bottom layer at field capacity unless a water table is configured.
pub fn multilayer_hydrolprocess(
    ws: &WaterState,
    soil: &SoilProfile,
    scheme: &dyn HydrologyScheme,
    epv: &mut EcophysVariables,
    wf: &mut WaterFlux,
    flags: &mut AdvisoryFlags,
) -> BgcResult<()> {
    surface_runoff(soil, wf);
    let evaporation = actual_evaporation(
        ws.pondw,
        ws.soilw[0],
        &soil.layers[0],
        epv,
        wf,
        flags,
    );
    pond_infiltration(ws.pondw, wf);
    let transpiration = multilayer_transpiration(wf.pot_trans, &ws.soilw, soil, epv, flags);

    let mut w = ws.soilw.clone();
    let demand = ColumnDemand {
        infiltration: wf.infiltration(),
        evaporation,
        transpiration: &transpiration,
    };
    let report = scheme.redistribute(soil, &demand, &mut w, wf)?;
    epv.richards_substeps = report.substeps;
    if report.min_step_limited {
        flags.raise(Advisory::RichardsMinStep);
    }

    pond_and_runoff(ws.pondw, soil, wf);
    groundwater(soil, &mut w, wf);

    if soil.groundwater_layer().is_none() {
        let last = w.len() - 1;
        let fc = soil.layers[last].fc_water();
        let excess = w[last] - fc;
        if excess > 0.0 {
            // drained water leaves as percolation so solutes go with it
            wf.soilw_percolation[last] += excess;
        } else {
            wf.soilw_from_boundary = -excess;
        }
        w[last] = fc;
    }

    for (l, layer) in soil.layers.iter().enumerate() {
        if w[l] < -CRIT_PREC {
            return Err(BgcError::invariant(Domain::Water, "soilw", Some(l), w[l]));
        }
        if w[l] > layer.sat_water() + SAT_PREC {
            return Err(BgcError::invariant(
                Domain::Water,
                "soilw above saturation",
                Some(l),
                w[l] - layer.sat_water(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HydrologyMode, RichardsControl};
    use crate::hydrology::resolve_scheme;
    use crate::params::soil::{SoilConfig, SoilLayerConfig};
    use crate::update::daily_water_state_update;
    use approx::assert_relative_eq;

    fn three_layers() -> SoilProfile {
        let layer = |thickness| SoilLayerConfig {
            thickness,
            ..SoilLayerConfig::default()
        };
        SoilProfile::build(&SoilConfig {
            layers: vec![layer(0.3), layer(0.3), layer(1.0)],
            curve_number: 0.0,
            ..SoilConfig::default()
        })
        .unwrap()
    }

    /// Drain a column with a saturated top layer for `days` without input
    /// or evapotranspiration.
    fn drain(soil: &SoilProfile, mode: HydrologyMode, days: usize) -> WaterState {
        let scheme = resolve_scheme(mode, &RichardsControl::default());
        let n = soil.n_layers();
        let mut ws = WaterState::new(n);
        for (w, l) in ws.soilw.iter_mut().zip(&soil.layers) {
            *w = l.fc_water();
        }
        ws.soilw[0] = soil.layers[0].sat_water();
        let mut epv = EcophysVariables::new(n);
        let mut flags = AdvisoryFlags::default();
        let mut wf = WaterFlux::new(n);
        for _ in 0..days {
            wf.reset();
            multilayer_hydrolprocess(&ws, soil, scheme.as_ref(), &mut epv, &mut wf, &mut flags)
                .unwrap();
            daily_water_state_update(&wf, &mut ws);
        }
        ws
    }

    #[test]
    fn bottom_layer_is_held_at_field_capacity() {
        let soil = SoilProfile::build(&SoilConfig::default()).unwrap();
        let mut ws = WaterState::new(soil.n_layers());
        for (w, l) in ws.soilw.iter_mut().zip(&soil.layers) {
            *w = l.wp_water();
        }
        let mut epv = EcophysVariables::new(soil.n_layers());
        let mut wf = WaterFlux::new(soil.n_layers());
        let mut flags = AdvisoryFlags::default();
        let scheme = resolve_scheme(HydrologyMode::Tipping, &RichardsControl::default());
        multilayer_hydrolprocess(&ws, &soil, scheme.as_ref(), &mut epv, &mut wf, &mut flags)
            .unwrap();
        let last = &soil.layers[9];
        assert!(wf.soilw_from_boundary > 0.0);
        assert!(wf.soilw_from_boundary <= last.fc_water() - last.wp_water() + 1e-9);
    }

    #[test]
    fn wet_bottom_layer_drains_as_percolation() {
        let soil = three_layers();
        let mut ws = WaterState::new(3);
        for (w, l) in ws.soilw.iter_mut().zip(&soil.layers) {
            *w = l.sat_water();
        }
        let mut epv = EcophysVariables::new(3);
        let mut wf = WaterFlux::new(3);
        let mut flags = AdvisoryFlags::default();
        let scheme = resolve_scheme(HydrologyMode::Tipping, &RichardsControl::default());
        multilayer_hydrolprocess(&ws, &soil, scheme.as_ref(), &mut epv, &mut wf, &mut flags)
            .unwrap();
        assert_eq!(wf.soilw_from_boundary, 0.0);
        assert!(wf.deep_percolation() > 0.0);

        daily_water_state_update(&wf, &mut ws);
        assert_relative_eq!(ws.soilw[2], soil.layers[2].fc_water(), epsilon = 1e-9);
        assert_relative_eq!(ws.snk.deep_percolation, wf.deep_percolation());
    }

    #[test]
    fn saturated_top_layer_settles_at_field_capacity_in_both_schemes() {
        let soil = three_layers();
        let tipping = drain(&soil, HydrologyMode::Tipping, 60);
        let richards = drain(&soil, HydrologyMode::Richards, 60);
        for l in 0..2 {
            let fc = soil.layers[l].fc_water();
            assert_relative_eq!(tipping.soilw[l], fc, max_relative = 1e-4);
            assert_relative_eq!(richards.soilw[l], fc, max_relative = 1e-4);
        }
        // the surplus left through the bottom, not by evaporation
        let surplus = soil.layers[0].sat_water() - soil.layers[0].fc_water();
        assert_relative_eq!(tipping.snk.deep_percolation, surplus, max_relative = 1e-3);
        assert_relative_eq!(richards.snk.deep_percolation, surplus, max_relative = 1e-3);
    }
}
