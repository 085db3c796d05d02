use crate::flux::WaterFlux;
use crate::state::WaterState;

/// Commit one day's water fluxes to the stores and the cumulative
/// source and sink counters.
pub fn daily_water_state_update(wf: &WaterFlux, ws: &mut WaterState) {
    let n = ws.soilw.len();
    let last = n - 1;

    ws.canopyw += wf.prcp_to_canopyw - wf.canopyw_evap - wf.canopyw_to_soilw;
    ws.snoww += wf.prcp_to_snoww - wf.snoww_to_soilw - wf.snoww_subl;
    ws.pondw += wf.soilw_to_pondw - wf.pondw_evap - wf.pondw_to_soilw - wf.pondw_to_runoff;

    ws.soilw[0] += wf.infiltration() - wf.soilw_evap - wf.soilw_to_pondw;
    for l in 0..n {
        let mut dw = wf.soilw_from_groundwater[l]
            - wf.soilw_trans[l]
            - wf.soilw_percolation[l]
            - wf.soilw_diffusion[l];
        if l > 0 {
            dw += wf.soilw_percolation[l - 1] + wf.soilw_diffusion[l - 1];
        }
        ws.soilw[l] += dw;
    }
    ws.soilw[last] += wf.soilw_from_boundary;

    let src = &mut ws.src;
    src.precipitation += wf.prcp_to_canopyw + wf.prcp_to_soilw + wf.prcp_to_snoww;
    src.groundwater += wf.soilw_from_groundwater.iter().sum::<f64>();

    let snk = &mut ws.snk;
    snk.canopy_evaporation += wf.canopyw_evap;
    snk.snow_sublimation += wf.snoww_subl;
    snk.pond_evaporation += wf.pondw_evap;
    snk.soil_evaporation += wf.soilw_evap;
    snk.transpiration += wf.transpiration();
    snk.runoff += wf.prcp_to_runoff + wf.pondw_to_runoff;
    snk.deep_percolation += wf.soilw_percolation[last] + wf.soilw_diffusion[last];

    // the bottom boundary works both ways
    if wf.soilw_from_boundary >= 0.0 {
        ws.src.boundary += wf.soilw_from_boundary;
    } else {
        ws.snk.deep_percolation -= wf.soilw_from_boundary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn balance(ws: &WaterState) -> f64 {
        ws.src.total() - ws.snk.total() - ws.storage_total()
    }

    #[test]
    fn routing_moves_water_between_stores() {
        let mut ws = WaterState::new(3);
        ws.soilw = smallvec::smallvec![30.0, 40.0, 50.0];
        ws.snoww = 5.0;
        let before = balance(&ws);

        let mut wf = WaterFlux::new(3);
        wf.prcp_to_canopyw = 1.0;
        wf.prcp_to_soilw = 9.0;
        wf.canopyw_evap = 0.4;
        wf.snoww_to_soilw = 2.0;
        wf.prcp_to_runoff = 0.5;
        wf.soilw_evap = 0.7;
        wf.soilw_trans[1] = 1.2;
        wf.soilw_percolation[0] = 3.0;
        wf.soilw_percolation[1] = 2.0;
        wf.soilw_diffusion[1] = -0.3;
        wf.soilw_percolation[2] = 1.0;
        wf.soilw_from_boundary = -0.8;
        daily_water_state_update(&wf, &mut ws);

        assert_relative_eq!(ws.canopyw, 0.6);
        assert_relative_eq!(ws.snoww, 3.0);
        assert_relative_eq!(ws.soilw[0], 30.0 + 10.5 - 0.7 - 3.0);
        assert_relative_eq!(ws.soilw[1], 40.0 - 1.2 - 2.0 + 0.3 + 3.0);
        assert_relative_eq!(ws.soilw[2], 50.0 - 1.0 - 0.3 + 2.0 - 0.8);
        assert_relative_eq!(ws.snk.deep_percolation, 1.8);
        assert_relative_eq!(balance(&ws), before, epsilon = 1e-12);
    }

    #[test]
    fn pond_exchange_closes() {
        let mut ws = WaterState::new(1);
        ws.soilw[0] = 100.0;
        ws.pondw = 4.0;
        let before = balance(&ws);
        let mut wf = WaterFlux::new(1);
        wf.pondw_evap = 1.0;
        wf.pondw_to_soilw = 3.0;
        wf.soilw_to_pondw = 6.0;
        wf.pondw_to_runoff = 2.0;
        wf.soilw_from_boundary = 0.5;
        daily_water_state_update(&wf, &mut ws);
        assert_relative_eq!(ws.pondw, 4.0);
        assert_relative_eq!(ws.soilw[0], 100.0 + 3.0 - 6.0 + 0.5);
        assert_relative_eq!(ws.src.boundary, 0.5);
        assert_relative_eq!(balance(&ws), before, epsilon = 1e-12);
    }
}
