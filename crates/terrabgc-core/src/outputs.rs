//! Per-day output record.

use terrabgc_macros::Fluxes;

use crate::epv::EcophysVariables;
use crate::flux::DailyFluxes;
use crate::state::{CarbonState, NitrogenState, WaterState};

/// Daily totals reported by the engine. Carbon in kgC/m2, nitrogen in
/// kgN/m2 and water in kg/m2, all per day unless noted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Fluxes)]
pub struct DailyOutputs {
    pub gpp: f64,
    pub mr: f64,
    pub gr: f64,
    pub npp: f64,
    pub hr: f64,
    /// Net ecosystem exchange, positive into the atmosphere.
    pub nee: f64,
    pub fire_c: f64,
    pub export_c: f64,
    pub ch4: f64,
    pub prcp: f64,
    pub canopy_evap: f64,
    pub snow_subl: f64,
    pub pond_evap: f64,
    pub soil_evap: f64,
    pub transpiration: f64,
    pub et: f64,
    pub runoff: f64,
    pub deep_percolation: f64,
    pub n_uptake: f64,
    pub n_mineralization: f64,
    pub n_immobilization: f64,
    pub n_leached: f64,
    pub doc_leached: f64,
    pub n2o: f64,
    pub lai: f64,
    pub rooting_depth: f64,
    /// State at the end of the day.
    pub soilw: f64,
    pub snoww: f64,
    pub vegetation_c: f64,
    pub litter_c: f64,
    pub soil_c: f64,
    pub mineral_n: f64,
    /// Day-to-day change of the balance of each domain.
    pub water_balance_delta: f64,
    pub carbon_balance_delta: f64,
    pub nitrogen_balance_delta: f64,
    pub cn_drift: f64,
}

impl DailyOutputs {
    /// Fluxes of the day and the state they left behind. Balance deltas
    /// and drift are filled in by the caller.
    pub fn collect(
        f: &DailyFluxes,
        epv: &EcophysVariables,
        ws: &WaterState,
        cs: &CarbonState,
        ns: &NitrogenState,
    ) -> Self {
        let (wf, cf, nf, df) = (&f.water, &f.carbon, &f.nitrogen, &f.disturbance);
        let gpp = cf.gpp();
        let mr = cf.mr_total();
        let gr = cf.gr_total();
        let hr = cf.hr_total();
        let et =
            wf.canopyw_evap + wf.snoww_subl + wf.pondw_evap + wf.soilw_evap + wf.transpiration();
        let litter_c: f64 = cs
            .soil
            .iter()
            .map(|s| s.litter.iter().sum::<f64>() + s.cwd)
            .sum();
        Self {
            gpp,
            mr,
            gr,
            npp: gpp - mr - gr,
            hr,
            nee: mr + gr + hr - gpp,
            fire_c: df.carbon.fire_total(),
            export_c: df.carbon.to_export,
            ch4: cf.ch4,
            prcp: wf.prcp_to_canopyw + wf.prcp_to_soilw + wf.prcp_to_snoww,
            canopy_evap: wf.canopyw_evap,
            snow_subl: wf.snoww_subl,
            pond_evap: wf.pondw_evap,
            soil_evap: wf.soilw_evap,
            transpiration: wf.transpiration(),
            et,
            runoff: wf.prcp_to_runoff + wf.pondw_to_runoff,
            deep_percolation: wf.deep_percolation(),
            n_uptake: nf.uptake_total(),
            n_mineralization: nf.gross_mineralization(),
            n_immobilization: nf.immobilization(),
            n_leached: nf.leached(),
            doc_leached: cf.doc_leached(),
            n2o: nf.nitrif_n2o.iter().sum(),
            lai: epv.proj_lai,
            rooting_depth: epv.rooting_depth,
            soilw: ws.soilw.iter().sum(),
            snoww: ws.snoww,
            vegetation_c: cs.vegetation_total(),
            litter_c,
            soil_c: cs.soil_total() - litter_c,
            mineral_n: ns.mineral_total(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exchange_terms_are_consistent() {
        let mut f = DailyFluxes::new(2);
        f.carbon.psnsun_to_cpool = 0.008;
        f.carbon.psnshade_to_cpool = 0.002;
        f.carbon.mr[0] = 0.003;
        f.carbon.gr[0] = 0.001;
        f.carbon.decomp[1].hr[4] = 0.004;
        f.water.soilw_trans[1] = 2.0;
        f.water.soilw_evap = 0.5;
        let epv = EcophysVariables::new(2);
        let out = DailyOutputs::collect(
            &f,
            &epv,
            &WaterState::new(2),
            &CarbonState::new(2),
            &NitrogenState::new(2),
        );
        assert_relative_eq!(out.npp, 0.006, epsilon = 1e-15);
        assert_relative_eq!(out.nee, -0.002, epsilon = 1e-15);
        assert_relative_eq!(out.et, 2.5);
    }

    #[test]
    fn timeseries_collects_columns() {
        let mut ts = DailyOutputsTimeseries::with_capacity(2);
        ts.push(&DailyOutputs {
            gpp: 0.01,
            ..DailyOutputs::default()
        });
        ts.push(&DailyOutputs::default());
        assert_eq!(ts.len(), 2);
        assert_eq!(ts.column("gpp"), Some(&[0.01, 0.0][..]));
        assert!(ts.column("streamflow").is_none());
        assert_eq!(DailyOutputs::field_names().len(), ts.columns().count());
    }
}
