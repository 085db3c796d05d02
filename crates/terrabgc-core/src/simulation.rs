//! Day driver.
//!
//! [`Simulation`] owns everything that lives across days: the conserved
//! states, the slowly evolving ecophysiological variables, the balance
//! trackers and the one-time advisories. Nothing is kept in statics, so
//! any number of simulations can run side by side.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::allocation::daily_allocation;
use crate::balance::{carbon_balance, nitrogen_balance, water_balance, BalanceTracker};
use crate::canopy::{
    canopy_et, conduct_calc, potential_evap, radtrans, sunshade_lai, total_photosynthesis,
};
use crate::config::SimulationConfig;
use crate::decomp::{ch4_flux, decomp, decomp_scalars, DecompPotential};
use crate::disturbance::{disturbance_fluxes, ManagementEvents};
use crate::epv::EcophysVariables;
use crate::error::{AdvisoryFlags, BgcError, BgcResult, Domain};
use crate::flux::DailyFluxes;
use crate::forcing::{ForcingData, MetVariables};
use crate::hydrology::params::multilayer_hydrolparams;
use crate::hydrology::surface::{prcp_route, snowmelt};
use crate::hydrology::{multilayer_hydrolprocess, resolve_scheme, HydrologyScheme};
use crate::nitrogen::{n_inputs, n_transformations};
use crate::outputs::{DailyOutputs, DailyOutputsTimeseries};
use crate::params::{EcophysConstants, SiteConstants, SoilProfile};
use crate::phenology::{phenology_fluxes, PhenologyInputs, PhenologyProvider};
use crate::respiration::{growth_resp, maint_resp};
use crate::restart::{RestartData, RestartState};
use crate::roots::update_root_profile;
use crate::soil_temperature::soil_temperature;
use crate::state::{CarbonState, NitrogenState, Tissue, WaterState};
use crate::transport::multilayer_leaching;
use crate::update::{
    apply_disturbance, apply_transport, check_non_negative, cn_ratio_control,
    daily_cn_state_update, daily_water_state_update, precision_control,
};

/// Management events keyed by simulation day.
pub type ManagementSchedule = BTreeMap<usize, ManagementEvents>;

#[derive(Debug)]
pub struct Simulation {
    site: SiteConstants,
    soil: SoilProfile,
    epc: EcophysConstants,
    scheme: Box<dyn HydrologyScheme>,
    strict_balance: bool,
    ws: WaterState,
    cs: CarbonState,
    ns: NitrogenState,
    epv: EcophysVariables,
    fluxes: DailyFluxes,
    potentials: Vec<DecompPotential>,
    flags: AdvisoryFlags,
    water: BalanceTracker,
    carbon: BalanceTracker,
    nitrogen: BalanceTracker,
    day: usize,
    max_cn_drift: f64,
}

impl Simulation {
    /// Build a fresh simulation from validated configuration.
    pub fn new(config: &SimulationConfig) -> BgcResult<Self> {
        config.validate()?;
        let soil = SoilProfile::build(&config.soil)?;
        let (ws, cs, ns) = config.initial.states(&soil, &config.epc);
        Ok(Self::assemble(config, soil, ws, cs, ns))
    }

    /// Continue a run from a restart written by [`Simulation::restart_output`].
    pub fn from_restart(config: &SimulationConfig, restart: &RestartData) -> BgcResult<Self> {
        config.validate()?;
        let soil = SoilProfile::build(&config.soil)?;
        let n = soil.n_layers();
        if restart.n_layers != n {
            return Err(BgcError::invalid_param(
                "restart.n_layers",
                restart.n_layers as f64,
                format!("soil profile has {n} layers"),
            ));
        }
        let ws = WaterState::from_slice(&restart.water, n)?;
        let cs = CarbonState::from_slice(&restart.carbon, n)?;
        let ns = NitrogenState::from_slice(&restart.nitrogen, n)?;
        check_non_negative(&ws, &cs, &ns)?;
        Ok(Self::assemble(config, soil, ws, cs, ns))
    }

    fn assemble(
        config: &SimulationConfig,
        soil: SoilProfile,
        ws: WaterState,
        cs: CarbonState,
        ns: NitrogenState,
    ) -> Self {
        let n = soil.n_layers();
        let control = &config.control;
        let tol = &control.tolerances;
        Self {
            site: config.site.clone(),
            epc: config.epc.clone(),
            scheme: resolve_scheme(control.hydrology, &control.richards),
            strict_balance: control.strict_balance,
            ws,
            cs,
            ns,
            epv: EcophysVariables::new(n),
            fluxes: DailyFluxes::new(n),
            potentials: vec![DecompPotential::default(); n],
            flags: AdvisoryFlags::default(),
            water: BalanceTracker::new(Domain::Water, tol.water),
            carbon: BalanceTracker::new(Domain::Carbon, tol.carbon),
            nitrogen: BalanceTracker::new(Domain::Nitrogen, tol.nitrogen),
            day: 0,
            max_cn_drift: 0.0,
            soil,
        }
    }

    /// Advance one day.
    ///
    /// Any error aborts the day with the day index attached; state may be
    /// partially updated afterwards and the simulation should be dropped.
    pub fn step_day(
        &mut self,
        met: &MetVariables,
        phen: &PhenologyInputs,
        mgmt: &ManagementEvents,
    ) -> BgcResult<DailyOutputs> {
        let day = self.day;
        let out = self.advance(met, phen, mgmt).map_err(|e| e.on_day(day))?;
        self.day += 1;
        Ok(out)
    }

    fn advance(
        &mut self,
        met: &MetVariables,
        phen: &PhenologyInputs,
        mgmt: &ManagementEvents,
    ) -> BgcResult<DailyOutputs> {
        let Self {
            site,
            soil,
            epc,
            scheme,
            ws,
            cs,
            ns,
            epv,
            fluxes,
            potentials,
            flags,
            ..
        } = self;
        fluxes.reset();
        let DailyFluxes {
            water: wf,
            carbon: cf,
            nitrogen: nf,
            disturbance: df,
        } = fluxes;

        soil_temperature(met, ws.snoww, soil, epv);
        epv.phase = phen.phase;
        phenology_fluxes(phen, epc, cs, ns, epv, cf, nf);

        sunshade_lai(cs.plant[Tissue::Leaf].active, epc, epv);
        radtrans(met, epc, site, epv);
        update_root_profile(cs.plant[Tissue::Froot].active, epc, soil, epv);
        multilayer_hydrolparams(&ws.soilw, soil, epc, epv);
        decomp_scalars(soil, epv);

        prcp_route(met, epc, epv, wf);
        snowmelt(met, epv.swtrans, ws.snoww, wf);

        maint_resp(met, epc, &ns.plant, epv, cf);
        conduct_calc(met, epc, epv);
        canopy_et(met, ws.canopyw, epv, wf)?;
        potential_evap(met, ws.snoww, epv, wf)?;
        multilayer_hydrolprocess(ws, soil, &**scheme, epv, wf, flags)?;
        if epv.richards_substeps > 0 {
            debug!("{} scheme took {} sub-steps", scheme.name(), epv.richards_substeps);
        }

        total_photosynthesis(met, epc, epv, cf)?;
        decomp(&cs.soil, &ns.soil, soil, epv, potentials);
        ch4_flux(soil, epv, cf);
        n_inputs(site, nf);
        daily_allocation(met, epc, soil, cs, ns, potentials, epv, cf, nf, flags)?;
        growth_resp(epc, cs.gresp_transfer + cf.gresp_storage_to_transfer, cf);
        n_transformations(ns, soil, epv, nf);

        daily_water_state_update(wf, ws);
        daily_cn_state_update(cf, nf, cs, ns);

        disturbance_fluxes(epc, soil, epv, cs, ns, mgmt, df);
        apply_disturbance(df, cs, ns);

        multilayer_leaching(ws, cs, ns, soil, wf, cf, nf, flags);
        apply_transport(cf, nf, cs, ns);

        precision_control(epc, ws, cs, ns);
        let drift = cn_ratio_control(epc, cs, ns, flags);
        self.max_cn_drift = self.max_cn_drift.max(drift);
        check_non_negative(&self.ws, &self.cs, &self.ns)?;

        let strict = self.strict_balance;
        let mut out = DailyOutputs::collect(&self.fluxes, &self.epv, &self.ws, &self.cs, &self.ns);
        out.water_balance_delta = self.water.check(water_balance(&self.ws), strict)?;
        out.carbon_balance_delta = self.carbon.check(carbon_balance(&self.cs), strict)?;
        out.nitrogen_balance_delta = self.nitrogen.check(nitrogen_balance(&self.ns), strict)?;
        out.cn_drift = drift;
        Ok(out)
    }

    /// Run over a whole forcing series.
    ///
    /// Keys of `management` index into this series. `phenology` is asked
    /// for the absolute simulation day, so a run split over several calls
    /// keeps its calendar.
    pub fn run(
        &mut self,
        forcing: &ForcingData,
        phenology: &mut impl PhenologyProvider,
        management: &ManagementSchedule,
    ) -> BgcResult<DailyOutputsTimeseries> {
        for events in management.values() {
            events.validate()?;
        }
        let first = self.day;
        info!(
            "running {} days from day {first} with the {} scheme",
            forcing.len(),
            self.scheme.name()
        );
        let none = ManagementEvents::default();
        let mut ts = DailyOutputsTimeseries::with_capacity(forcing.len());
        for (d, met) in forcing.met_series(&self.site).iter().enumerate() {
            let phen = phenology.inputs(first + d);
            let mgmt = management.get(&d).unwrap_or(&none);
            ts.push(&self.step_day(met, &phen, mgmt)?);
        }
        info!(
            "finished after {} days; max balance change water {:e} carbon {:e} nitrogen {:e}",
            forcing.len(),
            self.water.max_error(),
            self.carbon.max_error(),
            self.nitrogen.max_error()
        );
        Ok(ts)
    }

    /// Current state as a restart record.
    pub fn restart_output(&self) -> RestartData {
        RestartData {
            n_layers: self.soil.n_layers(),
            water: self.ws.to_vec(),
            carbon: self.cs.to_vec(),
            nitrogen: self.ns.to_vec(),
        }
    }

    /// Days simulated so far.
    pub fn day(&self) -> usize {
        self.day
    }

    pub fn water_state(&self) -> &WaterState {
        &self.ws
    }

    pub fn carbon_state(&self) -> &CarbonState {
        &self.cs
    }

    pub fn nitrogen_state(&self) -> &NitrogenState {
        &self.ns
    }

    pub fn ecophys(&self) -> &EcophysVariables {
        &self.epv
    }

    pub fn soil(&self) -> &SoilProfile {
        &self.soil
    }

    pub fn advisories(&self) -> &AdvisoryFlags {
        &self.flags
    }

    /// Largest day-to-day balance change of each domain, in the order
    /// water, carbon, nitrogen.
    pub fn max_balance_errors(&self) -> [f64; 3] {
        [
            self.water.max_error(),
            self.carbon.max_error(),
            self.nitrogen.max_error(),
        ]
    }

    pub fn max_cn_drift(&self) -> f64 {
        self.max_cn_drift
    }
}
