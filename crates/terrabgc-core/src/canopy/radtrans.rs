use crate::constants::EPAR;
use crate::epv::EcophysVariables;
use crate::forcing::MetVariables;
use crate::params::{EcophysConstants, SiteConstants};

/// Leaf area indices and sunlit/shaded specific leaf area from leaf carbon.
pub fn sunshade_lai(leafc: f64, epc: &EcophysConstants, epv: &mut EcophysVariables) {
    epv.proj_lai = (leafc * epc.avg_proj_sla).max(0.0);
    epv.all_lai = epv.proj_lai * epc.lai_ratio;
    if epv.proj_lai > 0.0 {
        epv.plaisun = 1.0 - (-epv.proj_lai).exp();
        epv.plaishade = epv.proj_lai - epv.plaisun;
        epv.sun_proj_sla = (epv.plaisun + epv.plaishade / epc.sla_ratio) / leafc;
        epv.shade_proj_sla = epv.sun_proj_sla * epc.sla_ratio;
    } else {
        epv.plaisun = 0.0;
        epv.plaishade = 0.0;
        epv.sun_proj_sla = 0.0;
        epv.shade_proj_sla = 0.0;
    }
}

/// Beer's law extinction of shortwave and PAR through the canopy, split
/// between the sunlit and shaded fractions.
pub fn radtrans(
    met: &MetVariables,
    epc: &EcophysConstants,
    site: &SiteConstants,
    epv: &mut EcophysVariables,
) {
    let sw = met.swavgfd * (1.0 - site.sw_albedo);
    let par = met.par * (1.0 - site.sw_albedo);
    let k = epc.ext_coef;
    let lai = epv.proj_lai;

    if lai <= 0.0 {
        epv.swabs = 0.0;
        epv.swtrans = sw;
        epv.swabs_per_plaisun = 0.0;
        epv.swabs_per_plaishade = 0.0;
        epv.parabs = 0.0;
        epv.ppfd_per_plaisun = 0.0;
        epv.ppfd_per_plaishade = 0.0;
        return;
    }

    let absorbed = 1.0 - (-k * lai).exp();
    epv.swabs = sw * absorbed;
    epv.swtrans = sw - epv.swabs;

    let swabs_sun = k * sw * epv.plaisun;
    let swabs_shade = (epv.swabs - swabs_sun).max(0.0);
    epv.swabs_per_plaisun = swabs_sun / epv.plaisun;
    epv.swabs_per_plaishade = if epv.plaishade > 0.0 {
        swabs_shade / epv.plaishade
    } else {
        0.0
    };

    epv.parabs = par * absorbed;
    let parabs_sun = k * par * epv.plaisun;
    let parabs_shade = (epv.parabs - parabs_sun).max(0.0);
    epv.ppfd_per_plaisun = parabs_sun / epv.plaisun * EPAR;
    epv.ppfd_per_plaishade = if epv.plaishade > 0.0 {
        parabs_shade / epv.plaishade * EPAR
    } else {
        0.0
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn met(sw: f64) -> MetVariables {
        MetVariables::from_daily(20.0, 10.0, 0.0, 800.0, sw, 0.45 * sw, 43_200.0, 15.0, 10.0, 1e5, 380.0)
    }

    #[test]
    fn sunlit_fraction_follows_exponential() {
        let epc = EcophysConstants::default();
        let mut epv = EcophysVariables::new(1);
        sunshade_lai(0.1, &epc, &mut epv);
        assert_relative_eq!(epv.proj_lai, 3.2);
        assert_relative_eq!(epv.plaisun, 1.0 - (-3.2f64).exp());
        assert_relative_eq!(epv.plaisun + epv.plaishade, epv.proj_lai);
        assert_relative_eq!(epv.shade_proj_sla / epv.sun_proj_sla, 2.0);
        // sunlit and shaded leaf mass add back to leaf carbon
        let leafc = epv.plaisun / epv.sun_proj_sla + epv.plaishade / epv.shade_proj_sla;
        assert_relative_eq!(leafc, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn absorbed_and_transmitted_sum_to_incident() {
        let epc = EcophysConstants::default();
        let site = SiteConstants::default();
        let mut epv = EcophysVariables::new(1);
        sunshade_lai(0.1, &epc, &mut epv);
        radtrans(&met(400.0), &epc, &site, &mut epv);
        assert_relative_eq!(epv.swabs + epv.swtrans, 400.0 * 0.8, epsilon = 1e-9);
        assert!(epv.ppfd_per_plaisun > epv.ppfd_per_plaishade);
    }

    #[test]
    fn leafless_canopy_transmits_everything() {
        let epc = EcophysConstants::default();
        let site = SiteConstants::default();
        let mut epv = EcophysVariables::new(1);
        sunshade_lai(0.0, &epc, &mut epv);
        radtrans(&met(300.0), &epc, &site, &mut epv);
        assert_eq!(epv.swabs, 0.0);
        assert_relative_eq!(epv.swtrans, 240.0);
    }
}
