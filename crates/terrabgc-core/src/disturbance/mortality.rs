//! Background whole-plant mortality and fire.

use super::{Destination, Disturber};
use crate::constants::DAYS_PER_YEAR;
use crate::state::{Tissue, N_LITTER};

/// Fire consumes surface litter and debris at this share of the plant
/// fire mortality rate.
pub const LITTER_FIRE_SHARE: f64 = 0.3;

/// Dead plants fall as litter and coarse debris.
pub fn whole_plant_mortality(d: &mut Disturber<'_>) {
    let rate = d.epc.whole_plant_mortality / DAYS_PER_YEAR;
    d.remove_tissues(&Tissue::ALL, rate, Destination::Litter);
    d.remove_nonstructural(rate, Destination::Litter);
}

/// Fire kills plants outright and burns part of the surface litter.
pub fn fire_mortality(d: &mut Disturber<'_>) {
    let rate = d.epc.fire_mortality / DAYS_PER_YEAR;
    if rate <= 0.0 {
        return;
    }
    d.remove_tissues(&Tissue::ALL, rate, Destination::Fire);
    d.remove_nonstructural(rate, Destination::Fire);

    let litter_rate = (LITTER_FIRE_SHARE * rate).min(1.0);
    let (cs, ns) = (d.cs, d.ns);
    let (sc, sn) = (&cs.soil[0], &ns.soil[0]);
    for k in 0..N_LITTER {
        d.df.carbon.litter_to_fire[k] = litter_rate * sc.litter[k].max(0.0);
        d.df.nitrogen.litter_to_fire[k] = litter_rate * sn.litter[k].max(0.0);
    }
    d.df.carbon.litter_to_fire[N_LITTER] = litter_rate * sc.cwd.max(0.0);
    d.df.nitrogen.litter_to_fire[N_LITTER] = litter_rate * sn.cwd.max(0.0);
}
