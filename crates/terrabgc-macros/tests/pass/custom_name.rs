use terrabgc_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
#[fluxes(timeseries_name = "WaterSeries")]
pub struct WaterDay {
    pub transpiration: f64,
    pub soilw: f64,
}

fn main() {
    let day = WaterDay { transpiration: 2.1, soilw: 310.0 };
    let mut ts = WaterSeries::default();
    assert!(ts.is_empty());
    ts.push(&day);
    assert_eq!(ts.len(), 1);
    assert_eq!(ts.soilw, vec![310.0]);
    assert_eq!(WaterDay::field_names(), &["transpiration", "soilw"]);
}
