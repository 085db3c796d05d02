use terrabgc_macros::Fluxes;

#[derive(Debug, Clone, Copy, Fluxes)]
pub struct CarbonDay {
    pub gpp: f64,
    pub hr: f64,
    pub nee: f64,
}

fn main() {
    let day = CarbonDay { gpp: 0.012, hr: 0.004, nee: -0.003 };
    let mut ts = CarbonDayTimeseries::with_capacity(365);
    ts.push(&day);
    ts.push(&day);
    assert_eq!(ts.len(), 2);
    assert!(!ts.is_empty());
    assert_eq!(CarbonDay::field_names(), &["gpp", "hr", "nee"]);
    assert_eq!(ts.column("hr"), Some(&[0.004, 0.004][..]));
    assert!(ts.column("npp").is_none());
    let names: Vec<&str> = ts.columns().map(|(n, _)| n).collect();
    assert_eq!(names, ["gpp", "hr", "nee"]);
}
