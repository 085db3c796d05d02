use std::f64::consts::PI;

use terrabgc_core::forcing::ForcingData;

/// Synthetic mid-latitude climate: a cosine annual temperature cycle with
/// frosty winters, rain every third day and a day length following the
/// season.
pub fn temperate(years: usize) -> ForcingData {
    let n = years * 365;
    let season = |d: usize| -(2.0 * PI * (d % 365) as f64 / 365.0).cos();
    let tmax: Vec<f64> = (0..n).map(|d| 14.0 + 13.0 * season(d)).collect();
    let tmin: Vec<f64> = tmax.iter().map(|t| t - 9.0).collect();
    let prcp = (0..n)
        .map(|d| match d % 9 {
            0 => 1.2,
            3 => 0.4,
            6 => 0.7,
            _ => 0.0,
        })
        .collect();
    let vpd = (0..n).map(|d| 700.0 + 500.0 * season(d)).collect();
    let swavgfd = (0..n).map(|d| 300.0 + 150.0 * season(d)).collect();
    let dayl = (0..n).map(|d| 43_200.0 + 12_000.0 * season(d)).collect();
    ForcingData::new(tmax, tmin, prcp, vpd, swavgfd, dayl, None).unwrap()
}

pub fn annual_sum(values: &[f64], year: usize) -> f64 {
    values[year * 365..(year + 1) * 365].iter().sum()
}
