use std::f64::consts::PI;

use terrabgc::forcing::ForcingData;
use terrabgc::phenology::SeasonalSchedule;
use terrabgc::simulation::ManagementSchedule;
use terrabgc::{BgcResult, Simulation, SimulationConfig};

const YEARS: usize = 2;

/// Two years of a synthetic temperate climate.
fn forcing() -> BgcResult<ForcingData> {
    let n = YEARS * 365;
    let season = |d: usize| -(2.0 * PI * (d % 365) as f64 / 365.0).cos();
    let tmax: Vec<f64> = (0..n).map(|d| 14.0 + 13.0 * season(d)).collect();
    let tmin = tmax.iter().map(|t| t - 9.0).collect();
    let prcp = (0..n).map(|d| if d % 4 == 0 { 0.9 } else { 0.0 }).collect();
    let vpd = (0..n).map(|d| 700.0 + 500.0 * season(d)).collect();
    let swavgfd = (0..n).map(|d| 300.0 + 150.0 * season(d)).collect();
    let dayl = (0..n).map(|d| 43_200.0 + 12_000.0 * season(d)).collect();
    ForcingData::new(tmax, tmin, prcp, vpd, swavgfd, dayl, None)
}

fn main() -> BgcResult<()> {
    env_logger::init();

    let config = SimulationConfig::default();
    let mut sim = Simulation::new(&config)?;
    let ts = sim.run(
        &forcing()?,
        &mut SeasonalSchedule::default(),
        &ManagementSchedule::new(),
    )?;

    println!("Year |   GPP   |   NPP   |   NEE   |    ET   | Runoff | N leached");
    println!("-----|---------|---------|---------|---------|--------|----------");
    for y in 0..YEARS {
        let total = |v: &[f64]| -> f64 { v[y * 365..(y + 1) * 365].iter().sum() };
        println!(
            "  {:>2} | {:>7.3} | {:>7.3} | {:>7.3} | {:>7.1} | {:>6.1} | {:>8.2e}",
            y + 1,
            total(&ts.gpp),
            total(&ts.npp),
            total(&ts.nee),
            total(&ts.et),
            total(&ts.runoff),
            total(&ts.n_leached),
        );
    }

    let [water, carbon, nitrogen] = sim.max_balance_errors();
    println!(
        "\nMax daily balance change: water {water:.2e} kg/m2, carbon {carbon:.2e} kgC/m2, nitrogen {nitrogen:.2e} kgN/m2"
    );
    println!("Max C:N drift repaired: {:.2e}", sim.max_cn_drift());
    Ok(())
}
