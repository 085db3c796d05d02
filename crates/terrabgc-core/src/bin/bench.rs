/// Timing of multi-year runs under both hydrology schemes.
///
/// Uses std::time::Instant for timing, a deterministic LCG PRNG for the
/// weather and std::hint::black_box to keep results alive.
use std::f64::consts::PI;
use std::hint::black_box;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use terrabgc_core::config::HydrologyMode;
use terrabgc_core::forcing::ForcingData;
use terrabgc_core::phenology::SeasonalSchedule;
use terrabgc_core::simulation::ManagementSchedule;
use terrabgc_core::{BgcResult, Simulation, SimulationConfig};

const REPEATS: usize = 5;

/// Seasonal temperature, light and day length with random showers.
fn make_forcing(days: usize, seed: u64) -> BgcResult<ForcingData> {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };
    let season = |d: usize| -(2.0 * PI * (d % 365) as f64 / 365.0).cos();

    let mut tmax = Vec::with_capacity(days);
    let mut tmin = Vec::with_capacity(days);
    let mut prcp = Vec::with_capacity(days);
    for d in 0..days {
        let t = 14.0 + 13.0 * season(d) + 4.0 * (next_f64() - 0.5);
        tmax.push(t);
        tmin.push(t - 6.0 - 6.0 * next_f64());
        let wet = next_f64() < 0.3;
        prcp.push(if wet { 2.0 * next_f64() } else { 0.0 });
    }
    let vpd = (0..days).map(|d| 700.0 + 500.0 * season(d)).collect();
    let swavgfd = (0..days).map(|d| 300.0 + 150.0 * season(d)).collect();
    let dayl = (0..days).map(|d| 43_200.0 + 12_000.0 * season(d)).collect();
    ForcingData::new(tmax, tmin, prcp, vpd, swavgfd, dayl, None)
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut() -> BgcResult<()>>(mut f: F) -> BgcResult<Duration> {
    let mut times = Vec::with_capacity(REPEATS);
    for _ in 0..REPEATS {
        let start = Instant::now();
        f()?;
        times.push(start.elapsed());
    }
    times.sort();
    Ok(times[REPEATS / 2])
}

fn bench_scheme(mode: HydrologyMode, years: &[usize]) -> BgcResult<Vec<(String, usize, Duration)>> {
    let mut config = SimulationConfig::default();
    config.control.hydrology = mode;
    let mut results = Vec::new();
    for &y in years {
        let forcing = make_forcing(y * 365, 42)?;
        let run_once = || -> BgcResult<()> {
            let mut sim = Simulation::new(&config)?;
            let ts = sim.run(
                &forcing,
                &mut SeasonalSchedule::default(),
                &ManagementSchedule::new(),
            )?;
            black_box(ts);
            Ok(())
        };
        // warmup
        run_once()?;
        let dur = median_time(run_once)?;
        results.push((format!("{mode:?}").to_lowercase(), y * 365, dur));
    }
    Ok(results)
}

fn main() -> ExitCode {
    env_logger::init();

    println!("terrabgc core benchmarks");
    println!("============================================================");
    println!("{:<18} {:>6}   {:>12}", "Scheme", "Days", "Median (ms)");
    println!("--------------------------------------------");

    let mut all_results = Vec::new();
    for mode in [HydrologyMode::Tipping, HydrologyMode::Richards] {
        match bench_scheme(mode, &[1, 10]) {
            Ok(r) => all_results.extend(r),
            Err(e) => {
                eprintln!("benchmark failed: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    for (scheme, n, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<18} {:>6}      {:>8.2}", scheme, n, ms);
    }
    println!("============================================================");
    ExitCode::SUCCESS
}
