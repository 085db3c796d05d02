//! Daily meteorological forcing and its conversion into the per-day
//! drivers the engine consumes.

use crate::constants::{PRCP_CM_TO_KG, RAD2PAR, SECONDS_PER_DAY};
use crate::error::{BgcError, BgcResult};
use crate::params::SiteConstants;

/// Days in the trailing soil-temperature running mean.
pub const RUNNING_MEAN_DAYS: usize = 11;

/// Validated daily forcing series.
///
/// All arrays must have the same length. NaN values are rejected.
/// Precipitation is in cm/day, VPD in Pa, shortwave as the daylight
/// average flux density (W/m2) and day length in seconds.
#[derive(Debug, Clone)]
pub struct ForcingData {
    pub tmax: Vec<f64>,
    pub tmin: Vec<f64>,
    pub prcp: Vec<f64>,
    pub vpd: Vec<f64>,
    pub swavgfd: Vec<f64>,
    pub dayl: Vec<f64>,
    /// Optional measured PAR (W/m2); derived from shortwave when absent.
    pub par: Option<Vec<f64>>,
    tannual: f64,
}

impl ForcingData {
    /// Create new ForcingData with validation.
    ///
    /// Validates:
    /// - arrays are non-empty and share one length
    /// - no NaN values
    /// - tmax >= tmin, precipitation, VPD and radiation non-negative
    /// - day length within [0, 86400] s
    pub fn new(
        tmax: Vec<f64>,
        tmin: Vec<f64>,
        prcp: Vec<f64>,
        vpd: Vec<f64>,
        swavgfd: Vec<f64>,
        dayl: Vec<f64>,
        par: Option<Vec<f64>>,
    ) -> BgcResult<Self> {
        if tmax.is_empty() {
            return Err(BgcError::Forcing("tmax array is empty".to_string()));
        }
        let n = tmax.len();
        let mut named: Vec<(&str, &[f64])> = vec![
            ("tmax", tmax.as_slice()),
            ("tmin", tmin.as_slice()),
            ("prcp", prcp.as_slice()),
            ("vpd", vpd.as_slice()),
            ("swavgfd", swavgfd.as_slice()),
            ("dayl", dayl.as_slice()),
        ];
        if let Some(p) = &par {
            named.push(("par", p.as_slice()));
        }
        for (name, arr) in &named {
            if arr.len() != n {
                return Err(BgcError::Forcing(format!(
                    "{name} length {} does not match tmax length {n}",
                    arr.len()
                )));
            }
            if arr.iter().any(|v| v.is_nan()) {
                return Err(BgcError::Forcing(format!("{name} array contains NaN values")));
            }
        }
        for (name, arr) in &named[2..] {
            if let Some(i) = arr.iter().position(|&v| v < 0.0) {
                return Err(BgcError::Forcing(format!(
                    "{name} is negative on day {i}: {}",
                    arr[i]
                )));
            }
        }
        if let Some(i) = (0..n).find(|&i| tmax[i] < tmin[i]) {
            return Err(BgcError::Forcing(format!(
                "tmax {} below tmin {} on day {i}",
                tmax[i], tmin[i]
            )));
        }
        if let Some(i) = dayl.iter().position(|&d| d > SECONDS_PER_DAY) {
            return Err(BgcError::Forcing(format!(
                "day length {} exceeds 86400 s on day {i}",
                dayl[i]
            )));
        }
        let tannual = (0..n).map(|i| 0.5 * (tmax[i] + tmin[i])).sum::<f64>() / n as f64;
        Ok(Self {
            tmax,
            tmin,
            prcp,
            vpd,
            swavgfd,
            dayl,
            par,
            tannual,
        })
    }

    /// Number of days.
    pub fn len(&self) -> usize {
        self.tmax.len()
    }

    /// Returns `true` if there are no days.
    pub fn is_empty(&self) -> bool {
        self.tmax.is_empty()
    }

    /// Series mean of the daily mean temperature (C).
    pub fn tannual(&self) -> f64 {
        self.tannual
    }

    fn tavg(&self, i: usize) -> f64 {
        0.5 * (self.tmax[i] + self.tmin[i])
    }

    fn par_at(&self, i: usize) -> f64 {
        match &self.par {
            Some(p) => p[i],
            None => self.swavgfd[i] * RAD2PAR,
        }
    }

    fn build(&self, d: usize, tavg_ra: f64, site: &SiteConstants) -> MetVariables {
        MetVariables::from_daily(
            self.tmax[d],
            self.tmin[d],
            self.prcp[d],
            self.vpd[d],
            self.swavgfd[d],
            self.par_at(d),
            self.dayl[d],
            tavg_ra,
            self.tannual,
            site.air_pressure(),
            site.co2,
        )
    }

    /// Drivers for day `d`, or `None` past the end of the series.
    pub fn met_for_day(&self, d: usize, site: &SiteConstants) -> Option<MetVariables> {
        if d >= self.len() {
            return None;
        }
        let first = (d + 1).saturating_sub(RUNNING_MEAN_DAYS);
        let window = (first..=d).map(|i| self.tavg(i)).sum::<f64>() / (d + 1 - first) as f64;
        Some(self.build(d, window, site))
    }

    /// Drivers for every day of the series.
    pub fn met_series(&self, site: &SiteConstants) -> Vec<MetVariables> {
        let mut window_sum = 0.0;
        (0..self.len())
            .map(|i| {
                window_sum += self.tavg(i);
                if i >= RUNNING_MEAN_DAYS {
                    window_sum -= self.tavg(i - RUNNING_MEAN_DAYS);
                }
                let window = (i + 1).min(RUNNING_MEAN_DAYS) as f64;
                self.build(i, window_sum / window, site)
            })
            .collect()
    }
}

/// One day's realized meteorological drivers. Read-only to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetVariables {
    pub tmax: f64,
    pub tmin: f64,
    pub tavg: f64,
    /// Daylight and night-time mean temperatures (C).
    pub tday: f64,
    pub tnight: f64,
    /// Trailing running mean of tavg (C).
    pub tavg_ra: f64,
    /// Long-term mean air temperature (C).
    pub tannual: f64,
    /// Precipitation (kg/m2/day).
    pub prcp: f64,
    pub vpd: f64,
    pub swavgfd: f64,
    pub par: f64,
    pub dayl: f64,
    pub pa: f64,
    pub co2: f64,
}

impl MetVariables {
    /// Build from raw daily values; `prcp_cm` is converted to kg/m2.
    #[allow(clippy::too_many_arguments)]
    pub fn from_daily(
        tmax: f64,
        tmin: f64,
        prcp_cm: f64,
        vpd: f64,
        swavgfd: f64,
        par: f64,
        dayl: f64,
        tavg_ra: f64,
        tannual: f64,
        pa: f64,
        co2: f64,
    ) -> Self {
        let tavg = 0.5 * (tmax + tmin);
        let tday = 0.45 * (tmax - tavg) + tavg;
        let tnight = 0.5 * (tday + tmin);
        Self {
            tmax,
            tmin,
            tavg,
            tday,
            tnight,
            tavg_ra,
            tannual,
            prcp: prcp_cm * PRCP_CM_TO_KG,
            vpd,
            swavgfd,
            par,
            dayl,
            pa,
            co2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(n: usize) -> ForcingData {
        ForcingData::new(
            vec![20.0; n],
            vec![10.0; n],
            vec![0.5; n],
            vec![800.0; n],
            vec![400.0; n],
            vec![43_200.0; n],
            None,
        )
        .unwrap()
    }

    #[test]
    fn valid_forcing_data() {
        assert_eq!(series(3).len(), 3);
    }

    #[test]
    fn rejects_empty_arrays() {
        let fd = ForcingData::new(vec![], vec![], vec![], vec![], vec![], vec![], None);
        assert!(fd.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn rejects_length_mismatch() {
        let fd = ForcingData::new(
            vec![1.0, 2.0],
            vec![0.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            None,
        );
        assert!(fd.unwrap_err().to_string().contains("does not match"));
    }

    #[test]
    fn rejects_nan() {
        let fd = ForcingData::new(
            vec![1.0],
            vec![0.0],
            vec![f64::NAN],
            vec![0.0],
            vec![0.0],
            vec![0.0],
            None,
        );
        assert!(fd.unwrap_err().to_string().contains("NaN"));
    }

    #[test]
    fn rejects_inverted_temperatures() {
        let fd = ForcingData::new(
            vec![0.0],
            vec![5.0],
            vec![0.0],
            vec![0.0],
            vec![0.0],
            vec![0.0],
            None,
        );
        assert!(fd.unwrap_err().to_string().contains("below tmin"));
    }

    #[test]
    fn rejects_overlong_day() {
        let fd = ForcingData::new(
            vec![1.0],
            vec![0.0],
            vec![0.0],
            vec![0.0],
            vec![0.0],
            vec![90_000.0],
            None,
        );
        assert!(fd.is_err());
    }

    #[test]
    fn precipitation_is_scaled_from_cm() {
        let met = series(1).met_series(&SiteConstants::default());
        assert_relative_eq!(met[0].prcp, 5.0);
    }

    #[test]
    fn daylight_and_night_temperatures() {
        let met = series(1).met_series(&SiteConstants::default());
        // tavg 15, tday = 0.45 * 5 + 15, tnight = (tday + tmin) / 2
        assert_relative_eq!(met[0].tday, 17.25);
        assert_relative_eq!(met[0].tnight, 13.625);
        assert_relative_eq!(met[0].par, 180.0);
    }

    #[test]
    fn running_mean_uses_trailing_window() {
        let n = 20;
        let tmax: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let fd = ForcingData::new(
            tmax.clone(),
            tmax,
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
            vec![0.0; n],
            None,
        )
        .unwrap();
        let met = fd.met_series(&SiteConstants::default());
        assert_relative_eq!(met[0].tavg_ra, 0.0);
        assert_relative_eq!(met[2].tavg_ra, 1.0);
        // days 9..=19 -> mean 14
        assert_relative_eq!(met[19].tavg_ra, 14.0, epsilon = 1e-12);
        assert_relative_eq!(met[0].tannual, 9.5);

        let site = SiteConstants::default();
        for d in [0, 5, 10, 11, 19] {
            let one = fd.met_for_day(d, &site).unwrap();
            assert_relative_eq!(one.tavg_ra, met[d].tavg_ra, epsilon = 1e-12);
        }
        assert!(fd.met_for_day(n, &site).is_none());
    }
}
