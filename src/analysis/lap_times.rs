use serde::Serialize;

use super::{SessionAnalyzer, focused_range, format_lap_time, skip_failures};
use crate::PitwallError;
use crate::session::{Session, SessionInfo};
use crate::stats::OutlierFilter;

#[derive(Clone, Debug, Serialize)]
pub struct DriverLapSeries {
    pub driver: String,
    /// `(lap number, seconds)` with outliers removed
    pub points: Vec<(u32, f64)>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FastestLapMarker {
    pub driver: String,
    pub lap_number: u32,
    pub lap_time_s: f64,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LapTimeEvolution {
    pub session: SessionInfo,
    pub series: Vec<DriverLapSeries>,
    /// Fastest lap across all plotted series
    pub fastest: Option<FastestLapMarker>,
    pub y_range: Option<(f64, f64)>,
}

/// Lap time evolution of the selected drivers.
pub struct LapTimesAnalyzer {
    drivers: Vec<String>,
    filter: OutlierFilter,
}

impl LapTimesAnalyzer {
    pub fn new(drivers: Vec<String>, filter: OutlierFilter) -> Self {
        Self { drivers, filter }
    }

    fn series(&self, session: &Session, driver: &str) -> Result<DriverLapSeries, PitwallError> {
        let timed = session
            .laps_for(driver)
            .into_iter()
            .filter_map(|l| l.valid_lap_time().map(|t| (l.lap_number, t)))
            .collect::<Vec<_>>();
        let points = self.filter.filter_pairs(&timed);
        if points.is_empty() {
            return Err(PitwallError::NoLapData {
                driver: driver.to_string(),
            });
        }
        Ok(DriverLapSeries {
            driver: driver.to_string(),
            points,
        })
    }
}

impl SessionAnalyzer for LapTimesAnalyzer {
    type Output = LapTimeEvolution;

    fn analyze(&self, session: &Session) -> Result<LapTimeEvolution, PitwallError> {
        let series = skip_failures(&self.drivers, |driver| self.series(session, driver));

        let fastest = series
            .iter()
            .flat_map(|s| s.points.iter().map(move |p| (s, *p)))
            .min_by(|a, b| a.1.1.total_cmp(&b.1.1))
            .map(|(s, (lap_number, lap_time_s))| FastestLapMarker {
                driver: s.driver.clone(),
                lap_number,
                lap_time_s,
                label: format!("Fastest: {}", format_lap_time(lap_time_s)),
            });
        let all_times = series
            .iter()
            .flat_map(|s| s.points.iter().map(|(_, t)| *t))
            .collect::<Vec<_>>();

        Ok(LapTimeEvolution {
            session: session.info.clone(),
            fastest,
            y_range: focused_range(&all_times),
            series,
        })
    }
}
