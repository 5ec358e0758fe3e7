use serde::Serialize;

use super::{SessionAnalyzer, format_lap_time, skip_failures};
use crate::PitwallError;
use crate::session::{Session, SessionInfo};
use crate::stats::{OutlierFilter, valid_durations};

#[derive(Clone, Debug, Serialize)]
pub struct MeanLapEntry {
    pub driver: String,
    pub team: Option<String>,
    pub mean_lap_time_s: f64,
    pub label: String,
    pub lap_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct MeanLapTimes {
    pub session: SessionInfo,
    /// Fastest first
    pub entries: Vec<MeanLapEntry>,
}

/// Outlier-filtered mean quicklap time for every classified driver.
pub struct MeanLapTimeAnalyzer {
    filter: OutlierFilter,
    quicklap_threshold: f64,
}

impl MeanLapTimeAnalyzer {
    pub fn new(filter: OutlierFilter, quicklap_threshold: f64) -> Self {
        Self {
            filter,
            quicklap_threshold,
        }
    }
}

impl SessionAnalyzer for MeanLapTimeAnalyzer {
    type Output = MeanLapTimes;

    fn analyze(&self, session: &Session) -> Result<MeanLapTimes, PitwallError> {
        let drivers = if session.results.is_empty() {
            session.drivers()
        } else {
            session
                .finishing_order()
                .into_iter()
                .map(|r| r.driver.clone())
                .collect()
        };
        let mut entries = skip_failures(drivers, |driver| {
            let laps = session.quicklaps_for(driver, self.quicklap_threshold);
            let times = valid_durations(laps.iter().map(|l| l.lap_time_s));
            let mean = self
                .filter
                .filtered_mean(&times)
                .ok_or_else(|| PitwallError::NoLapData {
                    driver: driver.clone(),
                })?;
            Ok(MeanLapEntry {
                driver: driver.clone(),
                team: session.team_of(driver),
                mean_lap_time_s: mean,
                label: format_lap_time(mean),
                lap_count: laps.len(),
            })
        });
        entries.sort_by(|a, b| a.mean_lap_time_s.total_cmp(&b.mean_lap_time_s));

        Ok(MeanLapTimes {
            session: session.info.clone(),
            entries,
        })
    }
}
