use serde::Serialize;

use super::{SessionAnalyzer, skip_failures};
use crate::PitwallError;
use crate::session::{Session, SessionInfo};
use crate::stats::median;

pub const SECTOR_COUNT: usize = 3;

#[derive(Clone, Debug, Serialize)]
pub struct SectorSeries {
    pub driver: String,
    pub points: Vec<(u32, f64)>,
    /// `(lap number, seconds)` of the driver's best time in this sector
    pub fastest: Option<(u32, f64)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectorChart {
    /// 1-based
    pub sector: usize,
    pub series: Vec<SectorSeries>,
    pub y_range: Option<(f64, f64)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectorTimes {
    pub session: SessionInfo,
    pub sectors: Vec<SectorChart>,
}

/// Sector time evolution of the selected drivers.
pub struct SectorTimesAnalyzer {
    drivers: Vec<String>,
}

impl SectorTimesAnalyzer {
    pub fn new(drivers: Vec<String>) -> Self {
        Self { drivers }
    }

    fn driver_sectors(
        &self,
        session: &Session,
        driver: &str,
    ) -> Result<[SectorSeries; SECTOR_COUNT], PitwallError> {
        let laps = session.laps_for(driver);
        if laps.is_empty() {
            return Err(PitwallError::NoLapData {
                driver: driver.to_string(),
            });
        }
        Ok(std::array::from_fn(|sector| {
            let points = laps
                .iter()
                .filter_map(|l| {
                    l.sector_times_s[sector]
                        .filter(|t| t.is_finite() && *t > 0.)
                        .map(|t| (l.lap_number, t))
                })
                .collect::<Vec<_>>();
            let fastest = points.iter().copied().min_by(|a, b| a.1.total_cmp(&b.1));
            SectorSeries {
                driver: driver.to_string(),
                points,
                fastest,
            }
        }))
    }
}

impl SessionAnalyzer for SectorTimesAnalyzer {
    type Output = SectorTimes;

    fn analyze(&self, session: &Session) -> Result<SectorTimes, PitwallError> {
        let per_driver = skip_failures(&self.drivers, |driver| self.driver_sectors(session, driver));

        let mut sectors = (1..=SECTOR_COUNT)
            .map(|sector| SectorChart {
                sector,
                series: Vec::new(),
                y_range: None,
            })
            .collect::<Vec<_>>();
        for driver_sectors in per_driver {
            for (chart, series) in sectors.iter_mut().zip(driver_sectors) {
                chart.series.push(series);
            }
        }
        for chart in sectors.iter_mut() {
            let times = chart
                .series
                .iter()
                .flat_map(|s| s.points.iter().map(|(_, t)| *t))
                .collect::<Vec<_>>();
            chart.y_range = median(&times).map(|m| (m * 0.95, m * 1.05));
        }

        Ok(SectorTimes {
            session: session.info.clone(),
            sectors,
        })
    }
}
