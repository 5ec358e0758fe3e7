use log::info;
use serde::Serialize;

use super::{SessionAnalyzer, skip_failures};
use crate::PitwallError;
use crate::session::{Session, SessionInfo};
use crate::stats::{CumulativeDelta, cumulative_delta, mean, valid_durations};

#[derive(Clone, Debug, Serialize)]
pub struct DeltaSeries {
    pub driver: String,
    pub deltas: Vec<CumulativeDelta>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PitMarker {
    pub driver: String,
    pub lap_number: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct RaceHistory {
    pub session: SessionInfo,
    pub reference_pace_s: f64,
    pub series: Vec<DeltaSeries>,
    pub pit_markers: Vec<PitMarker>,
}

/// Gap of every finisher to a theoretical car running the winner's average pace.
pub struct RaceHistoryAnalyzer {
    pit_marker_drivers: usize,
}

impl RaceHistoryAnalyzer {
    pub fn new(pit_marker_drivers: usize) -> Self {
        Self { pit_marker_drivers }
    }

    /// Winner's average lap, or race time over race distance when lap times are unusable.
    pub fn reference_pace(session: &Session) -> Result<f64, PitwallError> {
        let winner = session.winner().ok_or(PitwallError::NoResults)?;
        let winner_laps = valid_durations(
            session
                .laps_for(&winner.driver)
                .into_iter()
                .map(|l| l.lap_time_s),
        );
        if let Some(pace) = mean(&winner_laps) {
            return Ok(pace);
        }

        info!(
            "No usable lap times for winner {}, falling back to race time",
            winner.driver
        );
        let race_time = winner
            .race_time_s
            .ok_or_else(|| PitwallError::NoReferencePace {
                reason: format!("winner {} has no lap times and no race time", winner.driver),
            })?;
        match session.total_laps() {
            0 => Err(PitwallError::NoReferencePace {
                reason: "total lap count is unknown".to_string(),
            }),
            laps => Ok(race_time / laps as f64),
        }
    }

    fn series(
        &self,
        session: &Session,
        driver: &str,
        reference_pace_s: f64,
    ) -> Result<DeltaSeries, PitwallError> {
        let laps = session
            .laps_for(driver)
            .into_iter()
            .map(|l| (l.lap_number, l.lap_time_s))
            .collect::<Vec<_>>();
        if laps.is_empty() {
            return Err(PitwallError::NoLapData {
                driver: driver.to_string(),
            });
        }
        Ok(DeltaSeries {
            driver: driver.to_string(),
            deltas: cumulative_delta(&laps, reference_pace_s),
        })
    }
}

impl SessionAnalyzer for RaceHistoryAnalyzer {
    type Output = RaceHistory;

    fn analyze(&self, session: &Session) -> Result<RaceHistory, PitwallError> {
        let reference_pace_s = Self::reference_pace(session)?;
        let drivers = session
            .finishing_order()
            .into_iter()
            .map(|r| r.driver.clone())
            .collect::<Vec<_>>();

        let series = skip_failures(&drivers, |driver| {
            self.series(session, driver, reference_pace_s)
        });
        let pit_markers = drivers
            .iter()
            .take(self.pit_marker_drivers)
            .flat_map(|driver| {
                session
                    .laps_for(driver)
                    .into_iter()
                    .filter(|l| l.pit_out)
                    .map(move |l| PitMarker {
                        driver: driver.clone(),
                        lap_number: l.lap_number,
                    })
            })
            .collect();

        Ok(RaceHistory {
            session: session.info.clone(),
            reference_pace_s,
            series,
            pit_markers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{lap, result};

    fn race() -> Session {
        let mut pit_lap = lap("HAM", 2, -1.);
        pit_lap.pit_out = true;
        Session {
            laps: vec![
                lap("VER", 1, 90.),
                lap("VER", 2, 92.),
                lap("VER", 3, 91.),
                lap("HAM", 1, 91.),
                pit_lap,
                lap("HAM", 3, 93.),
            ],
            results: vec![
                result(2, "HAM", "Mercedes"),
                result(1, "VER", "Red Bull"),
                result(3, "BOT", "Alfa Romeo"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_is_winner_average() {
        assert_eq!(RaceHistoryAnalyzer::reference_pace(&race()).unwrap(), 91.);
    }

    #[test]
    fn test_reference_falls_back_to_race_time() {
        let mut session = race();
        session.laps.retain(|l| l.driver != "VER");
        session.results[1].race_time_s = Some(4500.);
        session.info.total_laps = Some(50);
        assert_eq!(RaceHistoryAnalyzer::reference_pace(&session).unwrap(), 90.);
    }

    #[test]
    fn test_no_reference_pace() {
        let mut session = race();
        session.laps.retain(|l| l.driver != "VER");
        assert!(matches!(
            RaceHistoryAnalyzer::reference_pace(&session),
            Err(PitwallError::NoReferencePace { .. })
        ));
        session.results.clear();
        assert!(matches!(
            RaceHistoryAnalyzer::reference_pace(&session),
            Err(PitwallError::NoResults)
        ));
    }

    #[test]
    fn test_deltas_with_repaired_pit_lap() {
        let output = RaceHistoryAnalyzer::new(5).analyze(&race()).unwrap();
        assert_eq!(output.reference_pace_s, 91.);
        // BOT has no laps
        assert_eq!(output.series.len(), 2);
        assert_eq!(output.series[0].driver, "VER");
        let ver = &output.series[0].deltas;
        assert_eq!(ver.last().unwrap().delta_s, 0.);

        let ham = &output.series[1].deltas;
        // pit lap repaired to 92
        assert_eq!(ham.len(), 3);
        assert_eq!(ham[0].delta_s, 0.);
        assert_eq!(ham[1].delta_s, -1.);
        assert_eq!(ham[2].delta_s, -3.);

        assert_eq!(
            output.pit_markers,
            vec![PitMarker {
                driver: "HAM".to_string(),
                lap_number: 2
            }]
        );
    }

    #[test]
    fn test_pit_markers_limited_to_top_finishers() {
        let output = RaceHistoryAnalyzer::new(1).analyze(&race()).unwrap();
        assert!(output.pit_markers.is_empty());
    }
}
