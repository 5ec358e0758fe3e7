use log::warn;
use serde::Serialize;

use super::SessionAnalyzer;
use crate::PitwallError;
use crate::session::{Session, SessionInfo};

/// Position swings smaller than or equal to this are not flagged.
pub const SIGNIFICANT_CHANGE: i32 = 1;
/// Position swings larger than this are labelled on the chart.
pub const ANNOTATED_CHANGE: i32 = 2;
/// Lap numbers above this are treated as corrupt when the session has no lap count.
pub const MAX_LAP_NUMBER: u32 = 500;

#[derive(Clone, Debug, Serialize)]
pub struct PositionSeries {
    pub driver: String,
    /// Position at the end of each lap, index 0 is lap 1. Zero means unknown.
    pub positions: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionChange {
    pub driver: String,
    pub lap_number: u32,
    pub from: u32,
    pub to: u32,
    /// Positive when places were gained
    pub change: i32,
    pub annotated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PitStopMarker {
    pub driver: String,
    pub lap_number: u32,
    pub position: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PositionChanges {
    pub session: SessionInfo,
    pub lap_count: u32,
    pub drivers: Vec<PositionSeries>,
    pub changes: Vec<PositionChange>,
    pub pit_stops: Vec<PitStopMarker>,
}

/// Lap by lap running order with the big swings highlighted.
#[derive(Default)]
pub struct PositionAnalyzer;

impl PositionAnalyzer {
    /// Position grid with gaps carried forward from the previous lap.
    fn position_grid(session: &Session, driver: &str, lap_count: u32) -> Vec<u32> {
        let mut positions = vec![0u32; lap_count as usize];
        for lap in session.laps_for(driver) {
            if lap.lap_number >= 1 && lap.lap_number <= lap_count {
                if let Some(position) = lap.position {
                    positions[lap.lap_number as usize - 1] = position;
                }
            }
        }
        for i in 1..positions.len() {
            if positions[i] == 0 {
                positions[i] = positions[i - 1];
            }
        }
        positions
    }
}

impl SessionAnalyzer for PositionAnalyzer {
    type Output = PositionChanges;

    fn analyze(&self, session: &Session) -> Result<PositionChanges, PitwallError> {
        let max_lap = session.info.total_laps.unwrap_or(MAX_LAP_NUMBER);
        let (valid, ignored): (Vec<u32>, Vec<u32>) = session
            .laps
            .iter()
            .map(|l| l.lap_number)
            .partition(|n| *n <= max_lap);
        if !ignored.is_empty() {
            warn!(
                "Ignoring {} laps numbered above {} in {}",
                ignored.len(),
                max_lap,
                session.info
            );
        }
        let lap_count = valid.into_iter().max().unwrap_or(0);
        let drivers = if session.results.is_empty() {
            session.drivers()
        } else {
            session
                .finishing_order()
                .into_iter()
                .map(|r| r.driver.clone())
                .collect()
        };

        let series = drivers
            .into_iter()
            .map(|driver| PositionSeries {
                positions: Self::position_grid(session, &driver, lap_count),
                driver,
            })
            .collect::<Vec<_>>();

        let mut changes = Vec::new();
        for s in &series {
            for (idx, pair) in s.positions.windows(2).enumerate() {
                let (from, to) = (pair[0], pair[1]);
                if from == 0 || to == 0 {
                    continue;
                }
                let change = from as i32 - to as i32;
                if change.abs() > SIGNIFICANT_CHANGE {
                    changes.push(PositionChange {
                        driver: s.driver.clone(),
                        lap_number: idx as u32 + 2,
                        from,
                        to,
                        change,
                        annotated: change.abs() > ANNOTATED_CHANGE,
                    });
                }
            }
        }

        let pit_stops = session
            .pit_stops
            .iter()
            .filter(|stop| stop.lap >= 1 && stop.lap <= lap_count)
            .filter_map(|stop| {
                let s = series.iter().find(|s| s.driver == stop.driver)?;
                Some(PitStopMarker {
                    driver: stop.driver.clone(),
                    lap_number: stop.lap,
                    position: s.positions[stop.lap as usize - 1],
                })
            })
            .collect();

        Ok(PositionChanges {
            session: session.info.clone(),
            lap_count,
            drivers: series,
            changes,
            pit_stops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PitStop;
    use crate::session::test_support::{lap, result};

    fn positioned(driver: &str, lap_number: u32, position: Option<u32>) -> crate::session::LapRecord {
        let mut l = lap(driver, lap_number, 90.);
        l.position = position;
        l
    }

    fn race() -> Session {
        Session {
            laps: vec![
                positioned("ALB", 1, Some(5)),
                positioned("ALB", 2, None),
                positioned("ALB", 3, Some(2)),
                positioned("ALB", 4, Some(1)),
                positioned("SAR", 1, Some(1)),
                positioned("SAR", 2, Some(4)),
                positioned("SAR", 3, Some(5)),
                positioned("SAR", 4, Some(5)),
            ],
            results: vec![result(2, "SAR", "Williams"), result(1, "ALB", "Williams")],
            pit_stops: vec![PitStop {
                driver: "SAR".to_string(),
                lap: 2,
                duration_s: 23.,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_corrupt_lap_numbers_ignored() {
        let mut session = race();
        session.laps.push(positioned("ALB", 4_000_000_000, Some(3)));
        let output = PositionAnalyzer.analyze(&session).unwrap();
        assert_eq!(output.lap_count, 4);
        assert_eq!(output.drivers[0].positions.len(), 4);

        session.info.total_laps = Some(3);
        let output = PositionAnalyzer.analyze(&session).unwrap();
        assert_eq!(output.lap_count, 3);
        assert_eq!(output.drivers[0].positions, vec![5, 5, 2]);
    }

    #[test]
    fn test_grid_carries_forward() {
        let output = PositionAnalyzer.analyze(&race()).unwrap();
        assert_eq!(output.lap_count, 4);
        assert_eq!(output.drivers[0].driver, "ALB");
        assert_eq!(output.drivers[0].positions, vec![5, 5, 2, 1]);
    }

    #[test]
    fn test_significant_changes() {
        let output = PositionAnalyzer.analyze(&race()).unwrap();
        assert_eq!(
            output.changes,
            vec![
                PositionChange {
                    driver: "ALB".to_string(),
                    lap_number: 3,
                    from: 5,
                    to: 2,
                    change: 3,
                    annotated: true,
                },
                PositionChange {
                    driver: "SAR".to_string(),
                    lap_number: 2,
                    from: 1,
                    to: 4,
                    change: -3,
                    annotated: true,
                },
            ]
        );
        assert_eq!(
            output.pit_stops,
            vec![PitStopMarker {
                driver: "SAR".to_string(),
                lap_number: 2,
                position: 4
            }]
        );
    }
}
