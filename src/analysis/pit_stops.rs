use std::collections::HashMap;

use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;

use super::SessionAnalyzer;
use crate::PitwallError;
use crate::session::{Session, SessionInfo};
use crate::stats::{mean, std_dev};

#[derive(Clone, Debug, Serialize)]
pub struct DriverStops {
    pub driver: String,
    /// `(stop number, seconds)`
    pub durations: Vec<(usize, f64)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TeamStops {
    pub team: String,
    pub mean_s: f64,
    /// Population standard deviation, zero for a single stop
    pub std_dev_s: f64,
    pub stop_count: usize,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PitStopAnalysis {
    pub session: SessionInfo,
    pub drivers: Vec<DriverStops>,
    /// Quickest average first
    pub teams: Vec<TeamStops>,
}

/// Pit stop durations by driver and team.
#[derive(Default)]
pub struct PitStopAnalyzer;

impl SessionAnalyzer for PitStopAnalyzer {
    type Output = PitStopAnalysis;

    fn analyze(&self, session: &Session) -> Result<PitStopAnalysis, PitwallError> {
        if session.pit_stops.is_empty() {
            info!("No pit stop data available for {}", session.info);
        }

        let drivers = session
            .pit_stops
            .iter()
            .map(|s| s.driver.clone())
            .unique()
            .map(|driver| {
                let durations = session
                    .pit_stops
                    .iter()
                    .filter(|s| s.driver == driver)
                    .sorted_by_key(|s| s.lap)
                    .enumerate()
                    .map(|(i, s)| (i + 1, s.duration_s))
                    .collect();
                DriverStops { driver, durations }
            })
            .collect::<Vec<_>>();

        let mut by_team: HashMap<String, Vec<f64>> = HashMap::new();
        for stop in &session.pit_stops {
            match session.team_of(&stop.driver) {
                Some(team) => by_team.entry(team).or_default().push(stop.duration_s),
                None => warn!("No team for {}, leaving stop on lap {} out", stop.driver, stop.lap),
            }
        }
        let teams = by_team
            .into_iter()
            .filter_map(|(team, durations)| {
                let mean_s = mean(&durations)?;
                Some(TeamStops {
                    team,
                    mean_s,
                    std_dev_s: std_dev(&durations).unwrap_or_default(),
                    stop_count: durations.len(),
                    label: format!("{:.2}s", mean_s),
                })
            })
            .sorted_by(|a, b| a.mean_s.total_cmp(&b.mean_s))
            .collect();

        Ok(PitStopAnalysis {
            session: session.info.clone(),
            drivers,
            teams,
        })
    }
}
