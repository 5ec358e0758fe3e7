use std::collections::HashMap;

use itertools::Itertools;
use log::warn;
use serde::Serialize;

use super::SeasonAnalyzer;
use crate::PitwallError;
use crate::session::{EventId, ScheduledEvent, Session, SessionKey, SessionProvider, SessionType};

#[derive(Clone, Debug, Serialize)]
pub struct TeamDevelopmentSeries {
    pub team: String,
    /// Gap to the fastest team per round in percent, `None` when the team has no time
    pub gaps_pct: Vec<Option<f64>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TeamDevelopment {
    pub year: i32,
    pub rounds: Vec<ScheduledEvent>,
    pub teams: Vec<TeamDevelopmentSeries>,
}

/// Qualifying pace of each team relative to the fastest, over a spread of rounds.
pub struct TeamDevelopmentAnalyzer {
    year: i32,
    rounds: usize,
}

/// Picks `count` schedule indices spread evenly from the first to the last
/// event. Short seasons (fewer than 3 events) use every event.
pub fn spread_indices(event_count: usize, count: usize) -> Vec<usize> {
    if event_count < 3 || count == 0 {
        return (0..event_count).collect();
    }
    if count == 1 {
        return vec![0];
    }
    (0..count)
        .map(|i| i * (event_count - 1) / (count - 1))
        .dedup()
        .collect()
}

/// Best valid lap of each team in a session.
pub fn best_lap_per_team(session: &Session) -> HashMap<String, f64> {
    let mut best: HashMap<String, f64> = HashMap::new();
    for driver in session.drivers() {
        let Some(time) = session.fastest_lap(&driver).and_then(|l| l.valid_lap_time()) else {
            continue;
        };
        let Some(team) = session.team_of(&driver) else {
            continue;
        };
        best.entry(team)
            .and_modify(|t| *t = t.min(time))
            .or_insert(time);
    }
    best
}

impl TeamDevelopmentAnalyzer {
    pub fn new(year: i32, rounds: usize) -> Self {
        Self { year, rounds }
    }
}

impl SeasonAnalyzer for TeamDevelopmentAnalyzer {
    type Output = TeamDevelopment;

    fn analyze(&self, provider: &dyn SessionProvider) -> Result<TeamDevelopment, PitwallError> {
        let schedule = provider.schedule(self.year)?;
        if schedule.is_empty() {
            return Err(PitwallError::InsufficientData {
                needed: 1,
                found: 0,
            });
        }
        let rounds = spread_indices(schedule.len(), self.rounds)
            .into_iter()
            .map(|i| schedule[i].clone())
            .collect::<Vec<_>>();

        let per_round = rounds
            .iter()
            .map(|event| {
                let key = SessionKey::Event {
                    year: self.year,
                    event: EventId::Round(event.round),
                    session: SessionType::Qualifying,
                };
                match provider.load_session(&key) {
                    Ok(session) => best_lap_per_team(&session),
                    Err(e) => {
                        warn!("Error processing {}: {}", event.name, e);
                        HashMap::new()
                    }
                }
            })
            .collect::<Vec<_>>();

        let team_names = per_round
            .iter()
            .flat_map(|r| r.keys().cloned().sorted())
            .unique()
            .collect::<Vec<_>>();
        let fastest = per_round
            .iter()
            .map(|r| r.values().cloned().min_by(f64::total_cmp))
            .collect::<Vec<_>>();

        let teams = team_names
            .into_iter()
            .map(|team| {
                let gaps_pct = per_round
                    .iter()
                    .zip(&fastest)
                    .map(|(round, round_fastest)| {
                        let time = round.get(&team)?;
                        let round_fastest = (*round_fastest)?;
                        Some(100. * (time - round_fastest) / round_fastest)
                    })
                    .collect();
                TeamDevelopmentSeries { team, gaps_pct }
            })
            .collect();

        Ok(TeamDevelopment {
            year: self.year,
            rounds,
            teams,
        })
    }
}
