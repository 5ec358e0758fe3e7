use log::{info, warn};
use serde::Serialize;

use super::SeasonAnalyzer;
use crate::PitwallError;
use crate::session::{EventId, Session, SessionKey, SessionProvider, SessionType};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeammateRound {
    pub event: String,
    /// Aligned with `TeammateComparison::drivers`
    pub qualifying: Vec<u32>,
    pub race: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeadToHead {
    pub driver: String,
    pub qualifying_wins: usize,
    pub qualifying_pct: f64,
    pub race_wins: usize,
    pub race_pct: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TeammateComparison {
    pub year: i32,
    pub team: String,
    pub drivers: Vec<String>,
    pub rounds: Vec<TeammateRound>,
    pub head_to_head: Vec<HeadToHead>,
}

/// Qualifying and race results of teammates across a season.
pub struct TeammateAnalyzer {
    year: i32,
    team: String,
}

struct LoadedRound {
    event: String,
    qualifying: Session,
    race: Session,
}

fn position_of(session: &Session, driver: &str) -> Option<u32> {
    session
        .results
        .iter()
        .find(|r| r.driver == driver)
        .and_then(|r| r.position)
}

/// Index of the best (lowest) position, first driver wins ties.
fn best_index(positions: &[u32]) -> Option<usize> {
    positions
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| **p)
        .map(|(i, _)| i)
}

impl TeammateAnalyzer {
    pub fn new(year: i32, team: String) -> Self {
        Self { year, team }
    }

    fn load_round(
        &self,
        provider: &dyn SessionProvider,
        round: u32,
        event: &str,
    ) -> Result<LoadedRound, PitwallError> {
        let key = |session| SessionKey::Event {
            year: self.year,
            event: EventId::Round(round),
            session,
        };
        Ok(LoadedRound {
            event: event.to_string(),
            qualifying: provider.load_session(&key(SessionType::Qualifying))?,
            race: provider.load_session(&key(SessionType::Race))?,
        })
    }

    /// Full team name and its drivers, taken from the latest race loaded.
    fn resolve_team(&self, rounds: &[LoadedRound]) -> Result<(String, Vec<String>), PitwallError> {
        let needle = self.team.to_lowercase();
        let race = rounds.last().map(|r| &r.race).ok_or(PitwallError::InsufficientData {
            needed: 1,
            found: 0,
        })?;
        let team = race
            .finishing_order()
            .into_iter()
            .map(|r| r.team.clone())
            .find(|t| t.to_lowercase().contains(&needle))
            .ok_or_else(|| PitwallError::UnknownTeam {
                team: self.team.clone(),
            })?;
        let drivers = race
            .finishing_order()
            .into_iter()
            .filter(|r| r.team == team)
            .map(|r| r.driver.clone())
            .collect::<Vec<_>>();
        if drivers.len() < 2 {
            return Err(PitwallError::InsufficientData {
                needed: 2,
                found: drivers.len(),
            });
        }
        Ok((team, drivers))
    }
}

impl SeasonAnalyzer for TeammateAnalyzer {
    type Output = TeammateComparison;

    fn analyze(&self, provider: &dyn SessionProvider) -> Result<TeammateComparison, PitwallError> {
        let schedule = provider.schedule(self.year)?;
        let loaded = schedule
            .iter()
            .filter_map(|event| match self.load_round(provider, event.round, &event.name) {
                Ok(round) => Some(round),
                Err(e) => {
                    warn!("Error processing {}: {}", event.name, e);
                    None
                }
            })
            .collect::<Vec<_>>();
        let (team, drivers) = self.resolve_team(&loaded)?;
        info!("Comparing {} teammates: {}", team, drivers.join(", "));

        let rounds = loaded
            .iter()
            .filter_map(|round| {
                let qualifying = drivers
                    .iter()
                    .map(|d| position_of(&round.qualifying, d))
                    .collect::<Option<Vec<_>>>()?;
                let race = drivers
                    .iter()
                    .map(|d| position_of(&round.race, d))
                    .collect::<Option<Vec<_>>>()?;
                Some(TeammateRound {
                    event: round.event.clone(),
                    qualifying,
                    race,
                })
            })
            .collect::<Vec<_>>();

        let mut qualifying_wins = vec![0usize; drivers.len()];
        let mut race_wins = vec![0usize; drivers.len()];
        for round in &rounds {
            if let Some(i) = best_index(&round.qualifying) {
                qualifying_wins[i] += 1;
            }
            if let Some(i) = best_index(&round.race) {
                race_wins[i] += 1;
            }
        }
        let pct = |wins: usize| {
            if rounds.is_empty() {
                0.
            } else {
                100. * wins as f64 / rounds.len() as f64
            }
        };
        let head_to_head = drivers
            .iter()
            .enumerate()
            .map(|(i, driver)| HeadToHead {
                driver: driver.clone(),
                qualifying_wins: qualifying_wins[i],
                qualifying_pct: pct(qualifying_wins[i]),
                race_wins: race_wins[i],
                race_pct: pct(race_wins[i]),
            })
            .collect();

        Ok(TeammateComparison {
            year: self.year,
            team,
            drivers,
            rounds,
            head_to_head,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_index_prefers_first_on_tie() {
        assert_eq!(best_index(&[3, 1, 1]), Some(1));
        assert_eq!(best_index(&[2, 2]), Some(0));
        assert_eq!(best_index(&[]), None);
    }
}
