use itertools::Itertools;
use log::debug;
use serde::Serialize;

use super::SessionAnalyzer;
use crate::PitwallError;
use crate::session::{Compound, LapRecord, Session, SessionInfo};
use crate::stats::{LinearFit, fit_degradation, mean};

#[derive(Clone, Debug, Serialize)]
pub struct CompoundSeries {
    pub compound: Compound,
    pub points: Vec<(u32, f64)>,
    pub average_s: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StintDegradation {
    pub compound: Compound,
    pub stint: u32,
    /// `(tyre life, seconds)`
    pub points: Vec<(f64, f64)>,
    pub fit: Option<LinearFit>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TyreCompoundComparison {
    pub session: SessionInfo,
    pub driver: String,
    pub compounds: Vec<CompoundSeries>,
    pub stints: Vec<StintDegradation>,
}

/// Lap times by compound for one driver, and how each stint degraded.
pub struct TyreCompoundAnalyzer {
    driver: String,
    min_stint_laps: usize,
}

impl TyreCompoundAnalyzer {
    pub fn new(driver: String, min_stint_laps: usize) -> Self {
        Self {
            driver,
            min_stint_laps,
        }
    }

    fn stint_degradation(&self, compound: &Compound, laps: &[&LapRecord]) -> Vec<StintDegradation> {
        if laps.len() < self.min_stint_laps {
            return Vec::new();
        }
        laps.iter()
            .filter_map(|l| l.stint.map(|s| (s, *l)))
            .into_group_map()
            .into_iter()
            .sorted_by_key(|(stint, _)| *stint)
            .filter(|(_, stint_laps)| stint_laps.len() >= self.min_stint_laps)
            .map(|(stint, stint_laps)| {
                let points = stint_laps
                    .iter()
                    .filter_map(|l| Some((l.tyre_life?, l.valid_lap_time()?)))
                    .collect::<Vec<_>>();
                let fit = fit_degradation(&points)
                    .map_err(|e| debug!("No degradation fit for {} stint {}: {}", compound, stint, e))
                    .ok();
                StintDegradation {
                    compound: compound.clone(),
                    stint,
                    points,
                    fit,
                }
            })
            .collect()
    }
}

impl SessionAnalyzer for TyreCompoundAnalyzer {
    type Output = TyreCompoundComparison;

    fn analyze(&self, session: &Session) -> Result<TyreCompoundComparison, PitwallError> {
        let laps = session.laps_for(&self.driver);
        if laps.is_empty() {
            return Err(PitwallError::NoLapData {
                driver: self.driver.clone(),
            });
        }

        let compounds = laps
            .iter()
            .map(|l| l.compound.clone().unwrap_or(Compound::Unknown))
            .unique()
            .collect::<Vec<_>>();
        if compounds.len() <= 1 {
            return Err(PitwallError::NotEnoughCompounds {
                found: compounds.iter().map(|c| c.to_string()).collect(),
            });
        }

        let mut series = Vec::new();
        let mut stints = Vec::new();
        for compound in compounds {
            let compound_laps = laps
                .iter()
                .filter(|l| l.compound.clone().unwrap_or(Compound::Unknown) == compound)
                .copied()
                .collect::<Vec<_>>();
            let points = compound_laps
                .iter()
                .filter_map(|l| l.valid_lap_time().map(|t| (l.lap_number, t)))
                .collect::<Vec<_>>();
            let times = points.iter().map(|(_, t)| *t).collect::<Vec<_>>();

            stints.extend(self.stint_degradation(&compound, &compound_laps));
            series.push(CompoundSeries {
                compound,
                average_s: mean(&times),
                points,
            });
        }

        Ok(TyreCompoundComparison {
            session: session.info.clone(),
            driver: self.driver.clone(),
            compounds: series,
            stints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_DEGRADATION_STINT_LAPS;
    use crate::session::test_support::lap;

    fn stint_lap(lap_number: u32, time: f64, compound: Compound, stint: u32, life: f64) -> LapRecord {
        let mut lap = lap("NOR", lap_number, time);
        lap.compound = Some(compound);
        lap.stint = Some(stint);
        lap.tyre_life = Some(life);
        lap
    }

    #[test]
    fn test_compounds_and_stint_degradation() {
        let session = Session {
            laps: vec![
                stint_lap(1, 92.0, Compound::Medium, 1, 1.),
                stint_lap(2, 92.1, Compound::Medium, 1, 2.),
                stint_lap(3, 92.2, Compound::Medium, 1, 3.),
                stint_lap(4, 92.3, Compound::Medium, 1, 4.),
                stint_lap(5, 91.0, Compound::Hard, 2, 1.),
                stint_lap(6, 91.2, Compound::Hard, 2, 2.),
            ],
            ..Default::default()
        };
        let output = TyreCompoundAnalyzer::new("NOR".to_string(), MIN_DEGRADATION_STINT_LAPS)
            .analyze(&session)
            .unwrap();

        assert_eq!(output.compounds.len(), 2);
        assert_eq!(output.compounds[0].compound, Compound::Medium);
        assert!((output.compounds[0].average_s.unwrap() - 92.15).abs() < 1e-9);
        assert_eq!(output.compounds[1].points.len(), 2);

        // the two lap hard stint is too short
        assert_eq!(output.stints.len(), 1);
        let fit = output.stints[0].fit.as_ref().unwrap();
        assert!((fit.slope - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_single_compound_is_rejected() {
        let session = Session {
            laps: vec![
                stint_lap(1, 92.0, Compound::Soft, 1, 1.),
                stint_lap(2, 92.1, Compound::Soft, 1, 2.),
            ],
            ..Default::default()
        };
        let result = TyreCompoundAnalyzer::new("NOR".to_string(), MIN_DEGRADATION_STINT_LAPS)
            .analyze(&session);
        match result {
            Err(PitwallError::NotEnoughCompounds { found }) => assert_eq!(found, vec!["SOFT"]),
            _ => panic!("Expected NotEnoughCompounds error"),
        }
    }

    #[test]
    fn test_unknown_driver() {
        let result = TyreCompoundAnalyzer::new("XXX".to_string(), MIN_DEGRADATION_STINT_LAPS)
            .analyze(&Session::default());
        assert!(matches!(result, Err(PitwallError::NoLapData { .. })));
    }
}
