use itertools::Itertools;
use log::debug;
use serde::Serialize;

use super::{SessionAnalyzer, format_lap_time};
use crate::PitwallError;
use crate::session::{Compound, Session, SessionInfo};
use crate::stats::{LinearFit, OutlierFilter, fit_degradation, mean};

#[derive(Clone, Debug, Serialize)]
pub struct LongRun {
    pub stint: u32,
    pub compound: Compound,
    /// `(tyre life, seconds)` after outlier removal
    pub points: Vec<(f64, f64)>,
    pub average_s: f64,
    pub best_s: f64,
    pub fit: Option<LinearFit>,
    /// Degradation label, e.g. `+0.081s/lap`
    pub label: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LongRuns {
    pub session: SessionInfo,
    pub driver: String,
    pub stints: Vec<LongRun>,
}

/// Race simulation runs from practice or testing: stints long enough to show
/// tyre degradation.
pub struct LongRunAnalyzer {
    driver: String,
    min_stint_laps: usize,
    filter: OutlierFilter,
}

impl LongRunAnalyzer {
    pub fn new(driver: String, min_stint_laps: usize, filter: OutlierFilter) -> Self {
        Self {
            driver,
            min_stint_laps,
            filter,
        }
    }
}

impl SessionAnalyzer for LongRunAnalyzer {
    type Output = LongRuns;

    fn analyze(&self, session: &Session) -> Result<LongRuns, PitwallError> {
        let laps = session.laps_for(&self.driver);
        if laps.is_empty() {
            return Err(PitwallError::NoLapData {
                driver: self.driver.clone(),
            });
        }

        let stints = laps
            .into_iter()
            .filter_map(|l| l.stint.map(|s| (s, l)))
            .into_group_map()
            .into_iter()
            .sorted_by_key(|(stint, _)| *stint)
            .collect::<Vec<_>>();
        let longest = stints.iter().map(|(_, l)| l.len()).max().unwrap_or(0);
        if longest < self.min_stint_laps {
            return Err(PitwallError::InsufficientData {
                needed: self.min_stint_laps,
                found: longest,
            });
        }

        let runs = stints
            .into_iter()
            .filter(|(_, stint_laps)| stint_laps.len() >= self.min_stint_laps)
            .filter_map(|(stint, stint_laps)| {
                let compound = stint_laps[0].compound.clone().unwrap_or(Compound::Unknown);
                let timed = stint_laps
                    .iter()
                    .filter_map(|l| Some((l.tyre_life?, l.valid_lap_time()?)))
                    .collect::<Vec<_>>();
                let points = self.filter.filter_pairs(&timed);
                let times = points.iter().map(|(_, t)| *t).collect::<Vec<_>>();
                let average_s = mean(&times)?;
                let best_s = times.iter().cloned().fold(f64::INFINITY, f64::min);
                let fit = fit_degradation(&points)
                    .map_err(|e| debug!("No degradation fit for stint {}: {}", stint, e))
                    .ok();
                let label = fit.as_ref().map(|f| format!("{:+.3}s/lap", f.slope));
                debug!(
                    "Stint {} on {}: avg {}, best {}",
                    stint,
                    compound,
                    format_lap_time(average_s),
                    format_lap_time(best_s)
                );
                Some(LongRun {
                    stint,
                    compound,
                    points,
                    average_s,
                    best_s,
                    fit,
                    label,
                })
            })
            .collect();

        Ok(LongRuns {
            session: session.info.clone(),
            driver: self.driver.clone(),
            stints: runs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LONG_RUN_MIN_STINT_LAPS, LONG_RUN_OUTLIER_MIN_SAMPLES};
    use crate::session::LapRecord;
    use crate::session::test_support::lap;

    fn stint_laps(stint: u32, start_lap: u32, times: &[f64]) -> Vec<LapRecord> {
        times
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let mut l = lap("RUS", start_lap + i as u32, *t);
                l.stint = Some(stint);
                l.tyre_life = Some(i as f64 + 1.);
                l.compound = Some(Compound::Hard);
                l
            })
            .collect()
    }

    fn analyzer() -> LongRunAnalyzer {
        LongRunAnalyzer::new(
            "RUS".to_string(),
            LONG_RUN_MIN_STINT_LAPS,
            OutlierFilter::with_min_samples(LONG_RUN_OUTLIER_MIN_SAMPLES),
        )
    }

    #[test]
    fn test_long_run_with_outlier_and_degradation() {
        let mut laps = stint_laps(1, 1, &[95., 94.]);
        laps.extend(stint_laps(
            2,
            3,
            &[92.0, 92.1, 92.2, 99.0, 92.4, 92.5],
        ));
        let session = Session {
            laps,
            ..Default::default()
        };
        let output = analyzer().analyze(&session).unwrap();

        assert_eq!(output.stints.len(), 1);
        let run = &output.stints[0];
        assert_eq!(run.stint, 2);
        assert_eq!(run.compound, Compound::Hard);
        // traffic lap at tyre life 4 removed
        assert_eq!(run.points.len(), 5);
        assert!(run.points.iter().all(|(life, _)| *life != 4.));
        assert_eq!(run.best_s, 92.0);
        assert!((run.average_s - 92.24).abs() < 1e-9);
        let fit = run.fit.as_ref().unwrap();
        assert!((fit.slope - 0.1).abs() < 1e-9);
        assert_eq!(run.label.as_deref(), Some("+0.100s/lap"));
    }

    #[test]
    fn test_no_long_runs() {
        let session = Session {
            laps: stint_laps(1, 1, &[95., 94., 93.]),
            ..Default::default()
        };
        match analyzer().analyze(&session) {
            Err(PitwallError::InsufficientData { needed: 5, found: 3 }) => {}
            _ => panic!("Expected InsufficientData error"),
        }
    }
}
