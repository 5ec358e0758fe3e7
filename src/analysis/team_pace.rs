use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use super::SessionAnalyzer;
use crate::PitwallError;
use crate::session::{Session, SessionInfo};
use crate::stats::percentile;

/// Box plot summary with Tukey whiskers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Most extreme values still inside the 1.5 IQR fences
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let q1 = percentile(values, 25.)?;
        let median = percentile(values, 50.)?;
        let q3 = percentile(values, 75.)?;
        let iqr = q3 - q1;
        let (low, high) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let (inside, outliers): (Vec<f64>, Vec<f64>) =
            values.iter().partition(|v| **v >= low && **v <= high);
        Some(Self {
            q1,
            median,
            q3,
            whisker_low: inside.iter().cloned().fold(f64::INFINITY, f64::min),
            whisker_high: inside.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            outliers: outliers.into_iter().sorted_by(f64::total_cmp).collect(),
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TeamPaceEntry {
    pub team: String,
    pub stats: BoxStats,
    pub gap_to_fastest_s: f64,
    pub lap_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct TeamPace {
    pub session: SessionInfo,
    /// Ordered by median quicklap, fastest first
    pub teams: Vec<TeamPaceEntry>,
}

/// Quicklap distribution of each team.
pub struct TeamPaceAnalyzer {
    quicklap_threshold: f64,
}

impl TeamPaceAnalyzer {
    pub fn new(quicklap_threshold: f64) -> Self {
        Self { quicklap_threshold }
    }
}

impl SessionAnalyzer for TeamPaceAnalyzer {
    type Output = TeamPace;

    fn analyze(&self, session: &Session) -> Result<TeamPace, PitwallError> {
        let mut by_team: HashMap<String, Vec<f64>> = HashMap::new();
        for lap in session.quicklaps(self.quicklap_threshold) {
            let Some(team) = lap.team.clone().or_else(|| session.team_of(&lap.driver)) else {
                continue;
            };
            if let Some(time) = lap.valid_lap_time() {
                by_team.entry(team).or_default().push(time);
            }
        }

        let mut teams = by_team
            .into_iter()
            .filter_map(|(team, times)| {
                BoxStats::from_values(&times).map(|stats| TeamPaceEntry {
                    team,
                    stats,
                    gap_to_fastest_s: 0.,
                    lap_count: times.len(),
                })
            })
            .sorted_by(|a, b| {
                a.stats
                    .median
                    .total_cmp(&b.stats.median)
                    .then_with(|| a.team.cmp(&b.team))
            })
            .collect::<Vec<_>>();

        if let Some(fastest) = teams.first().map(|t| t.stats.median) {
            for team in teams.iter_mut() {
                team.gap_to_fastest_s = team.stats.median - fastest;
            }
        }

        Ok(TeamPace {
            session: session.info.clone(),
            teams,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DEFAULT_QUICKLAP_THRESHOLD;
    use crate::session::test_support::{lap, result};

    #[test]
    fn test_box_stats() {
        let stats = BoxStats::from_values(&[90., 91., 92., 93., 99.]).unwrap();
        assert_eq!(stats.q1, 91.);
        assert_eq!(stats.median, 92.);
        assert_eq!(stats.q3, 93.);
        assert_eq!(stats.whisker_low, 90.);
        assert_eq!(stats.whisker_high, 93.);
        assert_eq!(stats.outliers, vec![99.]);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_teams_ordered_by_median_with_gap() {
        let mut alo = lap("ALO", 1, 91.5);
        alo.team = Some("Aston Martin".to_string());
        let session = Session {
            laps: vec![
                lap("VER", 1, 90.),
                lap("PER", 1, 90.4),
                lap("HAM", 1, 91.),
                lap("RUS", 1, 91.2),
                alo,
                lap("SAR", 1, 91.8),
            ],
            results: vec![
                result(1, "VER", "Red Bull"),
                result(2, "PER", "Red Bull"),
                result(3, "HAM", "Mercedes"),
                result(4, "RUS", "Mercedes"),
            ],
            ..Default::default()
        };

        let output = TeamPaceAnalyzer::new(DEFAULT_QUICKLAP_THRESHOLD)
            .analyze(&session)
            .unwrap();
        // SAR has no team anywhere and is ignored
        let teams = output.teams.iter().map(|t| t.team.as_str()).collect::<Vec<_>>();
        assert_eq!(teams, vec!["Red Bull", "Mercedes", "Aston Martin"]);
        assert_eq!(output.teams[0].gap_to_fastest_s, 0.);
        assert!((output.teams[1].gap_to_fastest_s - 0.9).abs() < 1e-9);
        assert_eq!(output.teams[0].lap_count, 2);
    }
}
