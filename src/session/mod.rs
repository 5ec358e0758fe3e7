pub mod loader;
pub mod provider;
pub mod types;

use itertools::Itertools;

pub use loader::load_session_jsonl;
pub use provider::{EventId, FileSessionProvider, SessionKey, SessionProvider};
pub use types::{
    CarSample, Compound, LapRecord, PitStop, ResultEntry, ScheduledEvent, SessionInfo,
    SessionRecord, SessionType,
};

/// Laps slower than this multiple of the session's fastest lap are not quicklaps.
pub const DEFAULT_QUICKLAP_THRESHOLD: f64 = 1.07;

/// Everything loaded for one race weekend segment. Read-only once loaded.
#[derive(Default, Clone, Debug)]
pub struct Session {
    pub info: SessionInfo,
    pub laps: Vec<LapRecord>,
    pub results: Vec<ResultEntry>,
    pub pit_stops: Vec<PitStop>,
    pub car_data: Vec<CarSample>,
}

impl Session {
    /// Driver laps in lap-number order.
    pub fn laps_for(&self, driver: &str) -> Vec<&LapRecord> {
        self.laps
            .iter()
            .filter(|l| l.driver == driver)
            .sorted_by_key(|l| l.lap_number)
            .collect()
    }

    /// Unique driver codes, in order of first appearance in the lap table.
    pub fn drivers(&self) -> Vec<String> {
        self.laps.iter().map(|l| l.driver.clone()).unique().collect()
    }

    /// Results ordered by classification, unclassified drivers last.
    pub fn finishing_order(&self) -> Vec<&ResultEntry> {
        self.results
            .iter()
            .sorted_by_key(|r| r.position.unwrap_or(u32::MAX))
            .collect()
    }

    pub fn winner(&self) -> Option<&ResultEntry> {
        self.finishing_order().into_iter().next()
    }

    pub fn team_of(&self, driver: &str) -> Option<String> {
        self.results
            .iter()
            .find(|r| r.driver == driver)
            .map(|r| r.team.clone())
            .or_else(|| {
                self.laps
                    .iter()
                    .find(|l| l.driver == driver && l.team.is_some())
                    .and_then(|l| l.team.clone())
            })
    }

    pub fn total_laps(&self) -> u32 {
        self.info
            .total_laps
            .or_else(|| self.laps.iter().map(|l| l.lap_number).max())
            .unwrap_or(0)
    }

    /// Fastest valid lap of a driver.
    pub fn fastest_lap(&self, driver: &str) -> Option<&LapRecord> {
        self.laps
            .iter()
            .filter(|l| l.driver == driver)
            .filter_map(|l| l.valid_lap_time().map(|t| (l, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(l, _)| l)
    }

    /// Laps that are representative of pace: timed, not an in or out lap, and
    /// within `threshold` times the fastest lap of the session.
    pub fn quicklaps(&self, threshold: f64) -> Vec<&LapRecord> {
        Self::quick(self.laps.iter().collect(), threshold)
    }

    /// Same as [`Session::quicklaps`], with the cutoff taken from the driver's
    /// own fastest lap.
    pub fn quicklaps_for(&self, driver: &str, threshold: f64) -> Vec<&LapRecord> {
        Self::quick(self.laps_for(driver), threshold)
    }

    fn quick(laps: Vec<&LapRecord>, threshold: f64) -> Vec<&LapRecord> {
        let Some(fastest) = laps
            .iter()
            .filter_map(|l| l.valid_lap_time())
            .min_by(f64::total_cmp)
        else {
            return Vec::new();
        };
        let cutoff = fastest * threshold;
        laps.into_iter()
            .filter(|l| !l.pit_in && !l.pit_out)
            .filter(|l| matches!(l.valid_lap_time(), Some(t) if t <= cutoff))
            .collect()
    }

    pub fn car_data_for(&self, driver: &str, lap_number: u32) -> Vec<&CarSample> {
        self.car_data
            .iter()
            .filter(|s| s.driver == driver && s.lap_number == lap_number)
            .sorted_by(|a, b| a.time_s.total_cmp(&b.time_s))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn lap(driver: &str, lap_number: u32, lap_time_s: f64) -> LapRecord {
        LapRecord {
            driver: driver.to_string(),
            lap_number,
            lap_time_s: Some(lap_time_s),
            ..Default::default()
        }
    }

    pub(crate) fn result(position: u32, driver: &str, team: &str) -> ResultEntry {
        ResultEntry {
            position: Some(position),
            driver: driver.to_string(),
            team: team.to_string(),
            race_time_s: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{lap, result};
    use super::*;

    fn session() -> Session {
        let mut out_lap = lap("HAM", 2, 95.);
        out_lap.pit_out = true;
        Session {
            laps: vec![
                lap("VER", 2, 91.),
                lap("VER", 1, 90.),
                lap("HAM", 1, 90.5),
                out_lap,
                lap("HAM", 3, 100.),
            ],
            results: vec![result(2, "HAM", "Mercedes"), result(1, "VER", "Red Bull")],
            ..Default::default()
        }
    }

    #[test]
    fn test_laps_for_sorted_by_lap_number() {
        let session = session();
        let laps = session.laps_for("VER");
        assert_eq!(laps.len(), 2);
        assert_eq!(laps[0].lap_number, 1);
        assert_eq!(laps[1].lap_number, 2);
    }

    #[test]
    fn test_drivers_and_finishing_order() {
        let session = session();
        assert_eq!(session.drivers(), vec!["VER".to_string(), "HAM".to_string()]);
        assert_eq!(session.winner().unwrap().driver, "VER");
        assert_eq!(session.team_of("HAM"), Some("Mercedes".to_string()));
        assert_eq!(session.team_of("ALO"), None);
    }

    #[test]
    fn test_quicklaps_exclude_pit_and_slow_laps() {
        let session = session();
        let quick = session.quicklaps(DEFAULT_QUICKLAP_THRESHOLD);
        // 100s > 90 * 1.07, out lap excluded
        assert_eq!(quick.len(), 3);
        assert!(quick.iter().all(|l| !l.pit_out));
        assert!(quick.iter().all(|l| l.lap_time_s.unwrap() < 96.3));
    }

    #[test]
    fn test_quicklaps_for_uses_driver_fastest_lap() {
        let mut session = session();
        session.laps.push(lap("SAR", 1, 97.1));
        session.laps.push(lap("SAR", 2, 97.5));
        session.laps.push(lap("SAR", 3, 104.));
        assert!(session.quicklaps(DEFAULT_QUICKLAP_THRESHOLD).iter().all(|l| l.driver != "SAR"));

        let quick = session.quicklaps_for("SAR", DEFAULT_QUICKLAP_THRESHOLD);
        // 104s > 97.1 * 1.07
        assert_eq!(quick.iter().map(|l| l.lap_number).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(session.quicklaps_for("HAM", DEFAULT_QUICKLAP_THRESHOLD).len(), 1);
        assert!(session.quicklaps_for("ALO", DEFAULT_QUICKLAP_THRESHOLD).is_empty());
    }

    #[test]
    fn test_fastest_lap_and_total_laps() {
        let session = session();
        assert_eq!(session.fastest_lap("HAM").unwrap().lap_number, 1);
        assert_eq!(session.total_laps(), 3);
        assert!(session.fastest_lap("ALO").is_none());
    }
}
