use serde::Serialize;

use super::{SessionAnalyzer, skip_failures};
use crate::PitwallError;
use crate::session::{Session, SessionInfo};

/// Number of drivers picked when none were requested, e.g. on testing days.
pub const DEFAULT_DRIVER_COUNT: usize = 3;

#[derive(Clone, Debug, Serialize)]
pub struct DriverSpeedTrace {
    pub driver: String,
    pub team: Option<String>,
    pub lap_number: u32,
    pub lap_time_s: f64,
    /// `(seconds into the lap, km/h)`
    pub samples: Vec<(f64, f64)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SpeedTrace {
    pub session: SessionInfo,
    pub traces: Vec<DriverSpeedTrace>,
}

/// Speed over each driver's fastest lap.
pub struct SpeedTraceAnalyzer {
    drivers: Vec<String>,
}

impl SpeedTraceAnalyzer {
    pub fn new(drivers: Vec<String>) -> Self {
        Self { drivers }
    }

    fn trace(&self, session: &Session, driver: &str) -> Result<DriverSpeedTrace, PitwallError> {
        let fastest = session
            .fastest_lap(driver)
            .ok_or_else(|| PitwallError::NoLapData {
                driver: driver.to_string(),
            })?;
        let samples = session
            .car_data_for(driver, fastest.lap_number)
            .into_iter()
            .map(|s| (s.time_s, s.speed_kph))
            .collect::<Vec<_>>();
        if samples.is_empty() {
            return Err(PitwallError::NoCarData {
                driver: driver.to_string(),
                lap_number: fastest.lap_number,
            });
        }
        Ok(DriverSpeedTrace {
            driver: driver.to_string(),
            team: fastest.team.clone().or_else(|| session.team_of(driver)),
            lap_number: fastest.lap_number,
            lap_time_s: fastest.valid_lap_time().unwrap_or_default(),
            samples,
        })
    }
}

impl SessionAnalyzer for SpeedTraceAnalyzer {
    type Output = SpeedTrace;

    fn analyze(&self, session: &Session) -> Result<SpeedTrace, PitwallError> {
        let drivers = if self.drivers.is_empty() {
            session
                .drivers()
                .into_iter()
                .take(DEFAULT_DRIVER_COUNT)
                .collect()
        } else {
            self.drivers.clone()
        };
        let traces = skip_failures(drivers, |driver| self.trace(session, driver));
        Ok(SpeedTrace {
            session: session.info.clone(),
            traces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CarSample;
    use crate::session::test_support::lap;

    fn sample(driver: &str, lap_number: u32, time_s: f64, speed_kph: f64) -> CarSample {
        CarSample {
            driver: driver.to_string(),
            lap_number,
            time_s,
            speed_kph,
        }
    }

    fn session() -> Session {
        Session {
            laps: vec![
                lap("VER", 1, 92.),
                lap("VER", 2, 90.),
                lap("HAM", 1, 91.),
                lap("LEC", 1, 93.),
                lap("SAI", 1, 94.),
            ],
            car_data: vec![
                sample("VER", 2, 0.5, 250.),
                sample("VER", 2, 0.1, 240.),
                sample("VER", 1, 0.1, 200.),
                sample("HAM", 1, 0.1, 230.),
                sample("LEC", 1, 0.1, 220.),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_trace_uses_fastest_lap() {
        let analyzer = SpeedTraceAnalyzer::new(vec!["VER".to_string()]);
        let trace = analyzer.analyze(&session()).unwrap();
        assert_eq!(trace.traces.len(), 1);
        assert_eq!(trace.traces[0].lap_number, 2);
        assert_eq!(trace.traces[0].samples, vec![(0.1, 240.), (0.5, 250.)]);
    }

    #[test]
    fn test_driver_without_data_is_skipped() {
        let analyzer = SpeedTraceAnalyzer::new(vec!["ALO".to_string(), "HAM".to_string()]);
        let trace = analyzer.analyze(&session()).unwrap();
        assert_eq!(trace.traces.len(), 1);
        assert_eq!(trace.traces[0].driver, "HAM");
    }

    #[test]
    fn test_default_drivers_when_none_requested() {
        let analyzer = SpeedTraceAnalyzer::new(vec![]);
        let trace = analyzer.analyze(&session()).unwrap();
        let drivers = trace.traces.iter().map(|t| t.driver.as_str()).collect::<Vec<_>>();
        assert_eq!(drivers, vec!["VER", "HAM", "LEC"]);
    }
}
