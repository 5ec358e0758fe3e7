use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::PitwallError;

/// Race weekend segment.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum SessionType {
    Practice1,
    Practice2,
    Practice3,
    Qualifying,
    Sprint,
    Race,
    /// Pre-season testing day
    Testing,
}

impl SessionType {
    /// Short code, also used as the session file stem.
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Practice1 => "FP1",
            SessionType::Practice2 => "FP2",
            SessionType::Practice3 => "FP3",
            SessionType::Qualifying => "Q",
            SessionType::Sprint => "S",
            SessionType::Race => "R",
            SessionType::Testing => "T",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Practice1 => write!(f, "Practice 1"),
            SessionType::Practice2 => write!(f, "Practice 2"),
            SessionType::Practice3 => write!(f, "Practice 3"),
            SessionType::Qualifying => write!(f, "Qualifying"),
            SessionType::Sprint => write!(f, "Sprint"),
            SessionType::Race => write!(f, "Race"),
            SessionType::Testing => write!(f, "Testing"),
        }
    }
}

impl FromStr for SessionType {
    type Err = PitwallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '_', '-'], "");
        match normalized.as_str() {
            "FP1" | "PRACTICE1" => Ok(SessionType::Practice1),
            "FP2" | "PRACTICE2" => Ok(SessionType::Practice2),
            "FP3" | "PRACTICE3" => Ok(SessionType::Practice3),
            "Q" | "QUALIFYING" => Ok(SessionType::Qualifying),
            "S" | "SPRINT" => Ok(SessionType::Sprint),
            "R" | "RACE" => Ok(SessionType::Race),
            _ => Err(PitwallError::InvalidUserInput {
                field: "session".to_string(),
                reason: format!("'{}' is not one of FP1, FP2, FP3, Q, S, R", s),
            }),
        }
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compound::Soft => write!(f, "SOFT"),
            Compound::Medium => write!(f, "MEDIUM"),
            Compound::Hard => write!(f, "HARD"),
            Compound::Intermediate => write!(f, "INTERMEDIATE"),
            Compound::Wet => write!(f, "WET"),
            Compound::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One timed lap of one car.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapRecord {
    /// Three letter driver code
    pub driver: String,
    pub team: Option<String>,
    pub lap_number: u32,
    /// Missing for laps the timing system could not close (red flags, retirements)
    pub lap_time_s: Option<f64>,
    pub sector_times_s: [Option<f64>; 3],
    pub compound: Option<Compound>,
    pub stint: Option<u32>,
    /// Laps driven on this tyre set, including laps from earlier sessions
    pub tyre_life: Option<f64>,
    pub pit_in: bool,
    pub pit_out: bool,
    /// Running position at the end of the lap
    pub position: Option<u32>,
}

impl LapRecord {
    /// Lap time if present, finite and positive.
    pub fn valid_lap_time(&self) -> Option<f64> {
        self.lap_time_s.filter(|t| t.is_finite() && *t > 0.)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultEntry {
    /// `None` when the driver was not classified
    pub position: Option<u32>,
    pub driver: String,
    pub team: String,
    /// Total race time, only meaningful for the winner
    pub race_time_s: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PitStop {
    pub driver: String,
    pub lap: u32,
    pub duration_s: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CarSample {
    pub driver: String,
    pub lap_number: u32,
    /// Seconds since the start of the lap
    pub time_s: f64,
    pub speed_kph: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub event_name: String,
    pub year: i32,
    #[serde(default)]
    pub round: Option<u32>,
    pub session_type: SessionType,
    #[serde(default)]
    pub total_laps: Option<u32>,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            event_name: "Unknown".to_string(),
            year: 0,
            round: None,
            session_type: SessionType::Race,
            total_laps: None,
        }
    }
}

impl fmt::Display for SessionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.event_name, self.year, self.session_type)
    }
}

/// One line of a session file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionRecord {
    Info(SessionInfo),
    Lap(LapRecord),
    Result(ResultEntry),
    PitStop(PitStop),
    CarSample(CarSample),
}

/// Event as listed in a season schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub round: u32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_type_parsing() {
        assert_eq!("R".parse::<SessionType>().unwrap(), SessionType::Race);
        assert_eq!("fp2".parse::<SessionType>().unwrap(), SessionType::Practice2);
        assert_eq!(
            "Practice 3".parse::<SessionType>().unwrap(),
            SessionType::Practice3
        );
        assert_eq!(
            "qualifying".parse::<SessionType>().unwrap(),
            SessionType::Qualifying
        );
        assert!(matches!(
            "FP4".parse::<SessionType>(),
            Err(PitwallError::InvalidUserInput { .. })
        ));
    }

    #[test]
    fn test_unknown_compound_deserializes() {
        let lap: LapRecord =
            serde_json::from_str(r#"{"driver":"VER","lap_number":3,"compound":"HYPERSOFT"}"#)
                .unwrap();
        assert_eq!(lap.compound, Some(Compound::Unknown));
        assert_eq!(lap.lap_time_s, None);
        assert!(!lap.pit_in);
    }

    #[test]
    fn test_valid_lap_time() {
        let lap = LapRecord {
            lap_time_s: Some(-1.),
            ..Default::default()
        };
        assert_eq!(lap.valid_lap_time(), None);
        let lap = LapRecord {
            lap_time_s: Some(92.5),
            ..Default::default()
        };
        assert_eq!(lap.valid_lap_time(), Some(92.5));
    }
}
