// Session storage: locates session files for a year / event / session type

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use log::debug;

use super::{ScheduledEvent, Session, SessionType, load_session_jsonl};
use crate::PitwallError;

const SCHEDULE_FILE_NAME: &str = "schedule.json";

/// Event by name (as in the schedule, case and punctuation insensitive) or round number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventId {
    Name(String),
    Round(u32),
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        match value.trim().parse::<u32>() {
            Ok(round) => EventId::Round(round),
            Err(_) => EventId::Name(value.trim().to_string()),
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Name(name) => write!(f, "{}", name),
            EventId::Round(round) => write!(f, "round {}", round),
        }
    }
}

/// Identifies one session to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionKey {
    Event {
        year: i32,
        event: EventId,
        session: SessionType,
    },
    Testing {
        year: i32,
        test_number: u32,
        day: u32,
    },
}

impl SessionKey {
    pub fn year(&self) -> i32 {
        match self {
            SessionKey::Event { year, .. } | SessionKey::Testing { year, .. } => *year,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKey::Event {
                year,
                event,
                session,
            } => write!(f, "{} {} {}", year, event, session),
            SessionKey::Testing {
                year,
                test_number,
                day,
            } => write!(f, "{} testing {} day {}", year, test_number, day),
        }
    }
}

/// Source of session data.
pub trait SessionProvider {
    /// Load a complete session
    fn load_session(&self, key: &SessionKey) -> Result<Session, PitwallError>;

    /// Events of a season in round order
    fn schedule(&self, year: i32) -> Result<Vec<ScheduledEvent>, PitwallError>;
}

/// Reads sessions from a directory tree:
/// `<root>/<year>/<event>/<code>.jsonl`, `<root>/<year>/testing-<n>/day-<d>.jsonl`
/// and `<root>/<year>/schedule.json`.
pub struct FileSessionProvider {
    root: PathBuf,
}

impl FileSessionProvider {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize event name for consistent directory naming
    pub fn normalize_event_name(event_name: &str) -> String {
        event_name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn resolve_event_name(&self, year: i32, event: &EventId) -> Result<String, PitwallError> {
        match event {
            EventId::Name(name) => Ok(name.clone()),
            EventId::Round(round) => self
                .schedule(year)?
                .into_iter()
                .find(|e| e.round == *round)
                .map(|e| e.name)
                .ok_or(PitwallError::UnknownRound {
                    year,
                    round: *round,
                }),
        }
    }

    /// File path for a session key.
    pub fn session_path(&self, key: &SessionKey) -> Result<PathBuf, PitwallError> {
        let path = match key {
            SessionKey::Event {
                year,
                event,
                session,
            } => {
                let event_name = self.resolve_event_name(*year, event)?;
                self.root
                    .join(year.to_string())
                    .join(Self::normalize_event_name(&event_name))
                    .join(format!("{}.jsonl", session.code()))
            }
            SessionKey::Testing {
                year,
                test_number,
                day,
            } => self
                .root
                .join(year.to_string())
                .join(format!("testing-{}", test_number))
                .join(format!("day-{}.jsonl", day)),
        };
        Ok(path)
    }
}

impl SessionProvider for FileSessionProvider {
    fn load_session(&self, key: &SessionKey) -> Result<Session, PitwallError> {
        let path = self.session_path(key)?;
        debug!("Loading session {} from {:?}", key, path);
        load_session_jsonl(&path)
    }

    fn schedule(&self, year: i32) -> Result<Vec<ScheduledEvent>, PitwallError> {
        let path = self.root.join(year.to_string()).join(SCHEDULE_FILE_NAME);
        if !path.exists() {
            return Err(PitwallError::SessionNotFound { path });
        }
        let content = fs::read_to_string(&path).map_err(|e| PitwallError::ScheduleIOError {
            path: path.clone(),
            source: e,
        })?;
        let mut events: Vec<ScheduledEvent> =
            serde_json::from_str(&content).map_err(|e| PitwallError::ScheduleParseError {
                path: path.clone(),
                source: e,
            })?;
        events.sort_by_key(|e| e.round);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider_with_schedule() -> (TempDir, FileSessionProvider) {
        let dir = TempDir::new().unwrap();
        let year_dir = dir.path().join("2023");
        fs::create_dir_all(&year_dir).unwrap();
        fs::write(
            year_dir.join(SCHEDULE_FILE_NAME),
            r#"[{"round":2,"name":"Saudi Arabian Grand Prix"},{"round":1,"name":"Bahrain Grand Prix"}]"#,
        )
        .unwrap();
        let provider = FileSessionProvider::new(dir.path().to_path_buf());
        (dir, provider)
    }

    #[test]
    fn test_event_id_parsing() {
        assert_eq!(EventId::from("10"), EventId::Round(10));
        assert_eq!(
            EventId::from(" Austria "),
            EventId::Name("Austria".to_string())
        );
    }

    #[test]
    fn test_normalize_event_name() {
        assert_eq!(
            FileSessionProvider::normalize_event_name("Saudi Arabian Grand Prix"),
            "saudi_arabian_grand_prix"
        );
        assert_eq!(FileSessionProvider::normalize_event_name("São Paulo"), "são_paulo");
    }

    #[test]
    fn test_schedule_sorted_by_round() {
        let (_dir, provider) = provider_with_schedule();
        let schedule = provider.schedule(2023).unwrap();
        assert_eq!(schedule[0].name, "Bahrain Grand Prix");
        assert_eq!(schedule[1].round, 2);
    }

    #[test]
    fn test_session_path_by_round_and_name() {
        let (dir, provider) = provider_with_schedule();
        let by_round = provider
            .session_path(&SessionKey::Event {
                year: 2023,
                event: EventId::Round(2),
                session: SessionType::Qualifying,
            })
            .unwrap();
        assert_eq!(
            by_round,
            dir.path()
                .join("2023")
                .join("saudi_arabian_grand_prix")
                .join("Q.jsonl")
        );

        let testing = provider
            .session_path(&SessionKey::Testing {
                year: 2023,
                test_number: 1,
                day: 2,
            })
            .unwrap();
        assert_eq!(
            testing,
            dir.path().join("2023").join("testing-1").join("day-2.jsonl")
        );
    }

    #[test]
    fn test_unknown_round() {
        let (_dir, provider) = provider_with_schedule();
        let result = provider.load_session(&SessionKey::Event {
            year: 2023,
            event: EventId::Round(9),
            session: SessionType::Race,
        });
        assert!(matches!(
            result,
            Err(PitwallError::UnknownRound {
                year: 2023,
                round: 9
            })
        ));
    }

    #[test]
    fn test_missing_session_file() {
        let (_dir, provider) = provider_with_schedule();
        let result = provider.load_session(&SessionKey::Event {
            year: 2023,
            event: EventId::Name("Bahrain Grand Prix".to_string()),
            session: SessionType::Race,
        });
        assert!(matches!(result, Err(PitwallError::SessionNotFound { .. })));
    }
}
