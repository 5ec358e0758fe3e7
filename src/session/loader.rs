use std::path::Path;

use log::{info, warn};

use super::{Session, SessionRecord};
use crate::PitwallError;

/// Reads a JSON Lines session file into a [`Session`].
///
/// The file must contain one `Info` record; any later `Info` record is ignored.
pub fn load_session_jsonl(source_file: &Path) -> Result<Session, PitwallError> {
    if !source_file.exists() {
        return Err(PitwallError::SessionNotFound {
            path: source_file.to_path_buf(),
        });
    }

    let records = serde_jsonlines::json_lines(source_file)
        .map_err(|e| PitwallError::SessionLoaderError {
            path: source_file.to_path_buf(),
            source: e,
        })?
        .collect::<Result<Vec<SessionRecord>, std::io::Error>>()
        .map_err(|e| PitwallError::SessionLoaderError {
            path: source_file.to_path_buf(),
            source: e,
        })?;

    let mut session = Session::default();
    let mut has_info = false;
    for record in records {
        match record {
            SessionRecord::Info(info) => {
                if has_info {
                    warn!(
                        "Ignoring extra session info record in {:?}: {}",
                        source_file, info
                    );
                    continue;
                }
                session.info = info;
                has_info = true;
            }
            SessionRecord::Lap(lap) => session.laps.push(lap),
            SessionRecord::Result(result) => session.results.push(result),
            SessionRecord::PitStop(stop) => session.pit_stops.push(stop),
            SessionRecord::CarSample(sample) => session.car_data.push(sample),
        }
    }

    if !has_info {
        return Err(PitwallError::MissingSessionInfo {
            path: source_file.to_path_buf(),
        });
    }

    info!(
        "Loaded {:?}: {}, {} laps, {} results, {} pit stops, {} car samples",
        source_file,
        session.info,
        session.laps.len(),
        session.results.len(),
        session.pit_stops.len(),
        session.car_data.len()
    );
    Ok(session)
}
