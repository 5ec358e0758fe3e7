// Error types for pitwall

use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
pub enum PitwallError {
    // Errors while locating and reading session files
    #[snafu(display("No session data found at {}", path.display()))]
    SessionNotFound { path: PathBuf },
    #[snafu(display("Error loading session file {}", path.display()))]
    SessionLoaderError { path: PathBuf, source: io::Error },
    #[snafu(display("Session file {} has no session info record", path.display()))]
    MissingSessionInfo { path: PathBuf },
    #[snafu(display("Error reading schedule {}", path.display()))]
    ScheduleIOError { path: PathBuf, source: io::Error },
    #[snafu(display("Error parsing schedule {}", path.display()))]
    ScheduleParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("Round {round} is not in the {year} schedule"))]
    UnknownRound { year: i32, round: u32 },

    // Errors for the exporters
    #[snafu(display("Error writing output file {}", path.display()))]
    WriterError { path: PathBuf, source: io::Error },
    #[snafu(display("Error serializing chart data"))]
    ChartSerializeError { source: serde_json::Error },
    #[snafu(display("Error writing lap table"))]
    CsvError { source: csv::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // Analysis errors, usually logged and skipped per item
    #[snafu(display("Not enough data: needed {needed} samples, found {found}"))]
    InsufficientData { needed: usize, found: usize },
    #[snafu(display("Cannot fit a line through points that share the same x value"))]
    DegenerateFit,
    #[snafu(display("No lap data for driver {driver}"))]
    NoLapData { driver: String },
    #[snafu(display("No car data for driver {driver} on lap {lap_number}"))]
    NoCarData { driver: String, lap_number: u32 },
    #[snafu(display("No team found matching '{team}'"))]
    UnknownTeam { team: String },
    #[snafu(display("Cannot determine a reference pace: {reason}"))]
    NoReferencePace { reason: String },
    #[snafu(display("Not enough tyre compounds for comparison, found: {found:?}"))]
    NotEnoughCompounds { found: Vec<String> },
    #[snafu(display("Session has no results table"))]
    NoResults,
}
