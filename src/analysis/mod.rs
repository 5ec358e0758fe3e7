pub mod lap_times;
pub mod long_runs;
pub mod mean_lap_time;
pub mod pit_stops;
pub mod positions;
pub mod race_history;
pub mod sector_times;
pub mod speed_trace;
pub mod team_development;
pub mod team_pace;
pub mod teammates;
pub mod tyre_compounds;

use std::fmt::Display;

use log::warn;
use serde::Serialize;

use crate::PitwallError;
use crate::session::{Session, SessionProvider};

pub use lap_times::{LapTimeEvolution, LapTimesAnalyzer};
pub use long_runs::{LongRunAnalyzer, LongRuns};
pub use mean_lap_time::{MeanLapTimeAnalyzer, MeanLapTimes};
pub use pit_stops::{PitStopAnalysis, PitStopAnalyzer};
pub use positions::{PositionAnalyzer, PositionChanges};
pub use race_history::{RaceHistory, RaceHistoryAnalyzer};
pub use sector_times::{SectorTimes, SectorTimesAnalyzer};
pub use speed_trace::{SpeedTrace, SpeedTraceAnalyzer};
pub use team_development::{TeamDevelopment, TeamDevelopmentAnalyzer};
pub use team_pace::{TeamPace, TeamPaceAnalyzer};
pub use teammates::{TeammateAnalyzer, TeammateComparison};
pub use tyre_compounds::{TyreCompoundAnalyzer, TyreCompoundComparison};

/// Turns one loaded session into chart-ready data.
pub trait SessionAnalyzer {
    type Output: Serialize;

    fn analyze(&self, session: &Session) -> Result<Self::Output, PitwallError>;
}

/// Turns a whole season, loaded on demand, into chart-ready data.
pub trait SeasonAnalyzer {
    type Output: Serialize;

    fn analyze(&self, provider: &dyn SessionProvider) -> Result<Self::Output, PitwallError>;
}

/// Computes every item independently. A failing item is logged and left out so
/// the rest of the chart still has data.
pub(crate) fn skip_failures<I, T, F>(items: I, mut compute: F) -> Vec<T>
where
    I: IntoIterator,
    I::Item: Display,
    F: FnMut(&I::Item) -> Result<T, PitwallError>,
{
    items
        .into_iter()
        .filter_map(|item| match compute(&item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping {}: {}", item, e);
                None
            }
        })
        .collect()
}

/// `m:ss.mmm`, the way lap times are written on timing screens.
pub fn format_lap_time(seconds: f64) -> String {
    let ms = (seconds * 1000.).round() as i64;
    format!("{}:{:02}.{:03}", ms / 60_000, (ms % 60_000) / 1000, ms % 1000)
}

/// Axis range that keeps a chart focused around the median.
pub(crate) fn focused_range(values: &[f64]) -> Option<(f64, f64)> {
    let median = crate::stats::median(values)?;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(((min - 1.).max(median * 0.95), (max + 1.).min(median * 1.05)))
}
