// Chart requests: what to draw and from which data, dispatched to the analyzers

use clap::ValueEnum;
use log::info;
use serde::Serialize;

use crate::PitwallError;
use crate::analysis::{
    LapTimeEvolution, LapTimesAnalyzer, LongRunAnalyzer, LongRuns, MeanLapTimeAnalyzer,
    MeanLapTimes, PitStopAnalysis, PitStopAnalyzer, PositionAnalyzer, PositionChanges,
    RaceHistory, RaceHistoryAnalyzer, SeasonAnalyzer, SectorTimes, SectorTimesAnalyzer,
    SessionAnalyzer, SpeedTrace, SpeedTraceAnalyzer, TeamDevelopment, TeamDevelopmentAnalyzer,
    TeamPace, TeamPaceAnalyzer, TeammateAnalyzer, TeammateComparison, TyreCompoundAnalyzer,
    TyreCompoundComparison,
};
use crate::config::AnalysisConfig;
use crate::session::{EventId, Session, SessionKey, SessionProvider, SessionType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    SpeedTrace,
    MeanLapTime,
    LapTimes,
    RaceHistory,
    TeamPace,
    TyreCompounds,
    SectorTimes,
    PitStops,
    Positions,
    LongRuns,
    TeamDevelopment,
    Teammates,
    TestingPace,
}

impl ChartKind {
    /// Season charts load their own sessions through the provider.
    pub fn is_season_chart(&self) -> bool {
        matches!(self, ChartKind::TeamDevelopment | ChartKind::Teammates)
    }
}

/// Everything needed to build one chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub year: i32,
    /// Required by every chart except the season ones
    pub session: Option<SessionKey>,
    /// Upper-case driver codes
    pub drivers: Vec<String>,
    pub team: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "chart", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    SpeedTrace(SpeedTrace),
    MeanLapTime(MeanLapTimes),
    LapTimes(LapTimeEvolution),
    RaceHistory(RaceHistory),
    TeamPace(TeamPace),
    TyreCompounds(TyreCompoundComparison),
    SectorTimes(SectorTimes),
    PitStops(PitStopAnalysis),
    Positions(PositionChanges),
    LongRuns(LongRuns),
    TeamDevelopment(TeamDevelopment),
    Teammates(TeammateComparison),
    TestingPace(SpeedTrace),
}

/// Splits a driver list typed by a user ("ver ham", "VER,HAM") into driver codes.
pub fn parse_drivers(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|d| !d.is_empty())
        .map(|d| d.to_uppercase())
        .collect()
}

/// Session key from command line parts. A test number or day selects a
/// pre-season testing day (the missing one defaults to 1), otherwise an event
/// needs a session. `None` when nothing was given.
pub fn session_key(
    year: i32,
    event: Option<&str>,
    session: Option<&str>,
    test: Option<u32>,
    day: Option<u32>,
) -> Result<Option<SessionKey>, PitwallError> {
    if test.is_some() || day.is_some() {
        return Ok(Some(SessionKey::Testing {
            year,
            test_number: test.unwrap_or(1),
            day: day.unwrap_or(1),
        }));
    }
    let Some(event) = event else {
        return Ok(None);
    };
    let session = session.ok_or_else(|| PitwallError::InvalidUserInput {
        field: "session".to_string(),
        reason: format!("no session given for {}", event),
    })?;
    Ok(Some(SessionKey::Event {
        year,
        event: EventId::from(event),
        session: session.parse::<SessionType>()?,
    }))
}

fn require_drivers(request: &ChartRequest) -> Result<Vec<String>, PitwallError> {
    if request.drivers.is_empty() {
        return Err(PitwallError::InvalidUserInput {
            field: "drivers".to_string(),
            reason: format!("the {:?} chart needs at least one driver", request.kind),
        });
    }
    Ok(request.drivers.clone())
}

fn require_single_driver(request: &ChartRequest) -> Result<String, PitwallError> {
    match request.drivers.as_slice() {
        [driver] => Ok(driver.clone()),
        _ => Err(PitwallError::InvalidUserInput {
            field: "drivers".to_string(),
            reason: format!(
                "the {:?} chart needs exactly one driver, got {}",
                request.kind,
                request.drivers.len()
            ),
        }),
    }
}

fn require_session(request: &ChartRequest) -> Result<&SessionKey, PitwallError> {
    let key = request
        .session
        .as_ref()
        .ok_or_else(|| PitwallError::InvalidUserInput {
            field: "session".to_string(),
            reason: format!("the {:?} chart needs an event and a session", request.kind),
        })?;
    let is_testing = matches!(key, SessionKey::Testing { .. });
    if is_testing != (request.kind == ChartKind::TestingPace) {
        return Err(PitwallError::InvalidUserInput {
            field: "session".to_string(),
            reason: if is_testing {
                format!("the {:?} chart needs a race weekend session", request.kind)
            } else {
                "testing pace needs a test number and day".to_string()
            },
        });
    }
    Ok(key)
}

/// Builds the data for one chart. Season charts load their own sessions, every
/// other chart loads the requested session once.
pub fn build_chart(
    request: &ChartRequest,
    provider: &dyn SessionProvider,
    config: &AnalysisConfig,
) -> Result<ChartData, PitwallError> {
    let load = || -> Result<Session, PitwallError> {
        let session = provider.load_session(require_session(request)?)?;
        info!("Building {:?} chart for {}", request.kind, session.info);
        Ok(session)
    };

    let chart = match request.kind {
        ChartKind::TeamDevelopment => ChartData::TeamDevelopment(
            TeamDevelopmentAnalyzer::new(request.year, config.team_development_rounds)
                .analyze(provider)?,
        ),
        ChartKind::Teammates => {
            let team = request
                .team
                .clone()
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| PitwallError::InvalidUserInput {
                    field: "team".to_string(),
                    reason: "the teammates chart needs a team name".to_string(),
                })?;
            ChartData::Teammates(TeammateAnalyzer::new(request.year, team).analyze(provider)?)
        }
        ChartKind::SpeedTrace => ChartData::SpeedTrace(
            SpeedTraceAnalyzer::new(request.drivers.clone()).analyze(&load()?)?,
        ),
        ChartKind::TestingPace => ChartData::TestingPace(
            SpeedTraceAnalyzer::new(request.drivers.clone()).analyze(&load()?)?,
        ),
        ChartKind::MeanLapTime => ChartData::MeanLapTime(
            MeanLapTimeAnalyzer::new(config.outlier_filter, config.quicklap_threshold)
                .analyze(&load()?)?,
        ),
        ChartKind::LapTimes => ChartData::LapTimes(
            LapTimesAnalyzer::new(require_drivers(request)?, config.outlier_filter)
                .analyze(&load()?)?,
        ),
        ChartKind::RaceHistory => ChartData::RaceHistory(
            RaceHistoryAnalyzer::new(config.race_history_pit_marker_drivers).analyze(&load()?)?,
        ),
        ChartKind::TeamPace => ChartData::TeamPace(
            TeamPaceAnalyzer::new(config.quicklap_threshold).analyze(&load()?)?,
        ),
        ChartKind::TyreCompounds => ChartData::TyreCompounds(
            TyreCompoundAnalyzer::new(
                require_single_driver(request)?,
                config.min_degradation_stint_laps,
            )
            .analyze(&load()?)?,
        ),
        ChartKind::SectorTimes => ChartData::SectorTimes(
            SectorTimesAnalyzer::new(require_drivers(request)?).analyze(&load()?)?,
        ),
        ChartKind::PitStops => ChartData::PitStops(PitStopAnalyzer.analyze(&load()?)?),
        ChartKind::Positions => ChartData::Positions(PositionAnalyzer.analyze(&load()?)?),
        ChartKind::LongRuns => ChartData::LongRuns(
            LongRunAnalyzer::new(
                require_single_driver(request)?,
                config.long_run_min_stint_laps,
                config.long_run_outlier_filter,
            )
            .analyze(&load()?)?,
        ),
    };
    Ok(chart)
}
