use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::PitwallError;
use crate::session::DEFAULT_QUICKLAP_THRESHOLD;
use crate::stats::OutlierFilter;

const APP_DIR_NAME: &str = "pitwall";
const CONFIG_FILE_NAME: &str = "config.json";

pub const LONG_RUN_MIN_STINT_LAPS: usize = 5;
pub const LONG_RUN_OUTLIER_MIN_SAMPLES: usize = 6;
pub const MIN_DEGRADATION_STINT_LAPS: usize = 3;
pub const TEAM_DEVELOPMENT_ROUNDS: usize = 6;
pub const RACE_HISTORY_PIT_MARKER_DRIVERS: usize = 5;

/// Tunables shared by the analyzers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub outlier_filter: OutlierFilter,
    pub quicklap_threshold: f64,
    pub long_run_min_stint_laps: usize,
    pub long_run_outlier_filter: OutlierFilter,
    pub min_degradation_stint_laps: usize,
    pub team_development_rounds: usize,
    pub race_history_pit_marker_drivers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outlier_filter: OutlierFilter::default(),
            quicklap_threshold: DEFAULT_QUICKLAP_THRESHOLD,
            long_run_min_stint_laps: LONG_RUN_MIN_STINT_LAPS,
            long_run_outlier_filter: OutlierFilter::with_min_samples(LONG_RUN_OUTLIER_MIN_SAMPLES),
            min_degradation_stint_laps: MIN_DEGRADATION_STINT_LAPS,
            team_development_rounds: TEAM_DEVELOPMENT_ROUNDS,
            race_history_pit_marker_drivers: RACE_HISTORY_PIT_MARKER_DRIVERS,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the session file tree, see `FileSessionProvider`
    pub data_dir: Option<PathBuf>,
    pub default_year: Option<i32>,
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_year: None,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Sessions live under the platform data directory unless configured otherwise.
    pub fn default_data_dir() -> Result<PathBuf, PitwallError> {
        let app_data_dir = dirs::data_dir().ok_or(PitwallError::NoConfigDir)?;
        Ok(app_data_dir.join(APP_DIR_NAME).join("sessions"))
    }

    pub fn resolved_data_dir(&self) -> Result<PathBuf, PitwallError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_data_dir(),
        }
    }

    pub fn from_local_file() -> Option<Self> {
        Self::from_file(&Self::config_path()?)
    }

    /// Reads a config file. Missing or unreadable files yield `None`.
    pub fn from_file(config_path: &PathBuf) -> Option<Self> {
        if !config_path.exists() {
            debug!("No config file at {:?}", config_path);
            return None;
        }
        let file = std::fs::File::open(config_path)
            .map_err(|e| warn!("Could not open config file {:?}: {}", config_path, e))
            .ok()?;
        serde_json::from_reader(file)
            .map_err(|e| warn!("Could not parse config file {:?}: {}", config_path, e))
            .ok()
    }

    pub fn save(&self) -> Result<PathBuf, PitwallError> {
        let config_path = Self::config_path().ok_or(PitwallError::NoConfigDir)?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &PathBuf) -> Result<(), PitwallError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PitwallError::ConfigIOError { source: e })?;
            }
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| PitwallError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| PitwallError::ConfigSerializeError { source: e })
    }
}
