use std::fmt;
use std::io::Error;
use std::path::PathBuf;
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;

pub const DEFAULT_DATA_SOURCE: &str = "https://raw.githubusercontent.com/healthbiodatascientist/cancer_health/refs/heads/main/cancer_prev_mapped.csv";
pub const DEFAULT_MAP_PATH: &str = "cancerprevmap.html";
pub const DEFAULT_KEY_COLUMN: &str = "HBCode";
pub const DEFAULT_DROP_COLUMN: &str = "geometry";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8050";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

// Errors that abort the startup of the dashboard.
#[derive(Debug)]
pub enum DashboardError {
    IoError(Error),
    PolarsError(PolarsError),
    DataUnavailable(String),
    FileNotFound(PathBuf),
    PermissionDenied(PathBuf),
    MissingColumn(String),
    DuplicateKey(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::IoError(e) => write!(f, "io error: {e}"),
            DashboardError::PolarsError(e) => write!(f, "dataframe error: {e}"),
            DashboardError::DataUnavailable(msg) => write!(f, "dataset unavailable: {msg}"),
            DashboardError::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            DashboardError::PermissionDenied(path) => {
                write!(f, "permission denied: {}", path.display())
            }
            DashboardError::MissingColumn(name) => write!(f, "column \"{name}\" is missing"),
            DashboardError::DuplicateKey(name) => {
                write!(f, "key column \"{name}\" contains duplicate values")
            }
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<Error> for DashboardError {
    fn from(err: Error) -> Self {
        DashboardError::IoError(err)
    }
}

impl From<PolarsError> for DashboardError {
    fn from(err: PolarsError) -> Self {
        DashboardError::PolarsError(err)
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::DataUnavailable(err.to_string())
    }
}

/// Everything the startup sequence needs, resolved once from the command line.
#[derive(Debug, Clone, Setters)]
#[setters(into)]
pub struct DashboardConfig {
    /// URL or local path of the CSV dataset.
    pub data_source: String,
    pub map_path: PathBuf,
    pub key_column: String,
    pub drop_column: String,
    pub addr: String,
    pub fetch_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            map_path: PathBuf::from(DEFAULT_MAP_PATH),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            drop_column: DEFAULT_DROP_COLUMN.to_string(),
            addr: DEFAULT_ADDR.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}
