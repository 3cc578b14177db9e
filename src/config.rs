use crate::errors::ConfigError;
use crate::views::BlocMapping;
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

pub const DEFAULT_HISTORY_PATH: &str = "data/history.json";

/// Settings for the polling process.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub feed_url: String,
    pub year: String,
    pub history_path: PathBuf,
    pub check_state: bool,
    pub poll_interval: Duration,
    pub baseline_url: Option<String>,
    pub baseline_year: String,
}

impl PollerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            feed_url: env::var("ELECTION_FEED_URL")
                .map_err(|_| ConfigError::Missing("ELECTION_FEED_URL"))?,
            year: var_or("ELECTION_YEAR", "2021"),
            history_path: resolve_history_path(),
            check_state: parse_bool("ELECTION_CHECK_STATE", true)?,
            poll_interval: Duration::from_secs(parse_secs("ELECTION_POLL_SECS", 10)?),
            baseline_url: env::var("ELECTION_BASELINE_URL").ok(),
            baseline_year: var_or("ELECTION_BASELINE_YEAR", "2019"),
        })
    }
}

/// Settings for the dashboard server.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub history_path: PathBuf,
    pub year: String,
    pub baseline_year: String,
    pub addr: SocketAddr,
    pub refresh_interval: Duration,
    pub blocs: BlocMapping,
    pub title: String,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            Err(_) => 8080,
        };

        let blocs = match env::var("ELECTION_BLOCS_PATH") {
            Ok(path) => load_blocs(PathBuf::from(path))?,
            Err(_) => BlocMapping::default(),
        };

        Ok(Self {
            history_path: resolve_history_path(),
            year: var_or("ELECTION_YEAR", "2021"),
            baseline_year: var_or("ELECTION_BASELINE_YEAR", "2019"),
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            refresh_interval: Duration::from_secs(parse_secs("ELECTION_REFRESH_SECS", 5)?),
            blocs,
            title: var_or("ELECTION_TITLE", "Election results"),
        })
    }
}

pub fn resolve_history_path() -> PathBuf {
    if let Ok(path) = env::var("ELECTION_HISTORY_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_HISTORY_PATH)
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => bool_from_str(&value).ok_or(ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn bool_from_str(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_secs(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid { name, value }),
        },
        Err(_) => Ok(default),
    }
}

fn load_blocs(path: PathBuf) -> Result<BlocMapping, ConfigError> {
    let bytes = std::fs::read(&path).map_err(|err| ConfigError::Blocs {
        path: path.clone(),
        message: err.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| ConfigError::Blocs {
        path,
        message: err.to_string(),
    })
}
