use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use shared_models::time_window::{hhmm, parse_time};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Business hours are inverted: {start} is not before {end}")]
    InvertedBusinessHours { start: NaiveTime, end: NaiveTime },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub scheduling: SchedulingConfig,
}

/// Clinic-wide booking policy shared by every validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(with = "hhmm")]
    pub business_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub business_end: NaiveTime,
    pub allowed_intervals_minutes: BTreeSet<u32>,
    pub min_advance_hours: u32,
    pub max_advance_months: u32,
    pub min_gap_minutes: u32,
    pub daily_limit: u32,
    pub allow_weekends: bool,
    pub blackout_dates: BTreeSet<NaiveDate>,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            business_start: NaiveTime::from_hms_opt(8, 0, 0).expect("08:00 is a valid time"),
            business_end: NaiveTime::from_hms_opt(18, 0, 0).expect("18:00 is a valid time"),
            allowed_intervals_minutes: BTreeSet::from([15, 30, 60]),
            min_advance_hours: 2,
            max_advance_months: 6,
            min_gap_minutes: 5,
            daily_limit: 20,
            allow_weekends: false,
            blackout_dates: BTreeSet::new(),
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.business_start >= self.business_end {
            return Err(ConfigError::InvertedBusinessHours {
                start: self.business_start,
                end: self.business_end,
            });
        }
        if self.allowed_intervals_minutes.is_empty() {
            return Err(ConfigError::Empty("allowed_intervals_minutes"));
        }
        if self.allowed_intervals_minutes.contains(&0) {
            return Err(ConfigError::InvalidValue {
                key: "SCHEDULING_ALLOWED_INTERVALS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Missing keys fall back to
    /// defaults; present but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SchedulingConfig::default();

        let server_port = read_parsed(&lookup, "SERVER_PORT", 3000)?;

        let business_start = match lookup("SCHEDULING_BUSINESS_START") {
            Some(raw) => parse_time(&raw).map_err(|_| ConfigError::InvalidValue {
                key: "SCHEDULING_BUSINESS_START",
                value: raw,
            })?,
            None => {
                warn!("SCHEDULING_BUSINESS_START not set, using default");
                defaults.business_start
            }
        };
        let business_end = match lookup("SCHEDULING_BUSINESS_END") {
            Some(raw) => parse_time(&raw).map_err(|_| ConfigError::InvalidValue {
                key: "SCHEDULING_BUSINESS_END",
                value: raw,
            })?,
            None => {
                warn!("SCHEDULING_BUSINESS_END not set, using default");
                defaults.business_end
            }
        };

        let allowed_intervals_minutes = match lookup("SCHEDULING_ALLOWED_INTERVALS") {
            Some(raw) => parse_list::<u32>(&raw, "SCHEDULING_ALLOWED_INTERVALS")?,
            None => {
                warn!("SCHEDULING_ALLOWED_INTERVALS not set, using default");
                defaults.allowed_intervals_minutes
            }
        };

        let blackout_dates = match lookup("SCHEDULING_BLACKOUT_DATES") {
            Some(raw) => parse_list::<NaiveDate>(&raw, "SCHEDULING_BLACKOUT_DATES")?,
            None => defaults.blackout_dates,
        };

        let scheduling = SchedulingConfig {
            business_start,
            business_end,
            allowed_intervals_minutes,
            min_advance_hours: read_parsed(&lookup, "SCHEDULING_MIN_ADVANCE_HOURS", defaults.min_advance_hours)?,
            max_advance_months: read_parsed(&lookup, "SCHEDULING_MAX_ADVANCE_MONTHS", defaults.max_advance_months)?,
            min_gap_minutes: read_parsed(&lookup, "SCHEDULING_MIN_GAP_MINUTES", defaults.min_gap_minutes)?,
            daily_limit: read_parsed(&lookup, "SCHEDULING_DAILY_LIMIT", defaults.daily_limit)?,
            allow_weekends: read_parsed(&lookup, "SCHEDULING_ALLOW_WEEKENDS", defaults.allow_weekends)?,
            blackout_dates,
        };

        scheduling.validate()?;

        Ok(Self {
            server_port,
            scheduling,
        })
    }
}

fn read_parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => {
            warn!("{} not set, using default {:?}", key, default);
            Ok(default)
        }
    }
}

fn parse_list<T>(raw: &str, key: &'static str) -> Result<BTreeSet<T>, ConfigError>
where
    T: FromStr + Ord,
{
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key,
                value: part.to_string(),
            })
        })
        .collect()
}
