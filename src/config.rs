//! Runtime configuration
//!
//! Read once at startup from the environment:
//!
//! - `NUTRILOG_DATABASE_PATH`: SQLite file (default `<project>/data/nutrilog.db`)
//! - `NUTRILOG_UTC_OFFSET`: fixed offset for day boundaries, e.g. `+02:00`
//!   (default: the server's local time zone)
//! - `NUTRILOG_POOL_SIZE`: connection pool size (default 10)

use std::path::PathBuf;

use chrono::FixedOffset;
use thiserror::Error;

use crate::reporting::Zone;

pub const DATABASE_PATH_VAR: &str = "NUTRILOG_DATABASE_PATH";
pub const UTC_OFFSET_VAR: &str = "NUTRILOG_UTC_OFFSET";
pub const POOL_SIZE_VAR: &str = "NUTRILOG_POOL_SIZE";

pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid UTC offset '{value}', expected Z, +HH:MM, +HHMM or +HH")]
    InvalidOffset { var: &'static str, value: String },

    #[error("{var}: invalid pool size '{value}'")]
    InvalidPoolSize { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub pool_size: u32,
    pub utc_offset: Option<FixedOffset>,
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let pool_size = match lookup(POOL_SIZE_VAR) {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidPoolSize { var: POOL_SIZE_VAR, value }),
            },
            None => DEFAULT_POOL_SIZE,
        };

        let utc_offset = match lookup(UTC_OFFSET_VAR) {
            Some(value) => Some(
                parse_utc_offset(&value)
                    .ok_or(ConfigError::InvalidOffset { var: UTC_OFFSET_VAR, value })?,
            ),
            None => None,
        };

        Ok(Self {
            database_path,
            pool_size,
            utc_offset,
        })
    }

    /// The zone reports use for day boundaries
    pub fn zone(&self) -> Zone {
        match self.utc_offset {
            Some(offset) => Zone::Fixed(offset),
            None => Zone::Local,
        }
    }
}

/// `<project>/data/nutrilog.db`, where project is the directory above
/// `target/{debug,release}` when running from a cargo build
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("nutrilog.db");
    path
}

/// Parse `Z`, `UTC`, `+HH:MM`, `+HHMM` or `+HH` (sign required for numeric forms)
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };

    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+02:00"), FixedOffset::east_opt(7200));
        assert_eq!(parse_utc_offset("-0530"), FixedOffset::west_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("+09"), FixedOffset::east_opt(9 * 3600));
        assert_eq!(parse_utc_offset("02:00"), None);
        assert_eq!(parse_utc_offset("+25:00"), None);
        assert_eq!(parse_utc_offset("+2:00"), None);
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.zone(), Zone::Local);
        assert!(config.database_path.ends_with("data/nutrilog.db"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (DATABASE_PATH_VAR, "/tmp/n.db"),
            (POOL_SIZE_VAR, "4"),
            (UTC_OFFSET_VAR, "-05:00"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/n.db"));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.zone(), Zone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap()));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(load(&[(POOL_SIZE_VAR, "0")]), Err(ConfigError::InvalidPoolSize { .. })));
        assert!(matches!(load(&[(UTC_OFFSET_VAR, "CET")]), Err(ConfigError::InvalidOffset { .. })));
    }
}
