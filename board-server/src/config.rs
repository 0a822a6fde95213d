//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::board::{BoardClientConfig, DEFAULT_BASE_URL};
use crate::domain::{LineTable, LineTableError, OPERATOR_ZONE};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default upstream request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors in process configuration. All of these stop startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read line colours from {path}: {source}")]
    LineFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid line colours in {path}: {source}")]
    LineTable {
        path: PathBuf,
        #[source]
        source: LineTableError,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to listen on (`BIND_ADDR`)
    pub bind_addr: SocketAddr,

    /// Base URL of the operator's stop pages (`BOARD_BASE_URL`)
    pub base_url: String,

    /// Upstream request timeout in seconds (`BOARD_TIMEOUT_SECS`)
    pub timeout_secs: u64,

    /// Zone board clock times are read in (`BOARD_TIMEZONE`)
    pub timezone: Tz,

    /// Serve saved pages from here instead of the live site
    /// (`BOARD_FIXTURE_DIR`)
    pub fixture_dir: Option<PathBuf>,

    /// JSON colour-to-line table replacing the built-in one
    /// (`LINE_COLOURS_PATH`)
    pub line_colours_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            timezone: OPERATOR_ZONE,
            fixture_dir: None,
            line_colours_path: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Unset and empty variables take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value.trim().parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    var: "BIND_ADDR",
                    reason: e.to_string(),
                    value,
                }
            })?,
            None => defaults.bind_addr,
        };

        let timeout_secs = match get("BOARD_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "BOARD_TIMEOUT_SECS",
                        value,
                        reason: "expected a positive number of seconds".into(),
                    });
                }
            },
            None => defaults.timeout_secs,
        };

        let timezone = match get("BOARD_TIMEZONE") {
            Some(value) => value.trim().parse::<Tz>().map_err(|e| ConfigError::Invalid {
                var: "BOARD_TIMEZONE",
                reason: e.to_string(),
                value,
            })?,
            None => defaults.timezone,
        };

        Ok(Self {
            bind_addr,
            base_url: get("BOARD_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs,
            timezone,
            fixture_dir: get("BOARD_FIXTURE_DIR").map(PathBuf::from),
            line_colours_path: get("LINE_COLOURS_PATH").map(PathBuf::from),
        })
    }

    /// Upstream client settings.
    pub fn client_config(&self) -> BoardClientConfig {
        BoardClientConfig::new()
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout_secs)
    }

    /// The colour-to-line table: the file at `line_colours_path` if set,
    /// otherwise the built-in table.
    pub fn load_lines(&self) -> Result<LineTable, ConfigError> {
        let Some(path) = &self.line_colours_path else {
            return Ok(LineTable::nct());
        };

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::LineFile {
            path: path.clone(),
            source,
        })?;
        LineTable::from_json(&json).map_err(|source| ConfigError::LineTable {
            path: path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.timezone, chrono_tz::Europe::London);
        assert!(config.fixture_dir.is_none());
        assert!(config.line_colours_path.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = config(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("BOARD_BASE_URL", "http://localhost:9000/stops"),
            ("BOARD_TIMEOUT_SECS", "5"),
            ("BOARD_TIMEZONE", "Europe/Dublin"),
            ("BOARD_FIXTURE_DIR", "/srv/boards"),
            ("LINE_COLOURS_PATH", "/etc/lines.json"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.base_url, "http://localhost:9000/stops");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.timezone, chrono_tz::Europe::Dublin);
        assert_eq!(config.fixture_dir, Some(PathBuf::from("/srv/boards")));
        assert_eq!(config.line_colours_path, Some(PathBuf::from("/etc/lines.json")));

        let client = config.client_config();
        assert_eq!(client.base_url, "http://localhost:9000/stops");
        assert_eq!(client.timeout_secs, 5);
    }

    #[test]
    fn empty_values_take_defaults() {
        let config = config(&[("BIND_ADDR", ""), ("BOARD_TIMEZONE", " ")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.timezone, OPERATOR_ZONE);
    }

    #[test]
    fn invalid_values_rejected() {
        for (var, value) in [
            ("BIND_ADDR", "localhost"),
            ("BOARD_TIMEOUT_SECS", "0"),
            ("BOARD_TIMEOUT_SECS", "soon"),
            ("BOARD_TIMEZONE", "Mars/Olympus_Mons"),
        ] {
            let err = config(&[(var, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { var: v, .. } if *v == var),
                "{var}={value}: {err}"
            );
        }
    }

    #[test]
    fn built_in_lines_by_default() {
        let lines = config(&[]).unwrap().load_lines().unwrap();
        assert_eq!(lines.len(), LineTable::nct().len());
    }

    #[test]
    fn lines_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.json");
        std::fs::write(&path, r##"{"#123abc": "Test"}"##).unwrap();

        let config = AppConfig {
            line_colours_path: Some(path),
            ..AppConfig::default()
        };
        let lines = config.load_lines().unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn line_file_errors() {
        let dir = tempdir().unwrap();

        let missing = AppConfig {
            line_colours_path: Some(dir.path().join("absent.json")),
            ..AppConfig::default()
        };
        assert!(matches!(missing.load_lines(), Err(ConfigError::LineFile { .. })));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"lime": "Lime"}"#).unwrap();
        let bad = AppConfig {
            line_colours_path: Some(path),
            ..AppConfig::default()
        };
        assert!(matches!(bad.load_lines(), Err(ConfigError::LineTable { .. })));
    }
}
