// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and default values, read once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for storage | `./data` |
//! | `AUTH_SECRET` | HS256 secret for token verification | Required for production |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | Optional |
//! | `SEED_FILE` | JSON file of users and groups to bootstrap | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

use crate::storage::paths::DATA_ROOT;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Without it the server runs in development mode and accepts unsigned tokens.
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const SEED_FILE_ENV: &str = "SEED_FILE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than `json` falls back to pretty output.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Settings for one server run.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub auth_secret: Option<String>,
    pub auth_issuer: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DATA_ROOT),
            auth_secret: None,
            auth_issuer: None,
            seed_file: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PORT, using default");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            host: get(HOST_ENV).unwrap_or(defaults.host),
            port,
            data_dir: get(DATA_DIR_ENV).map(PathBuf::from).unwrap_or(defaults.data_dir),
            auth_secret: get(AUTH_SECRET_ENV),
            auth_issuer: get(AUTH_ISSUER_ENV),
            seed_file: get(SEED_FILE_ENV).map(PathBuf::from),
            log_format: get(LOG_FORMAT_ENV)
                .map(|value| LogFormat::parse(&value))
                .unwrap_or(defaults.log_format),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.auth_secret.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("DATA_DIR", "/var/lib/skyshare"),
            ("AUTH_SECRET", "s3cret"),
            ("SEED_FILE", "seed.json"),
            ("LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/skyshare"));
        assert_eq!(config.auth_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_port_and_blank_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "http"), ("AUTH_SECRET", "  ")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.auth_secret.is_none());
    }
}
