//! Configuration for the prediction service.
//!
//! Values are read from the process environment, layered over an env file
//! (`.env.local` unless `QSTOCK_ENV_FILE` says otherwise). Entries in the
//! file only fill keys the environment leaves unset. On IBM Code Engine
//! (`IBM_CLOUD_EXECUTION_ENVIRONMENT=code_engine`) the file is skipped.
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Env file
//! 3. Default values

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use qstock_adapter_ibm::IbmConfig;

use crate::tracing_config::{DEFAULT_LOG_FILTER, LogFormat, TracingConfig};

/// Env file read when `QSTOCK_ENV_FILE` is unset.
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Shots per prediction.
pub const DEFAULT_SHOTS: u32 = 1024;

/// Job poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Listen port when neither `QSTOCK_BIND` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8000;

const CODE_ENGINE: &str = "code_engine";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IBM_QUANTUM_API_TOKEN is missing. Set it in .env.local or as an environment variable.")]
    MissingToken,

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read env file {0}: {1}")]
    EnvFile(String, String),
}

/// A snapshot of environment variables.
///
/// Parsing works on this map rather than on the live process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshot the process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a source from explicit pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Look up a variable, treating blank values as unset.
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Fill unset keys from an env file. A missing file is not an error.
    pub fn fill_from_env_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile(path.display().to_string(), e.to_string());

        let entries = match dotenvy::from_path_iter(path) {
            Ok(entries) => entries,
            Err(e) if e.not_found() => return Ok(()),
            Err(e) => return Err(env_file_error(e)),
        };

        for entry in entries {
            let (key, value) = entry.map_err(env_file_error)?;
            self.vars.entry(key).or_insert(value);
        }

        Ok(())
    }

    /// Apply the env file layer unless running on Code Engine.
    pub fn layered(mut self) -> Result<Self, ConfigError> {
        if self.get("IBM_CLOUD_EXECUTION_ENVIRONMENT") == Some(CODE_ENGINE) {
            return Ok(self);
        }

        let path = self
            .non_empty("QSTOCK_ENV_FILE")
            .unwrap_or(DEFAULT_ENV_FILE)
            .to_string();
        self.fill_from_env_file(Path::new(&path))?;
        Ok(self)
    }
}

/// Complete service configuration.
///
/// `Debug` output never contains the API token.
#[derive(Debug, Clone)]
pub struct Config {
    /// IBM Quantum connection settings.
    pub ibm: IbmConfig,
    /// Shots per prediction.
    pub shots: u32,
    /// Interval between job status polls.
    pub poll_interval: Duration,
    /// Listen address.
    pub bind_address: SocketAddr,
    /// Allowed CORS origins: `*` or a comma-separated list.
    pub cors_origins: String,
    /// List the remote backends once before serving.
    pub startup_probe: bool,
    /// Logging setup.
    pub tracing: TracingConfig,
}

impl Config {
    /// Load from the process environment and the env file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource::from_process().layered()?)
    }

    /// Build a configuration from a variable snapshot.
    pub fn from_source(source: &EnvSource) -> Result<Self, ConfigError> {
        let api_key = source
            .non_empty("IBM_QUANTUM_API_TOKEN")
            .ok_or(ConfigError::MissingToken)?;

        let mut ibm = IbmConfig::new(api_key);
        if let Some(crn) = source.non_empty("IBM_QUANTUM_INSTANCE") {
            ibm = ibm.with_service_crn(crn);
        }
        if let Some(target) = source.non_empty("IBM_QUANTUM_BACKEND") {
            ibm = ibm.with_target(target);
        }
        if let Some(endpoint) = source.non_empty("IBM_QUANTUM_ENDPOINT") {
            ibm = ibm.with_endpoint(endpoint);
        }
        if let Some(iam_url) = source.non_empty("IBM_IAM_URL") {
            ibm = ibm.with_iam_url(iam_url);
        }

        let shots = parse_positive(source, "QSTOCK_SHOTS", DEFAULT_SHOTS)?;
        let poll_ms = parse_positive(source, "QSTOCK_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;

        let log_format = match source.non_empty("QSTOCK_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| invalid("QSTOCK_LOG_FORMAT", raw, reason))?,
            None => LogFormat::Console,
        };
        let log_filter = source
            .non_empty("RUST_LOG")
            .unwrap_or(DEFAULT_LOG_FILTER);

        Ok(Self {
            ibm,
            shots,
            poll_interval: Duration::from_millis(poll_ms),
            bind_address: bind_address(source)?,
            cors_origins: source
                .non_empty("QSTOCK_CORS_ORIGINS")
                .unwrap_or("*")
                .to_string(),
            startup_probe: parse_bool(source, "QSTOCK_STARTUP_PROBE", true)?,
            tracing: TracingConfig::new(log_filter, log_format),
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// `QSTOCK_BIND`, else `0.0.0.0:$PORT`, else `127.0.0.1:8000`.
fn bind_address(source: &EnvSource) -> Result<SocketAddr, ConfigError> {
    if let Some(raw) = source.non_empty("QSTOCK_BIND") {
        return raw.parse().map_err(|e| invalid("QSTOCK_BIND", raw, e));
    }

    if let Some(raw) = source.non_empty("PORT") {
        let port: u16 = raw.parse().map_err(|e| invalid("PORT", raw, e))?;
        return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }

    Ok(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)))
}

fn parse_positive<T>(source: &EnvSource, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: ToString,
{
    let Some(raw) = source.non_empty(key) else {
        return Ok(default);
    };

    let value: T = raw.parse().map_err(|e| invalid(key, raw, e))?;
    if value <= T::default() {
        return Err(invalid(key, raw, "must be greater than zero"));
    }
    Ok(value)
}

fn parse_bool(source: &EnvSource, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = source.non_empty(key) else {
        return Ok(default);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_source(&source(&[("IBM_QUANTUM_API_TOKEN", "key")])).unwrap();

        assert_eq!(config.ibm.api_key, "key");
        assert_eq!(config.ibm.target, "ibm_perth");
        assert!(config.ibm.service_crn.is_none());
        assert_eq!(config.shots, 1024);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.bind_address, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.cors_origins, "*");
        assert!(config.startup_probe);
        assert_eq!(config.tracing.format, LogFormat::Console);
        assert_eq!(config.tracing.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_missing_token_fails() {
        let err = Config::from_source(&source(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
        assert!(err.to_string().contains("IBM_QUANTUM_API_TOKEN"));
    }

    #[test]
    fn test_blank_token_fails() {
        let err = Config::from_source(&source(&[("IBM_QUANTUM_API_TOKEN", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_source(&source(&[
            ("IBM_QUANTUM_API_TOKEN", "key"),
            ("IBM_QUANTUM_INSTANCE", "crn:v1:test"),
            ("IBM_QUANTUM_BACKEND", "ibm_torino"),
            ("IBM_QUANTUM_ENDPOINT", "http://localhost:9000/api/"),
            ("IBM_IAM_URL", "http://localhost:9000/identity/token"),
            ("QSTOCK_SHOTS", "4000"),
            ("QSTOCK_POLL_INTERVAL_MS", "250"),
            ("QSTOCK_BIND", "0.0.0.0:9090"),
            ("QSTOCK_CORS_ORIGINS", "https://a.example,https://b.example"),
            ("QSTOCK_STARTUP_PROBE", "off"),
            ("QSTOCK_LOG_FORMAT", "JSON"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.ibm.service_crn.as_deref(), Some("crn:v1:test"));
        assert_eq!(config.ibm.target, "ibm_torino");
        assert_eq!(config.ibm.endpoint, "http://localhost:9000/api");
        assert_eq!(config.ibm.iam_url, "http://localhost:9000/identity/token");
        assert_eq!(config.shots, 4000);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.bind_address, "0.0.0.0:9090".parse::<SocketAddr>().unwrap());
        assert_eq!(config.cors_origins, "https://a.example,https://b.example");
        assert!(!config.startup_probe);
        assert_eq!(config.tracing.format, LogFormat::Json);
        assert_eq!(config.tracing.filter, "debug");
    }

    #[test]
    fn test_port_binds_all_interfaces() {
        let config = Config::from_source(&source(&[
            ("IBM_QUANTUM_API_TOKEN", "key"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_bind_wins_over_port() {
        let config = Config::from_source(&source(&[
            ("IBM_QUANTUM_API_TOKEN", "key"),
            ("PORT", "8080"),
            ("QSTOCK_BIND", "127.0.0.1:7000"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("QSTOCK_SHOTS", "0"),
            ("QSTOCK_SHOTS", "many"),
            ("QSTOCK_POLL_INTERVAL_MS", "-5"),
            ("QSTOCK_BIND", "not-an-address"),
            ("PORT", "99999"),
            ("QSTOCK_STARTUP_PROBE", "maybe"),
            ("QSTOCK_LOG_FORMAT", "xml"),
        ];

        for (key, value) in cases {
            let err = Config::from_source(&source(&[("IBM_QUANTUM_API_TOKEN", "key"), (key, value)]))
                .unwrap_err();
            match err {
                ConfigError::InvalidValue { key: k, value: v, .. } => {
                    assert_eq!(k, key);
                    assert_eq!(v, value);
                }
                other => panic!("expected InvalidValue for {key}={value}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let config =
            Config::from_source(&source(&[("IBM_QUANTUM_API_TOKEN", "super-secret-token")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_env_file_fills_unset_keys_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IBM_QUANTUM_API_TOKEN=from-file").unwrap();
        writeln!(file, "IBM_QUANTUM_BACKEND=ibm_kyiv").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let layered = source(&[
            ("QSTOCK_ENV_FILE", path.as_str()),
            ("IBM_QUANTUM_API_TOKEN", "from-env"),
        ])
        .layered()
        .unwrap();

        assert_eq!(layered.get("IBM_QUANTUM_API_TOKEN"), Some("from-env"));
        assert_eq!(layered.get("IBM_QUANTUM_BACKEND"), Some("ibm_kyiv"));
    }

    #[test]
    fn test_env_file_supplies_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IBM_QUANTUM_API_TOKEN=from-file").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let layered = source(&[("QSTOCK_ENV_FILE", path.as_str())]).layered().unwrap();
        let config = Config::from_source(&layered).unwrap();
        assert_eq!(config.ibm.api_key, "from-file");
    }

    #[test]
    fn test_code_engine_skips_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "IBM_QUANTUM_API_TOKEN=from-file").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let layered = source(&[
            ("QSTOCK_ENV_FILE", path.as_str()),
            ("IBM_CLOUD_EXECUTION_ENVIRONMENT", "code_engine"),
        ])
        .layered()
        .unwrap();

        assert_eq!(layered.get("IBM_QUANTUM_API_TOKEN"), None);
        assert!(matches!(
            Config::from_source(&layered),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.env");

        let layered = source(&[("QSTOCK_ENV_FILE", path.to_str().unwrap())])
            .layered()
            .unwrap();
        assert_eq!(layered.get("IBM_QUANTUM_API_TOKEN"), None);
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "THIS IS NOT AN ASSIGNMENT").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let err = source(&[("QSTOCK_ENV_FILE", path.as_str())])
            .layered()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(ref p, _) if *p == path));
    }
}
