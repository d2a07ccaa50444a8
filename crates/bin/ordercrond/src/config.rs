//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `ordercron.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::time::Duration;

use serde::Deserialize;

use ordercron_app::scheduler::SchedulerConfig;
use ordercron_domain::time::Zone;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub scheduler: SchedulerSection,
    pub resolver: ResolverConfig,
    pub demo: DemoConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Scheduler cadence.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub tick_secs: u64,
    /// Upper bound on handing one run signal to the bus.
    pub emit_timeout_ms: u64,
}

/// Time phrase resolution.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// IANA timezone for calendar-day boundaries; the host's local zone
    /// when unset.
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Run the executor against the in-memory demo order book.
    pub enabled: bool,
}

impl Config {
    /// Load configuration from `ordercron.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("ordercron.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `var`; unparsable numbers are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("ORDERCRON_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("ORDERCRON_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("ORDERCRON_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("ORDERCRON_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("ORDERCRON_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(secs) = var("ORDERCRON_TICK_SECS").and_then(|v| v.parse().ok()) {
            self.scheduler.tick_secs = secs;
        }
        if let Some(val) = var("ORDERCRON_TIMEZONE") {
            self.resolver.timezone = Some(val);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.tick_secs == 0 {
            return Err(ConfigError::Validation(
                "scheduler.tick_secs must be non-zero".to_string(),
            ));
        }
        self.zone()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick: Duration::from_secs(self.scheduler.tick_secs),
            emit_timeout: Duration::from_millis(self.scheduler.emit_timeout_ms),
        }
    }

    /// The zone calendar days are resolved in.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the configured timezone is
    /// not a known IANA identifier.
    pub fn zone(&self) -> Result<Zone, ConfigError> {
        match self.resolver.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(Zone::Local),
            Some(tz) => tz
                .parse()
                .map_err(|err| ConfigError::Validation(format!("resolver.timezone: {err}"))),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:ordercron.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "ordercrond=info,ordercron=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        let defaults = SchedulerConfig::default();
        Self {
            tick_secs: defaults.tick.as_secs(),
            emit_timeout_ms: u64::try_from(defaults.emit_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.database_url(), "sqlite:ordercron.db?mode=rwc");
        assert_eq!(config.scheduler.tick_secs, 60);
        assert_eq!(config.scheduler.emit_timeout_ms, 5000);
        assert!(config.resolver.timezone.is_none());
        assert!(config.demo.enabled);
        assert_eq!(config.zone().unwrap(), Zone::Local);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [scheduler]
            tick_secs = 15
            emit_timeout_ms = 250

            [resolver]
            timezone = 'America/New_York'

            [demo]
            enabled = false
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.database_url(), "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(
            config.scheduler_config(),
            SchedulerConfig {
                tick: Duration::from_secs(15),
                emit_timeout: Duration::from_millis(250),
            }
        );
        assert_eq!(
            config.zone().unwrap(),
            "America/New_York".parse::<Zone>().unwrap()
        );
        assert!(!config.demo.enabled);
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let config: Config = toml::from_str("[server]\nport = 8080").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.scheduler.tick_secs, 60);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("ORDERCRON_BIND", "127.0.0.1:8081"),
            ("ORDERCRON_DATABASE_URL", "sqlite::memory:"),
            ("ORDERCRON_LOG", "trace"),
            ("ORDERCRON_TICK_SECS", "5"),
            ("ORDERCRON_TIMEZONE", "Europe/Paris"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.logging.filter, "trace");
        assert_eq!(config.scheduler.tick_secs, 5);
        assert_eq!(config.resolver.timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn should_prefer_rust_log_over_ordercron_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("ORDERCRON_LOG", "trace"), ("RUST_LOG", "warn")]));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_ignore_unparsable_numeric_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("ORDERCRON_PORT", "http"), ("ORDERCRON_TICK_SECS", "-1")]));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.scheduler.tick_secs, 60);
    }

    #[test]
    fn should_reject_zero_port_and_zero_tick() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scheduler.tick_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_unknown_timezone() {
        let mut config = Config::default();
        config.resolver.timezone = Some("Mars/Olympus".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_treat_blank_timezone_as_local() {
        let mut config = Config::default();
        config.resolver.timezone = Some("  ".to_string());
        assert_eq!(config.zone().unwrap(), Zone::Local);
    }
}
