use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_api_prefix() -> String {
    "/api".to_string()
}
fn default_timeout_ms() -> u64 {
    30_000
}
fn default_refresh_path() -> String {
    "auth/refresh".to_string()
}
fn default_refresh_timeout_ms() -> u64 {
    5_000
}
fn default_login_path() -> String {
    "auth/login".to_string()
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default)]
    pub filter: Option<String>,
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server origin (defaults to `http://127.0.0.1:8080`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path every API request is made relative to (defaults to `/api`).
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Transport timeout in milliseconds; `0` disables it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Refresh endpoint, relative to the API base.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Timeout for the refresh call in milliseconds.
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,
    /// Login endpoint, relative to the API base.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Where the CLI persists credentials (defaults to `~/.scribe/credentials.json`).
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    /// Raises the default log level to `debug`.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_ms: default_timeout_ms(),
            refresh_path: default_refresh_path(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
            login_path: default_login_path(),
            credentials_file: None,
            debug: false,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
    }

    /// Loads defaults, then the optional YAML file, then `SCRIBE_*` environment
    /// variables (`SCRIBE_LOG__FORMAT` for nested keys).
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if any layer fails to parse.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("SCRIBE_").split("__"))
            .extract()
    }

    /// Origin joined with the API prefix, without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> String {
        let origin = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{prefix}")
        }
    }

    /// Transport timeout; `None` when disabled.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    #[must_use]
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    /// Default filter directive for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> String {
        if let Some(filter) = &self.log.filter {
            return filter.clone();
        }
        if self.debug {
            "scribe=debug".to_string()
        } else {
            "scribe=info".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
base_url: "https://blog.example.com/"
api_prefix: "/api/"
timeout_ms: 0
refresh_timeout_ms: 2500
log:
  format: json
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.api_base(), "http://127.0.0.1:8080/api");
        assert_eq!(c.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(c.refresh_timeout(), Duration::from_secs(5));
        assert_eq!(c.refresh_path, "auth/refresh");
        assert_eq!(c.login_path, "auth/login");
        assert_eq!(c.log.format, LogFormat::Text);
    }

    #[test]
    fn test_from_yaml_overrides() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.api_base(), "https://blog.example.com/api");
        assert_eq!(c.timeout(), None);
        assert_eq!(c.refresh_timeout(), Duration::from_millis(2500));
        assert_eq!(c.log.format, LogFormat::Json);
    }

    #[test]
    fn test_from_yaml_defaults_applied() {
        let c = Config::from_yaml("timeout_ms: 1000").unwrap();
        assert_eq!(c.timeout(), Some(Duration::from_secs(1)));
        assert_eq!(c.base_url, "http://127.0.0.1:8080"); // default preserved
    }

    #[test]
    fn test_empty_prefix() {
        let c = Config::from_yaml("api_prefix: \"\"").unwrap();
        assert_eq!(c.api_base(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_log_filter() {
        let mut c = Config::default();
        assert_eq!(c.log_filter(), "scribe=info");
        c.debug = true;
        assert_eq!(c.log_filter(), "scribe=debug");
        c.log.filter = Some("warn".into());
        assert_eq!(c.log_filter(), "warn");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scribe.yaml");
        std::fs::write(&path, "base_url: \"http://10.0.0.2:9000\"\n").unwrap();
        let c = Config::from_file(&path).unwrap();
        assert_eq!(c.api_base(), "http://10.0.0.2:9000/api");
    }

    #[test]
    fn test_load_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("scribe.yaml", "timeout_ms: 1000\nbase_url: \"http://file\"\n")?;
            jail.set_env("SCRIBE_BASE_URL", "http://env");
            jail.set_env("SCRIBE_LOG__FORMAT", "json");
            let c = Config::load(Some(std::path::Path::new("scribe.yaml")))?;
            assert_eq!(c.base_url, "http://env");
            assert_eq!(c.timeout_ms, 1000);
            assert_eq!(c.log.format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml("timeout_ms: [not, a, number]").is_err());
    }
}
