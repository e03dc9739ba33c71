use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 3000;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── Environment ──────────────────────────────────────────────────────────────

/// Runtime environment switch. Controls whether 500 responses echo the
/// underlying error detail (development) or hide it (anything else).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Only the exact label `development` selects development mode; every
    /// other value, including absence, means production.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("development") => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn expose_error_detail(self) -> bool {
        matches!(self, Environment::Development)
    }
}

// ─── ObservabilityConfig ──────────────────────────────────────────────────────

/// Service observability configuration (`[observability]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds). Default: 100.
    /// Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 3000).
    port: Option<u16>,
    /// Bind address (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,taskd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Runtime environment: "development" exposes error detail in 500 bodies.
    environment: Option<String>,
    /// Observability configuration (`[observability]`).
    observability: Option<ObservabilityConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            // Config loads before the tracing subscriber is up.
            eprintln!(
                "warn: failed to parse {} — using defaults: {e}",
                path.display()
            );
            None
        }
    }
}

// ─── ServiceConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Log level filter string passed to the tracing subscriber.
    pub log: String,
    /// Bind address for the HTTP server (TASKD_BIND env var, default: "127.0.0.1").
    pub bind_address: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    /// Gates error-detail exposure on 500 responses (TASKD_ENV env var).
    pub environment: Environment,
    /// Observability: slow query threshold.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("TASKD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let environment = Environment::from_label(
            std::env::var("TASKD_ENV")
                .ok()
                .filter(|s| !s.is_empty())
                .or(toml.environment)
                .as_deref(),
        );

        let observability = toml.observability.unwrap_or_default();

        Self {
            port,
            data_dir,
            log,
            bind_address,
            log_format,
            environment,
            observability,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/taskd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/taskd or ~/.local/share/taskd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\taskd
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskd");
        }
    }
    // Fallback
    PathBuf::from(".taskd")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_label_parse() {
        assert_eq!(
            Environment::from_label(Some("development")),
            Environment::Development
        );
        // Anything but the exact label is production.
        for label in [Some("production"), Some("dev"), Some("Development"), None] {
            assert_eq!(Environment::from_label(label), Environment::Production);
        }
        assert!(Environment::Development.expose_error_detail());
        assert!(!Environment::Production.expose_error_detail());
    }

    #[test]
    fn test_toml_layer_and_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "port = 4100\nbind_address = \"0.0.0.0\"\n\n[observability]\nslow_query_threshold_ms = 250\n",
        )
        .unwrap();

        let config = ServiceConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.port, 4100);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.observability.slow_query_threshold_ms, 250);

        // CLI value beats the TOML layer.
        let config = ServiceConfig::new(Some(5000), Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.log, "info");
        assert_eq!(config.observability.slow_query_threshold_ms, 100);
    }
}
