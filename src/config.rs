//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::proxy::{ProxyError, ProxyMap, DEFAULT_BACKEND_ORIGIN, DEV_PREFIXES};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Development shell server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_shell_host")]
    pub host: String,

    #[serde(default = "default_shell_port")]
    pub port: u16,

    /// Directory holding the built client (`index.html` and assets)
    #[serde(default = "default_client_dir")]
    pub client_dir: String,
}

fn default_shell_host() -> String {
    "127.0.0.1".to_string()
}

fn default_shell_port() -> u16 {
    5173
}

fn default_client_dir() -> String {
    "assayer-ui/dist".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            host: default_shell_host(),
            port: default_shell_port(),
            client_dir: default_client_dir(),
        }
    }
}

impl ShellConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dev proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_enabled")]
    pub enabled: bool,

    #[serde(default = "default_backend_origin")]
    pub backend_origin: String,

    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,

    /// No timeout when unset
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
}

fn default_proxy_enabled() -> bool {
    true
}

fn default_backend_origin() -> String {
    DEFAULT_BACKEND_ORIGIN.to_string()
}

fn default_prefixes() -> Vec<String> {
    DEV_PREFIXES.iter().map(|p| p.to_string()).collect()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: default_proxy_enabled(),
            backend_origin: default_backend_origin(),
            prefixes: default_prefixes(),
            upstream_timeout_secs: None,
        }
    }
}

impl ProxyConfig {
    /// Build the proxy map; an empty map when disabled
    pub fn to_map(&self) -> Result<ProxyMap, ProxyError> {
        if !self.enabled {
            return Ok(ProxyMap::disabled());
        }
        ProxyMap::with_prefixes(&self.prefixes, &self.backend_origin)
    }
}

/// Backend API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,

    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Serve the built client from this directory (production)
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024 // 50 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            static_dir: None,
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `ASSAYER_CONFIG`, default locations or environment.
    /// Nothing is logged here; call [`LoadedConfig::log`] once logging
    /// is installed.
    pub fn load_default() -> LoadedConfig {
        let explicit = std::env::var("ASSAYER_CONFIG").ok().map(PathBuf::from);

        let config_paths: Vec<PathBuf> = [
            explicit,
            dirs::config_dir().map(|p| p.join("assayer").join("config.toml")),
            Some(PathBuf::from("/etc/assayer/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first of `paths` that exists and parses, falling back to
    /// environment-only config
    pub fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut failures = Vec::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        failures,
                    }
                }
                Err(e) => failures.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            failures,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Shell overrides
        if let Some(host) = lookup("ASSAYER_SHELL_HOST") {
            self.shell.host = host;
        }
        if let Some(port) = lookup("ASSAYER_SHELL_PORT").and_then(|p| p.parse().ok()) {
            self.shell.port = port;
        }
        if let Some(dir) = lookup("ASSAYER_CLIENT_DIR") {
            self.shell.client_dir = dir;
        }

        // Proxy overrides
        if let Some(origin) = lookup("ASSAYER_BACKEND_ORIGIN") {
            self.proxy.backend_origin = origin;
        }
        if let Some(enabled) = lookup("ASSAYER_PROXY_ENABLED") {
            self.proxy.enabled = enabled.to_lowercase() != "false" && enabled != "0";
        }

        // API overrides; PORT is honoured for hosted deployments
        if let Some(host) = lookup("ASSAYER_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("ASSAYER_API_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|p| p.parse().ok())
        {
            self.api.port = port;
        }
        if let Some(dir) = lookup("ASSAYER_STATIC_DIR") {
            self.api.static_dir = Some(dir);
        }

        // Logging overrides
        if let Some(level) = lookup("ASSAYER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("ASSAYER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of searching the config locations
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config was read from; `None` for defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that exist but could not be read or parsed
    pub failures: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Report where the config came from and any file that was skipped
    pub fn log(&self) {
        for failure in &self.failures {
            tracing::warn!("Skipping config file: {}", failure);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Assayer Configuration
#
# Environment variables override these settings:
# - ASSAYER_SHELL_HOST, ASSAYER_SHELL_PORT, ASSAYER_CLIENT_DIR
# - ASSAYER_BACKEND_ORIGIN, ASSAYER_PROXY_ENABLED
# - ASSAYER_API_HOST, ASSAYER_API_PORT (or PORT), ASSAYER_STATIC_DIR
# - ASSAYER_LOG_LEVEL, ASSAYER_LOG_FORMAT

[shell]
# Development server for the client
host = "127.0.0.1"
port = 5173

# Built client (index.html and assets)
client_dir = "assayer-ui/dist"

[proxy]
# Forward API prefixes to the backend during development
enabled = true
backend_origin = "http://localhost:8080"
prefixes = ["/upload-items", "/check-weights", "/calculate-fixed", "/items", "/edit-csv"]

# Optional upstream timeout in seconds (no timeout when unset)
# upstream_timeout_secs = 30

[api]
# Backend API server
host = "0.0.0.0"
port = 8080

# Serve the built client from the backend (production)
# static_dir = "assayer-ui/dist"

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# Maximum upload size in bytes
max_upload_bytes = 52428800

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.shell.addr(), "127.0.0.1:5173");
        assert_eq!(config.api.addr(), "0.0.0.0:8080");
        assert!(config.proxy.enabled);
        assert_eq!(config.proxy.prefixes.len(), 5);
        assert!(config.proxy.upstream_timeout_secs.is_none());
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.shell.port, 5173);
        assert_eq!(config.proxy.backend_origin, "http://localhost:8080");
        assert_eq!(config.proxy.prefixes, default_prefixes());
        assert_eq!(config.api.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.shell.port, 5173);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[proxy]\nenabled = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.proxy.enabled);
        assert!(config.proxy.to_map().unwrap().is_empty());

        std::fs::write(&path, "[proxy\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_first_keeps_broken_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "[shell\nport = 1\n").unwrap();
        std::fs::write(&good, "[proxy]\nprefixes = [\"/items\"]\n").unwrap();

        let loaded = Config::load_first(&[dir.path().join("absent.toml"), broken.clone(), good.clone()]);
        assert_eq!(loaded.source, Some(good));
        assert_eq!(loaded.config.proxy.prefixes, vec!["/items"]);
        assert_eq!(loaded.failures.len(), 1);
        assert!(matches!(&loaded.failures[0], ConfigError::Parse { path, .. } if *path == broken));
    }

    #[test]
    fn test_load_first_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("config.toml");
        std::fs::write(&broken, "not toml at all = [").unwrap();

        let loaded = Config::load_first(&[broken]);
        assert!(loaded.source.is_none());
        assert_eq!(loaded.failures.len(), 1);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ASSAYER_SHELL_PORT", "3000"),
            ("ASSAYER_BACKEND_ORIGIN", "http://backend:9090"),
            ("PORT", "8181"),
            ("ASSAYER_STATIC_DIR", "/srv/dist"),
            ("ASSAYER_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.shell.port, 3000);
        assert_eq!(config.proxy.backend_origin, "http://backend:9090");
        assert_eq!(config.api.port, 8181);
        assert_eq!(config.api.static_dir.as_deref(), Some("/srv/dist"));
        assert_eq!(config.logging.format, "json");

        let map = config.proxy.to_map().unwrap();
        let url = map.rewrite("/items/1").unwrap();
        assert_eq!(url.as_str(), "http://backend:9090/items/1");
    }

    #[test]
    fn test_api_port_beats_port() {
        let mut config = Config::default();
        config.apply_overrides(|k| match k {
            "ASSAYER_API_PORT" => Some("7000".to_string()),
            "PORT" => Some("8181".to_string()),
            _ => None,
        });
        assert_eq!(config.api.port, 7000);
    }
}
