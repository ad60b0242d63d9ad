use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::resolver::ResolveOptions;

const CONFIG_FILE: &str = ".gh-resolve.toml";
const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_PROXY_BASE: &str = "http://localhost:3000";
const DEFAULT_STALE_TIME_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .gh-resolve.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// Base URL of the REST API, e.g. for GitHub Enterprise.
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    /// Origin serving `/api/github/...` in the normalized resource shape.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub use_server: bool,
    pub stale_time_secs: Option<u64>,
}

impl Config {
    /// Load configuration from .gh-resolve.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn api_base_url(&self) -> &str {
        self.github.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn proxy_base_url(&self) -> &str {
        self.proxy.base_url.as_deref().unwrap_or(DEFAULT_PROXY_BASE)
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            use_server: self.query.use_server,
            stale_time: Duration::from_secs(self.query.stale_time_secs.unwrap_or(DEFAULT_STALE_TIME_SECS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.api_base_url(), "https://api.github.com");
        assert_eq!(config.proxy_base_url(), "http://localhost:3000");

        let options = config.resolve_options();
        assert!(!options.use_server);
        assert_eq!(options.stale_time, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
api_base_url = "https://ghe.example.com/api/v3"

[proxy]
base_url = "https://docs.example.com"

[query]
use_server = true
stale_time_secs = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_base_url(), "https://ghe.example.com/api/v3");
        assert_eq!(config.proxy_base_url(), "https://docs.example.com");
        let options = config.resolve_options();
        assert!(options.use_server);
        assert_eq!(options.stale_time, Duration::from_secs(5));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("gh-resolve-config-test.toml");
        std::fs::write(&path, "[github]\ntoken = \"from-file\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.github_token().as_deref(), Some("from-file"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let path = std::env::temp_dir().join("gh-resolve-config-invalid.toml");
        std::fs::write(&path, "[query\nuse_server = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        std::fs::remove_file(&path).ok();
    }
}
