use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default endpoint: a locally running `compare-tui proxy`
pub const DEFAULT_COMPLETION_URL: &str = "http://127.0.0.1:8787/v1/complete";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion endpoint the editor posts prompts to
    pub completion_url: String,
    /// Request timeout for generation, in seconds
    pub timeout_secs: u64,
    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
    /// Settings for `compare-tui proxy`
    pub proxy: ProxyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completion_url: DEFAULT_COMPLETION_URL.to_string(),
            timeout_secs: 60,
            log_level: "info".to_string(),
            proxy: ProxyConfig::default(),
        }
    }
}

/// Proxy settings. The upstream API key is deliberately absent: it is only
/// ever passed at startup (flag or environment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub listen: String,
    pub upstream_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub upstream_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8787".to_string(),
            upstream_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            upstream_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".compare-tui"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the config from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> anyhow::Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }
}
