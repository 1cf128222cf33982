use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use crate::error::{Result, SubgrabError};

pub const DEFAULT_CONFIG_FILE: &str = "subgrab.toml";

fn default_timeout_secs() -> u64 {
    30
}

fn default_video_extensions() -> Vec<String> {
    [
        ".avi", ".mp4", ".mkv", ".mpg", ".mpeg", ".mov", ".rm", ".vob", ".wmv", ".flv", ".3gp",
        ".3g2",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub primary: PrimaryConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryConfig {
    /// Hash-keyed download API endpoint
    pub endpoint: String,
    /// User-Agent the API insists on
    pub user_agent: String,
    /// Two-letter language code sent with every lookup
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Origin of the scraped site; relative links are resolved against it
    pub base_url: String,
    /// Language label as shown on the search page (exact match after trim)
    pub language_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Recognized video extensions, leading dot included, matched case-sensitively
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    /// Where subtitles are written; the current directory when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://api.thesubdb.com/".to_string(),
            user_agent: "SubDB/1.0 (subtitle-downloader/1.0; test)".to_string(),
            language: "en".to_string(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_url: "http://subscene.com".to_string(),
            language_name: "English".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            video_extensions: default_video_extensions(),
            output_dir: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ScanConfig {
    /// Resolve the output directory, falling back to the current working directory
    pub fn resolve_output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubgrabError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    /// Load `explicit` when given, else `subgrab.toml` in the working directory
    /// if present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubgrabError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubgrabError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [fallback]
            base_url = "http://localhost:8080"
            language_name = "French"
            "#,
        )
        .unwrap();

        assert_eq!(config.fallback.language_name, "French");
        assert_eq!(config.primary.language, "en");
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.scan.video_extensions.contains(&".mkv".to_string()));
        assert!(config.scan.output_dir.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subgrab.toml");

        let mut config = Config::default();
        config.scan.video_extensions = vec![".mkv".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.scan.video_extensions, vec![".mkv".to_string()]);
        assert_eq!(loaded.primary.user_agent, config.primary.user_agent);
    }

    #[test]
    fn test_malformed_file_is_toml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subgrab.toml");
        std::fs::write(&path, "garbage = [").unwrap();

        let err = Config::discover(Some(&path)).unwrap_err();
        assert!(matches!(err, SubgrabError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/subgrab.toml").unwrap_err();
        assert!(matches!(err, SubgrabError::Config(_)));
    }
}
