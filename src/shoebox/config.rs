use crate::error::{Result, ShoeboxError};
use crate::sync::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_FILE_EXT: &str = ".jpg";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Environment variable that takes precedence over the stored `api_token`.
pub const API_TOKEN_ENV: &str = "SHOEBOX_API_TOKEN";

/// Keys accepted by [`ShoeboxConfig::get`] and [`ShoeboxConfig::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "api-token",
    "timeout-secs",
    "retry-attempts",
    "retry-backoff-ms",
    "file-ext",
];

/// Configuration for shoebox, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoeboxConfig {
    /// Upload URL. Uploads are unavailable until this is set.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Automatic retries per upload; 0 leaves retrying to the user
    #[serde(default)]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Extension for captures whose name has none
    #[serde(default = "default_file_ext")]
    pub file_ext: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

fn default_file_ext() -> String {
    DEFAULT_FILE_EXT.to_string()
}

impl Default for ShoeboxConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: 0,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            file_ext: DEFAULT_FILE_EXT.to_string(),
        }
    }
}

impl ShoeboxConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: ShoeboxConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Replaces the stored token with `token` when one is given.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.api_token = Some(token);
        }
        self
    }

    /// Applies [`API_TOKEN_ENV`].
    pub fn with_env_overrides(self) -> Self {
        let token = std::env::var(API_TOKEN_ENV).ok();
        self.with_token_override(token)
    }

    pub fn endpoint_url(&self) -> Result<Option<Url>> {
        self.endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| ShoeboxError::Config(format!("Invalid endpoint {}: {}", raw, e)))
            })
            .transpose()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "endpoint" => Some(self.endpoint.clone().unwrap_or_default()),
            "api-token" => Some(self.api_token.clone().unwrap_or_default()),
            "timeout-secs" => Some(self.timeout_secs.to_string()),
            "retry-attempts" => Some(self.retry_attempts.to_string()),
            "retry-backoff-ms" => Some(self.retry_backoff_ms.to_string()),
            "file-ext" => Some(self.file_ext.clone()),
            _ => None,
        }
    }

    /// Sets one key from its string form. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "endpoint" => {
                if value.is_empty() {
                    self.endpoint = None;
                } else {
                    Url::parse(value).map_err(|e| format!("Invalid endpoint {}: {}", value, e))?;
                    self.endpoint = Some(value.to_string());
                }
            }
            "api-token" => {
                self.api_token = (!value.is_empty()).then(|| value.to_string());
            }
            "timeout-secs" => self.timeout_secs = parse_number(key, value)?,
            "retry-attempts" => self.retry_attempts = parse_number(key, value)?,
            "retry-backoff-ms" => self.retry_backoff_ms = parse_number(key, value)?,
            "file-ext" => self.set_file_ext(value),
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// Set the file extension (normalizes to start with a dot)
    pub fn set_file_ext(&mut self, ext: &str) {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> std::result::Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{} expects a number, got {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ShoeboxConfig::default();
        assert_eq!(config.file_ext, ".jpg");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry_policy(), RetryPolicy::manual());
        assert_eq!(config.endpoint_url().unwrap(), None);
    }

    #[test]
    fn test_set_file_ext_without_dot() {
        let mut config = ShoeboxConfig::default();
        config.set("file-ext", "png").unwrap();
        assert_eq!(config.file_ext, ".png");
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = ShoeboxConfig::load(dir.path().join("nope")).unwrap();
        assert_eq!(config, ShoeboxConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");

        let mut config = ShoeboxConfig::default();
        config.set("endpoint", "https://photos.example.com/upload").unwrap();
        config.set("retry-attempts", "3").unwrap();
        config.save(&home).unwrap();

        let loaded = ShoeboxConfig::load(&home).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.endpoint_url().unwrap().unwrap().as_str(),
            "https://photos.example.com/upload"
        );
        assert_eq!(loaded.retry_policy().attempts, 3);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"endpoint":"http://localhost:8080/up"}"#,
        )
        .unwrap();

        let config = ShoeboxConfig::load(dir.path()).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8080/up"));
        assert_eq!(config.retry_backoff_ms, 500);
        assert_eq!(config.file_ext, ".jpg");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "{nope").unwrap();
        assert!(matches!(
            ShoeboxConfig::load(dir.path()),
            Err(ShoeboxError::Serialization(_))
        ));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = ShoeboxConfig::default();
        assert!(config.set("endpoint", "not a url").is_err());
        assert!(config.set("timeout-secs", "soon").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, ShoeboxConfig::default());
    }

    #[test]
    fn test_empty_value_clears_optional_keys() {
        let mut config = ShoeboxConfig::default();
        config.set("api-token", "secret").unwrap();
        assert_eq!(config.get("api-token").as_deref(), Some("secret"));
        config.set("api-token", "").unwrap();
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_token_override() {
        let mut config = ShoeboxConfig::default();
        config.api_token = Some("stored".into());

        let same = config.clone().with_token_override(None);
        assert_eq!(same.api_token.as_deref(), Some("stored"));

        let overridden = config.with_token_override(Some("from-env".into()));
        assert_eq!(overridden.api_token.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = ShoeboxConfig::default();
        for key in CONFIG_KEYS {
            assert!(config.get(key).is_some(), "{} not readable", key);
        }
    }
}
