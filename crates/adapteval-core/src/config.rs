use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    pub responses: ResponsesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesConfig {
    /// Base directory holding `<variant>/<agent>/response_<idx>.json`.
    pub root: PathBuf,
    pub variant: String,
    /// The fixed reference agent shown in every pair.
    pub baseline: String,
    pub alternates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sheets" or "memory".
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Name of the environment variable carrying the OAuth bearer token.
    #[serde(default = "default_token_env")]
    pub api_token_env: String,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_token_env() -> String {
    "ADAPTEVAL_SHEETS_TOKEN".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            spreadsheet_id: String::new(),
            api_token_env: default_token_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Staleness window for the rated-pairs read-through cache.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

fn default_ttl() -> u64 {
    60
}

fn default_capacity() -> u64 {
    1024
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When true, registration stores a password digest and identify
    /// checks it. The default deployment is identifier-only.
    #[serde(default)]
    pub require_password: bool,
    #[serde(default)]
    pub dashboard_username: String,
    /// sha256 hex digest of the dashboard password.
    #[serde(default)]
    pub dashboard_password_sha256: String,
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    let mut cfg: AppConfig = serde_yaml::from_str(&raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if cfg.responses.baseline.is_empty() {
        return Err(ConfigError("responses.baseline must be set".into()));
    }
    if cfg.responses.alternates.is_empty() {
        return Err(ConfigError("responses.alternates must not be empty".into()));
    }
    if cfg.responses.alternates.iter().any(|a| a == &cfg.responses.baseline) {
        return Err(ConfigError(
            "responses.alternates must not contain the baseline agent".into(),
        ));
    }

    normalize_paths(&mut cfg, path);

    Ok(cfg)
}

/// Relative response roots resolve against the config file's directory,
/// not the process working directory.
fn normalize_paths(cfg: &mut AppConfig, config_path: &Path) {
    if cfg.responses.root.is_relative() {
        let base = config_path.parent().unwrap_or(Path::new("."));
        cfg.responses.root = base.join(&cfg.responses.root);
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, include_str!("../../../adapteval.yaml"))
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adapteval.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.version, SUPPORTED_CONFIG_VERSION);
        assert_eq!(cfg.responses.baseline, "Plain-LLM");
        assert_eq!(cfg.responses.alternates.len(), 3);
        assert!(!cfg.auth.require_password);
        // relative roots resolve against the config directory
        assert_eq!(cfg.responses.root, dir.path().join("responses"));
    }

    #[test]
    fn baseline_in_alternates_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(
            &path,
            r#"version: 1
responses:
  root: "responses"
  variant: "gpt-4o-mini"
  baseline: "Plain-LLM"
  alternates: ["Plain-LLM"]
"#,
        )
        .unwrap();
        assert!(load_config(&path).is_err());
    }
}
