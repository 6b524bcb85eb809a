use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::File, path: default_storage_path() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_storage_path() -> String { "data/preferences.json".to_string() }

/// Load from `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    match std::fs::metadata(&path) {
        Ok(_) => load_from_file(&path),
        Err(_) => Ok(AppConfig::default()),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read config {path}"))?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 storage（支持从环境变量填充路径）
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        // 若 TOML 中路径为空，则尝试从环境变量填充
        if self.path.trim().is_empty() {
            if let Ok(path) = std::env::var("STORAGE_PATH") {
                self.path = path;
            }
        }
        self.path = self.path.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::File && self.path.is_empty() {
            return Err(anyhow!("storage.path is empty; set it in config.toml or via STORAGE_PATH"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() -> Result<()> {
        let cfg = parse("")?;
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.path, "data/preferences.json");
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        Ok(())
    }

    #[test]
    fn parses_backend_and_format() -> Result<()> {
        let cfg = parse(
            r#"
            [storage]
            backend = "memory"

            [logging]
            format = "json"
            "#,
        )?;
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        Ok(())
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(parse("[storage]\nbackend = \"redis\"\n").is_err());
    }

    #[test]
    fn file_backend_requires_path() {
        let cfg = StorageConfig { backend: StorageBackend::File, path: String::new() };
        assert!(cfg.validate().is_err());
        let mem = StorageConfig { backend: StorageBackend::Memory, path: String::new() };
        assert!(mem.validate().is_ok());
    }
}
