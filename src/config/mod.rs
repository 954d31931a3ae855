use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Fully resolved runtime configuration. Precedence per field:
/// CLI flag, then environment, then config file, then default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub theme: String,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            theme: "dark".to_string(),
            llm: LlmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_retries: usize,
    pub retry_base_ms: u64,
    pub retry_jitter_ms: u64,
    pub respect_retry_after: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            request_timeout_ms: 120_000,
            max_retries: 2,
            retry_base_ms: 1_000,
            retry_jitter_ms: 500,
            respect_retry_after: true,
        }
    }
}

/// Shape of the on-disk config file. Everything optional; missing
/// fields fall through to the next precedence level.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub theme: Option<String>,
    pub llm: Option<PartialLlmConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialLlmConfig {
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub max_retries: Option<usize>,
    pub retry_base_ms: Option<u64>,
    pub retry_jitter_ms: Option<u64>,
    pub respect_retry_after: Option<bool>,
}

impl AppConfig {
    pub fn from_cli(cli: crate::Cli) -> Result<Self> {
        let file_cfg = load_file_config().unwrap_or_default();

        let api_key = cli
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .or(file_cfg.api_key);
        let base_url = if cli.base_url.is_empty() {
            std::env::var("OPENAI_BASE_URL")
                .ok()
                .or(file_cfg.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
        } else {
            cli.base_url
        };
        let model = if cli.model.is_empty() {
            std::env::var("OPENAI_MODEL")
                .ok()
                .or(file_cfg.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string())
        } else {
            cli.model
        };
        let theme = cli
            .theme
            .or(file_cfg.theme)
            .unwrap_or_else(|| "dark".to_string());

        Ok(Self {
            base_url,
            model,
            api_key,
            theme,
            llm: merge_llm(file_cfg.llm),
        })
    }
}

fn merge_llm(partial: Option<PartialLlmConfig>) -> LlmConfig {
    let d = LlmConfig::default();
    match partial {
        Some(p) => LlmConfig {
            connect_timeout_ms: p.connect_timeout_ms.unwrap_or(d.connect_timeout_ms),
            request_timeout_ms: p.request_timeout_ms.unwrap_or(d.request_timeout_ms),
            max_retries: p.max_retries.unwrap_or(d.max_retries),
            retry_base_ms: p.retry_base_ms.unwrap_or(d.retry_base_ms),
            retry_jitter_ms: p.retry_jitter_ms.unwrap_or(d.retry_jitter_ms),
            respect_retry_after: p.respect_retry_after.unwrap_or(d.respect_retry_after),
        },
        None => d,
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut v = Vec::new();
    if let Ok(p) = std::env::var("DECOMP_ASSIST_CONFIG") {
        v.push(PathBuf::from(p));
    }
    if let Some(dir) = dirs::config_dir() {
        v.push(dir.join("decomp-assist/config.toml"));
    }
    v
}

/// Parses one config file. A file that exists but does not parse is an
/// error the caller may ignore in favor of the next candidate.
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let s =
        fs::read_to_string(path).with_context(|| format!("read config file: {}", path.display()))?;
    let cfg = toml::from_str::<FileConfig>(&s)
        .with_context(|| format!("parse config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_file_config() -> Result<FileConfig> {
    for p in candidate_paths() {
        if !p.exists() {
            continue;
        }
        match load_config_file(&p) {
            Ok(cfg) => {
                info!(path = %p.display(), "loaded config file");
                return Ok(cfg);
            }
            Err(e) => {
                warn!(path = %p.display(), error = %e.to_string(), "config load failed");
                continue;
            }
        }
    }
    Ok(FileConfig::default())
}
