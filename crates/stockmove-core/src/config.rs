//! Configuration for the stock movement form.
//!
//! Precedence: defaults < config file (YAML) < environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::AdjustmentPolicy;

pub const ENV_STOCK_URL: &str = "STOCKMOVE_STOCK_URL";
pub const ENV_LOG_LEVEL: &str = "STOCKMOVE_LOG_LEVEL";

#[derive(Debug, Clone)]
pub struct Config {
    pub stock: StockConfig,
    pub recent: RecentConfig,
    pub form: FormConfig,
    pub logging: LoggingConfig,
}

/// Stock-by-location lookup endpoint.
#[derive(Debug, Clone)]
pub struct StockConfig {
    pub url: String,
    pub request_timeout: Duration,
}

/// Where the recent-products list is kept.
#[derive(Debug, Clone)]
pub struct RecentConfig {
    pub storage_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FormConfig {
    pub adjustment_policy: AdjustmentPolicy,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_from_env()
    }
}

impl Config {
    pub fn default_from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_default();
        let storage_dir = if home.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&home)
                .join(".local")
                .join("share")
                .join("stockmove")
        };
        Self {
            stock: StockConfig {
                url: "http://127.0.0.1:8000/inventario/api/stock-por-ubicacion/".to_string(),
                request_timeout: Duration::from_secs(10),
            },
            recent: RecentConfig { storage_dir },
            form: FormConfig {
                adjustment_policy: AdjustmentPolicy::default(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "console".to_string(),
            },
        }
    }

    /// Validates the configuration, returning an error message on failure.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.stock.url.trim();
        if url.is_empty() {
            return Err("stock.url is required".into());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("stock.url must be an http(s) URL".into());
        }
        if self.stock.request_timeout.is_zero() {
            return Err("stock.request_timeout_ms must be greater than 0".into());
        }
        if self.recent.storage_dir.as_os_str().is_empty() {
            return Err("recent.storage_dir is required".into());
        }
        match self.logging.level.to_lowercase().trim() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err("logging.level must be one of trace, debug, info, warn, error".into())
            }
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            _ => return Err("logging.format must be one of console, json".into()),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    stock: PartialStockConfig,
    #[serde(default)]
    recent: PartialRecentConfig,
    #[serde(default)]
    form: PartialFormConfig,
    #[serde(default)]
    logging: PartialLoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct PartialStockConfig {
    #[serde(default)]
    url: String,
    #[serde(default)]
    request_timeout_ms: i64,
}

#[derive(Debug, Default, Deserialize)]
struct PartialRecentConfig {
    #[serde(default)]
    storage_dir: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialFormConfig {
    #[serde(default)]
    adjustment_policy: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLoggingConfig {
    #[serde(default)]
    level: String,
    #[serde(default)]
    format: String,
}

/// Load config: defaults < (optional) config file < environment.
///
/// An explicit config path that cannot be read is a hard error; the default
/// path is optional.
pub fn load_config(config_file: Option<&str>) -> Result<(Config, Option<PathBuf>), String> {
    let mut cfg = Config::default_from_env();

    let explicit = config_file
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let (path_to_try, required) = match explicit {
        Some(path) => (Some(path), true),
        None => (default_config_path(), false),
    };

    let mut used = None;
    if let Some(path) = path_to_try {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                apply_yaml(&mut cfg, &text)?;
                used = Some(path);
            }
            Err(err) => {
                if required {
                    return Err(format!("failed to load config file: {err}"));
                }
            }
        }
    }

    apply_env(&mut cfg, |key| std::env::var(key).ok());
    cfg.validate()?;
    Ok((cfg, used))
}

/// Overlay a YAML document on top of `cfg`. Blank fields keep their current
/// value.
pub fn apply_yaml(cfg: &mut Config, text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let parsed: PartialConfig =
        serde_yaml::from_str(text).map_err(|err| format!("parse config: {err}"))?;
    apply_partial(cfg, parsed)
}

/// Overlay environment overrides; `lookup` resolves a variable name.
pub fn apply_env(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_STOCK_URL).filter(|v| !v.trim().is_empty()) {
        cfg.stock.url = url.trim().to_string();
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        cfg.logging.level = level.trim().to_string();
    }
}

fn apply_partial(cfg: &mut Config, partial: PartialConfig) -> Result<(), String> {
    if !partial.stock.url.trim().is_empty() {
        cfg.stock.url = partial.stock.url.trim().to_string();
    }
    if partial.stock.request_timeout_ms > 0 {
        cfg.stock.request_timeout = Duration::from_millis(partial.stock.request_timeout_ms as u64);
    }
    if !partial.recent.storage_dir.trim().is_empty() {
        cfg.recent.storage_dir = expand_tilde(partial.recent.storage_dir.trim())?;
    }
    let policy = partial.form.adjustment_policy.trim();
    if !policy.is_empty() {
        cfg.form.adjustment_policy = AdjustmentPolicy::from_str(policy).ok_or_else(|| {
            format!("form.adjustment_policy must be signed or unsigned, got {policy:?}")
        })?;
    }
    if !partial.logging.level.trim().is_empty() {
        cfg.logging.level = partial.logging.level.trim().to_string();
    }
    if !partial.logging.format.trim().is_empty() {
        cfg.logging.format = partial.logging.format.trim().to_string();
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("stockmove").join("config.yaml"));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("stockmove")
                    .join("config.yaml"),
            );
        }
    }
    None
}

fn expand_tilde(input: &str) -> Result<PathBuf, String> {
    if input == "~" {
        let home = std::env::var("HOME").map_err(|_| "failed to resolve HOME".to_string())?;
        return Ok(PathBuf::from(home));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        let home = std::env::var("HOME").map_err(|_| "failed to resolve HOME".to_string())?;
        return Ok(PathBuf::from(home).join(rest));
    }
    Ok(Path::new(input).to_path_buf())
}
