use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Shortest progress tick accepted from config; the ticker cannot run at zero.
const MIN_PROGRESS_INTERVAL_MS: u64 = 100;

/// Global configuration loaded from `~/.config/fdl/config.toml`.
///
/// Every key is optional in the file; missing keys take the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FdlConfig {
    /// Default number of chunks per download (None = available parallelism).
    pub chunks: Option<usize>,
    /// How many downloads from a URL list run at once.
    pub jobs: usize,
    /// Progress sampling interval in milliseconds.
    pub progress_interval_ms: u64,
    /// Parent of the `fdl/` folder holding per-job part files (None = system temp dir).
    pub temp_root: Option<PathBuf>,
    /// Leave part files on disk when a download fails instead of removing them.
    pub keep_failed_parts: bool,
}

impl Default for FdlConfig {
    fn default() -> Self {
        Self {
            chunks: None,
            jobs: 1,
            progress_interval_ms: 1000,
            temp_root: None,
            keep_failed_parts: false,
        }
    }
}

impl FdlConfig {
    /// Directory under which the `fdl/` temp folder is created.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(MIN_PROGRESS_INTERVAL_MS))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: FdlConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
