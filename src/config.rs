//! Config and data file locations, plus loading of `TrackConfig`.
//!
//! Directory priority:
//! 1. `--config-dir` CLI argument
//! 2. `FRAMETRACK_CONFIG_DIR` environment variable
//! 3. Current directory, if it already holds one of our files
//! 4. Platform directory from dirs-next
//!    (Linux: `~/.config/frametrack`, macOS: `~/Library/Application Support/frametrack`,
//!    Windows: `%APPDATA%\frametrack`)

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::widgets::frame_track::TrackConfig;

const APP_DIR: &str = "frametrack";
const LOCAL_FILES: [&str; 3] = ["frametrack.json", "track_config.json", "frametrack.log"];

/// eframe persistence file
pub const APP_STATE_FILE: &str = "frametrack.json";
/// Optional geometry override
pub const TRACK_CONFIG_FILE: &str = "track_config.json";
pub const LOG_FILE: &str = "frametrack.log";

/// Overrides for the default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// CLI argument wins over `FRAMETRACK_CONFIG_DIR`
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| {
            std::env::var("FRAMETRACK_CONFIG_DIR")
                .ok()
                .map(PathBuf::from)
        });
        Self { config_dir }
    }
}

pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Create config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_config_dir(config);
    let data_dir = get_data_dir(config);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
    }
    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    LOCAL_FILES.iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }
    platform_dir
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir())
}

fn get_data_dir(config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir())
}

/// Read a `TrackConfig` JSON file; missing fields take defaults.
pub fn load_track_config(path: &Path) -> Result<TrackConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read track config: {}", path.display()))?;
    let config: TrackConfig = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse track config: {}", path.display()))?;
    Ok(config.sanitized())
}

/// Explicit path if given, else `track_config.json` in the config dir, else defaults.
///
/// Never fails: problems are logged and defaults used.
pub fn resolve_track_config(explicit: Option<&Path>, paths: &PathConfig) -> TrackConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = config_file(TRACK_CONFIG_FILE, paths);
            if !path.exists() {
                return TrackConfig::default();
            }
            path
        }
    };

    match load_track_config(&path) {
        Ok(config) => {
            info!("Track config loaded from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{:#}; using default track config", e);
            TrackConfig::default()
        }
    }
}
