//! Monitor configuration: built-in defaults, optional config file, flag
//! overrides. Precedence is flag > file > default; daemon mode always runs
//! unbounded regardless of any `samples` value.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds between samples when nothing overrides it.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
/// Number of samples taken when nothing overrides it.
pub const DEFAULT_SAMPLES: u32 = 6;

/// Configuration rejected before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("samples = 0 runs unbounded and is only valid in daemon mode")]
    UnboundedWithoutDaemon,
}

/// On-disk configuration (`~/.config/sdm/config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Seconds between samples.
    pub interval: u64,
    /// Samples to take before exiting; 0 = unbounded (daemon only).
    pub samples: u32,
    /// Report destination; stdout when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Steam installation root; platform autodetection when unset.
    #[serde(default)]
    pub steam_path: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL_SECS,
            samples: DEFAULT_SAMPLES,
            log_file: None,
            steam_path: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FileConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FileConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Flag-level overrides applied on top of the file config; all optional.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interval: Option<u64>,
    pub samples: Option<u32>,
    pub log_file: Option<PathBuf>,
    pub steam_path: Option<PathBuf>,
    pub daemon: bool,
}

/// Validated settings the sampler runs with.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between samples. Zero is permitted (back-to-back ticks).
    pub interval: Duration,
    /// Number of samples before a clean exit; 0 = unbounded.
    pub samples: u32,
    /// Report destination; stdout when unset.
    pub log_file: Option<PathBuf>,
    /// Explicit installation root; platform autodetection when unset.
    pub steam_path: Option<PathBuf>,
    /// Whether the run was started as a daemon.
    pub daemon: bool,
}

impl MonitorConfig {
    /// Merges flag overrides onto the file config and validates the result.
    pub fn resolve(file: &FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let samples = if overrides.daemon {
            0
        } else {
            overrides.samples.unwrap_or(file.samples)
        };
        if samples == 0 && !overrides.daemon {
            return Err(ConfigError::UnboundedWithoutDaemon);
        }
        Ok(Self {
            interval: Duration::from_secs(overrides.interval.unwrap_or(file.interval)),
            samples,
            log_file: overrides.log_file.or_else(|| file.log_file.clone()),
            steam_path: overrides.steam_path.or_else(|| file.steam_path.clone()),
            daemon: overrides.daemon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FileConfig::default();
        assert_eq!(cfg.interval, 60);
        assert_eq!(cfg.samples, 6);
        assert!(cfg.log_file.is_none());
        assert!(cfg.steam_path.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FileConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FileConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.interval, cfg.interval);
        assert_eq!(parsed.samples, cfg.samples);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            interval = 5
            samples = 12
            log_file = "/var/log/sdm.log"
            steam_path = "/opt/steam"
        "#;
        let cfg: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.interval, 5);
        assert_eq!(cfg.samples, 12);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/var/log/sdm.log")));
        assert_eq!(cfg.steam_path, Some(PathBuf::from("/opt/steam")));
    }

    #[test]
    fn flag_override_beats_file_value() {
        let file = FileConfig {
            interval: 60,
            ..FileConfig::default()
        };
        let cfg = MonitorConfig::resolve(
            &file,
            Overrides {
                interval: Some(5),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(cfg.interval, Duration::from_secs(5));
    }

    #[test]
    fn file_value_beats_built_in_default() {
        let file = FileConfig {
            samples: 12,
            ..FileConfig::default()
        };
        let cfg = MonitorConfig::resolve(&file, Overrides::default()).unwrap();
        assert_eq!(cfg.samples, 12);
    }

    #[test]
    fn daemon_forces_unbounded_sampling() {
        let file = FileConfig::default();
        let cfg = MonitorConfig::resolve(
            &file,
            Overrides {
                samples: Some(6),
                daemon: true,
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(cfg.samples, 0);
        assert!(cfg.daemon);
    }

    #[test]
    fn unbounded_without_daemon_is_rejected() {
        let file = FileConfig::default();
        let err = MonitorConfig::resolve(
            &file,
            Overrides {
                samples: Some(0),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnboundedWithoutDaemon));
    }

    #[test]
    fn unbounded_file_value_without_daemon_is_rejected() {
        let file = FileConfig {
            samples: 0,
            ..FileConfig::default()
        };
        let err = MonitorConfig::resolve(&file, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnboundedWithoutDaemon));
    }

    #[test]
    fn flag_log_file_beats_file_config() {
        let file = FileConfig {
            log_file: Some(PathBuf::from("/from/file.log")),
            ..FileConfig::default()
        };
        let cfg = MonitorConfig::resolve(
            &file,
            Overrides {
                log_file: Some(PathBuf::from("/from/flag.log")),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(cfg.log_file, Some(PathBuf::from("/from/flag.log")));
    }
}
