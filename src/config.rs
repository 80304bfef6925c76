// src/config.rs

//! Configuration for the windowing layer.
//!
//! Every struct is deserializable from JSON and falls back to defaults for
//! missing fields, so a config file only needs to name what it changes.
//! The process-wide [`CONFIG`] is read once from the file named by the
//! `KATWINDOW_CONFIG` environment variable, or built from defaults.

use crate::frame::FrameInsets;
use crate::units::{IVec2, UVec2, BASE_DPI};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "KATWINDOW_CONFIG";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// DPI resolution settings.
    pub dpi: DpiConfig,
    /// Defaults applied to newly created windows.
    pub window: WindowConfig,
}

impl Config {
    /// Reads a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parses a config from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse config JSON")
    }

    /// Loads the file named by `KATWINDOW_CONFIG`, or returns defaults.
    pub fn load_or_default() -> Self {
        Self::load_from(std::env::var_os(CONFIG_ENV_VAR).as_deref())
    }

    /// Loads `path` if given, or returns defaults.
    ///
    /// A missing or malformed file is logged and replaced by defaults.
    pub fn load_from(path: Option<&OsStr>) -> Self {
        match path {
            Some(path) => match Self::from_file(Path::new(path)) {
                Ok(config) => {
                    info!("Loaded windowing config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("{:#}. Using default windowing config.", e);
                    Self::default()
                }
            },
            None => {
                debug!("{} not set, using default windowing config.", CONFIG_ENV_VAR);
                Self::default()
            }
        }
    }
}

// --- DPI Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DpiConfig {
    /// DPI reported when the native layer has no value (X11 without
    /// `Xft.dpi`, a Win32 monitor whose handle could not be resolved).
    pub fallback_dpi: f32,
    /// Forces this DPI for every monitor and window when set.
    pub override_dpi: Option<f32>,
}

impl Default for DpiConfig {
    fn default() -> Self {
        DpiConfig {
            fallback_dpi: BASE_DPI,
            override_dpi: None,
        }
    }
}

impl DpiConfig {
    /// Applies the override, or the fallback when `native` is `None`.
    pub fn resolve(&self, native: Option<f32>) -> f32 {
        self.override_dpi
            .or(native.filter(|dpi| *dpi > 0.0))
            .unwrap_or(self.fallback_dpi)
    }
}

// --- Window Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Native window class registered by the Win32 backend.
    pub class_name: String,
    pub default_title: String,
    /// Client-area size.
    pub default_size: UVec2,
    pub default_position: IVec2,
    pub decorated: bool,
    /// Whether a new window is shown immediately.
    pub show_on_create: bool,
    /// Frame insets at 96 DPI, used when the native layer does not report
    /// its own frame extents.
    pub frame: FrameInsets,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            class_name: "katwc".to_string(),
            default_title: "kat".to_string(),
            default_size: UVec2::new(800, 600),
            default_position: IVec2::new(0, 0),
            decorated: true,
            show_on_create: true,
            // Frame of an overlapped Win32 window at 100% scaling.
            frame: FrameInsets::new(8, 31, 8, 8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_yields_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let config =
            Config::from_json(r#"{ "dpi": { "override_dpi": 144.0 }, "window": { "decorated": false } }"#)
                .unwrap();
        assert_eq!(config.dpi.override_dpi, Some(144.0));
        assert_eq!(config.dpi.fallback_dpi, BASE_DPI);
        assert!(!config.window.decorated);
        assert_eq!(config.window.class_name, "katwc");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Config::from_json("{ not json").is_err());
    }

    #[test]
    fn test_dpi_resolution_order() {
        let mut dpi = DpiConfig::default();
        assert_eq!(dpi.resolve(None), 96.0);
        assert_eq!(dpi.resolve(Some(120.0)), 120.0);
        assert_eq!(dpi.resolve(Some(0.0)), 96.0);
        dpi.override_dpi = Some(192.0);
        assert_eq!(dpi.resolve(Some(120.0)), 192.0);
    }

    fn scratch_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("katwindow-{}-{}.json", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_without_a_path_yields_defaults() {
        assert_eq!(Config::load_from(None), Config::default());
    }

    #[test_log::test]
    fn test_load_falls_back_to_defaults_on_a_malformed_file() {
        let path = scratch_file("malformed", "{ \"dpi\": { \"fallback_dpi\": ");
        let config = Config::load_from(Some(path.as_os_str()));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_falls_back_to_defaults_on_a_missing_file() {
        let config = Config::load_from(Some(OsStr::new("/nonexistent/katwindow.json")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reads_a_valid_file() {
        let path = scratch_file("valid", r#"{ "dpi": { "override_dpi": 120.0 } }"#);
        let config = Config::load_from(Some(path.as_os_str()));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.dpi.override_dpi, Some(120.0));
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(Config::from_file(Path::new("/nonexistent/katwindow.json")).is_err());
    }
}
