//! User configuration for inkpad front ends.
//!
//! Stored as JSON. Every field has a default, so a partial or missing file
//! is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::export::{CaptureOptions, ExportOptions, PageGeometry};
use crate::storage::write_atomic;
use crate::util::{normalize_text_option, parse_hex_color};
use crate::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the persisted note collection.
    pub data_dir: Option<PathBuf>,
    pub toast_duration_ms: u64,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            toast_duration_ms: 2000,
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub view_width_px: u32,
    pub capture_scale: f64,
    pub view_padding_px: u32,
    /// `#rrggbb`
    pub background: String,
    pub jpeg_quality: u8,
    pub page: PageGeometry,
    /// Where exports go when no output directory is given.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let capture = CaptureOptions::default();
        let [r, g, b] = capture.background;
        Self {
            view_width_px: capture.view_width_px,
            capture_scale: capture.scale,
            view_padding_px: capture.padding_px,
            background: format!("#{r:02x}{g:02x}{b:02x}"),
            jpeg_quality: ExportOptions::default().jpeg_quality,
            page: PageGeometry::A4,
            output_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            Error::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                error
            ))
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse config at {}: {}",
                path.display(),
                error
            ))
        })?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        write_atomic(path, serialized.as_bytes()).map_err(|error| {
            Error::Config(format!(
                "Failed to write config at {}: {}",
                path.display(),
                error
            ))
        })
    }

    pub const fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    fn normalize(&mut self) {
        self.data_dir = normalize_path(self.data_dir.take());
        self.export.output_dir = normalize_path(self.export.output_dir.take());
        self.export.background = self.export.background.trim().to_string();
    }
}

impl ExportConfig {
    /// Validate and convert into pipeline options.
    pub fn to_options(&self) -> Result<ExportOptions> {
        let background = parse_hex_color(&self.background).ok_or_else(|| {
            Error::Config(format!(
                "Invalid export background color {:?} (expected #rrggbb)",
                self.background
            ))
        })?;
        if !(self.capture_scale.is_finite() && self.capture_scale > 0.0) {
            return Err(Error::Config(format!(
                "Capture scale must be positive, got {}",
                self.capture_scale
            )));
        }
        if self.view_width_px == 0 {
            return Err(Error::Config("View width must be positive".to_string()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        self.page
            .validate()
            .map_err(|error| Error::Config(error.to_string()))?;

        Ok(ExportOptions {
            capture: CaptureOptions {
                view_width_px: self.view_width_px,
                scale: self.capture_scale,
                padding_px: self.view_padding_px,
                background,
            },
            page: self.page,
            jpeg_quality: self.jpeg_quality,
        })
    }
}

fn normalize_path(path: Option<PathBuf>) -> Option<PathBuf> {
    let text = path.map(|path| path.to_string_lossy().into_owned());
    normalize_text_option(text).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from_path(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.toast_duration(), Duration::from_millis(2000));
    }

    #[test]
    fn defaults_convert_to_default_export_options() {
        let options = AppConfig::default().export.to_options().unwrap();
        assert_eq!(options, ExportOptions::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r##"{ "toast_duration_ms": 500, "export": { "background": " #FFFFFF " } }"##,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.toast_duration_ms, 500);
        assert_eq!(config.export.background, "#FFFFFF");
        assert_eq!(config.export.view_width_px, 794);

        let options = config.export.to_options().unwrap();
        assert_eq!(options.capture.background, [255, 255, 255]);
    }

    #[test]
    fn roundtrip_normalizes_blank_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            data_dir: Some(PathBuf::from("  ")),
            ..AppConfig::default()
        };

        config.save_to_path(&path).unwrap();
        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, None);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_from_path(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn invalid_export_settings_are_rejected() {
        let bad_color = ExportConfig {
            background: "navy".to_string(),
            ..ExportConfig::default()
        };
        assert!(matches!(bad_color.to_options(), Err(Error::Config(_))));

        let bad_scale = ExportConfig {
            capture_scale: 0.0,
            ..ExportConfig::default()
        };
        assert!(bad_scale.to_options().is_err());

        let bad_page = ExportConfig {
            page: PageGeometry {
                width: 10.0,
                height: 10.0,
                margin: 20.0,
            },
            ..ExportConfig::default()
        };
        assert!(bad_page.to_options().is_err());
    }
}
