//! Engine configuration persisted as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::DisplayDescriptor;
use crate::error::ConfigError;
use crate::input::InputDevices;
use crate::logging::{log, LogCategory, LogLevel};

pub const DEFAULT_FRAMEBUFFER: &str = "/dev/fb0";

/// Overlays drawn by the engine on top of each scene frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default = "enabled")]
    pub show_metrics: bool,
    #[serde(default = "enabled")]
    pub show_mouse_cursor: bool,
    #[serde(default = "enabled")]
    pub show_touch_cursor: bool,
    #[serde(default = "enabled")]
    pub hide_console_caret: bool,
}

fn enabled() -> bool {
    true
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            show_metrics: true,
            show_mouse_cursor: true,
            show_touch_cursor: true,
            hide_console_caret: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_framebuffer")]
    pub framebuffer: PathBuf,
    #[serde(default)]
    pub display: DisplayDescriptor,
    #[serde(default)]
    pub input: InputDevices,
    #[serde(default)]
    pub options: EngineOptions,
}

fn default_framebuffer() -> PathBuf {
    PathBuf::from(DEFAULT_FRAMEBUFFER)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            framebuffer: default_framebuffer(),
            display: DisplayDescriptor::default(),
            input: InputDevices::default(),
            options: EngineOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when it is missing or unusable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(err) => {
                log(LogCategory::Engine, LogLevel::Warn, || {
                    format!("{}; using defaults", err)
                });
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeviceError;
    use crate::input::TouchDevice;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rawdraw_test_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.framebuffer, PathBuf::from("/dev/fb0"));
        assert_eq!(config.display.width, 1920);
        assert_eq!(config.display.depth, 32);
        assert!(config.input.keyboard.is_none());
        assert!(config.options.show_metrics);
    }

    #[test]
    fn test_config_save_load() {
        let dir = test_dir("save_load");
        let path = dir.join("rawdraw.json");

        let config = EngineConfig {
            display: DisplayDescriptor::new(800, 480, 16),
            input: InputDevices {
                keyboard: Some(PathBuf::from("/dev/input/event0")),
                mouse: None,
                touch: Some(TouchDevice {
                    path: PathBuf::from("/dev/input/event2"),
                    max_x: 4095,
                    max_y: 4095,
                }),
            },
            options: EngineOptions {
                show_metrics: false,
                ..Default::default()
            },
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "framebuffer": "/dev/fb1", "options": {} }"#).unwrap();
        assert_eq!(config.framebuffer, PathBuf::from("/dev/fb1"));
        assert_eq!(config.display, DisplayDescriptor::default());
        assert_eq!(config.options, EngineOptions::default());
    }

    #[test]
    fn test_load_rejects_unsupported_depth() {
        let dir = test_dir("bad_depth");
        let path = dir.join("rawdraw.json");
        let config = EngineConfig {
            display: DisplayDescriptor::new(640, 480, 24),
            ..Default::default()
        };
        config.save(&path).unwrap();

        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Invalid(DeviceError::UnsupportedColorDepth(24)))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_or_default_on_missing_and_malformed() {
        let dir = test_dir("fallback");
        let missing = dir.join("missing.json");
        assert_eq!(EngineConfig::load_or_default(&missing), EngineConfig::default());

        let malformed = dir.join("malformed.json");
        fs::write(&malformed, "{ not json").unwrap();
        assert!(matches!(
            EngineConfig::load(&malformed),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(EngineConfig::load_or_default(&malformed), EngineConfig::default());

        fs::remove_dir_all(&dir).unwrap();
    }
}
