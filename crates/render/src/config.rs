use renderplan_common::{FrameSettings, Rect, StereoMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Schedule configuration: output canvas, stereo mode and framing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub stereo_mode: StereoMode,
    pub frame_settings: FrameSettings,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1920,
            canvas_height: 1080,
            stereo_mode: StereoMode::Mono,
            frame_settings: FrameSettings::default(),
        }
    }
}

impl ScheduleConfig {
    pub fn canvas(&self) -> Rect {
        Rect::from_size(self.canvas_width as i32, self.canvas_height as i32)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderplan_common::FrameType;
    use std::io::Write;

    #[test]
    fn config_defaults() {
        let config = ScheduleConfig::default();
        assert_eq!(config.stereo_mode, StereoMode::Mono);
        assert_eq!(config.canvas(), Rect::from_size(1920, 1080));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, r#"{{ "stereo_mode": "anaglyph", "canvas_width": 800 }}"#).unwrap();

        let config = ScheduleConfig::load(tmp.path()).unwrap();
        assert_eq!(config.stereo_mode, StereoMode::Anaglyph);
        assert_eq!(config.canvas_width, 800);
        assert_eq!(config.canvas_height, 1080);
    }

    #[test]
    fn unknown_stereo_mode_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, r#"{{ "stereo_mode": "hologram" }}"#).unwrap();
        assert!(matches!(
            ScheduleConfig::load(tmp.path()),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = ScheduleConfig {
            stereo_mode: StereoMode::SideBySide,
            frame_settings: FrameSettings {
                frame_type: FrameType::Bars,
                ..FrameSettings::default()
            },
            ..ScheduleConfig::default()
        };
        config.save(tmp.path()).unwrap();
        assert_eq!(ScheduleConfig::load(tmp.path()).unwrap(), config);
    }
}
