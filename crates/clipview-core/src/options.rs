use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clip::VideoClip;
use crate::error::Result;
use crate::time::validate_fps;

/// Frame rate used when neither the caller nor the clip provides one.
pub const DEFAULT_PREVIEW_FPS: f64 = 15.0;

/// Settings for an interactive preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    /// Target display rate. Falls back to the clip's rate, then 15 fps.
    pub fps: Option<f64>,
    /// Play the clip's soundtrack alongside the video.
    pub with_audio: bool,
    /// Report the position and colour of clicked pixels.
    pub interactive: bool,
    /// How far ahead of the playhead audio is queued, in seconds.
    pub audio_buffer_secs: f64,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            fps: None,
            with_audio: true,
            interactive: false,
            audio_buffer_secs: 1.0,
        }
    }
}

impl PreviewOptions {
    /// Resolve the effective frame rate for `clip`.
    pub fn effective_fps(&self, clip: &dyn VideoClip) -> Result<f64> {
        validate_fps(self.fps.or(clip.fps()).unwrap_or(DEFAULT_PREVIEW_FPS))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&json)?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ColorClip;

    #[test]
    fn test_effective_fps_precedence() {
        let clip = ColorClip::new(1, 1, [0, 0, 0], 1.0).unwrap();
        let options = PreviewOptions::default();
        assert_eq!(options.effective_fps(&clip).unwrap(), DEFAULT_PREVIEW_FPS);

        let clip = clip.with_fps(24.0);
        assert_eq!(options.effective_fps(&clip).unwrap(), 24.0);

        let options = PreviewOptions {
            fps: Some(10.0),
            ..Default::default()
        };
        assert_eq!(options.effective_fps(&clip).unwrap(), 10.0);

        let options = PreviewOptions {
            fps: Some(0.0),
            ..Default::default()
        };
        assert!(options.effective_fps(&clip).is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: PreviewOptions = serde_json::from_str(r#"{"interactive": true}"#).unwrap();
        assert!(options.interactive);
        assert!(options.with_audio);
        assert_eq!(options.fps, None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("preview.json");
        let options = PreviewOptions {
            fps: Some(12.0),
            with_audio: false,
            interactive: true,
            audio_buffer_secs: 0.5,
        };
        options.save(&path).unwrap();
        assert_eq!(PreviewOptions::load(&path).unwrap(), options);
    }
}
