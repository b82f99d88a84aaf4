use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a media file holds, as far as preview and embedding care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Classify a file extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" => Some(Self::Image),
            "mp4" | "webm" | "ogv" => Some(Self::Video),
            "mp3" | "ogg" | "wav" => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME top-level type used in `data:` URIs.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Container-level metadata of a media file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaInfo {
    pub name: String,
    pub path: PathBuf,
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub has_video: bool,
    pub has_audio: bool,
}

impl MediaInfo {
    pub fn new(
        path: PathBuf,
        duration: Duration,
        width: u32,
        height: u32,
        fps: f64,
        has_video: bool,
        has_audio: bool,
    ) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".into());
        Self {
            name,
            path,
            duration,
            width,
            height,
            fps,
            has_video,
            has_audio,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("PNG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("webm"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("ogg"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_extension("avi"), None);
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            MediaKind::from_path(Path::new("/tmp/clip.MP4")),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_path(Path::new("/tmp/noext")), None);
    }

    #[test]
    fn test_media_info_name() {
        let info = MediaInfo::new(
            PathBuf::from("/media/intro.mp4"),
            Duration::from_secs(3),
            640,
            480,
            25.0,
            true,
            false,
        );
        assert_eq!(info.name, "intro.mp4");
        assert_eq!(info.duration_secs(), 3.0);
    }
}
