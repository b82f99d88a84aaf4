use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::{Engine, prelude::BASE64_STANDARD};
use clipview_core::audio::SharedAudio;
use clipview_core::clip::{SharedClip, VideoClip};
use clipview_core::frame::Frame;
use clipview_core::media::MediaKind;
use clipview_core::sampler::sample;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::encoder::FfmpegVideoWriter;
use crate::error::{MediaError, Result};
use crate::file_clip::VideoFileClip;
use crate::probe::probe;
use crate::snapshot::encode_image;
use crate::wav::encode_wav;

/// Longest clip embedded by default, in seconds.
pub const DEFAULT_MAX_DURATION: f64 = 60.0;

/// Attributes set from the options themselves; `attrs` may not override them.
const RESERVED_ATTRS: [&str; 5] = ["src", "controls", "autoplay", "loop", "width"];

/// How a resource is turned into notebook markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    /// Encoding rate for video clips without a native frame rate.
    pub fps: Option<f64>,
    pub width: Option<u32>,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Embed the single frame at this timestamp instead of the whole media.
    pub t: Option<f64>,
    /// Extra attributes copied onto the media tag.
    pub attrs: BTreeMap<String, String>,
    /// Refuse media longer than this. `None` disables the check.
    pub max_duration: Option<f64>,
    /// Wrap the tag in a centred `<div>`.
    pub center: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            fps: None,
            width: None,
            autoplay: false,
            looping: false,
            t: None,
            attrs: BTreeMap::new(),
            max_duration: Some(DEFAULT_MAX_DURATION),
            center: true,
        }
    }
}

/// Something that can be embedded.
#[derive(Clone)]
pub enum Resource {
    Video(SharedClip),
    Audio(SharedAudio),
    Image(Frame),
    /// A media file; its kind comes from the extension.
    File(PathBuf),
}

/// Inline HTML fragment for a notebook front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build inline markup for `resource` with its payload base64-encoded in a
/// `data:` URI.
pub fn embed(resource: &Resource, options: &EmbedOptions) -> Result<Markup> {
    let extra = extra_attrs(options)?;
    let (kind, mime, payload) = match resource {
        Resource::Image(frame) => png_payload(frame)?,
        Resource::Video(clip) => match options.t {
            Some(t) => png_payload(&sample(clip.as_ref(), t)?)?,
            None => video_payload(clip.as_ref(), options)?,
        },
        Resource::Audio(audio) => {
            check_duration(audio.duration(), options)?;
            (MediaKind::Audio, "audio/wav".to_string(), encode_wav(audio.as_ref())?)
        }
        Resource::File(path) => file_payload(path, options)?,
    };

    log::debug!("embedding {} bytes of {mime}", payload.len());
    Ok(Markup(render(kind, &mime, &payload, options, &extra)))
}

/// Pass-through attributes, minus reserved names. Names must be ASCII
/// letters, digits, `-` or `_`.
fn extra_attrs(options: &EmbedOptions) -> Result<Vec<(&str, &str)>> {
    let mut extra = Vec::with_capacity(options.attrs.len());
    for (name, value) in &options.attrs {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(MediaError::InvalidAttribute(name.clone()));
        }
        if RESERVED_ATTRS.contains(&name.to_ascii_lowercase().as_str()) {
            log::warn!("ignoring attribute {name:?}, it is set from the embed options");
            continue;
        }
        extra.push((name.as_str(), value.as_str()));
    }
    Ok(extra)
}

fn check_duration(duration: f64, options: &EmbedOptions) -> Result<()> {
    match options.max_duration {
        Some(max) if duration > max => Err(MediaError::TooLong { duration, max }),
        _ => Ok(()),
    }
}

fn png_payload(frame: &Frame) -> Result<(MediaKind, String, Vec<u8>)> {
    Ok((
        MediaKind::Image,
        "image/png".to_string(),
        encode_image(frame, ImageFormat::Png)?,
    ))
}

fn video_payload(
    clip: &dyn VideoClip,
    options: &EmbedOptions,
) -> Result<(MediaKind, String, Vec<u8>)> {
    check_duration(clip.duration(), options)?;
    let fps = options.fps.or(clip.fps()).ok_or(MediaError::MissingFps)?;

    let file = tempfile::Builder::new().suffix(".mp4").tempfile()?;
    FfmpegVideoWriter::new(file.path(), fps).run(clip)?;
    Ok((MediaKind::Video, "video/mp4".to_string(), fs::read(file.path())?))
}

fn file_payload(path: &Path, options: &EmbedOptions) -> Result<(MediaKind, String, Vec<u8>)> {
    let kind = MediaKind::from_path(path)
        .ok_or_else(|| MediaError::UnsupportedKind(path.display().to_string()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if let (MediaKind::Video, Some(t)) = (kind, options.t) {
        let clip = VideoFileClip::open(path)?;
        return png_payload(&sample(&clip, t)?);
    }
    if kind != MediaKind::Image {
        check_duration(probe(path)?.duration_secs(), options)?;
    }

    let subtype = match ext.as_str() {
        "jpg" => "jpeg",
        "ogv" => "ogg",
        "mp3" => "mpeg",
        other => other,
    };
    let mime = format!("{}/{subtype}", kind.mime_prefix());
    Ok((kind, mime, fs::read(path)?))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render(
    kind: MediaKind,
    mime: &str,
    payload: &[u8],
    options: &EmbedOptions,
    extra: &[(&str, &str)],
) -> String {
    let src = format!("data:{mime};base64,{}", BASE64_STANDARD.encode(payload));

    let mut attrs = format!(" src=\"{src}\"");
    if kind != MediaKind::Image {
        attrs.push_str(" controls");
        if options.autoplay {
            attrs.push_str(" autoplay");
        }
        if options.looping {
            attrs.push_str(" loop");
        }
    }
    if let Some(width) = options.width {
        attrs.push_str(&format!(" width=\"{width}\""));
    }
    for (name, value) in extra {
        attrs.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
    }

    let tag = match kind {
        MediaKind::Image => format!("<img{attrs}>"),
        MediaKind::Video => format!("<video{attrs}></video>"),
        MediaKind::Audio => format!("<audio{attrs}></audio>"),
    };
    if options.center {
        format!("<div align=\"middle\">{tag}</div>")
    } else {
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use clipview_core::audio::AudioArrayClip;
    use clipview_core::clip::ColorClip;

    #[test]
    fn test_image_markup() {
        let frame = Frame::solid(2, 2, [255, 0, 0]);
        let markup = embed(&Resource::Image(frame), &EmbedOptions::default()).unwrap();
        let html = markup.as_str();
        assert!(html.starts_with("<div align=\"middle\"><img src=\"data:image/png;base64,"));
        assert!(html.ends_with("></div>"));
        assert!(!html.contains("controls"));
    }

    #[test]
    fn test_options_and_attrs() {
        let mut options = EmbedOptions {
            width: Some(320),
            autoplay: true,
            looping: true,
            center: false,
            ..Default::default()
        };
        options.attrs.insert("title".into(), "a \"quoted\" <clip>".into());
        let audio: SharedAudio = Arc::new(AudioArrayClip::new(vec![0.0; 80], 8000, 1).unwrap());

        let html = embed(&Resource::Audio(audio), &options).unwrap().into_string();
        assert!(html.starts_with("<audio src=\"data:audio/wav;base64,"));
        assert!(html.contains(" controls autoplay loop width=\"320\""));
        assert!(html.contains("title=\"a &quot;quoted&quot; &lt;clip&gt;\""));
        assert!(html.ends_with("</audio>"));
    }

    #[test]
    fn test_attribute_names_are_checked() {
        let image = Resource::Image(Frame::solid(1, 1, [0, 0, 0]));
        for bad in ["on\"load", "a>b", "", "data x"] {
            let mut options = EmbedOptions::default();
            options.attrs.insert(bad.into(), "1".into());
            let err = embed(&image, &options).unwrap_err();
            assert!(matches!(err, MediaError::InvalidAttribute(ref name) if name == bad));
        }

        let mut options = EmbedOptions {
            width: Some(50),
            ..Default::default()
        };
        options.attrs.insert("WIDTH".into(), "999".into());
        options.attrs.insert("src".into(), "elsewhere.png".into());
        options.attrs.insert("data-id".into(), "7".into());
        let html = embed(&image, &options).unwrap().into_string();
        assert_eq!(html.matches(" src=\"").count(), 1);
        assert!(!html.contains("999"));
        assert!(html.contains(" width=\"50\" data-id=\"7\""));
    }

    #[test]
    fn test_too_long_is_refused() {
        let clip: SharedClip =
            Arc::new(ColorClip::new(8, 8, [0, 0, 0], 120.0).unwrap().with_fps(10.0));
        let err = embed(&Resource::Video(clip.clone()), &EmbedOptions::default()).unwrap_err();
        assert!(matches!(err, MediaError::TooLong { max, .. } if max == DEFAULT_MAX_DURATION));

        // A single frame is not limited by duration.
        let options = EmbedOptions {
            t: Some(100.0),
            ..Default::default()
        };
        assert!(embed(&Resource::Video(clip), &options).is_ok());
    }

    #[test]
    fn test_video_without_fps() {
        let clip: SharedClip = Arc::new(ColorClip::new(8, 8, [0, 0, 0], 1.0).unwrap());
        let err = embed(&Resource::Video(clip), &EmbedOptions::default()).unwrap_err();
        assert!(matches!(err, MediaError::MissingFps));
    }

    #[test]
    fn test_unknown_extension() {
        let err = embed(
            &Resource::File(PathBuf::from("notes.txt")),
            &EmbedOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedKind(_)));
    }

    #[test]
    fn test_options_from_json() {
        let options: EmbedOptions =
            serde_json::from_str(r#"{"width": 400, "loop": true, "t": 2.5}"#).unwrap();
        assert_eq!(options.width, Some(400));
        assert!(options.looping);
        assert_eq!(options.t, Some(2.5));
        assert_eq!(options.max_duration, Some(DEFAULT_MAX_DURATION));
        assert!(options.center);
    }
}
