use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clipview_core::clip::VideoClip;
use clipview_core::sampler::iter_frames;

use crate::error::{MediaError, Result};
use crate::wav::write_wav;

type CodecArgs = (&'static [&'static str], &'static [&'static str]);

const MP4: CodecArgs = (
    &["-c:v", "libx264", "-pix_fmt", "yuv420p", "-preset", "veryfast"],
    &["-c:a", "aac"],
);
const WEBM: CodecArgs = (
    &["-c:v", "libvpx-vp9", "-pix_fmt", "yuv420p"],
    &["-c:a", "libopus"],
);
const OGV: CodecArgs = (&["-c:v", "libtheora"], &["-c:a", "libvorbis"]);

/// Video and audio codec arguments for an output container, chosen by file
/// extension.
fn codec_args(path: &Path) -> Result<CodecArgs> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") => Ok(MP4),
        Some("webm") => Ok(WEBM),
        Some("ogv") => Ok(OGV),
        _ => Err(MediaError::UnsupportedKind(path.display().to_string())),
    }
}

/// Encode a clip to a video file using ffmpeg CLI subprocess (crash isolation).
///
/// Frames are rendered in-process and piped to ffmpeg as raw RGB24.
pub struct FfmpegVideoWriter {
    output_path: PathBuf,
    fps: f64,
    with_audio: bool,
}

impl FfmpegVideoWriter {
    pub fn new(output: &Path, fps: f64) -> Self {
        Self {
            output_path: output.to_path_buf(),
            fps,
            with_audio: true,
        }
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.with_audio = enabled;
        self
    }

    pub fn run(&self, clip: &dyn VideoClip) -> Result<()> {
        let (video_args, audio_args) = codec_args(&self.output_path)?;
        let frames = iter_frames(clip, self.fps)?;
        let (width, height) = clip.size();

        // Held until ffmpeg exits.
        let audio_file = match clip.audio().filter(|_| self.with_audio) {
            Some(audio) => {
                let file = tempfile::Builder::new().suffix(".wav").tempfile()?;
                write_wav(audio.as_ref(), file.path())?;
                Some(file)
            }
            None => None,
        };

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error"]);
        cmd.args(["-f", "rawvideo", "-pix_fmt", "rgb24"]);
        cmd.args(["-s", &format!("{width}x{height}")]);
        cmd.args(["-r", &self.fps.to_string()]);
        cmd.args(["-i", "-"]);
        if let Some(file) = &audio_file {
            cmd.arg("-i").arg(file.path());
        }
        cmd.args(video_args);
        if audio_file.is_some() {
            cmd.args(audio_args);
        }
        cmd.args(["-t", &clip.duration().to_string()]);
        cmd.arg(&self.output_path);

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MediaError::EncoderError(format!("failed to spawn ffmpeg: {e}")))?;

        log::debug!(
            "encoding {} frames at {} fps to {}",
            frames.len(),
            self.fps,
            self.output_path.display()
        );

        let mut failure = None;
        if let Some(mut stdin) = child.stdin.take() {
            for item in frames {
                let frame = match item {
                    Ok((_, frame)) => frame,
                    Err(e) => {
                        failure = Some(MediaError::from(e));
                        break;
                    }
                };
                // ffmpeg exited early; its stderr explains why.
                if let Err(e) = stdin.write_all(&frame.data) {
                    failure = Some(MediaError::EncoderError(format!("piping frames: {e}")));
                    break;
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| MediaError::EncoderError(format!("waiting for ffmpeg: {e}")))?;

        if let Some(e @ MediaError::Core(_)) = failure {
            return Err(e);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::EncoderError(format!(
                "ffmpeg exited with {}: {}",
                output.status, stderr
            )));
        }
        if let Some(e) = failure {
            return Err(e);
        }

        log::info!("wrote {}", self.output_path.display());
        Ok(())
    }
}
