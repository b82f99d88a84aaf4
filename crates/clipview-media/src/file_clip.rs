use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clipview_core::audio::{AudioArrayClip, AudioClip, SharedAudio};
use clipview_core::clip::{ImageClip, SharedClip, VideoClip};
use clipview_core::error::CoreError;
use clipview_core::frame::Frame;
use clipview_core::media::MediaKind;
use clipview_core::time::TIME_EPSILON;

use crate::audio_decoder::FfmpegAudioDecoder;
use crate::decoder::{FfmpegDecoder, VideoDecoder};
use crate::error::{MediaError, Result};
use crate::snapshot::load_image;

/// Forward jumps longer than this seek instead of decoding through.
const SEEK_THRESHOLD_SECS: f64 = 1.0;

struct DecodeState {
    decoder: FfmpegDecoder,
    current: Option<Frame>,
    lookahead: Option<Frame>,
    exhausted: bool,
}

impl DecodeState {
    fn reset_to(&mut self, t: f64) -> Result<()> {
        log::trace!("seeking to {t:.3}s");
        self.decoder.seek_to(t)?;
        self.current = None;
        self.lookahead = None;
        self.exhausted = false;
        Ok(())
    }

    /// The decoded frame with the largest timestamp not after `t`.
    fn frame_at(&mut self, t: f64) -> Result<Frame> {
        let needs_seek = match &self.current {
            Some(frame) => frame.t > t + TIME_EPSILON || t - frame.t > SEEK_THRESHOLD_SECS,
            None => self.lookahead.as_ref().is_some_and(|f| f.t > t + TIME_EPSILON),
        };
        if needs_seek {
            self.reset_to(t)?;
        }

        loop {
            if self.lookahead.is_none() && !self.exhausted {
                self.lookahead = self.decoder.decode_next_frame()?;
                self.exhausted = self.lookahead.is_none();
            }
            match self.lookahead.take() {
                Some(next) if next.t <= t + TIME_EPSILON => self.current = Some(next),
                other => {
                    self.lookahead = other;
                    break;
                }
            }
        }

        // Streams whose first pts is after `t` show their first frame.
        self.current
            .clone()
            .or_else(|| self.lookahead.clone())
            .ok_or_else(|| MediaError::DecoderError(format!("no frame decoded for {t:.3}s")))
    }
}

/// A video clip read from a file, decoded on demand.
pub struct VideoFileClip {
    path: PathBuf,
    size: (u32, u32),
    duration: f64,
    fps: f64,
    audio: Option<SharedAudio>,
    state: Mutex<DecodeState>,
}

impl VideoFileClip {
    /// Open `path` and its soundtrack, if it has one.
    pub fn open(path: &Path) -> Result<Self> {
        let decoder = FfmpegDecoder::open(path)?;
        let info = decoder.stream_info();
        if !(info.duration_secs > 0.0) {
            return Err(MediaError::ProbeError(format!(
                "{}: unknown duration",
                path.display()
            )));
        }

        let audio = match AudioFileClip::open(path) {
            Ok(audio) => Some(Arc::new(audio) as SharedAudio),
            Err(MediaError::NoAudioStream) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            path: path.to_path_buf(),
            size: (info.width, info.height),
            duration: info.duration_secs,
            fps: info.fps,
            audio,
            state: Mutex::new(DecodeState {
                decoder,
                current: None,
                lookahead: None,
                exhausted: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VideoClip for VideoFileClip {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn fps(&self) -> Option<f64> {
        Some(self.fps)
    }

    fn make_frame(&self, t: f64) -> clipview_core::error::Result<Frame> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CoreError::RenderFailure("decoder state poisoned".into()))?;
        state
            .frame_at(t)
            .map(|frame| frame.with_timestamp(t))
            .map_err(|e| CoreError::RenderFailure(format!("{}: {e}", self.path.display())))
    }

    fn audio(&self) -> Option<SharedAudio> {
        self.audio.clone()
    }
}

/// An audio file decoded fully into memory.
pub struct AudioFileClip {
    path: PathBuf,
    inner: AudioArrayClip,
}

impl AudioFileClip {
    pub fn open(path: &Path) -> Result<Self> {
        let mut decoder = FfmpegAudioDecoder::open(path)?;
        let samples = decoder.decode_all()?;
        let inner = AudioArrayClip::new(samples, decoder.sample_rate(), decoder.channels())?;
        log::debug!(
            "decoded {:.3}s of audio from {}",
            inner.duration(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioClip for AudioFileClip {
    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn frame_count(&self) -> usize {
        self.inner.frame_count()
    }

    fn samples(&self, start: usize, count: usize) -> Vec<f32> {
        self.inner.samples(start, count)
    }
}

/// Open an image or video file as a clip. Images are held for `still_duration`.
pub fn open_clip(path: &Path, still_duration: f64) -> Result<SharedClip> {
    match MediaKind::from_path(path) {
        Some(MediaKind::Image) => {
            let frame = load_image(path)?;
            Ok(Arc::new(ImageClip::new(frame, still_duration)?))
        }
        Some(MediaKind::Video) => Ok(Arc::new(VideoFileClip::open(path)?)),
        _ => Err(MediaError::UnsupportedKind(path.display().to_string())),
    }
}
