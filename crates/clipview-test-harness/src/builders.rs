use std::f64::consts::TAU;
use std::sync::Arc;

use clipview_core::audio::{FnAudioClip, SharedAudio};
use clipview_core::clip::{FnClip, SharedClip};
use clipview_core::frame::{Frame, Rgb};
use clipview_core::fx::VideoClipExt;

/// Colour every pixel of a [`ClipBuilder`] clip carries at `(x, y, t)`.
///
/// Red and green encode the coordinate, blue the time in tenths of a second,
/// so a sampled frame identifies where and when it came from.
pub fn gradient_pixel(x: u32, y: u32, t: f64) -> Rgb {
    [
        (x % 256) as u8,
        (y % 256) as u8,
        ((t * 10.0).round() as u64 % 256) as u8,
    ]
}

/// Builder for synthetic video clips with sensible defaults.
pub struct ClipBuilder {
    width: u32,
    height: u32,
    duration: f64,
    fps: Option<f64>,
    audio: Option<SharedAudio>,
}

impl ClipBuilder {
    pub fn new() -> Self {
        Self {
            width: 64,
            height: 48,
            duration: 10.0,
            fps: Some(24.0),
            audio: None,
        }
    }

    pub fn resolution(mut self, w: u32, h: u32) -> Self {
        self.width = w;
        self.height = h;
        self
    }

    pub fn duration_secs(mut self, secs: f64) -> Self {
        self.duration = secs;
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn no_fps(mut self) -> Self {
        self.fps = None;
        self
    }

    pub fn audio(mut self, audio: SharedAudio) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn build(self) -> SharedClip {
        let (w, h) = (self.width, self.height);
        let clip = FnClip::new(
            move |t| Frame::from_fn(w, h, |x, y| gradient_pixel(x, y, t)),
            w,
            h,
            self.duration,
        )
        .expect("invalid duration in test builder");
        let clip: SharedClip = match self.fps {
            Some(fps) => Arc::new(clip.with_fps(fps)),
            None => Arc::new(clip),
        };
        match self.audio {
            Some(audio) => clip.with_audio(audio),
            None => clip,
        }
    }
}

impl Default for ClipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for sine tone audio clips.
pub struct ToneBuilder {
    frequency: f64,
    duration: f64,
    sample_rate: u32,
    channels: u16,
    amplitude: f64,
}

impl ToneBuilder {
    pub fn new() -> Self {
        Self {
            frequency: 440.0,
            duration: 1.0,
            sample_rate: 8000,
            channels: 2,
            amplitude: 0.5,
        }
    }

    pub fn frequency(mut self, hz: f64) -> Self {
        self.frequency = hz;
        self
    }

    pub fn duration_secs(mut self, secs: f64) -> Self {
        self.duration = secs;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn mono(mut self) -> Self {
        self.channels = 1;
        self
    }

    pub fn build(self) -> SharedAudio {
        let (freq, amp) = (self.frequency, self.amplitude);
        Arc::new(
            FnAudioClip::new(
                move |t| (amp * (TAU * freq * t).sin()) as f32,
                self.duration,
                self.sample_rate,
                self.channels,
            )
            .expect("invalid tone in test builder"),
        )
    }
}

impl Default for ToneBuilder {
    fn default() -> Self {
        Self::new()
    }
}
