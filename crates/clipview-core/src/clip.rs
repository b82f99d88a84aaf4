use std::sync::Arc;

use crate::audio::SharedAudio;
use crate::error::{CoreError, Result};
use crate::frame::{Frame, Rgb};

/// A time-indexed sequence of frames.
///
/// Clips are immutable. Frames are produced on demand by [`VideoClip::make_frame`];
/// callers outside the clip implementations go through
/// [`crate::sampler::sample`], which enforces the `[0, duration)` bound.
pub trait VideoClip: Send + Sync {
    /// Frame dimensions as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Length in seconds.
    fn duration(&self) -> f64;

    /// Native frame rate, if the clip has one.
    fn fps(&self) -> Option<f64> {
        None
    }

    /// Render the frame at `t`. `t` is already known to lie inside the clip.
    fn make_frame(&self, t: f64) -> Result<Frame>;

    /// Soundtrack attached to this clip.
    fn audio(&self) -> Option<SharedAudio> {
        None
    }
}

pub type SharedClip = Arc<dyn VideoClip>;

fn check_duration(duration: f64) -> Result<f64> {
    if duration.is_finite() && duration > 0.0 {
        Ok(duration)
    } else {
        Err(CoreError::InvalidDuration(duration))
    }
}

/// A clip showing a single colour for its whole duration.
#[derive(Debug, Clone)]
pub struct ColorClip {
    width: u32,
    height: u32,
    color: Rgb,
    duration: f64,
    fps: Option<f64>,
}

impl ColorClip {
    pub fn new(width: u32, height: u32, color: Rgb, duration: f64) -> Result<Self> {
        Ok(Self {
            width,
            height,
            color,
            duration: check_duration(duration)?,
            fps: None,
        })
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }
}

impl VideoClip for ColorClip {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn make_frame(&self, t: f64) -> Result<Frame> {
        Ok(Frame::solid(self.width, self.height, self.color).with_timestamp(t))
    }
}

/// A still image held for a duration.
#[derive(Debug, Clone)]
pub struct ImageClip {
    frame: Frame,
    duration: f64,
}

impl ImageClip {
    pub fn new(frame: Frame, duration: f64) -> Result<Self> {
        Ok(Self {
            frame,
            duration: check_duration(duration)?,
        })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl VideoClip for ImageClip {
    fn size(&self) -> (u32, u32) {
        self.frame.size()
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn make_frame(&self, t: f64) -> Result<Frame> {
        Ok(self.frame.clone().with_timestamp(t))
    }
}

/// A clip whose frames come from a function of time.
pub struct FnClip<F> {
    f: F,
    width: u32,
    height: u32,
    duration: f64,
    fps: Option<f64>,
}

impl<F> FnClip<F>
where
    F: Fn(f64) -> Frame + Send + Sync,
{
    pub fn new(f: F, width: u32, height: u32, duration: f64) -> Result<Self> {
        Ok(Self {
            f,
            width,
            height,
            duration: check_duration(duration)?,
            fps: None,
        })
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }
}

impl<F> VideoClip for FnClip<F>
where
    F: Fn(f64) -> Frame + Send + Sync,
{
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn make_frame(&self, t: f64) -> Result<Frame> {
        Ok((self.f)(t).with_timestamp(t))
    }
}

/// A clip with a soundtrack attached.
pub(crate) struct WithAudio {
    pub(crate) inner: SharedClip,
    pub(crate) audio: SharedAudio,
}

impl VideoClip for WithAudio {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn duration(&self) -> f64 {
        self.inner.duration()
    }

    fn fps(&self) -> Option<f64> {
        self.inner.fps()
    }

    fn make_frame(&self, t: f64) -> Result<Frame> {
        self.inner.make_frame(t)
    }

    fn audio(&self) -> Option<SharedAudio> {
        Some(Arc::clone(&self.audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_clip_frames() {
        let clip = ColorClip::new(4, 3, [10, 20, 30], 2.0).unwrap();
        let frame = clip.make_frame(1.5).unwrap();
        assert_eq!(frame.size(), (4, 3));
        assert_eq!(frame.pixel(3, 2), Some([10, 20, 30]));
        assert_eq!(frame.t, 1.5);
        assert_eq!(clip.fps(), None);
        assert_eq!(clip.with_fps(25.0).fps(), Some(25.0));
    }

    #[test]
    fn test_clip_rejects_bad_duration() {
        assert!(ColorClip::new(1, 1, [0, 0, 0], 0.0).is_err());
        assert!(ColorClip::new(1, 1, [0, 0, 0], f64::NAN).is_err());
        assert!(ImageClip::new(Frame::solid(1, 1, [0, 0, 0]), -1.0).is_err());
    }

    #[test]
    fn test_fn_clip_receives_time() {
        let clip = FnClip::new(|t| Frame::solid(2, 2, [(t * 10.0) as u8, 0, 0]), 2, 2, 3.0)
            .unwrap();
        assert_eq!(clip.make_frame(2.0).unwrap().pixel(0, 0), Some([20, 0, 0]));
    }
}
