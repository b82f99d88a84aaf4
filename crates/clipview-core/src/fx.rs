use std::sync::Arc;

use crate::audio::{AudioClipExt, SharedAudio, insert_silence, loop_over};
use crate::clip::{SharedClip, VideoClip, WithAudio};
use crate::error::{CoreError, Result};
use crate::frame::{BLACK, Frame, Rgb};

/// Resolve `start..end` against a clip of length `duration`.
///
/// `None` means the end of the clip; a negative `end` counts back from it.
pub(crate) fn resolve_range(duration: f64, start: f64, end: Option<f64>) -> Result<(f64, f64)> {
    let end = match end {
        None => duration,
        Some(e) if e < 0.0 => duration + e,
        Some(e) => e,
    };
    if !start.is_finite() || start < 0.0 || start > duration {
        return Err(CoreError::InvalidTimeRange { start, end });
    }
    if !end.is_finite() || end > duration || start >= end {
        return Err(CoreError::InvalidTimeRange { start, end });
    }
    Ok((start, end))
}

struct Subclip {
    inner: SharedClip,
    start: f64,
    duration: f64,
    audio: Option<SharedAudio>,
}

impl VideoClip for Subclip {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn fps(&self) -> Option<f64> {
        self.inner.fps()
    }

    fn make_frame(&self, t: f64) -> Result<Frame> {
        Ok(self.inner.make_frame(self.start + t)?.with_timestamp(t))
    }

    fn audio(&self) -> Option<SharedAudio> {
        self.audio.clone()
    }
}

struct Looped {
    inner: SharedClip,
    duration: f64,
    audio: Option<SharedAudio>,
}

impl VideoClip for Looped {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn fps(&self) -> Option<f64> {
        self.inner.fps()
    }

    fn make_frame(&self, t: f64) -> Result<Frame> {
        let period = self.inner.duration();
        Ok(self.inner.make_frame(t % period)?.with_timestamp(t))
    }

    fn audio(&self) -> Option<SharedAudio> {
        self.audio.clone()
    }
}

/// Source time `at` held for `gap` seconds, then `skip` seconds of source
/// dropped. Freezing and cutting out are both splices.
struct Splice {
    inner: SharedClip,
    at: f64,
    gap: f64,
    skip: f64,
    audio: Option<SharedAudio>,
}

impl Splice {
    fn source_time(&self, t: f64) -> f64 {
        if t < self.at {
            t
        } else if t < self.at + self.gap {
            self.at
        } else {
            t - self.gap + self.skip
        }
    }
}

impl VideoClip for Splice {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn duration(&self) -> f64 {
        self.inner.duration() + self.gap - self.skip
    }

    fn fps(&self) -> Option<f64> {
        self.inner.fps()
    }

    fn make_frame(&self, t: f64) -> Result<Frame> {
        Ok(self.inner.make_frame(self.source_time(t))?.with_timestamp(t))
    }

    fn audio(&self) -> Option<SharedAudio> {
        self.audio.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

struct Fade {
    inner: SharedClip,
    fade: f64,
    color: Rgb,
    edge: Edge,
}

impl VideoClip for Fade {
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
        let frame = self.inner.make_frame(t)?;
        let distance = match self.edge {
            Edge::Start => t,
            Edge::End => self.inner.duration() - t,
        };
        if self.fade <= 0.0 || distance >= self.fade {
            return Ok(frame);
        }
        Ok(frame.blend_toward(self.color, distance / self.fade))
    }

    fn audio(&self) -> Option<SharedAudio> {
        self.inner.audio()
    }
}

/// Outplace transformations of video clips. The receiver is never modified.
pub trait VideoClipExt {
    /// Content between `start` and `end` seconds. A negative `end` counts
    /// back from the end of the clip; `None` runs to the end. The soundtrack
    /// is cut the same way.
    fn subclip(&self, start: f64, end: Option<f64>) -> Result<SharedClip>;

    /// Play the clip `n` times back to back. The soundtrack restarts with
    /// every repeat of the picture.
    fn looped(&self, n: usize) -> Result<SharedClip>;

    /// Repeat the clip until it lasts `duration` seconds.
    fn looped_for(&self, duration: f64) -> Result<SharedClip>;

    /// Hold the frame at `t` for `duration` seconds, then carry on. The
    /// soundtrack is silent while the picture is frozen.
    fn freeze(&self, t: f64, duration: f64) -> Result<SharedClip>;

    /// Remove the content between `start` and `end` seconds.
    fn cutout(&self, start: f64, end: f64) -> Result<SharedClip>;

    /// Fade in from black over the first `duration` seconds.
    fn fade_in(&self, duration: f64) -> Result<SharedClip>;

    /// Fade out to black over the last `duration` seconds.
    fn fade_out(&self, duration: f64) -> Result<SharedClip>;

    /// Like [`VideoClipExt::fade_in`] with a custom starting colour.
    fn fade_in_from(&self, duration: f64, color: Rgb) -> Result<SharedClip>;

    /// Like [`VideoClipExt::fade_out`] with a custom final colour.
    fn fade_out_to(&self, duration: f64, color: Rgb) -> Result<SharedClip>;

    /// Attach `audio` as the clip's soundtrack, replacing any existing one.
    fn with_audio(&self, audio: SharedAudio) -> SharedClip;
}

impl VideoClipExt for SharedClip {
    fn subclip(&self, start: f64, end: Option<f64>) -> Result<SharedClip> {
        let (start, end) = resolve_range(self.duration(), start, end)?;
        let audio = match self.audio() {
            Some(audio) => {
                let audio_end = end.min(audio.duration());
                if start < audio_end {
                    Some(audio.subclip(start, Some(audio_end))?)
                } else {
                    None
                }
            }
            None => None,
        };
        Ok(Arc::new(Subclip {
            inner: Arc::clone(self),
            start,
            duration: end - start,
            audio,
        }))
    }

    fn looped(&self, n: usize) -> Result<SharedClip> {
        if n == 0 {
            return Err(CoreError::InvalidDuration(0.0));
        }
        self.looped_for(self.duration() * n as f64)
    }

    fn looped_for(&self, duration: f64) -> Result<SharedClip> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CoreError::InvalidDuration(duration));
        }
        let period = self.duration();
        Ok(Arc::new(Looped {
            inner: Arc::clone(self),
            duration,
            audio: self.audio().map(|a| loop_over(&a, period, duration)),
        }))
    }

    fn freeze(&self, t: f64, duration: f64) -> Result<SharedClip> {
        if !t.is_finite() || t < 0.0 || t >= self.duration() {
            return Err(CoreError::OutOfRangeTimestamp {
                t,
                duration: self.duration(),
            });
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CoreError::InvalidDuration(duration));
        }
        Ok(Arc::new(Splice {
            inner: Arc::clone(self),
            at: t,
            gap: duration,
            skip: 0.0,
            audio: self.audio().map(|a| insert_silence(&a, t, duration)),
        }))
    }

    fn cutout(&self, start: f64, end: f64) -> Result<SharedClip> {
        let (start, end) = resolve_range(self.duration(), start, Some(end))?;
        if end - start >= self.duration() {
            return Err(CoreError::InvalidTimeRange { start, end });
        }
        let audio = match self.audio() {
            Some(audio) if start < audio.duration() => {
                Some(audio.cutout(start, end.min(audio.duration()))?)
            }
            other => other,
        };
        Ok(Arc::new(Splice {
            inner: Arc::clone(self),
            at: start,
            gap: 0.0,
            skip: end - start,
            audio,
        }))
    }

    fn fade_in(&self, duration: f64) -> Result<SharedClip> {
        self.fade_in_from(duration, BLACK)
    }

    fn fade_out(&self, duration: f64) -> Result<SharedClip> {
        self.fade_out_to(duration, BLACK)
    }

    fn fade_in_from(&self, duration: f64, color: Rgb) -> Result<SharedClip> {
        fade(self, duration, color, Edge::Start)
    }

    fn fade_out_to(&self, duration: f64, color: Rgb) -> Result<SharedClip> {
        fade(self, duration, color, Edge::End)
    }

    fn with_audio(&self, audio: SharedAudio) -> SharedClip {
        Arc::new(WithAudio {
            inner: Arc::clone(self),
            audio,
        })
    }
}

fn fade(clip: &SharedClip, duration: f64, color: Rgb, edge: Edge) -> Result<SharedClip> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(CoreError::InvalidDuration(duration));
    }
    Ok(Arc::new(Fade {
        inner: Arc::clone(clip),
        fade: duration,
        color,
        edge,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioArrayClip;
    use crate::clip::{ColorClip, FnClip};

    fn clock_clip(duration: f64) -> SharedClip {
        Arc::new(
            FnClip::new(
                |t| Frame::solid(2, 2, [(t * 10.0).round() as u8, 0, 0]),
                2,
                2,
                duration,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(10.0, 2.0, None).unwrap(), (2.0, 10.0));
        assert_eq!(resolve_range(10.0, 0.0, Some(-2.0)).unwrap(), (0.0, 8.0));
        assert!(resolve_range(10.0, 11.0, None).is_err());
        assert!(resolve_range(10.0, 5.0, Some(5.0)).is_err());
        assert!(resolve_range(10.0, 0.0, Some(12.0)).is_err());
        assert!(resolve_range(10.0, -1.0, None).is_err());
    }

    #[test]
    fn test_subclip_shifts_time() {
        let clip = clock_clip(10.0);
        let sub = clip.subclip(3.0, Some(5.0)).unwrap();
        assert_eq!(sub.duration(), 2.0);
        let frame = sub.make_frame(1.0).unwrap();
        assert_eq!(frame.pixel(0, 0), Some([40, 0, 0]));
        assert_eq!(frame.t, 1.0);
        // Original untouched.
        assert_eq!(clip.duration(), 10.0);
    }

    #[test]
    fn test_subclip_cuts_audio() {
        let audio: SharedAudio = Arc::new(AudioArrayClip::new(vec![0.5; 100], 10, 1).unwrap());
        let clip = clock_clip(10.0).with_audio(audio);
        let sub = clip.subclip(2.0, Some(-3.0)).unwrap();
        assert_eq!(sub.duration(), 5.0);
        let sub_audio = sub.audio().expect("audio should follow the subclip");
        assert_eq!(sub_audio.frame_count(), 50);
    }

    #[test]
    fn test_looped_wraps_time() {
        let clip = clock_clip(2.0);
        let looped = clip.looped(3).unwrap();
        assert_eq!(looped.duration(), 6.0);
        assert_eq!(looped.make_frame(4.5).unwrap().pixel(0, 0), Some([5, 0, 0]));
        assert!(clip.looped(0).is_err());
    }

    #[test]
    fn test_fade_in_and_out() {
        let clip: SharedClip = Arc::new(ColorClip::new(2, 2, [200, 200, 200], 4.0).unwrap());
        let faded = clip.fade_in(1.0).unwrap().fade_out(1.0).unwrap();
        assert_eq!(faded.make_frame(0.0).unwrap().pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(faded.make_frame(0.5).unwrap().pixel(0, 0), Some([100, 100, 100]));
        assert_eq!(faded.make_frame(2.0).unwrap().pixel(0, 0), Some([200, 200, 200]));
        assert_eq!(faded.make_frame(3.5).unwrap().pixel(0, 0), Some([100, 100, 100]));
    }

    #[test]
    fn test_fade_to_custom_color() {
        let clip: SharedClip = Arc::new(ColorClip::new(1, 1, [0, 0, 0], 2.0).unwrap());
        let faded = clip.fade_out_to(2.0, [255, 255, 255]).unwrap();
        assert_eq!(faded.make_frame(1.0).unwrap().pixel(0, 0), Some([128, 128, 128]));
    }
}
