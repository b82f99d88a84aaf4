use std::sync::Arc;

use crate::error::{CoreError, Result};

/// A sound source addressed by sample frame index.
///
/// A sample frame holds one interleaved value per channel. Indices at or past
/// [`AudioClip::frame_count`] render as silence.
pub trait AudioClip: Send + Sync {
    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    fn frame_count(&self) -> usize;

    /// Interleaved samples for frames `start..start + count`.
    fn samples(&self, start: usize, count: usize) -> Vec<f32>;

    fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate() as f64
    }
}

pub type SharedAudio = Arc<dyn AudioClip>;

/// Render the whole clip into one interleaved buffer.
pub fn to_sound_array(clip: &dyn AudioClip) -> Vec<f32> {
    clip.samples(0, clip.frame_count())
}

/// Iterate over the clip in chunks of at most `chunk_frames` sample frames.
pub fn chunks(clip: &dyn AudioClip, chunk_frames: usize) -> AudioChunks<'_> {
    AudioChunks {
        clip,
        next: 0,
        chunk_frames: chunk_frames.max(1),
    }
}

pub struct AudioChunks<'a> {
    clip: &'a dyn AudioClip,
    next: usize,
    chunk_frames: usize,
}

impl Iterator for AudioChunks<'_> {
    type Item = Vec<f32>;

    fn next(&mut self) -> Option<Vec<f32>> {
        let total = self.clip.frame_count();
        if self.next >= total {
            return None;
        }
        let count = self.chunk_frames.min(total - self.next);
        let chunk = self.clip.samples(self.next, count);
        self.next += count;
        Some(chunk)
    }
}

/// Audio held in memory as interleaved samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArrayClip {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioArrayClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self> {
        if channels == 0 || samples.len() % channels as usize != 0 {
            return Err(CoreError::InvalidAudioBuffer {
                len: samples.len(),
                channels,
            });
        }
        if sample_rate == 0 {
            return Err(CoreError::InvalidFps(0.0));
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }
}

impl AudioClip for AudioArrayClip {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    fn samples(&self, start: usize, count: usize) -> Vec<f32> {
        let ch = self.channels as usize;
        let mut out = vec![0.0; count * ch];
        let available = self.frame_count().saturating_sub(start).min(count);
        if available > 0 {
            out[..available * ch]
                .copy_from_slice(&self.samples[start * ch..(start + available) * ch]);
        }
        out
    }
}

/// Audio generated from a function of time, copied to every channel.
pub struct FnAudioClip<F> {
    f: F,
    duration: f64,
    sample_rate: u32,
    channels: u16,
}

impl<F> FnAudioClip<F>
where
    F: Fn(f64) -> f32 + Send + Sync,
{
    pub fn new(f: F, duration: f64, sample_rate: u32, channels: u16) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CoreError::InvalidDuration(duration));
        }
        if sample_rate == 0 || channels == 0 {
            return Err(CoreError::InvalidAudioBuffer {
                len: 0,
                channels,
            });
        }
        Ok(Self {
            f,
            duration,
            sample_rate,
            channels,
        })
    }
}

impl<F> AudioClip for FnAudioClip<F>
where
    F: Fn(f64) -> f32 + Send + Sync,
{
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn frame_count(&self) -> usize {
        (self.duration * self.sample_rate as f64).round() as usize
    }

    fn samples(&self, start: usize, count: usize) -> Vec<f32> {
        let total = self.frame_count();
        let mut out = Vec::with_capacity(count * self.channels as usize);
        for i in start..start + count {
            let value = if i < total {
                (self.f)(i as f64 / self.sample_rate as f64)
            } else {
                0.0
            };
            out.extend(std::iter::repeat_n(value, self.channels as usize));
        }
        out
    }
}

struct AudioSubclip {
    inner: SharedAudio,
    offset: usize,
    frames: usize,
}

impl AudioClip for AudioSubclip {
    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn frame_count(&self) -> usize {
        self.frames
    }

    fn samples(&self, start: usize, count: usize) -> Vec<f32> {
        let ch = self.channels() as usize;
        let available = self.frames.saturating_sub(start).min(count);
        let mut out = self.inner.samples(self.offset + start, available);
        out.resize(count * ch, 0.0);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeDirection {
    In,
    Out,
}

struct AudioFade {
    inner: SharedAudio,
    fade_frames: usize,
    direction: FadeDirection,
}

impl AudioFade {
    fn gain(&self, index: usize) -> f32 {
        if self.fade_frames == 0 {
            return 1.0;
        }
        let distance = match self.direction {
            FadeDirection::In => index,
            FadeDirection::Out => self.inner.frame_count().saturating_sub(index),
        };
        (distance as f32 / self.fade_frames as f32).min(1.0)
    }
}

impl AudioClip for AudioFade {
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
        let ch = self.channels() as usize;
        let mut out = self.inner.samples(start, count);
        for (i, frame) in out.chunks_mut(ch).enumerate() {
            let gain = self.gain(start + i);
            frame.iter_mut().for_each(|s| *s *= gain);
        }
        out
    }
}

/// Repeats the first `period` frames of `inner` until `total` frames have
/// played. Period frames past the end of `inner` are silent.
struct AudioLoop {
    inner: SharedAudio,
    period: usize,
    total: usize,
}

impl AudioClip for AudioLoop {
    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn frame_count(&self) -> usize {
        self.total
    }

    fn samples(&self, start: usize, count: usize) -> Vec<f32> {
        let ch = self.channels() as usize;
        let mut out = Vec::with_capacity(count * ch);
        let mut pos = start;
        let end = start + count;
        while pos < end {
            if pos >= self.total || self.period == 0 {
                out.resize(count * ch, 0.0);
                break;
            }
            let within = pos % self.period;
            let take = (self.period - within).min(end - pos).min(self.total - pos);
            out.extend(self.inner.samples(within, take));
            pos += take;
        }
        out
    }
}

/// Loop `audio` on a period of `period_secs` for `duration_secs` in total.
pub(crate) fn loop_over(audio: &SharedAudio, period_secs: f64, duration_secs: f64) -> SharedAudio {
    let rate = audio.sample_rate() as f64;
    Arc::new(AudioLoop {
        inner: Arc::clone(audio),
        period: (period_secs * rate).round() as usize,
        total: (duration_secs * rate).round() as usize,
    })
}

/// `inner` with `gap` silent frames inserted at `at`, then `skip` source
/// frames dropped after the gap.
struct AudioSplice {
    inner: SharedAudio,
    at: usize,
    gap: usize,
    skip: usize,
    frames: usize,
}

impl AudioSplice {
    fn new(inner: &SharedAudio, at: usize, gap: usize, skip: usize) -> Self {
        let len = inner.frame_count();
        let at = at.min(len);
        let skip = skip.min(len - at);
        Self {
            inner: Arc::clone(inner),
            at,
            gap,
            skip,
            frames: len + gap - skip,
        }
    }
}

impl AudioClip for AudioSplice {
    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn frame_count(&self) -> usize {
        self.frames
    }

    fn samples(&self, start: usize, count: usize) -> Vec<f32> {
        let ch = self.channels() as usize;
        let resume = self.at + self.gap;
        let mut out = Vec::with_capacity(count * ch);
        let mut pos = start;
        let end = start + count;
        while pos < end {
            let (take, source) = if pos >= self.frames {
                (end - pos, None)
            } else if pos < self.at {
                (self.at.min(end) - pos, Some(pos))
            } else if pos < resume {
                (resume.min(end) - pos, None)
            } else {
                (self.frames.min(end) - pos, Some(pos - self.gap + self.skip))
            };
            match source {
                Some(src) => out.extend(self.inner.samples(src, take)),
                None => out.resize(out.len() + take * ch, 0.0),
            }
            pos += take;
        }
        out
    }
}

/// Insert `gap_secs` of silence into `audio` at `at_secs`.
pub(crate) fn insert_silence(audio: &SharedAudio, at_secs: f64, gap_secs: f64) -> SharedAudio {
    let rate = audio.sample_rate() as f64;
    Arc::new(AudioSplice::new(
        audio,
        (at_secs * rate).round() as usize,
        (gap_secs * rate).round() as usize,
        0,
    ))
}

/// Outplace transformations of audio clips.
pub trait AudioClipExt {
    /// Audio between `start` and `end` seconds. A negative `end` counts back
    /// from the end of the clip; `None` runs to the end.
    fn subclip(&self, start: f64, end: Option<f64>) -> Result<SharedAudio>;

    /// Ramp the volume up from silence over the first `duration` seconds.
    fn fade_in(&self, duration: f64) -> Result<SharedAudio>;

    /// Ramp the volume down to silence over the last `duration` seconds.
    fn fade_out(&self, duration: f64) -> Result<SharedAudio>;

    /// Play the clip `n` times back to back.
    fn looped(&self, n: usize) -> SharedAudio;

    /// Repeat the clip until it lasts `duration` seconds. The last repeat
    /// is cut short.
    fn looped_for(&self, duration: f64) -> Result<SharedAudio>;

    /// Remove the audio between `start` and `end` seconds.
    fn cutout(&self, start: f64, end: f64) -> Result<SharedAudio>;
}

impl AudioClipExt for SharedAudio {
    fn subclip(&self, start: f64, end: Option<f64>) -> Result<SharedAudio> {
        let (start, end) = crate::fx::resolve_range(self.duration(), start, end)?;
        let rate = self.sample_rate() as f64;
        let offset = (start * rate).round() as usize;
        let frames = ((end * rate).round() as usize)
            .min(self.frame_count())
            .saturating_sub(offset);
        Ok(Arc::new(AudioSubclip {
            inner: Arc::clone(self),
            offset,
            frames,
        }))
    }

    fn fade_in(&self, duration: f64) -> Result<SharedAudio> {
        self.fade(duration, FadeDirection::In)
    }

    fn fade_out(&self, duration: f64) -> Result<SharedAudio> {
        self.fade(duration, FadeDirection::Out)
    }

    fn looped(&self, n: usize) -> SharedAudio {
        let period = self.frame_count();
        Arc::new(AudioLoop {
            inner: Arc::clone(self),
            period,
            total: period * n,
        })
    }

    fn looped_for(&self, duration: f64) -> Result<SharedAudio> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CoreError::InvalidDuration(duration));
        }
        Ok(loop_over(self, self.duration(), duration))
    }

    fn cutout(&self, start: f64, end: f64) -> Result<SharedAudio> {
        let (start, end) = crate::fx::resolve_range(self.duration(), start, Some(end))?;
        let rate = self.sample_rate() as f64;
        let at = (start * rate).round() as usize;
        let skip = ((end * rate).round() as usize).saturating_sub(at);
        Ok(Arc::new(AudioSplice::new(self, at, 0, skip)))
    }
}

trait Fade {
    fn fade(&self, duration: f64, direction: FadeDirection) -> Result<SharedAudio>;
}

impl Fade for SharedAudio {
    fn fade(&self, duration: f64, direction: FadeDirection) -> Result<SharedAudio> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(CoreError::InvalidDuration(duration));
        }
        Ok(Arc::new(AudioFade {
            inner: Arc::clone(self),
            fade_frames: (duration * self.sample_rate() as f64).round() as usize,
            direction,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, channels: u16) -> SharedAudio {
        let samples = (0..frames)
            .flat_map(|i| std::iter::repeat_n(i as f32, channels as usize))
            .collect();
        Arc::new(AudioArrayClip::new(samples, 10, channels).unwrap())
    }

    #[test]
    fn test_array_clip_rejects_ragged_buffer() {
        assert!(AudioArrayClip::new(vec![0.0; 3], 44100, 2).is_err());
        assert!(AudioArrayClip::new(vec![0.0; 4], 44100, 0).is_err());
    }

    #[test]
    fn test_array_clip_pads_with_silence() {
        let clip = ramp(4, 2);
        assert_eq!(clip.duration(), 0.4);
        assert_eq!(clip.samples(3, 2), vec![3.0, 3.0, 0.0, 0.0]);
        assert_eq!(clip.samples(10, 1), vec![0.0, 0.0]);
    }

    #[test]
    fn test_chunks_cover_whole_clip() {
        let clip = ramp(25, 1);
        let chunks: Vec<Vec<f32>> = chunks(clip.as_ref(), 10).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 5);
        let joined: Vec<f32> = chunks.concat();
        assert_eq!(joined, to_sound_array(clip.as_ref()));
    }

    #[test]
    fn test_fn_clip_copies_value_to_channels() {
        let clip = FnAudioClip::new(|t| t as f32, 1.0, 4, 2).unwrap();
        assert_eq!(clip.frame_count(), 4);
        assert_eq!(clip.samples(1, 2), vec![0.25, 0.25, 0.5, 0.5]);
    }

    #[test]
    fn test_subclip_offsets_samples() {
        let clip = ramp(20, 1);
        let sub = clip.subclip(0.5, Some(1.0)).unwrap();
        assert_eq!(sub.frame_count(), 5);
        assert_eq!(to_sound_array(sub.as_ref()), vec![5.0, 6.0, 7.0, 8.0, 9.0]);

        let tail = clip.subclip(0.0, Some(-0.5)).unwrap();
        assert_eq!(tail.frame_count(), 15);
    }

    #[test]
    fn test_fade_in_starts_silent() {
        let clip: SharedAudio = Arc::new(AudioArrayClip::new(vec![1.0; 10], 10, 1).unwrap());
        let faded = clip.fade_in(0.5).unwrap();
        let samples = to_sound_array(faded.as_ref());
        assert_eq!(samples[0], 0.0);
        assert!((samples[2] - 0.4).abs() < 1e-6);
        assert_eq!(samples[5], 1.0);
        assert_eq!(samples[9], 1.0);
    }

    #[test]
    fn test_fade_out_ends_quiet() {
        let clip: SharedAudio = Arc::new(AudioArrayClip::new(vec![1.0; 10], 10, 1).unwrap());
        let faded = clip.fade_out(0.5).unwrap();
        let samples = to_sound_array(faded.as_ref());
        assert_eq!(samples[0], 1.0);
        assert!((samples[9] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_looped_repeats_content() {
        let clip = ramp(3, 1);
        let looped = clip.looped(2);
        assert_eq!(looped.frame_count(), 6);
        assert_eq!(
            to_sound_array(looped.as_ref()),
            vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]
        );
        assert_eq!(looped.samples(5, 3), vec![2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_looped_for_cuts_last_repeat() {
        let clip = ramp(4, 1);
        let looped = clip.looped_for(1.0).unwrap();
        assert_eq!(looped.frame_count(), 10);
        assert_eq!(
            to_sound_array(looped.as_ref()),
            vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0]
        );
        assert!(clip.looped_for(0.0).is_err());
    }

    #[test]
    fn test_loop_over_longer_period_pads_silence() {
        let clip = ramp(3, 1);
        let looped = loop_over(&clip, 0.5, 1.0);
        assert_eq!(
            to_sound_array(looped.as_ref()),
            vec![0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_cutout_removes_middle() {
        let clip = ramp(10, 2);
        let cut = clip.cutout(0.2, 0.5).unwrap();
        assert_eq!(cut.frame_count(), 7);
        let mono: Vec<f32> = to_sound_array(cut.as_ref()).into_iter().step_by(2).collect();
        assert_eq!(mono, vec![0.0, 1.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert!(clip.cutout(0.5, 0.2).is_err());
    }

    #[test]
    fn test_insert_silence_shifts_tail() {
        let clip = ramp(4, 1);
        let spliced = insert_silence(&clip, 0.2, 0.3);
        assert_eq!(spliced.frame_count(), 7);
        assert_eq!(
            to_sound_array(spliced.as_ref()),
            vec![0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 3.0]
        );
        assert_eq!(spliced.samples(6, 2), vec![3.0, 0.0]);
    }
}
