use crate::clip::VideoClip;
use crate::error::{CoreError, Result};
use crate::frame::Frame;
use crate::time::{frame_count, frame_time, validate_fps};

/// Check that `t` lies in `[0, duration)`.
pub fn check_timestamp(t: f64, duration: f64) -> Result<()> {
    if t.is_finite() && t >= 0.0 && t < duration {
        Ok(())
    } else {
        Err(CoreError::OutOfRangeTimestamp { t, duration })
    }
}

/// Extract the frame of `clip` at `t` seconds.
pub fn sample(clip: &dyn VideoClip, t: f64) -> Result<Frame> {
    check_timestamp(t, clip.duration())?;
    let frame = clip.make_frame(t)?;
    if frame.size() != clip.size() {
        return Err(CoreError::RenderFailure(format!(
            "clip declared {:?} but produced a {:?} frame at {t:.3}s",
            clip.size(),
            frame.size()
        )));
    }
    Ok(frame)
}

/// Iterate over the frames of `clip` at `fps`, starting at 0.
pub fn iter_frames(clip: &dyn VideoClip, fps: f64) -> Result<FrameIter<'_>> {
    let fps = validate_fps(fps)?;
    Ok(FrameIter {
        clip,
        fps,
        index: 0,
        count: frame_count(clip.duration(), fps),
    })
}

pub struct FrameIter<'a> {
    clip: &'a dyn VideoClip,
    fps: f64,
    index: u64,
    count: u64,
}

impl FrameIter<'_> {
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Iterator for FrameIter<'_> {
    type Item = Result<(f64, Frame)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let t = frame_time(self.index, self.fps);
        self.index += 1;
        Some(sample(self.clip, t).map(|frame| (t, frame)))
    }
}
