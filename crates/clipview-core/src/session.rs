use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::frame::{Frame, Rgb};
use crate::time::{TIME_EPSILON, format_timestamp, frame_time, validate_fps};

/// Shortest wait handed back by [`PreviewSession::tick`].
pub const MIN_WAIT: Duration = Duration::from_millis(1);

/// A pixel the user clicked during an interactive preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelClick {
    pub x: u32,
    pub y: u32,
    pub rgb: Rgb,
    /// Clip time of the frame that was on screen.
    pub t: f64,
}

/// What the playback loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Sample and present the frame at `t`.
    Render { index: u64, t: f64 },
    /// The current frame is still due; nothing to draw for `Duration`.
    Wait(Duration),
    /// Playback reached the end of the clip or was cancelled.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
}

/// Summary of a finished preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub outcome: PlaybackOutcome,
    pub frames_presented: u64,
    pub frames_skipped: u64,
    pub clicks: Vec<PixelClick>,
}

/// Transient state of one preview, paced by wall-clock time.
///
/// The caller feeds the time elapsed since playback started; the session maps
/// it to a frame index and never replays an index. Indices passed over while
/// rendering lagged count as skipped.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    duration: f64,
    fps: f64,
    interactive: bool,
    running: bool,
    cancelled: bool,
    current_t: f64,
    last_index: Option<u64>,
    frames_presented: u64,
    frames_skipped: u64,
    clicks: Vec<PixelClick>,
}

impl PreviewSession {
    pub fn new(duration: f64, fps: f64, interactive: bool) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CoreError::InvalidDuration(duration));
        }
        Ok(Self {
            duration,
            fps: validate_fps(fps)?,
            interactive,
            running: true,
            cancelled: false,
            current_t: 0.0,
            last_index: None,
            frames_presented: 0,
            frames_skipped: 0,
            clicks: Vec::new(),
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Timestamp of the frame currently on screen.
    pub fn current_t(&self) -> f64 {
        self.current_t
    }

    pub fn last_click(&self) -> Option<&PixelClick> {
        self.clicks.last()
    }

    pub fn clicks(&self) -> &[PixelClick] {
        &self.clicks
    }

    /// Advance to the frame due at `elapsed` since playback started.
    pub fn tick(&mut self, elapsed: Duration) -> Tick {
        if !self.running {
            return Tick::Finished;
        }

        let index = (elapsed.as_secs_f64() * self.fps + TIME_EPSILON).floor() as u64;
        let skipped = match self.last_index {
            Some(last) if index <= last => {
                let next_t = frame_time(last.saturating_add(1), self.fps);
                let next_due = Duration::from_secs_f64(next_t);
                return Tick::Wait(next_due.saturating_sub(elapsed).max(MIN_WAIT));
            }
            Some(last) => index - last - 1,
            None => index,
        };

        let t = frame_time(index, self.fps);
        if t >= self.duration {
            self.running = false;
            return Tick::Finished;
        }

        if skipped > 0 {
            log::warn!("preview fell behind, skipping {skipped} frame(s) before t={t:.3}s");
        }
        self.frames_skipped += skipped;
        self.frames_presented += 1;
        self.last_index = Some(index);
        self.current_t = t;
        Tick::Render { index, t }
    }

    /// Stop playback at the next tick.
    pub fn cancel(&mut self) {
        if self.running {
            log::info!("preview cancelled at {}", format_timestamp(self.current_t));
        }
        self.running = false;
        self.cancelled = true;
    }

    /// Record a click at `(x, y)` on `frame`. Ignored unless the session is
    /// interactive and the coordinate falls inside the frame.
    pub fn record_click(&mut self, x: u32, y: u32, frame: &Frame) -> Option<PixelClick> {
        if !self.interactive {
            return None;
        }
        let rgb = frame.pixel(x, y)?;
        let click = PixelClick {
            x,
            y,
            rgb,
            t: frame.t,
        };
        log::info!(
            "pixel ({x}, {y}) at {}: rgb({}, {}, {})",
            format_timestamp(click.t),
            rgb[0],
            rgb[1],
            rgb[2]
        );
        self.clicks.push(click);
        Some(click)
    }

    pub fn report(&self) -> PlaybackReport {
        PlaybackReport {
            outcome: if self.cancelled {
                PlaybackOutcome::Cancelled
            } else {
                PlaybackOutcome::Completed
            },
            frames_presented: self.frames_presented,
            frames_skipped: self.frames_skipped,
            clicks: self.clicks.clone(),
        }
    }
}
