use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::clip::VideoClip;
use crate::error::Result;
use crate::frame::Frame;
use crate::options::PreviewOptions;
use crate::sampler::sample;
use crate::session::{PixelClick, PlaybackReport, PreviewSession, Tick};

/// How long a blocking still-frame display sleeps between event polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Input reported by a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Escape pressed or window closed.
    Cancel,
    /// Pointer click at a pixel of the presented frame.
    Click { x: u32, y: u32 },
}

/// Somewhere frames can be drawn.
pub trait DisplaySurface {
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Drain input received since the last poll.
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;

    /// Release the surface. Called exactly once when a display call returns.
    fn close(&mut self);
}

/// Source of elapsed time for the playback loop.
pub trait Clock {
    /// Time since the clock started.
    fn elapsed(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for WallClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Cooperative cancellation flag shared between a loop and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Closes the wrapped surface when dropped, on every exit path.
struct Closing<'a, S: DisplaySurface + ?Sized>(&'a mut S);

impl<S: DisplaySurface + ?Sized> Deref for Closing<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.0
    }
}

impl<S: DisplaySurface + ?Sized> DerefMut for Closing<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.0
    }
}

impl<S: DisplaySurface + ?Sized> Drop for Closing<'_, S> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Present `frame` and block until the surface reports a cancel or `cancel`
/// is triggered.
pub fn show_frame<S, C>(
    surface: &mut S,
    frame: &Frame,
    clock: &C,
    cancel: &CancelToken,
) -> Result<()>
where
    S: DisplaySurface + ?Sized,
    C: Clock + ?Sized,
{
    let mut surface = Closing(surface);
    surface.present(frame)?;
    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }
        if surface
            .poll_events()
            .iter()
            .any(|e| *e == SurfaceEvent::Cancel)
        {
            return Ok(());
        }
        clock.sleep(POLL_INTERVAL);
    }
}

/// Play `clip` on `surface` in best-effort real time.
///
/// Runs until the clip ends or a cancel arrives from the surface or `cancel`.
/// When rendering falls behind the clock, frames are skipped rather than
/// delayed. Clicks are reported through `on_click` in interactive mode.
pub fn play_loop<S, C>(
    surface: &mut S,
    clip: &dyn VideoClip,
    options: &PreviewOptions,
    cancel: &CancelToken,
    clock: &C,
    mut on_click: Option<&mut dyn FnMut(&PixelClick)>,
) -> Result<PlaybackReport>
where
    S: DisplaySurface + ?Sized,
    C: Clock + ?Sized,
{
    let mut surface = Closing(surface);
    let fps = options.effective_fps(clip)?;
    let mut session = PreviewSession::new(clip.duration(), fps, options.interactive)?;
    let mut shown: Option<Frame> = None;
    let started = clock.elapsed();

    log::debug!(
        "starting preview: {:.3}s at {fps} fps, interactive={}",
        clip.duration(),
        options.interactive
    );

    loop {
        if cancel.is_cancelled() {
            session.cancel();
        }
        for event in surface.poll_events() {
            match event {
                SurfaceEvent::Cancel => session.cancel(),
                SurfaceEvent::Click { x, y } => {
                    let Some(frame) = shown.as_ref() else {
                        continue;
                    };
                    if let Some(click) = session.record_click(x, y, frame) {
                        if let Some(callback) = on_click.as_mut() {
                            callback(&click);
                        }
                    }
                }
            }
        }

        match session.tick(clock.elapsed().saturating_sub(started)) {
            Tick::Render { t, .. } => {
                let frame = sample(clip, t)?;
                surface.present(&frame)?;
                shown = Some(frame);
            }
            Tick::Wait(duration) => clock.sleep(duration),
            Tick::Finished => break,
        }
    }

    let report = session.report();
    log::info!(
        "preview finished ({:?}): {} frames shown, {} skipped",
        report.outcome,
        report.frames_presented,
        report.frames_skipped
    );
    Ok(report)
}
