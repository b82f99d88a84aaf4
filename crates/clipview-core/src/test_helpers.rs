use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{CoreError, Result};
use crate::frame::Frame;
use crate::surface::{Clock, DisplaySurface, SurfaceEvent};

/// A clock that only moves when told to. Sleeping advances it instantly.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.0.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// In-memory surface that records what it was shown and replays scripted input.
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    /// Timestamps of presented frames, in order.
    pub presented: Vec<f64>,
    /// Last frame presented.
    pub last_frame: Option<Frame>,
    pub polls: usize,
    pub closed: bool,
    close_calls: usize,
    script: VecDeque<(usize, SurfaceEvent)>,
    render_cost: Option<(ManualClock, Duration)>,
    fail_on_present: Option<usize>,
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` at the first poll after `presents` frames were shown.
    pub fn event_after(mut self, presents: usize, event: SurfaceEvent) -> Self {
        self.script.push_back((presents, event));
        self
    }

    /// Advance `clock` by `cost` on every present, simulating slow rendering.
    pub fn render_cost(mut self, clock: &ManualClock, cost: Duration) -> Self {
        self.render_cost = Some((clock.clone(), cost));
        self
    }

    /// Fail the present call with the given zero-based index.
    pub fn fail_on_present(mut self, index: usize) -> Self {
        self.fail_on_present = Some(index);
        self
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }
}

impl DisplaySurface for ScriptedSurface {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_on_present == Some(self.presented.len()) {
            return Err(CoreError::RenderFailure("scripted present failure".into()));
        }
        if let Some((clock, cost)) = &self.render_cost {
            clock.advance(*cost);
        }
        self.presented.push(frame.t);
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        self.polls += 1;
        let mut due = Vec::new();
        while let Some((after, _)) = self.script.front() {
            if *after > self.presented.len() {
                break;
            }
            if let Some((_, event)) = self.script.pop_front() {
                due.push(event);
            }
        }
        due
    }

    fn close(&mut self) {
        self.closed = true;
        self.close_calls += 1;
    }
}
