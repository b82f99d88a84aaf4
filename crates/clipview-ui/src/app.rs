use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clipview_core::audio::SharedAudio;
use clipview_core::clip::SharedClip;
use clipview_core::frame::Frame;
use clipview_core::options::PreviewOptions;
use clipview_core::sampler::sample;
use clipview_core::session::{PixelClick, PlaybackReport, PreviewSession, Tick};
use iced::widget::{center, container, image, mouse_area, text};
use iced::{Element, Event, Length, Point, Subscription, Task, event, keyboard, window};

use crate::audio_player::AudioPlayer;
use crate::message::Message;

/// How a windowed preview ended: its report, or the render error that
/// stopped it.
pub type PlaybackResult = std::result::Result<PlaybackReport, String>;

/// Where the playback result is left when the window closes.
pub type ReportSlot = Arc<Mutex<Option<PlaybackResult>>>;

/// Called with every pixel clicked during an interactive preview, as it
/// happens.
pub type ClickHandler = Arc<dyn Fn(&PixelClick) + Send + Sync>;

/// Fastest the tick subscription fires.
const MAX_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Clip audio streamed into the output device ahead of the playhead.
struct AudioFeed {
    player: AudioPlayer,
    clip: SharedAudio,
    /// Next sample frame to queue.
    queued: usize,
    lead: Duration,
}

impl AudioFeed {
    fn start(clip: SharedAudio, lead: Duration) -> Option<Self> {
        let Some(player) = AudioPlayer::new() else {
            log::warn!("no audio output device, previewing without sound");
            return None;
        };
        Some(Self {
            player,
            clip,
            queued: 0,
            lead,
        })
    }

    /// Queue audio up to `elapsed` plus the lead time.
    fn fill(&mut self, elapsed: Duration) {
        let rate = self.clip.sample_rate();
        let window = queue_window(
            elapsed + self.lead,
            rate,
            self.queued,
            self.clip.frame_count(),
        );
        if let Some(window) = window {
            let samples = self.clip.samples(window.start, window.len());
            self.player.queue_audio(samples, rate, self.clip.channels());
            self.queued = window.end;
        }
    }

    fn stop(&self) {
        self.player.stop();
    }
}

/// Sample frames still to be queued so that audio reaches `horizon`, given
/// `queued` frames already sent. Never past the end of the clip.
pub fn queue_window(
    horizon: Duration,
    sample_rate: u32,
    queued: usize,
    frame_count: usize,
) -> Option<Range<usize>> {
    let target = ((horizon.as_secs_f64() * sample_rate as f64) as usize).min(frame_count);
    (target > queued).then_some(queued..target)
}

struct Playback {
    clip: SharedClip,
    session: PreviewSession,
    audio: Option<SharedAudio>,
    audio_lead: Duration,
    feed: Option<AudioFeed>,
}

enum Content {
    Still,
    Playback(Box<Playback>),
}

/// Window state for `show` and `preview`.
pub struct PreviewApp {
    content: Content,
    size: (u32, u32),
    shown: Option<Frame>,
    handle: Option<image::Handle>,
    cursor: Option<Point>,
    report: ReportSlot,
    on_click: Option<ClickHandler>,
    pub started: Option<Instant>,
    pub error: Option<String>,
}

impl PreviewApp {
    /// A window holding one frame until cancelled.
    pub fn still(frame: Frame) -> Self {
        let mut app = Self::empty(Content::Still, frame.size(), ReportSlot::default());
        app.display(frame);
        app
    }

    /// A window playing `clip` paced by `session`.
    pub fn playback(
        clip: SharedClip,
        session: PreviewSession,
        options: &PreviewOptions,
        report: ReportSlot,
    ) -> Self {
        let audio = clip.audio().filter(|_| options.with_audio);
        let size = clip.size();
        let playback = Playback {
            clip,
            session,
            audio,
            audio_lead: Duration::from_secs_f64(options.audio_buffer_secs.max(0.0)),
            feed: None,
        };
        Self::empty(Content::Playback(Box::new(playback)), size, report)
    }

    /// Forward each recorded click to `handler` while playback runs.
    pub fn with_click_handler(mut self, handler: ClickHandler) -> Self {
        self.on_click = Some(handler);
        self
    }

    fn empty(content: Content, size: (u32, u32), report: ReportSlot) -> Self {
        Self {
            content,
            size,
            shown: None,
            handle: None,
            cursor: None,
            report,
            on_click: None,
            started: None,
            error: None,
        }
    }

    pub fn session(&self) -> Option<&PreviewSession> {
        match &self.content {
            Content::Playback(playback) => Some(&playback.session),
            Content::Still => None,
        }
    }

    /// The frame currently on screen.
    pub fn shown(&self) -> Option<&Frame> {
        self.shown.as_ref()
    }

    pub fn last_click(&self) -> Option<&PixelClick> {
        self.session().and_then(PreviewSession::last_click)
    }

    fn display(&mut self, frame: Frame) {
        self.handle = Some(image::Handle::from_rgba(
            frame.width,
            frame.height,
            frame.to_rgba(),
        ));
        self.shown = Some(frame);
    }

    fn publish(&self) {
        if let (Some(session), Ok(mut slot)) = (self.session(), self.report.lock()) {
            *slot = Some(match &self.error {
                Some(error) => Err(error.clone()),
                None => Ok(session.report()),
            });
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(now) => self.tick(now),
            Message::Cancel => {
                if let Content::Playback(playback) = &mut self.content {
                    playback.session.cancel();
                    if let Some(feed) = &playback.feed {
                        feed.stop();
                    }
                }
                self.publish();
                iced::exit()
            }
            Message::CursorMoved(point) => {
                self.cursor = Some(point);
                Task::none()
            }
            Message::Pressed => {
                let (Some(point), Some(frame)) = (self.cursor, self.shown.as_ref()) else {
                    return Task::none();
                };
                if point.x < 0.0 || point.y < 0.0 {
                    return Task::none();
                }
                let Content::Playback(playback) = &mut self.content else {
                    return Task::none();
                };
                let (x, y) = (point.x.floor() as u32, point.y.floor() as u32);
                if let Some(click) = playback.session.record_click(x, y, frame) {
                    if let Some(handler) = &self.on_click {
                        handler(&click);
                    }
                    self.publish();
                }
                Task::none()
            }
        }
    }

    fn tick(&mut self, now: Instant) -> Task<Message> {
        let Content::Playback(playback) = &mut self.content else {
            return Task::none();
        };
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);

        if playback.feed.is_none() && playback.session.is_running() {
            if let Some(audio) = playback.audio.take() {
                playback.feed = AudioFeed::start(audio, playback.audio_lead);
            }
        }
        if let Some(feed) = &mut playback.feed {
            feed.fill(elapsed);
        }

        match playback.session.tick(elapsed) {
            Tick::Render { t, .. } => match sample(playback.clip.as_ref(), t) {
                Ok(frame) => {
                    self.display(frame);
                    self.publish();
                    Task::none()
                }
                // Left on screen until the window is closed.
                Err(e) => {
                    log::error!("failed to render frame at {t:.3}s: {e}");
                    playback.session.cancel();
                    if let Some(feed) = &playback.feed {
                        feed.stop();
                    }
                    self.error = Some(e.to_string());
                    self.publish();
                    Task::none()
                }
            },
            Tick::Wait(_) => Task::none(),
            Tick::Finished => {
                self.publish();
                iced::exit()
            }
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let input = event::listen_with(|event, _status, _window| match event {
            Event::Keyboard(keyboard::Event::KeyPressed {
                key: keyboard::Key::Named(keyboard::key::Named::Escape),
                ..
            }) => Some(Message::Cancel),
            Event::Window(window::Event::CloseRequested) => Some(Message::Cancel),
            _ => None,
        });

        match &self.content {
            Content::Playback(playback) if playback.session.is_running() => {
                let interval =
                    Duration::from_secs_f64(0.5 / playback.session.fps()).min(MAX_TICK_INTERVAL);
                Subscription::batch([input, iced::time::every(interval).map(Message::Tick)])
            }
            _ => input,
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        if let Some(error) = &self.error {
            return center(text(format!("Render failure: {error}"))).into();
        }
        let Some(handle) = &self.handle else {
            return center(text("Waiting for first frame")).into();
        };

        let (w, h) = self.size;
        let frame = image(handle.clone())
            .width(Length::Fixed(w as f32))
            .height(Length::Fixed(h as f32));
        let area = mouse_area(frame)
            .on_press(Message::Pressed)
            .on_move(Message::CursorMoved);
        container(area).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_first_fill_queues_the_lead() {
        assert_eq!(queue_window(ms(500), RATE, 0, 10_000), Some(0..500));
    }

    #[test]
    fn test_steady_state_queues_only_new_frames() {
        assert_eq!(queue_window(ms(520), RATE, 500, 10_000), Some(500..520));
        assert_eq!(queue_window(ms(500), RATE, 500, 10_000), None);
        assert_eq!(queue_window(ms(480), RATE, 500, 10_000), None);
    }

    #[test]
    fn test_window_stops_at_clip_end() {
        assert_eq!(queue_window(ms(2_500), RATE, 1_800, 2_000), Some(1_800..2_000));
        assert_eq!(queue_window(ms(3_000), RATE, 2_000, 2_000), None);
    }

    #[test]
    fn test_audio_shorter_than_video() {
        // 0.3s of audio under a longer picture: one window, then nothing.
        assert_eq!(queue_window(ms(1_000), RATE, 0, 300), Some(0..300));
        for elapsed in [1_100, 5_000, 60_000] {
            assert_eq!(queue_window(ms(elapsed), RATE, 300, 300), None);
        }
    }
}
