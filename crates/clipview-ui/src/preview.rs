use std::sync::Arc;

use clipview_core::audio::{SharedAudio, chunks};
use clipview_core::clip::SharedClip;
use clipview_core::frame::Frame;
use clipview_core::options::PreviewOptions;
use clipview_core::sampler::sample;
use clipview_core::session::{PlaybackOutcome, PlaybackReport, PreviewSession};

use crate::app::{ClickHandler, PreviewApp, ReportSlot};
use crate::audio_player::AudioPlayer;
use crate::backend;
use crate::error::{PreviewError, Result};

const TITLE: &str = "clipview";

/// Show the frame of `clip` at `t` until the window is closed or Escape is
/// pressed.
pub fn show(clip: &SharedClip, t: f64) -> Result<()> {
    let frame = sample(clip.as_ref(), t)?;
    show_frame(frame)
}

pub fn show_frame(frame: Frame) -> Result<()> {
    backend::detect()?;
    let (w, h) = frame.size();
    log::debug!("showing {w}x{h} frame at {:.3}s", frame.t);

    iced::application(
        move || PreviewApp::still(frame.clone()),
        PreviewApp::update,
        PreviewApp::view,
    )
    .title(TITLE)
    .subscription(PreviewApp::subscription)
    .window_size((w as f32, h as f32))
    .exit_on_close_request(false)
    .run()?;
    Ok(())
}

/// Play `clip` in a window in best-effort real time.
///
/// Returns when the clip ends or the user cancels. In interactive mode each
/// click is passed to `on_click` as it happens and the report lists them all.
/// A frame that fails to render stops playback; the error stays on screen
/// until the window is closed and is then returned.
pub fn preview(
    clip: SharedClip,
    options: &PreviewOptions,
    on_click: Option<ClickHandler>,
) -> Result<PlaybackReport> {
    let fps = options.effective_fps(clip.as_ref())?;
    let session = PreviewSession::new(clip.duration(), fps, options.interactive)?;
    backend::detect()?;

    let (w, h) = clip.size();
    let slot = ReportSlot::default();
    let boot = {
        let slot = slot.clone();
        let options = options.clone();
        move || {
            let app = PreviewApp::playback(clip.clone(), session.clone(), &options, slot.clone());
            match &on_click {
                Some(handler) => app.with_click_handler(Arc::clone(handler)),
                None => app,
            }
        }
    };

    log::debug!("previewing {w}x{h} clip at {fps} fps");
    iced::application(boot, PreviewApp::update, PreviewApp::view)
        .title(TITLE)
        .subscription(PreviewApp::subscription)
        .window_size((w as f32, h as f32))
        .exit_on_close_request(false)
        .run()?;

    let result = slot
        .lock()
        .map_err(|_| PreviewError::RenderFailure("playback state poisoned".into()))?
        .take();
    match result {
        Some(Ok(report)) => Ok(report),
        Some(Err(message)) => Err(PreviewError::RenderFailure(message)),
        // Closed before the first tick.
        None => Ok(PlaybackReport {
            outcome: PlaybackOutcome::Cancelled,
            frames_presented: 0,
            frames_skipped: 0,
            clicks: Vec::new(),
        }),
    }
}

/// Play an audio clip on the default output device, blocking until it ends.
pub fn preview_audio(clip: SharedAudio) -> Result<()> {
    let player = AudioPlayer::new().ok_or(PreviewError::MissingAudioDevice)?;
    let rate = clip.sample_rate();
    for chunk in chunks(clip.as_ref(), rate as usize) {
        player.queue_audio(chunk, rate, clip.channels());
    }
    log::debug!("playing {:.3}s of audio", clip.duration());
    player.wait_until_end();
    Ok(())
}
