use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clipview_core::audio::SharedAudio;
use clipview_core::media::MediaKind;
use clipview_core::options::PreviewOptions;
use clipview_core::session::PixelClick;
use clipview_core::surface::{CancelToken, WallClock, play_loop};
use clipview_core::time::{format_timestamp, parse_timestamp};
use clipview_media::embed::{EmbedOptions, Resource, embed};
use clipview_media::file_clip::{AudioFileClip, open_clip};
use clipview_media::sequence::ImageSequenceSurface;
use clipview_media::snapshot::save_frame;
use clipview_ui::preview;

/// How long a still image is held when opened as a clip.
const STILL_DURATION: f64 = 5.0;

#[derive(Parser)]
#[command(name = "clipview", version, about = "Preview, snapshot and embed media clips")]
struct Cli {
    /// JSON file with preview and embed defaults. Flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save the frame at a timestamp as PNG or JPEG.
    Frame {
        input: PathBuf,
        #[arg(value_parser = timestamp)]
        t: f64,
        output: PathBuf,
    },
    /// Show one frame until the window is closed or Escape is pressed.
    Show {
        input: PathBuf,
        #[arg(long, value_parser = timestamp, default_value = "0")]
        t: f64,
    },
    /// Play a clip in real time.
    Preview {
        input: PathBuf,
        #[arg(long)]
        fps: Option<f64>,
        /// Play the soundtrack (true/false).
        #[arg(long)]
        audio: Option<bool>,
        /// Print the colour of clicked pixels.
        #[arg(long)]
        interactive: bool,
        /// Write frames to this directory as PNGs instead of opening a window.
        #[arg(long)]
        dump: Option<PathBuf>,
    },
    /// Print HTML markup embedding the media inline.
    Embed {
        input: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        autoplay: bool,
        #[arg(long = "loop")]
        looping: bool,
        #[arg(long, value_parser = timestamp)]
        t: Option<f64>,
        /// Re-encode video at this frame rate.
        #[arg(long)]
        fps: Option<f64>,
    },
}

fn timestamp(s: &str) -> Result<f64, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

fn print_click(click: &PixelClick) {
    let [r, g, b] = click.rgb;
    println!(
        "{} x={} y={} rgb=({r}, {g}, {b})",
        format_timestamp(click.t),
        click.x,
        click.y
    );
}

/// Preview and embed defaults read from `--config`.
#[derive(Default, serde::Deserialize)]
#[serde(default)]
struct Config {
    preview: PreviewOptions,
    embed: EmbedOptions,
}

impl Config {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Frame { input, t, output } => {
            let clip = open_clip(&input, STILL_DURATION)?;
            save_frame(clip.as_ref(), &output, t)?;
        }
        Command::Show { input, t } => {
            let clip = open_clip(&input, STILL_DURATION)?;
            preview::show(&clip, t)?;
        }
        Command::Preview {
            input,
            fps,
            audio,
            interactive,
            dump,
        } => {
            let mut options = config.preview;
            options.fps = fps.or(options.fps);
            options.with_audio = audio.unwrap_or(options.with_audio);
            options.interactive |= interactive;

            if MediaKind::from_path(&input) == Some(MediaKind::Audio) {
                let clip: SharedAudio = Arc::new(AudioFileClip::open(&input)?);
                preview::preview_audio(clip)?;
                return Ok(());
            }

            let clip = open_clip(&input, STILL_DURATION)?;
            let report = match dump {
                Some(dir) => {
                    let mut surface = ImageSequenceSurface::new(&dir)?;
                    play_loop(
                        &mut surface,
                        clip.as_ref(),
                        &options,
                        &CancelToken::new(),
                        &WallClock::start(),
                        Some(&mut print_click),
                    )?
                }
                None => preview::preview(clip, &options, Some(Arc::new(print_click)))?,
            };
            log::info!(
                "{:?}: {} frames, {} skipped",
                report.outcome,
                report.frames_presented,
                report.frames_skipped
            );
        }
        Command::Embed {
            input,
            width,
            autoplay,
            looping,
            t,
            fps,
        } => {
            let mut options = config.embed;
            options.width = width.or(options.width);
            options.autoplay |= autoplay;
            options.looping |= looping;
            options.t = t.or(options.t);
            options.fps = fps.or(options.fps);

            // An explicit rate re-encodes video instead of inlining the file.
            let resource = match (fps, MediaKind::from_path(&input)) {
                (Some(_), Some(MediaKind::Video)) => {
                    Resource::Video(open_clip(&input, STILL_DURATION)?)
                }
                _ => Resource::File(input),
            };
            let markup = embed(&resource, &options)?;
            println!("{markup}");
        }
    }

    Ok(())
}
