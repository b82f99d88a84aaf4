use clipview_core::audio::AudioClip;
use clipview_core::clip::VideoClip;
use clipview_core::options::PreviewOptions;
use clipview_core::surface::{CancelToken, WallClock, play_loop};
use clipview_media::encoder::FfmpegVideoWriter;
use clipview_media::file_clip::{AudioFileClip, VideoFileClip};
use clipview_media::probe::probe;
use clipview_media::sequence::ImageSequenceSurface;
use clipview_media::wav::write_wav;
use clipview_test_harness::builders::{ClipBuilder, ToneBuilder};

#[test]
fn test_write_video_matches_clip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.mp4");
    let clip = ClipBuilder::new().resolution(64, 48).duration_secs(1.0).fps(10.0).build();

    FfmpegVideoWriter::new(&path, 10.0).run(clip.as_ref()).unwrap();

    let info = probe(&path).unwrap();
    assert_eq!((info.width, info.height), (64, 48));
    assert!((info.fps - 10.0).abs() < 0.5, "fps: {}", info.fps);
    assert!(!info.has_audio);

    let decoded = VideoFileClip::open(&path).unwrap();
    assert!((decoded.duration() - 1.0).abs() < 0.2, "duration: {}", decoded.duration());
}

#[test]
fn test_write_video_with_audio() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sound.mp4");
    let tone = ToneBuilder::new().duration_secs(1.0).build();
    let clip = ClipBuilder::new().duration_secs(1.0).fps(10.0).audio(tone).build();

    FfmpegVideoWriter::new(&path, 10.0).run(clip.as_ref()).unwrap();
    assert!(probe(&path).unwrap().has_audio);

    let muted = dir.path().join("muted.mp4");
    FfmpegVideoWriter::new(&muted, 10.0)
        .with_audio(false)
        .run(clip.as_ref())
        .unwrap();
    assert!(!probe(&muted).unwrap().has_audio);
}

#[test]
fn test_wav_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    let tone = ToneBuilder::new().duration_secs(0.5).sample_rate(8000).build();

    write_wav(tone.as_ref(), &path).unwrap();

    let decoded = AudioFileClip::open(&path).unwrap();
    assert_eq!(decoded.sample_rate(), 8000);
    assert_eq!(decoded.channels(), 2);
    assert_eq!(decoded.frame_count(), tone.frame_count());
}

#[test]
fn test_image_sequence_surface() {
    let dir = tempfile::tempdir().unwrap();
    let clip = ClipBuilder::new().duration_secs(0.3).fps(10.0).build();
    let mut surface = ImageSequenceSurface::new(&dir.path().join("frames")).unwrap();

    let report = play_loop(
        &mut surface,
        clip.as_ref(),
        &PreviewOptions::default(),
        &CancelToken::new(),
        &WallClock::start(),
        None,
    )
    .unwrap();

    assert!(surface.is_closed());
    assert_eq!(surface.written().len() as u64, report.frames_presented);
    assert!(surface.written()[0].ends_with("frame_00000.png"));
}
