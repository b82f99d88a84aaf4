use clipview_core::audio::AudioClip;
use clipview_core::clip::VideoClip;
use clipview_core::sampler::sample;
use clipview_media::error::MediaError;
use clipview_media::file_clip::{AudioFileClip, VideoFileClip, open_clip};
use clipview_test_harness::assertions::assert_frame_matches_clip;
use clipview_test_harness::fixtures;

#[test]
fn test_video_file_clip_metadata() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "meta", 2.0);

    let clip = VideoFileClip::open(&path).unwrap();
    assert_eq!(clip.size(), (160, 120));
    let fps = clip.fps().unwrap();
    assert!(fps > 29.0 && fps < 31.0, "fps: {fps}");
    assert!(clip.duration() > 1.5 && clip.duration() < 2.5);
    assert!(clip.audio().is_none());
}

#[test]
fn test_sampled_frame_carries_requested_timestamp() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "sampled", 2.0);
    let clip = VideoFileClip::open(&path).unwrap();

    let frame = sample(&clip, 0.5).unwrap();
    assert_frame_matches_clip(&frame, &clip);
    assert_eq!(frame.t, 0.5);
}

#[test]
fn test_backward_read_matches_sequential_read() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "backward", 3.0);
    let clip = VideoFileClip::open(&path).unwrap();

    let first = sample(&clip, 1.0).unwrap();
    sample(&clip, 2.5).unwrap();
    let again = sample(&clip, 1.0).unwrap();
    assert_eq!(first.data, again.data, "seeking back should land on the same frame");

    let fresh = VideoFileClip::open(&path).unwrap();
    assert_eq!(sample(&fresh, 1.0).unwrap().data, first.data);
}

#[test]
fn test_repeated_reads_reuse_the_decoded_frame() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "repeat", 1.0);
    let clip = VideoFileClip::open(&path).unwrap();

    // 30 fps source: 0.40 and 0.41 fall on the same source frame.
    let a = sample(&clip, 0.40).unwrap();
    let b = sample(&clip, 0.41).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn test_out_of_range_is_rejected() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "range", 1.0);
    let clip = VideoFileClip::open(&path).unwrap();

    assert!(sample(&clip, clip.duration()).is_err());
    assert!(sample(&clip, -0.1).is_err());
}

#[test]
fn test_soundtrack_is_attached() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video_with_audio(dir.path(), "with_sound", 1.0);

    let clip = VideoFileClip::open(&path).unwrap();
    let audio = clip.audio().expect("soundtrack should be attached");
    assert!(audio.sample_rate() > 0);
    assert!(audio.duration() > 0.5 && audio.duration() < 1.5);
}

#[test]
fn test_audio_file_clip() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_tone(dir.path(), "tone", 0.5);

    let clip = AudioFileClip::open(&path).unwrap();
    assert_eq!(clip.sample_rate(), 8000);
    assert!((clip.duration() - 0.5).abs() < 0.05, "duration: {}", clip.duration());
}

#[test]
fn test_open_clip_by_kind() {
    let dir = fixtures::fixture_dir();
    let video = fixtures::generate_test_video(dir.path(), "kind", 1.0);
    assert_eq!(open_clip(&video, 5.0).unwrap().size(), (160, 120));

    let tone = fixtures::generate_test_tone(dir.path(), "kind_tone", 0.5);
    assert!(matches!(
        open_clip(&tone, 5.0),
        Err(MediaError::UnsupportedKind(_))
    ));
}
