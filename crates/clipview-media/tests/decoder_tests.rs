use clipview_media::decoder::{FfmpegDecoder, VideoDecoder};
use clipview_media::error::MediaError;
use clipview_test_harness::fixtures;

#[test]
fn test_open_video() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "open_test", 1.0);

    let decoder = FfmpegDecoder::open(&path).unwrap();
    let info = decoder.stream_info();
    assert_eq!(info.width, 160);
    assert_eq!(info.height, 120);
    assert!(info.fps > 29.0 && info.fps < 31.0, "fps: {}", info.fps);
    assert!(
        info.duration_secs > 0.8 && info.duration_secs < 1.5,
        "duration: {}",
        info.duration_secs
    );
}

#[test]
fn test_decode_frames_are_packed_rgb() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "decode_test", 1.0);

    let mut decoder = FfmpegDecoder::open(&path).unwrap();
    let mut frame_count = 0;
    let mut last_t = -1.0;

    while let Ok(Some(frame)) = decoder.decode_next_frame() {
        assert_eq!(frame.size(), (160, 120));
        assert_eq!(frame.data.len(), 160 * 120 * 3);
        assert!(frame.t > last_t, "timestamps should increase");
        last_t = frame.t;
        frame_count += 1;
    }

    // 1 second at 30fps should yield ~30 frames.
    assert!(
        (25..=35).contains(&frame_count),
        "expected ~30 frames, got {frame_count}"
    );
}

#[test]
fn test_seek_and_decode() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "seek_test", 3.0);

    let mut decoder = FfmpegDecoder::open(&path).unwrap();
    decoder.seek_to(2.0).unwrap();

    let frame = decoder.decode_next_frame().unwrap();
    assert!(frame.is_some(), "should decode a frame after seeking");
    let frame = frame.unwrap();
    assert_eq!(frame.size(), (160, 120));
    assert!(frame.t <= 2.0 + 1e-6, "seek lands at or before target, got {}", frame.t);
}

#[test]
fn test_open_missing_file() {
    let result = FfmpegDecoder::open(std::path::Path::new("/nonexistent/clip.mp4"));
    assert!(matches!(result, Err(MediaError::OpenFailed(_))));
}

#[test]
fn test_audio_only_file_has_no_video_stream() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_tone(dir.path(), "tone_only", 0.5);

    let result = FfmpegDecoder::open(&path);
    assert!(matches!(result, Err(MediaError::NoVideoStream)));
}
