use clipview_media::audio_decoder::FfmpegAudioDecoder;
use clipview_media::error::MediaError;
use clipview_test_harness::fixtures;

#[test]
fn test_open_audio_stream() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video_with_audio(dir.path(), "audio_open", 2.0);

    let decoder = FfmpegAudioDecoder::open(&path).unwrap();
    assert!(decoder.sample_rate() > 0);
    assert!(decoder.channels() > 0);
}

#[test]
fn test_decode_audio_frames() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video_with_audio(dir.path(), "audio_decode", 2.0);

    let mut decoder = FfmpegAudioDecoder::open(&path).unwrap();
    let frame = decoder.decode_next_audio_frame().unwrap();
    assert!(frame.is_some(), "should decode at least one frame");

    let frame = frame.unwrap();
    assert!(!frame.samples.is_empty(), "samples should not be empty");
    assert_eq!(frame.samples.len() % frame.channels as usize, 0);
    for sample in &frame.samples {
        assert!(sample.is_finite(), "sample should be finite, got {sample}");
    }
}

#[test]
fn test_decode_all_covers_duration() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_tone(dir.path(), "tone_all", 1.0);

    let mut decoder = FfmpegAudioDecoder::open(&path).unwrap();
    assert_eq!(decoder.sample_rate(), 8000);
    let samples = decoder.decode_all().unwrap();
    let frames = samples.len() / decoder.channels() as usize;
    assert!(
        (7800..=8200).contains(&frames),
        "1s at 8kHz should be ~8000 frames, got {frames}"
    );

    let max_amp = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    assert!(max_amp > 0.0 && max_amp <= 1.0, "amplitude: {max_amp}");
}

#[test]
fn test_seek_audio() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video_with_audio(dir.path(), "audio_seek", 5.0);

    let mut decoder = FfmpegAudioDecoder::open(&path).unwrap();
    decoder.seek_to(2.0).unwrap();

    let frame = decoder.decode_next_audio_frame().unwrap().unwrap();
    // Keyframe seeking may land up to ~1s early.
    assert!(
        frame.pts_secs >= 1.0,
        "PTS after seek to 2.0 should be >= 1.0, got {}",
        frame.pts_secs
    );
}

#[test]
fn test_no_audio_stream_returns_error() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "video_only", 1.0);

    let result = FfmpegAudioDecoder::open(&path);
    assert!(matches!(result, Err(MediaError::NoAudioStream)));
}
