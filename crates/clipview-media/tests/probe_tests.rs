use clipview_media::probe;
use clipview_test_harness::fixtures;

#[test]
fn test_probe_video_only() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video(dir.path(), "probe_video", 2.0);

    let info = probe::probe(&path).unwrap();
    assert_eq!(info.name, "probe_video.mp4");
    assert_eq!(info.width, 160);
    assert_eq!(info.height, 120);
    assert!(info.fps > 29.0 && info.fps < 31.0, "fps: {}", info.fps);
    assert!(
        info.duration_secs() > 1.5 && info.duration_secs() < 2.5,
        "duration: {:?}",
        info.duration
    );
    assert!(info.has_video);
    assert!(!info.has_audio);
}

#[test]
fn test_probe_video_with_audio() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_video_with_audio(dir.path(), "probe_av", 1.0);

    let info = probe::probe(&path).unwrap();
    assert_eq!(info.name, "probe_av.mp4");
    assert!(info.has_video);
    assert!(info.has_audio);
}

#[test]
fn test_probe_audio_file() {
    let dir = fixtures::fixture_dir();
    let path = fixtures::generate_test_tone(dir.path(), "probe_tone", 1.0);

    let info = probe::probe(&path).unwrap();
    assert!(!info.has_video);
    assert!(info.has_audio);
    assert_eq!((info.width, info.height), (0, 0));
}

#[test]
fn test_probe_missing_file() {
    assert!(probe::probe(std::path::Path::new("/nonexistent/file.mp4")).is_err());
}
