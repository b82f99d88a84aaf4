use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Picture source shared by the video fixtures: 160x120 test pattern, 30 fps.
fn test_pattern(duration_secs: f64) -> String {
    format!("testsrc=duration={duration_secs}:size=160x120:rate=30")
}

fn sine(duration_secs: f64) -> String {
    format!("sine=frequency=440:duration={duration_secs}")
}

/// Run ffmpeg over the given lavfi sources and write `output`.
fn render_lavfi(sources: &[String], codec_args: &[&str], output: &Path) {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y");
    for source in sources {
        cmd.args(["-f", "lavfi", "-i", source]);
    }
    let status = cmd
        .args(codec_args)
        .arg(output)
        .stderr(Stdio::null())
        .status()
        .expect("ffmpeg must be installed to generate test fixtures");

    assert!(
        status.success(),
        "ffmpeg failed to generate {}",
        output.display()
    );
    assert!(output.exists(), "fixture was not created: {}", output.display());
}

const H264: [&str; 6] = ["-c:v", "libx264", "-pix_fmt", "yuv420p", "-preset", "ultrafast"];

/// A silent H.264 test pattern video.
pub fn generate_test_video(output_dir: &Path, name: &str, duration_secs: f64) -> PathBuf {
    let output = output_dir.join(format!("{name}.mp4"));
    render_lavfi(&[test_pattern(duration_secs)], &H264, &output);
    output
}

/// The test pattern with a 440 Hz AAC soundtrack of the same length.
pub fn generate_test_video_with_audio(
    output_dir: &Path,
    name: &str,
    duration_secs: f64,
) -> PathBuf {
    let output = output_dir.join(format!("{name}.mp4"));
    let mut args = H264.to_vec();
    args.extend(["-c:a", "aac", "-shortest"]);
    render_lavfi(
        &[test_pattern(duration_secs), sine(duration_secs)],
        &args,
        &output,
    );
    output
}

/// A mono 440 Hz WAV at 8 kHz.
pub fn generate_test_tone(output_dir: &Path, name: &str, duration_secs: f64) -> PathBuf {
    let output = output_dir.join(format!("{name}.wav"));
    render_lavfi(&[sine(duration_secs)], &["-ar", "8000"], &output);
    output
}

/// Scratch directory for fixtures, removed when dropped.
pub fn fixture_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("failed to create temp dir for fixtures")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_test_video() {
        let dir = fixture_dir();
        let path = generate_test_video(dir.path(), "test_basic", 1.0);
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0, "generated video should not be empty");
    }

    #[test]
    fn test_generate_test_tone() {
        let dir = fixture_dir();
        let path = generate_test_tone(dir.path(), "tone", 0.5);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
