use crate::error::{CoreError, Result};

/// Slack used when comparing frame boundaries computed in floating point.
pub const TIME_EPSILON: f64 = 1e-9;

/// Parse a timestamp into seconds.
///
/// Accepts plain seconds (`"15.35"`, `"-2"`), `"mm:ss"` and `"hh:mm:ss"`
/// forms. The seconds field may carry a fraction, written with either a
/// dot or a comma (`"01:03:05,35"`).
pub fn parse_timestamp(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let invalid = || CoreError::InvalidTimestamp(input.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let fields: Vec<&str> = body.split(':').collect();
    if fields.len() > 3 {
        return Err(invalid());
    }

    let mut secs = 0.0;
    for (i, field) in fields.iter().enumerate() {
        let is_last = i == fields.len() - 1;
        let value: f64 = if is_last {
            field.replace(',', ".").parse().map_err(|_| invalid())?
        } else {
            field.parse::<u32>().map_err(|_| invalid())? as f64
        };
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        // Minutes and seconds fields stay below 60 once a larger unit is present.
        if i > 0 && value >= 60.0 {
            return Err(invalid());
        }
        secs = secs * 60.0 + value;
    }

    Ok(if negative { -secs } else { secs })
}

/// Format seconds as `hh:mm:ss.mmm`.
pub fn format_timestamp(secs: f64) -> String {
    let sign = if secs < 0.0 { "-" } else { "" };
    let total_ms = (secs.abs() * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let s = (total_ms / 1000) % 60;
    let m = (total_ms / 60_000) % 60;
    let h = total_ms / 3_600_000;
    format!("{sign}{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Highest frame rate accepted for sampling or playback.
pub const MAX_FPS: f64 = 10_000.0;

pub fn validate_fps(fps: f64) -> Result<f64> {
    if fps > 0.0 && fps <= MAX_FPS {
        Ok(fps)
    } else {
        Err(CoreError::InvalidFps(fps))
    }
}

/// Number of frames in `[0, duration)` at `fps`, i.e. `ceil(duration * fps)`.
pub fn frame_count(duration: f64, fps: f64) -> u64 {
    if duration <= 0.0 {
        return 0;
    }
    (duration * fps - TIME_EPSILON).ceil().max(0.0) as u64
}

/// Timestamp of frame `index` at `fps`.
pub fn frame_time(index: u64, fps: f64) -> f64 {
    index as f64 / fps
}
