use clipview_core::clip::VideoClip;
use clipview_core::frame::{Frame, Rgb};

/// Assert that a frame has the clip's declared dimensions.
pub fn assert_frame_matches_clip(frame: &Frame, clip: &dyn VideoClip) {
    assert_eq!(
        frame.size(),
        clip.size(),
        "frame at t={} is {:?}, clip declares {:?}",
        frame.t,
        frame.size(),
        clip.size()
    );
    assert_eq!(
        frame.data.len(),
        frame.width as usize * frame.height as usize * 3,
        "pixel buffer length does not match dimensions"
    );
}

/// Assert that every channel of the pixel at `(x, y)` is within `tolerance`
/// of `expected`.
pub fn assert_pixel_approx(frame: &Frame, x: u32, y: u32, expected: Rgb, tolerance: u8) {
    let actual = frame
        .pixel(x, y)
        .unwrap_or_else(|| panic!("pixel ({x}, {y}) outside {:?} frame", frame.size()));
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            a.abs_diff(e) <= tolerance,
            "pixel ({x}, {y}) is {actual:?}, expected {expected:?} (tolerance {tolerance})"
        );
    }
}

/// Assert that markup embeds an inline payload of the given MIME prefix,
/// e.g. `"image/png"` or `"video/mp4"`.
pub fn assert_inline_payload(markup: &str, mime: &str) {
    let needle = format!("data:{mime};base64,");
    assert!(
        markup.contains(&needle),
        "markup does not embed a {mime} payload: {}",
        &markup[..markup.len().min(200)]
    );
}

/// Assert that a markup tag carries `name="value"`.
pub fn assert_attribute(markup: &str, name: &str, value: &str) {
    let needle = format!("{name}=\"{value}\"");
    assert!(
        markup.contains(&needle),
        "markup lacks attribute {needle}: {}",
        &markup[..markup.len().min(200)]
    );
}
