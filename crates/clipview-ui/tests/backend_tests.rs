use std::ffi::OsString;

use clipview_ui::backend::detect_from;
use clipview_ui::error::PreviewError;

fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<OsString> {
    move |name| {
        pairs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| OsString::from(v))
    }
}

#[test]
fn test_x11_display() {
    assert!(detect_from(env(&[("DISPLAY", ":0")])).is_ok());
}

#[test]
fn test_wayland_display() {
    assert!(detect_from(env(&[("WAYLAND_DISPLAY", "wayland-0")])).is_ok());
}

#[test]
fn test_missing_display() {
    let err = detect_from(env(&[("HOME", "/root")])).unwrap_err();
    assert!(matches!(err, PreviewError::MissingDisplayBackend(_)));
}

#[test]
fn test_empty_display_counts_as_missing() {
    let err = detect_from(env(&[("DISPLAY", "")])).unwrap_err();
    assert!(matches!(err, PreviewError::MissingDisplayBackend(_)));
}
