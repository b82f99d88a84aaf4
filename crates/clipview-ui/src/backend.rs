use std::ffi::OsString;

use crate::error::{PreviewError, Result};

/// Variables that point a windowing client at a display server.
const DISPLAY_VARS: [&str; 2] = ["WAYLAND_DISPLAY", "DISPLAY"];

/// Check that a window can be opened before starting a preview.
///
/// Only X11/Wayland platforms need a display server named in the
/// environment; elsewhere the platform always provides one.
pub fn detect() -> Result<()> {
    if cfg!(all(unix, not(target_os = "macos"))) {
        detect_from(|name| std::env::var_os(name))
    } else {
        Ok(())
    }
}

/// [`detect`] against an arbitrary environment lookup.
pub fn detect_from(var: impl Fn(&str) -> Option<OsString>) -> Result<()> {
    let found = DISPLAY_VARS
        .iter()
        .find(|name| var(name).is_some_and(|value| !value.is_empty()));
    match found {
        Some(name) => {
            log::debug!("display backend found via {name}");
            Ok(())
        }
        None => Err(PreviewError::MissingDisplayBackend(format!(
            "neither {} is set",
            DISPLAY_VARS.join(" nor ")
        ))),
    }
}
