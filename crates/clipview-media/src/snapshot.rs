use std::io::Cursor;
use std::path::Path;

use clipview_core::clip::VideoClip;
use clipview_core::frame::Frame;
use clipview_core::sampler::sample;
use image::{ImageFormat, RgbImage};

use crate::error::{MediaError, Result};

/// Still formats a frame can be written as.
fn still_format(path: &Path) -> Result<ImageFormat> {
    match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(format),
        _ => Err(MediaError::UnsupportedKind(path.display().to_string())),
    }
}

fn to_image(frame: &Frame) -> Result<RgbImage> {
    RgbImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or_else(|| {
        MediaError::EncoderError(format!(
            "{}x{} frame has a short pixel buffer",
            frame.width, frame.height
        ))
    })
}

/// Encode `frame` into an in-memory PNG or JPEG.
pub fn encode_image(frame: &Frame, format: ImageFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    to_image(frame)?.write_to(&mut Cursor::new(&mut bytes), format)?;
    Ok(bytes)
}

/// Write the frame of `clip` at `t` to `path`. The extension picks PNG or JPEG.
pub fn save_frame(clip: &dyn VideoClip, path: &Path, t: f64) -> Result<()> {
    let format = still_format(path)?;
    let frame = sample(clip, t)?;
    to_image(&frame)?.save_with_format(path, format)?;
    log::info!("saved frame at {t:.3}s to {}", path.display());
    Ok(())
}

/// Read a still image into a frame. Animated GIFs yield their first frame.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(width, height, img.into_raw(), 0.0)?)
}
