use std::path::Path;
use std::time::Duration;

use clipview_core::media::MediaInfo;

use crate::decoder::open_input;
use crate::error::{MediaError, Result};

/// Probe a media file and return its stream metadata.
pub fn probe(path: &Path) -> Result<MediaInfo> {
    let input_ctx = open_input(path).map_err(|e| MediaError::ProbeError(e.to_string()))?;

    let streams = input_ctx.streams();
    let mut width = 0u32;
    let mut height = 0u32;
    let mut fps = 0.0f64;
    let mut has_video = false;
    let mut has_audio = false;

    for stream in streams.iter() {
        let codecpar = stream.codecpar();
        if codecpar.codec_type == rsmpeg::ffi::AVMEDIA_TYPE_VIDEO && !has_video {
            has_video = true;
            width = codecpar.width as u32;
            height = codecpar.height as u32;
            let r = stream.r_frame_rate;
            if r.den > 0 && r.num > 0 {
                fps = r.num as f64 / r.den as f64;
            }
        } else if codecpar.codec_type == rsmpeg::ffi::AVMEDIA_TYPE_AUDIO {
            has_audio = true;
        }
    }

    let duration_secs = input_ctx.duration as f64 / rsmpeg::ffi::AV_TIME_BASE as f64;
    let duration = Duration::from_secs_f64(duration_secs.max(0.0));

    Ok(MediaInfo::new(
        path.to_path_buf(),
        duration,
        width,
        height,
        fps,
        has_video,
        has_audio,
    ))
}
