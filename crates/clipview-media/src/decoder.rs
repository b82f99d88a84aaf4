use std::ffi::CString;
use std::path::Path;

use clipview_core::frame::{CHANNELS, Frame};
use rsmpeg::avcodec::AVCodecContext;
use rsmpeg::avformat::AVFormatContextInput;
use rsmpeg::avutil::AVFrame;
use rsmpeg::swscale::SwsContext;

use crate::error::{MediaError, Result};

/// Trait for video decoders, enabling test mocking.
pub trait VideoDecoder: Send {
    fn open(path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Decode the next frame in presentation order, `None` at end of stream.
    fn decode_next_frame(&mut self) -> Result<Option<Frame>>;

    /// Seek to the keyframe at or before `timestamp_secs`.
    fn seek_to(&mut self, timestamp_secs: f64) -> Result<()>;

    fn stream_info(&self) -> StreamInfo;
}

#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_secs: f64,
    pub codec_name: String,
}

pub(crate) fn open_input(path: &Path) -> Result<AVFormatContextInput> {
    let path_str = path.to_string_lossy().to_string();
    let c_path =
        CString::new(path_str.clone()).map_err(|_| MediaError::OpenFailed(path_str.clone()))?;
    AVFormatContextInput::open(&c_path)
        .map_err(|e| MediaError::OpenFailed(format!("{path_str}: {e}")))
}

/// A decoder opened on one stream of an input.
pub(crate) struct OpenedStream {
    pub index: usize,
    pub decode_ctx: AVCodecContext,
    pub codec_name: String,
}

/// Open a decoder for the first decodable stream of `media_type`.
pub(crate) fn open_stream_decoder(
    input_ctx: &AVFormatContextInput,
    media_type: rsmpeg::ffi::AVMediaType,
) -> Result<Option<OpenedStream>> {
    let found = {
        let streams = input_ctx.streams();
        streams.iter().enumerate().find_map(|(i, stream)| {
            let codecpar = stream.codecpar();
            if codecpar.codec_type != media_type {
                return None;
            }
            rsmpeg::avcodec::AVCodec::find_decoder(codecpar.codec_id).map(|codec| (i, codec))
        })
    };
    let Some((index, codec)) = found else {
        return Ok(None);
    };

    let mut decode_ctx = AVCodecContext::new(&codec);
    {
        let streams = input_ctx.streams();
        decode_ctx
            .apply_codecpar(&streams[index].codecpar())
            .map_err(|e| MediaError::DecoderError(format!("apply_codecpar: {e}")))?;
    }
    // 0 lets FFmpeg pick the thread count.
    unsafe {
        use rsmpeg::UnsafeDerefMut;
        decode_ctx.deref_mut().thread_count = 0;
    }
    decode_ctx
        .open(None)
        .map_err(|e| MediaError::DecoderError(format!("open: {e}")))?;

    Ok(Some(OpenedStream {
        index,
        decode_ctx,
        codec_name: codec.name().to_string_lossy().to_string(),
    }))
}

/// Seconds per tick of stream `index`.
pub(crate) fn stream_time_base(input_ctx: &AVFormatContextInput, index: usize) -> f64 {
    let streams = input_ctx.streams();
    let tb = streams[index].time_base;
    tb.num as f64 / tb.den as f64
}

pub(crate) fn pts_secs(frame: &AVFrame, time_base: f64) -> f64 {
    if frame.pts != rsmpeg::ffi::AV_NOPTS_VALUE {
        frame.pts as f64 * time_base
    } else {
        0.0
    }
}

/// Pull the next decoded frame of stream `index`, flushing the decoder at EOF.
pub(crate) fn receive_next(
    input_ctx: &mut AVFormatContextInput,
    decode_ctx: &mut AVCodecContext,
    index: usize,
) -> Result<Option<AVFrame>> {
    loop {
        if let Ok(frame) = decode_ctx.receive_frame() {
            return Ok(Some(frame));
        }
        match input_ctx.read_packet() {
            Ok(Some(packet)) => {
                if packet.stream_index as usize != index {
                    continue;
                }
                decode_ctx
                    .send_packet(Some(&packet))
                    .map_err(|e| MediaError::DecoderError(format!("send_packet: {e}")))?;
            }
            Ok(None) => {
                // A second flush after EOF is rejected; ignore it.
                decode_ctx.send_packet(None).ok();
                return Ok(decode_ctx.receive_frame().ok());
            }
            Err(e) => {
                return Err(MediaError::DecoderError(format!("read_packet: {e}")));
            }
        }
    }
}

pub(crate) fn seek_stream(
    input_ctx: &mut AVFormatContextInput,
    decode_ctx: &mut AVCodecContext,
    index: usize,
    timestamp_secs: f64,
) -> Result<()> {
    let ts = (timestamp_secs.max(0.0) / stream_time_base(input_ctx, index)) as i64;
    input_ctx
        .seek(index as i32, ts, rsmpeg::ffi::AVSEEK_FLAG_BACKWARD as i32)
        .map_err(|e| MediaError::SeekError(format!("{e}")))?;
    decode_ctx.flush_buffers();
    Ok(())
}

pub struct FfmpegDecoder {
    input_ctx: AVFormatContextInput,
    decode_ctx: AVCodecContext,
    sws_ctx: Option<SwsContext>,
    sws_src: (i32, i32, i32),
    video_stream_index: usize,
    time_base: f64,
    stream_info: StreamInfo,
}

impl VideoDecoder for FfmpegDecoder {
    fn open(path: &Path) -> Result<Self> {
        let input_ctx = open_input(path)?;
        let OpenedStream {
            index: video_stream_index,
            decode_ctx,
            codec_name,
        } = open_stream_decoder(&input_ctx, rsmpeg::ffi::AVMEDIA_TYPE_VIDEO)?
            .ok_or(MediaError::NoVideoStream)?;

        let time_base = stream_time_base(&input_ctx, video_stream_index);
        let stream_info = {
            let streams = input_ctx.streams();
            let video_stream = &streams[video_stream_index];
            let duration_secs = if video_stream.duration > 0 {
                video_stream.duration as f64 * time_base
            } else {
                input_ctx.duration as f64 / rsmpeg::ffi::AV_TIME_BASE as f64
            };
            let r = video_stream.r_frame_rate;
            let fps = if r.den > 0 && r.num > 0 {
                r.num as f64 / r.den as f64
            } else {
                30.0
            };
            StreamInfo {
                width: decode_ctx.width as u32,
                height: decode_ctx.height as u32,
                fps,
                duration_secs,
                codec_name,
            }
        };

        log::debug!(
            "opened {}: {}x{} {} @ {:.2} fps, {:.3}s",
            path.display(),
            stream_info.width,
            stream_info.height,
            stream_info.codec_name,
            stream_info.fps,
            stream_info.duration_secs
        );

        Ok(Self {
            input_ctx,
            decode_ctx,
            sws_ctx: None,
            sws_src: (0, 0, -1),
            video_stream_index,
            time_base,
            stream_info,
        })
    }

    fn decode_next_frame(&mut self) -> Result<Option<Frame>> {
        match receive_next(
            &mut self.input_ctx,
            &mut self.decode_ctx,
            self.video_stream_index,
        )? {
            Some(frame) => Ok(Some(self.to_rgb(&frame)?)),
            None => Ok(None),
        }
    }

    fn seek_to(&mut self, timestamp_secs: f64) -> Result<()> {
        seek_stream(
            &mut self.input_ctx,
            &mut self.decode_ctx,
            self.video_stream_index,
            timestamp_secs,
        )
    }

    fn stream_info(&self) -> StreamInfo {
        self.stream_info.clone()
    }
}

impl FfmpegDecoder {
    /// Convert a decoded frame of any pixel format to a packed RGB24 [`Frame`].
    fn to_rgb(&mut self, frame: &AVFrame) -> Result<Frame> {
        let (w, h, fmt) = (frame.width, frame.height, frame.format);
        let dst_fmt = rsmpeg::ffi::AV_PIX_FMT_RGB24;

        if self.sws_ctx.is_none() || self.sws_src != (w, h, fmt) {
            self.sws_ctx = Some(
                SwsContext::get_context(
                    w,
                    h,
                    fmt,
                    w,
                    h,
                    dst_fmt,
                    rsmpeg::ffi::SWS_FAST_BILINEAR,
                    None,
                    None,
                    None,
                )
                .ok_or_else(|| MediaError::DecoderError("failed to create sws context".into()))?,
            );
            self.sws_src = (w, h, fmt);
        }
        let Some(sws) = self.sws_ctx.as_mut() else {
            return Err(MediaError::DecoderError("sws context missing".into()));
        };

        let mut dst = AVFrame::new();
        dst.set_width(w);
        dst.set_height(h);
        dst.set_format(dst_fmt);
        dst.alloc_buffer()
            .map_err(|e| MediaError::DecoderError(format!("alloc_buffer: {e}")))?;
        sws.scale_frame(frame, 0, h, &mut dst)
            .map_err(|e| MediaError::DecoderError(format!("scale_frame: {e}")))?;

        // Rows in the destination buffer may be padded past width * 3.
        let width = w as u32;
        let height = h as u32;
        let row_bytes = width as usize * CHANNELS;
        let stride = dst.linesize[0] as usize;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let row_data = unsafe {
                std::slice::from_raw_parts(dst.data[0].add(row * stride) as *const u8, row_bytes)
            };
            data.extend_from_slice(row_data);
        }

        Ok(Frame::new(width, height, data, pts_secs(frame, self.time_base))?)
    }
}
