use std::path::Path;

use rsmpeg::avcodec::AVCodecContext;
use rsmpeg::avformat::AVFormatContextInput;
use rsmpeg::avutil::{AVChannelLayout, AVFrame};
use rsmpeg::swresample::SwrContext;

use crate::decoder::{
    OpenedStream, open_input, open_stream_decoder, pts_secs, receive_next, seek_stream,
    stream_time_base,
};
use crate::error::{MediaError, Result};

/// Decoded audio frame with interleaved f32 PCM samples.
pub struct AudioFrame {
    /// Interleaved f32 PCM samples (L, R, L, R, ... for stereo).
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Presentation timestamp in seconds.
    pub pts_secs: f64,
}

pub struct FfmpegAudioDecoder {
    input_ctx: AVFormatContextInput,
    decode_ctx: AVCodecContext,
    swr_ctx: SwrContext,
    audio_stream_index: usize,
    time_base: f64,
    sample_rate: u32,
    channels: u16,
}

impl FfmpegAudioDecoder {
    pub fn open(path: &Path) -> Result<Self> {
        let input_ctx = open_input(path)?;
        let OpenedStream {
            index: audio_stream_index,
            decode_ctx,
            codec_name,
        } = open_stream_decoder(&input_ctx, rsmpeg::ffi::AVMEDIA_TYPE_AUDIO)?
            .ok_or(MediaError::NoAudioStream)?;

        // Have the demuxer drop every other stream so read_packet() only
        // yields audio.
        {
            let nb_streams = input_ctx.streams().len();
            for i in (0..nb_streams).filter(|i| *i != audio_stream_index) {
                unsafe {
                    let streams = input_ctx.streams();
                    let stream_ptr = streams[i].as_ptr() as *mut rsmpeg::ffi::AVStream;
                    (*stream_ptr).discard = rsmpeg::ffi::AVDISCARD_ALL;
                }
            }
        }

        let in_sample_rate = decode_ctx.sample_rate;
        let in_sample_fmt = decode_ctx.sample_fmt;
        let in_ch_layout =
            unsafe { rsmpeg::avutil::AVChannelLayoutRef::new(&decode_ctx.ch_layout) };
        let channels = in_ch_layout.nb_channels as u16;

        // Same rate and channel count as the input, packed f32 samples.
        let out_ch_layout = AVChannelLayout::from_nb_channels(channels as i32);
        let mut swr_ctx = SwrContext::new(
            &out_ch_layout,
            rsmpeg::ffi::AV_SAMPLE_FMT_FLT,
            in_sample_rate,
            &in_ch_layout,
            in_sample_fmt,
            in_sample_rate,
        )
        .map_err(|e| MediaError::DecoderError(format!("swr_alloc_set_opts2: {e}")))?;
        swr_ctx
            .init()
            .map_err(|e| MediaError::DecoderError(format!("swr_init: {e}")))?;

        let time_base = stream_time_base(&input_ctx, audio_stream_index);
        log::debug!(
            "opened {} audio of {}: {} Hz, {} channel(s)",
            codec_name,
            path.display(),
            in_sample_rate,
            channels
        );

        Ok(Self {
            input_ctx,
            decode_ctx,
            swr_ctx,
            audio_stream_index,
            time_base,
            sample_rate: in_sample_rate as u32,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Decode the next audio frame, returning interleaved f32 PCM samples.
    pub fn decode_next_audio_frame(&mut self) -> Result<Option<AudioFrame>> {
        match receive_next(
            &mut self.input_ctx,
            &mut self.decode_ctx,
            self.audio_stream_index,
        )? {
            Some(frame) => Ok(Some(self.convert_frame(&frame)?)),
            None => Ok(None),
        }
    }

    /// Decode every remaining frame into one interleaved buffer.
    pub fn decode_all(&mut self) -> Result<Vec<f32>> {
        let mut samples = Vec::new();
        while let Some(frame) = self.decode_next_audio_frame()? {
            samples.extend_from_slice(&frame.samples);
        }
        Ok(samples)
    }

    /// Seek to a timestamp in the audio stream.
    pub fn seek_to(&mut self, timestamp_secs: f64) -> Result<()> {
        seek_stream(
            &mut self.input_ctx,
            &mut self.decode_ctx,
            self.audio_stream_index,
            timestamp_secs,
        )
    }

    fn convert_frame(&mut self, frame: &AVFrame) -> Result<AudioFrame> {
        let mut dst_frame = AVFrame::new();
        dst_frame.set_format(rsmpeg::ffi::AV_SAMPLE_FMT_FLT);
        dst_frame.set_sample_rate(self.sample_rate as i32);

        let out_ch_layout = AVChannelLayout::from_nb_channels(self.channels as i32);
        unsafe {
            rsmpeg::ffi::av_channel_layout_copy(
                &mut (*dst_frame.as_mut_ptr()).ch_layout,
                out_ch_layout.as_ptr(),
            );
        }
        dst_frame.set_nb_samples(frame.nb_samples);
        dst_frame
            .alloc_buffer()
            .map_err(|e| MediaError::DecoderError(format!("alloc_buffer: {e}")))?;

        self.swr_ctx
            .convert_frame(Some(frame), &mut dst_frame)
            .map_err(|e| MediaError::DecoderError(format!("convert_frame: {e}")))?;

        let total_floats = dst_frame.nb_samples as usize * self.channels as usize;
        let samples = unsafe {
            std::slice::from_raw_parts(dst_frame.data[0] as *const f32, total_floats).to_vec()
        };

        Ok(AudioFrame {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
            pts_secs: pts_secs(frame, self.time_base),
        })
    }
}
