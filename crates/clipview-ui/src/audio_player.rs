use rodio::{OutputStream, OutputStreamHandle, Sink};

/// Wrapper around rodio for audio playback.
pub struct AudioPlayer {
    _stream: OutputStream,
    _stream_handle: OutputStreamHandle,
    sink: Sink,
}

impl AudioPlayer {
    pub fn new() -> Option<Self> {
        let (stream, stream_handle) = OutputStream::try_default().ok()?;
        let sink = Sink::try_new(&stream_handle).ok()?;
        Some(Self {
            _stream: stream,
            _stream_handle: stream_handle,
            sink,
        })
    }

    /// Queue interleaved f32 PCM audio samples for playback.
    pub fn queue_audio(&self, samples: Vec<f32>, sample_rate: u32, channels: u16) {
        let source = rodio::buffer::SamplesBuffer::new(channels, sample_rate, samples);
        self.sink.append(source);
    }

    pub fn stop(&self) {
        self.sink.stop();
    }

    /// Block until everything queued has played.
    pub fn wait_until_end(&self) {
        self.sink.sleep_until_end();
    }
}
