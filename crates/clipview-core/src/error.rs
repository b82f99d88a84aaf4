use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("timestamp {t:.3}s is outside clip bounds [0, {duration:.3}s)")]
    OutOfRangeTimestamp { t: f64, duration: f64 },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid frame rate: {0}")]
    InvalidFps(f64),

    #[error("invalid time range {start:.3}s..{end:.3}s")]
    InvalidTimeRange { start: f64, end: f64 },

    #[error("invalid duration: {0}")]
    InvalidDuration(f64),

    #[error("invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidPixelBuffer { expected: usize, actual: usize },

    #[error("invalid audio buffer: {len} samples do not divide into {channels} channels")]
    InvalidAudioBuffer { len: usize, channels: u16 },

    #[error("render failure: {0}")]
    RenderFailure(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
