use clipview_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to open file: {0}")]
    OpenFailed(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("no audio stream found")]
    NoAudioStream,

    #[error("decoder error: {0}")]
    DecoderError(String),

    #[error("seek error: {0}")]
    SeekError(String),

    #[error("encoder error: {0}")]
    EncoderError(String),

    #[error("probe error: {0}")]
    ProbeError(String),

    #[error("unsupported media kind: {0}")]
    UnsupportedKind(String),

    #[error("clip has no frame rate; pass one explicitly")]
    MissingFps,

    #[error("clip is {duration:.1}s long, above the {max:.1}s embedding limit")]
    TooLong { duration: f64, max: f64 },

    #[error("invalid attribute name: {0:?}")]
    InvalidAttribute(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;
