use clipview_core::error::CoreError;
use clipview_media::error::MediaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("no display available: {0}")]
    MissingDisplayBackend(String),

    #[error("no audio output device available")]
    MissingAudioDevice,

    #[error("render failure: {0}")]
    RenderFailure(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<iced::Error> for PreviewError {
    fn from(error: iced::Error) -> Self {
        match error {
            iced::Error::WindowCreationFailed(e) => Self::MissingDisplayBackend(e.to_string()),
            other => Self::RenderFailure(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PreviewError>;
