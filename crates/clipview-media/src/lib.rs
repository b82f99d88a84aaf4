pub mod audio_decoder;
pub mod decoder;
pub mod embed;
pub mod encoder;
pub mod error;
pub mod file_clip;
pub mod probe;
pub mod sequence;
pub mod snapshot;
pub mod wav;
