pub mod audio;
pub mod clip;
pub mod error;
pub mod frame;
pub mod fx;
pub mod media;
pub mod options;
pub mod sampler;
pub mod session;
pub mod surface;
pub mod time;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
