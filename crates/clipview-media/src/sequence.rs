use std::path::{Path, PathBuf};

use clipview_core::error::{CoreError, Result};
use clipview_core::frame::Frame;
use clipview_core::surface::{DisplaySurface, SurfaceEvent};
use image::ImageFormat;

use crate::snapshot::encode_image;

/// A headless surface that writes every presented frame as a numbered PNG.
pub struct ImageSequenceSurface {
    dir: PathBuf,
    written: Vec<PathBuf>,
    closed: bool,
}

impl ImageSequenceSurface {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
            closed: false,
        })
    }

    /// Files written so far, in presentation order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl DisplaySurface for ImageSequenceSurface {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        let path = self
            .dir
            .join(format!("frame_{:05}.png", self.written.len()));
        let bytes = encode_image(frame, ImageFormat::Png)
            .map_err(|e| CoreError::RenderFailure(e.to_string()))?;
        std::fs::write(&path, bytes)?;
        self.written.push(path);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        Vec::new()
    }

    fn close(&mut self) {
        self.closed = true;
        log::debug!("wrote {} frames to {}", self.written.len(), self.dir.display());
    }
}
