use rayon::prelude::*;

use crate::error::{CoreError, Result};

/// Bytes per pixel in a [`Frame`] buffer.
pub const CHANNELS: usize = 3;

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];

/// Decoded video frame with raw pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data, row-major, 3 bytes per pixel.
    pub data: Vec<u8>,
    /// Clip time this frame was sampled at, in seconds.
    pub t: f64,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, t: f64) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(CoreError::InvalidPixelBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            t,
        })
    }

    /// A frame filled with a single colour.
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            data: color.repeat(pixels),
            t: 0.0,
        }
    }

    /// Build a frame by evaluating `f` at every pixel coordinate.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Rgb) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
            t: 0.0,
        }
    }

    pub fn with_timestamp(mut self, t: f64) -> Self {
        self.t = t;
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Colour at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Mix every pixel toward `color`, keeping `keep` (0..=1) of the original.
    pub fn blend_toward(&self, color: Rgb, keep: f64) -> Frame {
        let keep = keep.clamp(0.0, 1.0);
        let mut data = self.data.clone();
        data.par_chunks_mut(CHANNELS).for_each(|px| {
            for (c, target) in px.iter_mut().zip(color) {
                let mixed = keep * *c as f64 + (1.0 - keep) * target as f64;
                *c = mixed.round().clamp(0.0, 255.0) as u8;
            }
        });
        Frame {
            width: self.width,
            height: self.height,
            data,
            t: self.t,
        }
    }

    /// RGBA copy of the pixel buffer with an opaque alpha channel.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.data.chunks_exact(CHANNELS) {
            rgba.extend_from_slice(px);
            rgba.push(255);
        }
        rgba
    }
}
