use crate::PipelineError;
use std::fmt;
use vmcam_base::Tensor;
use vmcam_camera::rgb_to_rgba;

/// Samples per pixel: R, G, B, A.
pub const CHANNELS: usize = 4;

/// A rectangular array of 8-bit RGBA samples, rows top to bottom.
#[derive(Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Wrap `pixels`; the length must be `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, PipelineError> {
        let expected = byte_len(width, height);
        if pixels.len() != expected {
            return Err(PipelineError::Frame(format!(
                "{width}x{height} RGBA needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Caller guarantees `pixels.len() == width * height * 4`.
    pub(crate) fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), byte_len(width, height));
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Transparent black.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; byte_len(width, height)],
        }
    }

    /// Convert a camera frame (`[h, w, 3]` RGB or `[h, w, 4]` RGBA).
    pub fn from_tensor(tensor: &Tensor<u8>) -> Result<Self, PipelineError> {
        let (height, width, channels) = tensor.hwc()?;
        let pixels = match channels {
            4 => tensor.data.clone(),
            3 => rgb_to_rgba(&tensor.data),
            other => {
                return Err(PipelineError::Frame(format!(
                    "unsupported channel count {other}"
                )));
            }
        };
        Self::new(width as u32, height as u32, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Runtime shape descriptor: `[height, width, channels]`.
    pub fn shape(&self) -> [i32; 3] {
        [self.height as i32, self.width as i32, CHANNELS as i32]
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}
