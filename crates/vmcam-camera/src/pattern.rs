use crate::{Camera, CameraConfig, CameraError};
use vmcam_base::Tensor;

/// A camera that synthesizes frames instead of reading a device.
///
/// Each frame is an RGBA gradient that shifts by one step per frame, so
/// consecutive frames differ. Useful for demos without hardware and for tests.
#[derive(Debug, Clone)]
pub struct PatternCamera {
    width: u32,
    height: u32,
    frame_index: u64,
}

impl PatternCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
        }
    }

    /// Use the width and height requested in `config`.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.width(), config.height())
    }

    /// Number of frames produced so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Render frame `index` without advancing the camera.
    pub fn render(&self, index: u64) -> Result<Tensor<u8>, CameraError> {
        let (w, h) = (self.width as usize, self.height as usize);
        let shift = index as usize;
        let mut data = Vec::with_capacity(w * h * 4);
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[
                    ((x + shift) % 256) as u8,
                    ((y + shift) % 256) as u8,
                    ((x + y) % 256) as u8,
                    255,
                ]);
            }
        }
        Ok(Tensor::from_hwc(h, w, 4, data)?)
    }
}

impl Camera for PatternCamera {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        let frame = self.render(self.frame_index)?;
        self.frame_index += 1;
        Ok(frame)
    }
}
