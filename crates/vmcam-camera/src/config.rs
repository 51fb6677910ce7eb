use crate::CameraError;

/// Wire formats a capture device may be asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptureFormat {
    /// MJPEG if the driver offers it at the requested size, else YUYV.
    #[default]
    Auto,
    Mjpeg,
    Yuyv,
}

/// What to ask the camera for when access is requested.
///
/// Drivers may round width, height and rate; backends report what they
/// actually negotiated.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    device: String,
    width: u32,
    height: u32,
    fps: u32,
    format: CaptureFormat,
    driver_buffers: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 30,
            format: CaptureFormat::Auto,
            driver_buffers: 4,
        }
    }
}

impl CameraConfig {
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Device capture rate. The pipeline samples at its own, usually lower, rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_format(mut self, format: CaptureFormat) -> Self {
        self.format = format;
        self
    }

    /// Number of buffers the driver captures into.
    pub fn with_driver_buffers(mut self, count: u32) -> Self {
        self.driver_buffers = count;
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    pub fn driver_buffers(&self) -> u32 {
        self.driver_buffers
    }

    /// Reject requests no device can satisfy.
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::Device(format!(
                "invalid frame size {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(CameraError::Device("frame rate must be positive".to_string()));
        }
        if self.driver_buffers == 0 {
            return Err(CameraError::Device("driver buffer count must be positive".to_string()));
        }
        Ok(())
    }
}
