use crate::latest::{LatestReceiver, LatestSender, latest_frame};
use crate::{Camera, CameraConfig, CameraError, CaptureFormat, decode_mjpeg, yuyv_to_rgb};
use std::thread::{self, JoinHandle};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};
use vmcam_base::Tensor;

type FrameResult = Result<Tensor<u8>, CameraError>;

/// Wire format negotiated with the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireFormat {
    Mjpeg,
    Yuyv,
}

/// V4L2 camera implementation.
///
/// Frames are captured on a background thread at the device rate. Only the
/// newest one is kept for `recv()`; frames nobody asked for are dropped.
/// Every frame is delivered as RGB `[height, width, 3]`.
pub struct V4l2Camera {
    config: CameraConfig,
    wire: WireFormat,
    width: u32,
    height: u32,
    device: Option<Device>,
    receiver: Option<LatestReceiver>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("wire", &self.wire)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("receiver", &self.receiver.is_some())
            .field("thread_handle", &self.thread_handle.is_some())
            .finish()
    }
}

impl Camera for V4l2Camera {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("Receiver not initialized".to_string()))?;

        receiver.recv().await
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // Dropping the receiver makes the capture thread's next send fail
        drop(self.receiver.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl V4l2Camera {
    /// Open the device in `config` and negotiate a capture format.
    ///
    /// With `CaptureFormat::Auto`, MJPEG is preferred and YUYV is accepted
    /// when the driver does not offer MJPEG at the requested size. The driver
    /// may adjust the resolution, the negotiated size is available from
    /// `width()` / `height()`.
    ///
    /// # Errors
    ///
    /// - `CameraError::AccessDenied` if the process may not open the device
    /// - `CameraError::Device` for an invalid config, a missing device, or a
    ///   device that offers none of the requested formats
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        config.validate()?;
        let device = Device::with_path(config.device())?;

        let (wire, format) = Self::negotiate(&device, &config)?;
        log::info!(
            "{}: negotiated {:?} at {}x{}",
            config.device(),
            wire,
            format.width,
            format.height
        );

        let params = v4l::video::capture::Parameters::with_fps(config.fps());
        Capture::set_params(&device, &params)?;

        Ok(Self {
            wire,
            width: format.width,
            height: format.height,
            config,
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    fn negotiate(
        device: &Device,
        config: &CameraConfig,
    ) -> Result<(WireFormat, Format), CameraError> {
        let candidates: &[WireFormat] = match config.format() {
            CaptureFormat::Auto => &[WireFormat::Mjpeg, WireFormat::Yuyv],
            CaptureFormat::Mjpeg => &[WireFormat::Mjpeg],
            CaptureFormat::Yuyv => &[WireFormat::Yuyv],
        };

        for &wire in candidates {
            let fourcc = match wire {
                WireFormat::Mjpeg => FourCC::new(b"MJPG"),
                WireFormat::Yuyv => FourCC::new(b"YUYV"),
            };
            let requested = Format::new(config.width(), config.height(), fourcc);
            let format = Capture::set_format(device, &requested)?;
            if format.fourcc == fourcc {
                return Ok((wire, format));
            }
        }

        Err(CameraError::Device(format!(
            "device does not offer {:?} at {}x{}",
            config.format(),
            config.width(),
            config.height()
        )))
    }

    /// Start the capture thread if not already running.
    ///
    /// Called on the first `recv()`.
    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Device("Device already consumed".to_string()))?;

        let driver_buffers = self.config.driver_buffers().max(1);
        let (tx, rx) = latest_frame();
        let (wire, width, height) = (self.wire, self.width, self.height);

        let handle = thread::spawn(move || {
            if let Err(e) = Self::capture_loop(device, tx, driver_buffers, wire, width, height) {
                log::error!("capture thread stopped: {e}");
            }
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);

        Ok(())
    }

    fn capture_loop(
        device: Device,
        tx: LatestSender,
        driver_buffers: u32,
        wire: WireFormat,
        width: u32,
        height: u32,
    ) -> Result<(), CameraError> {
        let mut stream =
            MmapStream::with_buffers(&device, Type::VideoCapture, driver_buffers)?;

        loop {
            let (frame_data, _metadata) = CaptureStream::next(&mut stream)?;

            let frame = match wire {
                WireFormat::Mjpeg => decode_mjpeg(frame_data),
                WireFormat::Yuyv => Self::decode_yuyv(frame_data, width, height),
            };

            // A bad frame is reported to the consumer, the stream keeps going
            if !tx.send(frame) {
                break;
            }
        }

        Ok(())
    }

    fn decode_yuyv(data: &[u8], width: u32, height: u32) -> FrameResult {
        let rgb = yuyv_to_rgb(data, width, height).ok_or_else(|| {
            CameraError::Decode(format!(
                "short YUYV frame: {} bytes for {width}x{height}",
                data.len()
            ))
        })?;
        Ok(Tensor::from_hwc(height as usize, width as usize, 3, rgb)?)
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Negotiated frame width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Negotiated frame height.
    pub fn height(&self) -> u32 {
        self.height
    }
}
