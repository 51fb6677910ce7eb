use crate::CameraError;
use vmcam_base::Tensor;

/// Async camera trait for frame capture.
///
/// Implementations return the most recent frame as a `Tensor<u8>` in HWC
/// layout `[height, width, channels]`, with 3 (RGB) or 4 (RGBA) channels.
/// The frame dimensions are the stream's negotiated width and height.
#[allow(async_fn_in_trait)]
pub trait Camera {
    /// Receive the next frame from the camera.
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError>;
}
