//! Camera capture for vmcam.
//!
//! A `Camera` yields frames as `Tensor<u8>` in HWC layout. Backends:
//! - `PatternCamera`: synthetic frames, no hardware required
//! - `LatestReceiver`: newest-frame handoff from a capture thread
//! - `V4l2Camera` (feature `v4l2`): Linux video devices

pub mod config;
pub mod convert;
pub mod decode;
pub mod error;
pub mod latest;
pub mod pattern;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::{CameraConfig, CaptureFormat};
pub use convert::{rgb_to_rgba, yuyv_to_rgb};
pub use decode::decode_mjpeg;
pub use error::CameraError;
pub use latest::{LatestReceiver, LatestSender, latest_frame};
pub use pattern::PatternCamera;
pub use traits::Camera;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
