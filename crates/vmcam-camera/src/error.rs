use std::fmt;

#[derive(Debug)]
pub enum CameraError {
    /// The user or the OS refused access to the camera.
    AccessDenied(String),
    Device(String),
    Stream(String),
    Decode(String),
    Channel(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::AccessDenied(msg) => write!(f, "camera access denied: {msg}"),
            CameraError::Device(msg) => write!(f, "device error: {msg}"),
            CameraError::Stream(msg) => write!(f, "stream error: {msg}"),
            CameraError::Decode(msg) => write!(f, "decode error: {msg}"),
            CameraError::Channel(msg) => write!(f, "channel error: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => CameraError::AccessDenied(err.to_string()),
            _ => CameraError::Device(err.to_string()),
        }
    }
}

impl From<crates_image::ImageError> for CameraError {
    fn from(err: crates_image::ImageError) -> Self {
        CameraError::Decode(err.to_string())
    }
}

impl From<vmcam_base::TensorError> for CameraError {
    fn from(err: vmcam_base::TensorError) -> Self {
        CameraError::Stream(err.to_string())
    }
}
