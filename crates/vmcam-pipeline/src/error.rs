use std::fmt;
use vmcam_camera::CameraError;
use vmcam_runtime::RuntimeError;

#[derive(Debug)]
pub enum PipelineError {
    Config(String),
    MissingElement(String),
    MissingAttribute { element: String, attribute: String },
    Bytecode(String),
    Frame(String),
    Camera(CameraError),
    Runtime(RuntimeError),
    /// The runtime returned OK but no output tensor.
    NoOutput,
    /// The output tensor does not hold one RGBA sample per input pixel.
    OutputSize { expected: usize, got: usize },
    Encode(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(msg) => write!(f, "config error: {msg}"),
            PipelineError::MissingElement(id) => write!(f, "missing element: #{id}"),
            PipelineError::MissingAttribute { element, attribute } => {
                write!(f, "missing attribute {attribute} on #{element}")
            }
            PipelineError::Bytecode(msg) => write!(f, "bytecode error: {msg}"),
            PipelineError::Frame(msg) => write!(f, "frame error: {msg}"),
            PipelineError::Camera(err) => write!(f, "camera error: {err}"),
            PipelineError::Runtime(err) => write!(f, "runtime error: {err}"),
            PipelineError::NoOutput => write!(f, "runtime returned no outputs"),
            PipelineError::OutputSize { expected, got } => {
                write!(f, "output size mismatch: expected {expected} bytes, got {got}")
            }
            PipelineError::Encode(msg) => write!(f, "encode error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<CameraError> for PipelineError {
    fn from(err: CameraError) -> Self {
        PipelineError::Camera(err)
    }
}

impl From<RuntimeError> for PipelineError {
    fn from(err: RuntimeError) -> Self {
        PipelineError::Runtime(err)
    }
}

impl From<vmcam_base::TensorError> for PipelineError {
    fn from(err: vmcam_base::TensorError) -> Self {
        PipelineError::Frame(err.to_string())
    }
}

impl From<base64::DecodeError> for PipelineError {
    fn from(err: base64::DecodeError) -> Self {
        PipelineError::Bytecode(err.to_string())
    }
}

impl From<crates_image::ImageError> for PipelineError {
    fn from(err: crates_image::ImageError) -> Self {
        PipelineError::Encode(err.to_string())
    }
}
