pub mod echo;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use echo::{EchoRuntime, HandleCounts, HandleKind};

#[cfg(feature = "onnx")]
pub use onnx::OnnxRuntime;
