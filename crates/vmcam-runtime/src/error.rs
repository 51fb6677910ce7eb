use crate::Status;
use std::fmt;

#[derive(Debug)]
pub enum RuntimeError {
    Device(String),
    Instance(String),
    Tensor(String),
    Buffer(String),
    UnsupportedType(String),
    /// `call` returned a non-OK status.
    Call(Status),
    Backend(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Device(msg) => write!(f, "device error: {msg}"),
            RuntimeError::Instance(msg) => write!(f, "vm instance error: {msg}"),
            RuntimeError::Tensor(msg) => write!(f, "tensor error: {msg}"),
            RuntimeError::Buffer(msg) => write!(f, "data buffer error: {msg}"),
            RuntimeError::UnsupportedType(tag) => write!(f, "unsupported element type: {tag}"),
            RuntimeError::Call(status) => write!(f, "call failed: {status}"),
            RuntimeError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<Status> for RuntimeError {
    fn from(status: Status) -> Self {
        RuntimeError::Call(status)
    }
}
