//! Binding surface of the external tensor runtime.
//!
//! The runtime is a black box that owns its handles: devices, VM instances,
//! tensors and data buffers are created through it and must be handed back
//! through it. [`Handle`] ties each of them to a scope so they are released
//! exactly once on every exit path.

pub mod backends;
pub mod device;
pub mod element;
pub mod error;
pub mod handle;
pub mod runtime;
pub mod session;
pub mod status;

pub use backends::EchoRuntime;
pub use device::Device;
pub use element::ElementType;
pub use error::RuntimeError;
pub use handle::Handle;
pub use runtime::Runtime;
pub use session::Session;
pub use status::{Status, StatusCode};

#[cfg(feature = "onnx")]
pub use backends::OnnxRuntime;
