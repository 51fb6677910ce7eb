//! Shared primitives for the vmcam crates: HWC pixel tensors and the log backends.

pub mod logging;
pub mod tensor;

pub use logging::{
    init_file_logger, init_stdout_logger, level_from_env, FileLogger, StdoutLogger, LOG_ENV,
};
pub use tensor::{Tensor, TensorError};

// Re-export log crate so downstream crates can use vmcam_base::log::*
pub use log;
