//! Frame pipeline adapter.
//!
//! Samples a camera at a fixed interval, hands each frame to an external
//! tensor runtime and renders the runtime's output to a canvas:
//!
//! camera → sampler → input canvas → `FrameBuffer` → runtime tensor → `call`
//! → output tensor → `FrameBuffer` → output canvas
//!
//! [`FrameUploader`] is the capture-only variant that pushes each sampled frame
//! as a base64 PNG event instead of running inference.

pub mod bytecode;
pub mod canvas;
pub mod config;
pub mod document;
pub mod error;
pub mod frame;
pub mod pipeline;
mod sampler;
pub mod slot;
pub mod stats;
pub mod upload;

pub use bytecode::{decode_bytecode, BytecodeStore};
pub use canvas::{Canvas, MemoryCanvas, SharedCanvas};
pub use config::{BytecodeCache, PipelineConfig};
pub use document::{Document, MemoryDocument};
pub use error::PipelineError;
pub use frame::FrameBuffer;
pub use pipeline::{FramePipeline, PipelineState};
pub use slot::{SingleSlot, SlotPermit};
pub use stats::PipelineStats;
pub use upload::{encode_png_base64, EventSink, FrameUploader, FRAME_EVENT};
