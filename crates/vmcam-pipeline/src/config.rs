use crate::PipelineError;
use std::time::Duration;

/// When the base64 bytecode attribute is decoded into a runtime buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BytecodeCache {
    /// Decode once at mount, keep one buffer until teardown.
    #[default]
    PerSession,
    /// Decode and create a fresh buffer on every tick, release it after the tick.
    PerFrame,
}

/// Configuration for the frame pipeline and the frame uploader.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    interval: Duration,
    video_element: String,
    input_canvas: String,
    output_canvas: String,
    bytecode_attribute: String,
    bytecode_cache: BytecodeCache,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            video_element: "wasm-webcam".to_string(),
            input_canvas: "wasm-webcam-input".to_string(),
            output_canvas: "wasm-webcam-output".to_string(),
            bytecode_attribute: "data-bytecode".to_string(),
            bytecode_cache: BytecodeCache::default(),
        }
    }
}

impl PipelineConfig {
    /// Sample `fps` frames per second. `0` is rejected by `validate`.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.interval = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };
        self
    }

    /// Set the sampling interval directly.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_video_element(mut self, id: impl Into<String>) -> Self {
        self.video_element = id.into();
        self
    }

    pub fn with_input_canvas(mut self, id: impl Into<String>) -> Self {
        self.input_canvas = id.into();
        self
    }

    pub fn with_output_canvas(mut self, id: impl Into<String>) -> Self {
        self.output_canvas = id.into();
        self
    }

    pub fn with_bytecode_attribute(mut self, name: impl Into<String>) -> Self {
        self.bytecode_attribute = name.into();
        self
    }

    pub fn with_bytecode_cache(mut self, cache: BytecodeCache) -> Self {
        self.bytecode_cache = cache;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn video_element(&self) -> &str {
        &self.video_element
    }

    pub fn input_canvas(&self) -> &str {
        &self.input_canvas
    }

    pub fn output_canvas(&self) -> &str {
        &self.output_canvas
    }

    pub fn bytecode_attribute(&self) -> &str {
        &self.bytecode_attribute
    }

    pub fn bytecode_cache(&self) -> BytecodeCache {
        self.bytecode_cache
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.interval.is_zero() {
            return Err(PipelineError::Config(
                "sampling interval must be positive".to_string(),
            ));
        }
        for (name, id) in [
            ("video element", &self.video_element),
            ("input canvas", &self.input_canvas),
            ("output canvas", &self.output_canvas),
            ("bytecode attribute", &self.bytecode_attribute),
        ] {
            if id.is_empty() {
                return Err(PipelineError::Config(format!("{name} id is empty")));
            }
        }
        if self.input_canvas == self.output_canvas {
            return Err(PipelineError::Config(format!(
                "input and output canvas are both #{}",
                self.input_canvas
            )));
        }
        Ok(())
    }
}
