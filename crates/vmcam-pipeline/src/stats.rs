use std::fmt;

/// Per-session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Sampling ticks, skipped ones included.
    pub ticks: u64,
    /// Ticks dropped because the previous call was still running.
    pub skipped: u64,
    pub rendered: u64,
    /// Ticks whose call or conversion failed; nothing was rendered.
    pub failed: u64,
    /// Ticks that produced no usable camera frame.
    pub capture_errors: u64,
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} skipped={} rendered={} failed={} capture_errors={}",
            self.ticks, self.skipped, self.rendered, self.failed, self.capture_errors
        )
    }
}
