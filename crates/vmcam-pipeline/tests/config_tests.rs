use std::time::Duration;
use vmcam_pipeline::{BytecodeCache, PipelineConfig, PipelineError};

#[test]
fn test_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.interval(), Duration::from_secs(1));
    assert_eq!(config.video_element(), "wasm-webcam");
    assert_eq!(config.input_canvas(), "wasm-webcam-input");
    assert_eq!(config.output_canvas(), "wasm-webcam-output");
    assert_eq!(config.bytecode_attribute(), "data-bytecode");
    assert_eq!(config.bytecode_cache(), BytecodeCache::PerSession);
    assert!(config.validate().is_ok());
}

#[test]
fn test_with_fps() {
    let config = PipelineConfig::default().with_fps(4);
    assert_eq!(config.interval(), Duration::from_millis(250));
}

#[test]
fn test_zero_fps_is_rejected() {
    let config = PipelineConfig::default().with_fps(0);
    assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
}

#[test]
fn test_empty_id_is_rejected() {
    let config = PipelineConfig::default().with_video_element("");
    assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
}

#[test]
fn test_same_input_and_output_canvas_is_rejected() {
    let config = PipelineConfig::default()
        .with_input_canvas("view")
        .with_output_canvas("view");
    assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
}
