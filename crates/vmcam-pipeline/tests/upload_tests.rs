use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use std::time::Duration;
use vmcam_base::Tensor;
use vmcam_camera::{Camera, CameraError, PatternCamera};
use vmcam_pipeline::{
    Canvas, EventSink, FRAME_EVENT, FrameBuffer, FrameUploader, MemoryCanvas, MemoryDocument,
    PipelineConfig, PipelineError, PipelineState, encode_png_base64,
};

#[derive(Default)]
struct RecordingSink {
    events: Vec<(String, String)>,
}

impl EventSink for RecordingSink {
    fn push_event(&mut self, event: &str, payload: &str) {
        self.events.push((event.to_string(), payload.to_string()));
    }
}

fn document() -> MemoryDocument<MemoryCanvas> {
    MemoryDocument::new()
        .with_element("wasm-webcam")
        .with_canvas("wasm-webcam-input", MemoryCanvas::default())
}

fn decode_png(payload: &str) -> crates_image::RgbaImage {
    let png = BASE64_STANDARD.decode(payload).unwrap();
    crates_image::load_from_memory(&png).unwrap().to_rgba8()
}

#[test]
fn test_encode_png_base64_round_trips_pixels() {
    let pixels: Vec<u8> = (0..5 * 3 * 4).map(|i| i as u8).collect();
    let frame = FrameBuffer::new(5, 3, pixels.clone()).unwrap();

    let image = decode_png(&encode_png_base64(&frame).unwrap());
    assert_eq!(image.dimensions(), (5, 3));
    assert_eq!(image.into_raw(), pixels);
}

#[test]
fn test_mount_does_not_need_output_canvas_or_bytecode() {
    let uploader = FrameUploader::mount(PipelineConfig::default(), &mut document(), RecordingSink::default());
    assert!(uploader.is_ok());
}

#[test]
fn test_mount_missing_input_canvas() {
    let mut document = MemoryDocument::<MemoryCanvas>::new().with_element("wasm-webcam");
    let result = FrameUploader::mount(PipelineConfig::default(), &mut document, RecordingSink::default());
    assert!(matches!(result, Err(PipelineError::MissingElement(id)) if id == "wasm-webcam-input"));
}

#[test]
fn test_upload_frame_pushes_png_event() {
    let mut uploader =
        FrameUploader::mount(PipelineConfig::default(), &mut document(), RecordingSink::default())
            .unwrap();
    let camera = PatternCamera::new(7, 5);

    uploader.upload_frame(&camera.render(0).unwrap()).unwrap();

    let events = &uploader.sink().events;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, FRAME_EVENT);

    let image = decode_png(&events[0].1);
    assert_eq!(image.dimensions(), (7, 5));
    assert_eq!(image.as_raw().as_slice(), uploader.input().get_image_data().pixels());
}

#[tokio::test]
async fn test_camera_denied_pushes_nothing() {
    let mut uploader =
        FrameUploader::mount(PipelineConfig::default(), &mut document(), Vec::<(String, String)>::new()).unwrap();

    let denied = async { Err::<PatternCamera, _>(CameraError::AccessDenied("denied".into())) };
    uploader.run(denied, std::future::pending()).await;

    assert_eq!(uploader.state(), PipelineState::Idle);
    assert!(uploader.sink().is_empty());
}

#[tokio::test]
async fn test_run_uploads_each_tick() {
    let config = PipelineConfig::default().with_interval(Duration::from_millis(10));
    let mut uploader = FrameUploader::mount(config, &mut document(), Vec::<(String, String)>::new()).unwrap();

    let camera = async { Ok(PatternCamera::new(4, 4)) };
    uploader
        .run(camera, tokio::time::sleep(Duration::from_millis(60)))
        .await;

    assert_eq!(uploader.state(), PipelineState::Running);
    let events = uploader.into_sink();
    assert!(!events.is_empty());
    assert!(events.iter().all(|(name, _)| name == FRAME_EVENT));
}

struct FrozenCamera;

impl Camera for FrozenCamera {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_shutdown_interrupts_frozen_camera() {
    let config = PipelineConfig::default().with_interval(Duration::from_millis(10));
    let mut uploader = FrameUploader::mount(config, &mut document(), Vec::<(String, String)>::new()).unwrap();

    let camera = async { Ok(FrozenCamera) };
    let finished = tokio::time::timeout(
        Duration::from_secs(2),
        uploader.run(camera, tokio::time::sleep(Duration::from_millis(50))),
    )
    .await;

    assert!(finished.is_ok(), "run did not return after shutdown");
    assert!(uploader.into_sink().is_empty());
}
