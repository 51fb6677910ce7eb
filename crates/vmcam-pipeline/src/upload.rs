use crate::sampler::{acquire_camera, ticker};
use crate::{Canvas, Document, FrameBuffer, PipelineConfig, PipelineError, PipelineState, PipelineStats};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use crates_image::codecs::png::PngEncoder;
use crates_image::{ExtendedColorType, ImageEncoder};
use std::future::Future;
use vmcam_base::Tensor;
use vmcam_camera::{Camera, CameraError};

/// Name of the event carrying one uploaded frame.
pub const FRAME_EVENT: &str = "frame";

/// Receiver of pushed events, e.g. a UI framework's socket.
pub trait EventSink {
    fn push_event(&mut self, event: &str, payload: &str);
}

impl EventSink for Vec<(String, String)> {
    fn push_event(&mut self, event: &str, payload: &str) {
        self.push((event.to_string(), payload.to_string()));
    }
}

/// Encode `frame` as PNG and return the base64 text, without a data URL prefix.
pub fn encode_png_base64(frame: &FrameBuffer) -> Result<String, PipelineError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        frame.pixels(),
        frame.width(),
        frame.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(BASE64_STANDARD.encode(png))
}

/// Capture-only mode: every tick, snapshot the camera to the input canvas and
/// push it to an [`EventSink`] as a base64 PNG under [`FRAME_EVENT`].
///
/// No runtime is involved. Encoding runs on the sampling loop itself, so a
/// slow encode delays the next tick and missed ticks are dropped.
pub struct FrameUploader<C: Canvas, E: EventSink> {
    config: PipelineConfig,
    input: C,
    sink: E,
    state: PipelineState,
    stats: PipelineStats,
}

impl<C: Canvas, E: EventSink> FrameUploader<C, E> {
    /// Needs the video element and the input canvas; the output canvas and the
    /// bytecode attribute are not used.
    pub fn mount<D>(config: PipelineConfig, document: &mut D, sink: E) -> Result<Self, PipelineError>
    where
        D: Document<Canvas = C>,
    {
        config.validate()?;

        if !document.has_element(config.video_element()) {
            return Err(PipelineError::MissingElement(config.video_element().to_string()));
        }
        let input = document
            .take_canvas(config.input_canvas())
            .ok_or_else(|| PipelineError::MissingElement(config.input_canvas().to_string()))?;

        log::info!(
            "frame uploader mounted on #{}, sampling every {:?}",
            config.video_element(),
            config.interval()
        );

        Ok(Self {
            config,
            input,
            sink,
            state: PipelineState::Idle,
            stats: PipelineStats::default(),
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn input(&self) -> &C {
        &self.input
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn into_sink(self) -> E {
        self.sink
    }

    /// Snapshot one camera frame and push it.
    pub fn upload_frame(&mut self, frame: &Tensor<u8>) -> Result<(), PipelineError> {
        self.stats.ticks += 1;

        let snapshot = FrameBuffer::from_tensor(frame)
            .map(|frame| {
                self.input.draw_frame(&frame);
                self.input.get_image_data()
            })
            .inspect_err(|_| self.stats.capture_errors += 1)?;

        match encode_png_base64(&snapshot) {
            Ok(payload) => {
                self.sink.push_event(FRAME_EVENT, &payload);
                self.stats.rendered += 1;
                Ok(())
            }
            Err(err) => {
                self.stats.failed += 1;
                log::error!("frame upload failed: {err}");
                Err(err)
            }
        }
    }

    /// Acquire the camera, then upload one frame per tick until `shutdown`
    /// resolves. A refused camera is logged and leaves the uploader `Idle`.
    pub async fn run<Cam, A, S>(&mut self, acquire: A, shutdown: S)
    where
        Cam: Camera,
        A: Future<Output = Result<Cam, CameraError>>,
        S: Future<Output = ()>,
    {
        let Some(mut camera) = acquire_camera(acquire).await else {
            return;
        };
        self.state = PipelineState::Running;

        let mut ticks = ticker(self.config.interval());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticks.tick() => {
                    let frame = tokio::select! {
                        _ = &mut shutdown => break,
                        frame = camera.recv() => frame,
                    };
                    match frame {
                        Ok(frame) => {
                            let _ = self.upload_frame(&frame);
                        }
                        Err(err) => {
                            self.stats.ticks += 1;
                            self.stats.capture_errors += 1;
                            log::warn!("frame capture failed: {err}");
                        }
                    }
                }
            }
        }
        log::info!("upload stopped: {}", self.stats);
    }
}

