use crate::bytecode::BytecodeStore;
use crate::sampler::{acquire_camera, ticker};
use crate::{
    Canvas, Document, FrameBuffer, PipelineConfig, PipelineError, PipelineStats, SingleSlot,
    SlotPermit,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use vmcam_base::Tensor;
use vmcam_camera::{Camera, CameraError};
use vmcam_runtime::{ElementType, Runtime, RuntimeError, Session};

type FrameResult = Result<FrameBuffer, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Mounted, waiting for camera access.
    Idle,
    /// Sampling loop active.
    Running,
}

/// Bridges a camera to a runtime and renders its output, one frame per tick.
///
/// Lifecycle: [`mount`](Self::mount) opens the runtime session, [`run`](Self::run)
/// acquires the camera and samples until shutdown, [`teardown`](Self::teardown)
/// releases the session. Dropping the pipeline releases it as well.
pub struct FramePipeline<R: Runtime, C: Canvas> {
    config: PipelineConfig,
    bytecode: BytecodeStore<R>,
    session: Arc<Session<R>>,
    input: C,
    output: C,
    slot: SingleSlot,
    state: PipelineState,
    stats: PipelineStats,
}

/// Everything one runtime call needs, detached from the pipeline so it can
/// run off the sampling loop.
struct InferenceJob<R: Runtime> {
    session: Arc<Session<R>>,
    bytecode: BytecodeStore<R>,
    input: FrameBuffer,
}

impl<R: Runtime> InferenceJob<R> {
    /// Every handle created here is released before returning, on both paths.
    fn run(self) -> FrameResult {
        let bytecode = self.bytecode.acquire(&self.session)?;
        let tensor = self.session.create_tensor(
            self.input.pixels(),
            &self.input.shape(),
            ElementType::U8,
        )?;

        let outputs = self.session.call(bytecode.handle(), &[&tensor])?;
        let first = outputs.first().ok_or(PipelineError::NoOutput)?;
        let pixels = self.session.to_flat_array(first)?;

        let expected = self.input.pixels().len();
        if pixels.len() != expected {
            return Err(PipelineError::OutputSize {
                expected,
                got: pixels.len(),
            });
        }
        FrameBuffer::new(self.input.width(), self.input.height(), pixels)
    }
}

impl<R: Runtime, C: Canvas> FramePipeline<R, C> {
    /// Look up the elements named in `config`, decode the bytecode attribute
    /// and open the runtime session.
    ///
    /// # Errors
    ///
    /// - `PipelineError::Config` for an invalid config
    /// - `PipelineError::MissingElement` / `MissingAttribute` if the document
    ///   lacks the video element, a canvas or the bytecode attribute
    /// - `PipelineError::Bytecode` for malformed base64
    /// - `PipelineError::Runtime` if the device or VM instance cannot be created
    pub fn mount<D>(
        config: PipelineConfig,
        runtime: Arc<R>,
        document: &mut D,
    ) -> Result<Self, PipelineError>
    where
        D: Document<Canvas = C>,
    {
        config.validate()?;

        let video = config.video_element();
        if !document.has_element(video) {
            return Err(PipelineError::MissingElement(video.to_string()));
        }
        let encoded = document
            .attribute(video, config.bytecode_attribute())
            .ok_or_else(|| PipelineError::MissingAttribute {
                element: video.to_string(),
                attribute: config.bytecode_attribute().to_string(),
            })?;
        let input = document
            .take_canvas(config.input_canvas())
            .ok_or_else(|| PipelineError::MissingElement(config.input_canvas().to_string()))?;
        let output = document
            .take_canvas(config.output_canvas())
            .ok_or_else(|| PipelineError::MissingElement(config.output_canvas().to_string()))?;

        let runtime_name = runtime.name().to_string();
        let session = Session::open(runtime)?;
        let bytecode = BytecodeStore::new(config.bytecode_cache(), &encoded, &session)?;

        log::info!(
            "pipeline mounted on #{video} with {runtime_name} runtime, sampling every {:?}",
            config.interval()
        );

        Ok(Self {
            config,
            bytecode,
            session: Arc::new(session),
            input,
            output,
            slot: SingleSlot::new(),
            state: PipelineState::Idle,
            stats: PipelineStats::default(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// The input preview canvas.
    pub fn input(&self) -> &C {
        &self.input
    }

    pub fn output(&self) -> &C {
        &self.output
    }

    /// Acquire the camera, then sample until `shutdown` resolves.
    ///
    /// If camera access fails the error is logged and the pipeline stays
    /// `Idle`. Otherwise it enters `Running` and, on every tick, captures a
    /// frame and starts one runtime call unless the previous call is still
    /// running, in which case the tick is skipped. Results are rendered as
    /// they arrive. Shutdown also interrupts a capture that is waiting on the
    /// camera. The in-flight call, if any, is awaited and rendered before
    /// returning.
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
        log::info!("camera granted, pipeline running");

        let (results_tx, mut results_rx) = mpsc::channel::<FrameResult>(1);
        let mut ticks = ticker(self.config.interval());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticks.tick() => {
                    let Some(permit) = self.begin_tick() else {
                        continue;
                    };
                    // A stalled camera must not hold off shutdown
                    let frame = tokio::select! {
                        _ = &mut shutdown => break,
                        frame = camera.recv() => frame,
                    };
                    self.dispatch(permit, frame, &results_tx);
                }
                Some(result) = results_rx.recv() => {
                    let _ = self.finish(result);
                }
            }
        }

        // Each job owns a sender clone, so this drains exactly the jobs still running
        drop(results_tx);
        while let Some(result) = results_rx.recv().await {
            let _ = self.finish(result);
        }
        log::info!("sampling stopped: {}", self.stats);
    }

    /// Count the tick and claim the slot, or count it as skipped.
    fn begin_tick(&mut self) -> Option<SlotPermit> {
        self.stats.ticks += 1;
        let permit = self.slot.try_acquire();
        if permit.is_none() {
            self.stats.skipped += 1;
            log::debug!("tick skipped: previous call still running");
        }
        permit
    }

    /// Snapshot `frame` and hand the runtime call to the blocking pool. The
    /// slot stays taken until the result is queued for rendering.
    fn dispatch(
        &mut self,
        permit: SlotPermit,
        frame: Result<Tensor<u8>, CameraError>,
        results: &mpsc::Sender<FrameResult>,
    ) {
        let input = match frame.map_err(PipelineError::from).and_then(|f| self.snapshot(&f)) {
            Ok(input) => input,
            Err(err) => {
                self.stats.capture_errors += 1;
                log::warn!("frame capture failed: {err}");
                return;
            }
        };

        let job = self.job(input);
        let results = results.clone();
        tokio::task::spawn_blocking(move || {
            let result = job.run();
            let _ = results.blocking_send(result);
            drop(permit);
        });
    }

    /// Draw the camera frame onto the input canvas and read it back.
    fn snapshot(&mut self, frame: &Tensor<u8>) -> FrameResult {
        let frame = FrameBuffer::from_tensor(frame)?;
        self.input.draw_frame(&frame);
        Ok(self.input.get_image_data())
    }

    fn job(&self, input: FrameBuffer) -> InferenceJob<R> {
        InferenceJob {
            session: self.session.clone(),
            bytecode: self.bytecode.clone(),
            input,
        }
    }

    /// Render a successful result; log a failed one and leave the output as is.
    fn finish(&mut self, result: FrameResult) -> Result<(), PipelineError> {
        match result {
            Ok(frame) => {
                self.output.draw_frame(&frame);
                self.stats.rendered += 1;
                Ok(())
            }
            Err(err) => {
                self.stats.failed += 1;
                match &err {
                    PipelineError::Runtime(RuntimeError::Call(status)) => {
                        log::error!("inference call failed: {}", status.message());
                    }
                    other => log::error!("frame skipped: {other}"),
                }
                Err(err)
            }
        }
    }

    /// Run one tick synchronously on `frame`: snapshot, call, render.
    ///
    /// Returns the error that kept the frame from rendering, after logging it.
    pub fn process_frame(&mut self, frame: &Tensor<u8>) -> Result<(), PipelineError> {
        self.stats.ticks += 1;
        let input = self.snapshot(frame).inspect_err(|_| self.stats.capture_errors += 1)?;
        let result = self.job(input).run();
        self.finish(result)
    }

    /// Release the bytecode buffer and the runtime session.
    ///
    /// If a call is still running on another thread, its references keep the
    /// session alive and the handles are released when it finishes.
    pub fn teardown(self) {
        let FramePipeline {
            bytecode,
            session,
            stats,
            ..
        } = self;

        drop(bytecode);
        match Arc::try_unwrap(session) {
            Ok(session) => session.close(),
            Err(shared) => {
                log::warn!("teardown while a call is in flight; release deferred");
                drop(shared);
            }
        }
        log::info!("pipeline torn down: {stats}");
    }
}
