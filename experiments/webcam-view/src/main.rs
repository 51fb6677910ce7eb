use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use minifb::{Key, Window, WindowOptions};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use vmcam_base::log;
use vmcam_camera::{CameraConfig, PatternCamera};
use vmcam_pipeline::{
    Canvas, FrameBuffer, FramePipeline, MemoryDocument, PipelineConfig, SharedCanvas,
    decode_bytecode,
};
use vmcam_runtime::Runtime;

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

/// Header of an empty WebAssembly module. The echo runtime ignores the program.
const PLACEHOLDER_BYTECODE: &str = "AGFzbQEAAAA=";

#[cfg(feature = "onnx")]
fn runtime() -> vmcam_runtime::OnnxRuntime {
    #[cfg(feature = "cuda")]
    let device = vmcam_runtime::Device::Cuda { device_id: 0 };
    #[cfg(not(feature = "cuda"))]
    let device = vmcam_runtime::Device::Cpu;
    vmcam_runtime::OnnxRuntime::new(device)
}

#[cfg(not(feature = "onnx"))]
fn runtime() -> vmcam_runtime::EchoRuntime {
    vmcam_runtime::EchoRuntime::new()
}

struct Args {
    bytecode: Option<String>,
    fps: u32,
    pattern: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        bytecode: None,
        fps: 1,
        pattern: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pattern" => args.pattern = true,
            "--fps" => {
                let value = iter.next().ok_or("--fps needs a value")?;
                args.fps = value
                    .parse()
                    .map_err(|_| format!("invalid --fps value: {value}"))?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path => args.bytecode = Some(path.to_string()),
        }
    }

    Ok(args)
}

/// Read a program file. Base64 text is used as is, anything else is encoded.
fn load_bytecode(path: &str) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    match std::str::from_utf8(&bytes) {
        Ok(text) if decode_bytecode(text).is_ok() => Ok(text.trim().to_string()),
        _ => Ok(BASE64_STANDARD.encode(&bytes)),
    }
}

/// Copy an RGBA frame into the packed 0RGB window buffer, starting at column `x0`.
fn blit(buffer: &mut [u32], stride: usize, x0: usize, frame: &FrameBuffer) {
    let w = (frame.width() as usize).min(WIDTH);
    let h = (frame.height() as usize).min(HEIGHT);
    let src_stride = frame.width() as usize * 4;

    for y in 0..h {
        let src = &frame.pixels()[y * src_stride..][..w * 4];
        let dst = &mut buffer[y * stride + x0..][..w];
        for (px, rgba) in dst.iter_mut().zip(src.chunks_exact(4)) {
            *px = (rgba[0] as u32) << 16 | (rgba[1] as u32) << 8 | rgba[2] as u32;
        }
    }
}

async fn sample<R, C, S>(
    pipeline: &mut FramePipeline<R, C>,
    camera_config: CameraConfig,
    pattern: bool,
    shutdown: S,
) where
    R: Runtime,
    C: Canvas,
    S: Future<Output = ()>,
{
    #[cfg(feature = "v4l2")]
    if !pattern {
        let acquire = async move { vmcam_camera::V4l2Camera::new(camera_config) };
        pipeline.run(acquire, shutdown).await;
        return;
    }

    #[cfg(not(feature = "v4l2"))]
    if !pattern {
        log::warn!("built without v4l2, showing the test pattern");
    }

    let acquire = async move { Ok(PatternCamera::from_config(&camera_config)) };
    pipeline.run(acquire, shutdown).await;
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    vmcam_base::init_stdout_logger();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("Usage: webcam-view [program] [--fps N] [--pattern]");
            std::process::exit(1);
        }
    };

    let encoded = match &args.bytecode {
        Some(path) => load_bytecode(path)?,
        None => {
            log::warn!("no program given, using an empty module");
            PLACEHOLDER_BYTECODE.to_string()
        }
    };

    let config = PipelineConfig::default().with_fps(args.fps);
    let input = SharedCanvas::new(WIDTH as u32, HEIGHT as u32);
    let output = SharedCanvas::new(WIDTH as u32, HEIGHT as u32);
    let mut document = MemoryDocument::new()
        .with_attribute(config.video_element(), config.bytecode_attribute(), encoded)
        .with_canvas(config.input_canvas(), input.clone())
        .with_canvas(config.output_canvas(), output.clone());

    let mut pipeline = FramePipeline::mount(config, Arc::new(runtime()), &mut document)?;

    let camera_config = CameraConfig::default()
        .with_width(WIDTH as u32)
        .with_height(HEIGHT as u32);
    let pattern = args.pattern;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let worker = std::thread::spawn(move || -> std::io::Result<()> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let shutdown = async {
            let _ = stop_rx.await;
        };
        rt.block_on(sample(&mut pipeline, camera_config, pattern, shutdown));
        pipeline.teardown();
        Ok(())
    });

    let mut window = Window::new(
        "webcam-view: input | output - ESC to exit",
        WIDTH * 2,
        HEIGHT,
        WindowOptions::default(),
    )?;
    window.set_target_fps(30);

    let mut buffer = vec![0u32; WIDTH * 2 * HEIGHT];
    while window.is_open() && !window.is_key_down(Key::Escape) {
        if worker.is_finished() {
            log::warn!("pipeline stopped");
            break;
        }
        blit(&mut buffer, WIDTH * 2, 0, &input.get_image_data());
        blit(&mut buffer, WIDTH * 2, WIDTH, &output.get_image_data());
        window.update_with_buffer(&buffer, WIDTH * 2, HEIGHT)?;
    }

    let _ = stop_tx.send(());
    match worker.join() {
        Ok(result) => result?,
        Err(_) => log::error!("pipeline thread panicked"),
    }

    log::info!("exiting");
    Ok(())
}
