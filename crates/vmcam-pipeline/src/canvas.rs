use crate::FrameBuffer;
use crate::frame::{byte_len, CHANNELS};
use std::sync::{Arc, Mutex, MutexGuard};

/// A 2D RGBA drawing surface.
pub trait Canvas {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Change the canvas size. Like an HTML canvas, resizing clears it.
    fn resize(&mut self, width: u32, height: u32);

    /// Write `frame` with its top-left corner at (0, 0). Pixels outside the
    /// canvas are clipped.
    fn put_image_data(&mut self, frame: &FrameBuffer);

    /// Read back the whole canvas.
    fn get_image_data(&self) -> FrameBuffer;

    /// Size the canvas to `frame` and draw it.
    fn draw_frame(&mut self, frame: &FrameBuffer) {
        if self.width() != frame.width() || self.height() != frame.height() {
            self.resize(frame.width(), frame.height());
        }
        self.put_image_data(frame);
    }
}

/// A canvas backed by a pixel buffer in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl MemoryCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; byte_len(width, height)],
        }
    }
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        // HTML canvas default size
        Self::new(300, 150)
    }
}

impl Canvas for MemoryCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = MemoryCanvas::new(width, height);
    }

    fn put_image_data(&mut self, frame: &FrameBuffer) {
        let rows = self.height.min(frame.height()) as usize;
        let row_bytes = self.width.min(frame.width()) as usize * CHANNELS;
        let dst_stride = self.width as usize * CHANNELS;
        let src_stride = frame.width() as usize * CHANNELS;

        for row in 0..rows {
            let src = &frame.pixels()[row * src_stride..][..row_bytes];
            self.pixels[row * dst_stride..][..row_bytes].copy_from_slice(src);
        }
    }

    fn get_image_data(&self) -> FrameBuffer {
        FrameBuffer::from_raw(self.width, self.height, self.pixels.clone())
    }
}

/// A `MemoryCanvas` that can be drawn by the pipeline and read elsewhere,
/// e.g. by a window presenting it.
#[derive(Debug, Clone, Default)]
pub struct SharedCanvas {
    inner: Arc<Mutex<MemoryCanvas>>,
}

impl SharedCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryCanvas::new(width, height))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryCanvas> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Canvas for SharedCanvas {
    fn width(&self) -> u32 {
        self.lock().width()
    }

    fn height(&self) -> u32 {
        self.lock().height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.lock().resize(width, height);
    }

    fn put_image_data(&mut self, frame: &FrameBuffer) {
        self.lock().put_image_data(frame);
    }

    fn get_image_data(&self) -> FrameBuffer {
        self.lock().get_image_data()
    }
}
