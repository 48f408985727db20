//! Presentation targets for a drawn frame
//!
//! Scenes and the frame loop draw into a [`Canvas`] and never care where the
//! pixels end up. A [`Renderer`] owns that canvas and knows how to make it
//! visible:
//!
//! ```text
//! Scene -> Canvas -> Renderer::present -> { FrameBuffer (device), HeadlessRenderer (memory) }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use rawdraw_core::graphics::{Color, PixelFormat};
//! use rawdraw_core::renderer::{HeadlessRenderer, Renderer};
//!
//! let mut renderer = HeadlessRenderer::new(64, 48, PixelFormat::Bgra8888);
//! renderer.canvas_mut().fill_rect(0, 0, 8, 8, Color::RED);
//! renderer.present().unwrap();
//! assert_eq!(renderer.frames_presented(), 1);
//! ```

use crate::error::DeviceError;
use crate::framebuffer::FrameBuffer;
use crate::graphics::PixelFormat;
use crate::raster::Canvas;

pub trait Renderer: Send {
    fn canvas(&self) -> &Canvas;

    fn canvas_mut(&mut self) -> &mut Canvas;

    /// Make the current canvas contents visible.
    fn present(&mut self) -> Result<(), DeviceError>;

    /// Human-readable target name for logs
    fn name(&self) -> &str;

    fn width(&self) -> i32 {
        self.canvas().width()
    }

    fn height(&self) -> i32 {
        self.canvas().height()
    }
}

impl Renderer for FrameBuffer {
    fn canvas(&self) -> &Canvas {
        FrameBuffer::canvas(self)
    }

    fn canvas_mut(&mut self) -> &mut Canvas {
        FrameBuffer::canvas_mut(self)
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        self.swap_buffers();
        Ok(())
    }

    fn name(&self) -> &str {
        "Framebuffer Device"
    }
}

/// In-memory target that keeps a copy of the last presented frame.
pub struct HeadlessRenderer {
    canvas: Canvas,
    front: Vec<u8>,
    frames: u64,
}

impl HeadlessRenderer {
    pub fn new(width: i32, height: i32, format: PixelFormat) -> Self {
        let canvas = Canvas::with_format(width, height, format);
        let front = vec![0; canvas.as_bytes().len()];
        Self {
            canvas,
            front,
            frames: 0,
        }
    }

    /// Bytes of the last presented frame.
    pub fn front_buffer(&self) -> &[u8] {
        &self.front
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }
}

impl Renderer for HeadlessRenderer {
    fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        self.front.copy_from_slice(self.canvas.as_bytes());
        self.canvas.clear_dirty();
        self.frames += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "Headless Renderer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Color;

    #[test]
    fn test_headless_renderer_creation() {
        let renderer = HeadlessRenderer::new(256, 240, PixelFormat::Rgb565);
        assert_eq!(renderer.width(), 256);
        assert_eq!(renderer.height(), 240);
        assert_eq!(renderer.front_buffer().len(), 256 * 240 * 2);
        assert_eq!(renderer.name(), "Headless Renderer");
    }

    #[test]
    fn test_present_copies_back_buffer() {
        let mut renderer = HeadlessRenderer::new(16, 16, PixelFormat::Bgra8888);
        renderer.canvas_mut().clear(Color::BLUE);
        assert!(renderer.front_buffer().iter().all(|&b| b == 0));

        renderer.present().unwrap();
        assert_eq!(renderer.front_buffer(), renderer.canvas().as_bytes());
        assert_eq!(renderer.frames_presented(), 1);
    }

    #[test]
    fn test_present_resets_dirty_regions() {
        let mut renderer = HeadlessRenderer::new(16, 16, PixelFormat::Bgra8888);
        renderer.canvas_mut().fill_rect(1, 1, 4, 4, Color::RED);
        assert_eq!(renderer.canvas().dirty_regions().len(), 1);

        renderer.present().unwrap();
        assert!(renderer.canvas().dirty_regions().is_empty());
    }
}
