//! Software back buffer and drawing primitives
//!
//! A [`Canvas`] holds the pixels of one frame in device byte order. All
//! primitives clip silently against `[0, width) x [0, height)`, so callers
//! never need to bounds-check geometry. Pixel `(x, y)` lives at byte offset
//! `(y * width + x) * bytes_per_pixel`.

use crate::display::DisplayDescriptor;
use crate::error::DeviceError;
use crate::graphics::font::{self, GLYPH_SIZE};
use crate::graphics::{Color, PixelFormat, Point, Rect};

/// Smallest supported text height in pixels
pub const MIN_FONT_SIZE: i32 = 8;

/// Largest border `draw_rect` will draw
pub const MAX_BORDER_WIDTH: i32 = 10;

pub struct Canvas {
    width: i32,
    height: i32,
    format: PixelFormat,
    bytes_per_pixel: usize,
    pixels: Vec<u8>,
    dirty: Vec<Rect>,
}

impl Canvas {
    /// Allocate a zeroed back buffer for the visible area of `descriptor`.
    pub fn new(descriptor: &DisplayDescriptor) -> Result<Self, DeviceError> {
        descriptor.validate()?;
        let format = descriptor.pixel_format()?;
        Ok(Self::with_format(
            descriptor.width as i32,
            descriptor.height as i32,
            format,
        ))
    }

    pub fn with_format(width: i32, height: i32, format: PixelFormat) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let bytes_per_pixel = format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            bytes_per_pixel,
            pixels: vec![0; width as usize * height as usize * bytes_per_pixel],
            dirty: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw back buffer in device byte order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Rectangles touched by recording primitives since the last commit.
    pub fn dirty_regions(&self) -> &[Rect] {
        &self.dirty
    }

    /// Forget recorded dirty rectangles; presenting a frame does this.
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.bytes_per_pixel
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Decoded color at `(x, y)`, or `None` off-screen.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let offset = self.offset(x, y);
        Some(
            self.format
                .decode(&self.pixels[offset..offset + self.bytes_per_pixel]),
        )
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let packed = self.format.encode(color);
        let offset = self.offset(x, y);
        self.pixels[offset..offset + self.bytes_per_pixel].copy_from_slice(packed.as_bytes());
    }

    /// Write one already-clipped horizontal run.
    #[inline]
    fn write_span(&mut self, y: i32, x_start: i32, x_end: i32, bytes: &[u8]) {
        let start = self.offset(x_start, y);
        let end = self.offset(x_end, y);
        for chunk in self.pixels[start..end].chunks_exact_mut(self.bytes_per_pixel) {
            chunk.copy_from_slice(bytes);
        }
    }

    /// Fill the whole back buffer. Not recorded as dirty.
    pub fn clear(&mut self, color: Color) {
        let packed = self.format.encode(color);
        for chunk in self.pixels.chunks_exact_mut(self.bytes_per_pixel) {
            chunk.copy_from_slice(packed.as_bytes());
        }
    }

    /// Fill `rect` without recording it as dirty.
    pub fn clear_rect(&mut self, rect: Rect, color: Color) {
        let x_start = rect.x.max(0);
        let x_end = rect.x.saturating_add(rect.width).min(self.width);
        let y_start = rect.y.max(0);
        let y_end = rect.y.saturating_add(rect.height).min(self.height);
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        let packed = self.format.encode(color);
        for y in y_start..y_end {
            self.write_span(y, x_start, x_end, packed.as_bytes());
        }
    }

    /// Fill a rectangle and record the requested (unclipped) area as dirty.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let rect = Rect::new(x, y, width, height);
        self.clear_rect(rect, color);
        self.dirty.push(rect);
    }

    /// Draw a border of `border_width` concentric one-pixel rings.
    ///
    /// `border_width` is clamped to `1..=MAX_BORDER_WIDTH`.
    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        border_width: i32,
        color: Color,
    ) {
        let border_width = border_width.clamp(1, MAX_BORDER_WIDTH);
        let outer = Rect::new(x, y, width, height);
        let (x, y, width, height) = (x as i64, y as i64, width as i64, height as i64);

        for i in 0..border_width as i64 {
            let top = y + i;
            let bottom = y + height - 1 - i;
            let left = x + i;
            let right = x + width - 1 - i;

            self.hline(saturate(left), saturate(right), saturate(top), color);
            if bottom != top {
                self.hline(saturate(left), saturate(right), saturate(bottom), color);
            }
            self.vline(saturate(left), saturate(top), saturate(bottom), color);
            if right != left {
                self.vline(saturate(right), saturate(top), saturate(bottom), color);
            }
        }

        self.dirty.push(outer);
    }

    /// Inclusive horizontal line, clipped.
    fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Color) {
        if y < 0 || y >= self.height {
            return;
        }
        let start = x0.max(0);
        let end = x1.min(self.width - 1);
        if start > end {
            return;
        }
        let packed = self.format.encode(color);
        self.write_span(y, start, end + 1, packed.as_bytes());
    }

    /// Inclusive vertical line, clipped.
    fn vline(&mut self, x: i32, y0: i32, y1: i32, color: Color) {
        if x < 0 || x >= self.width {
            return;
        }
        for y in y0.max(0)..=y1.min(self.height - 1) {
            self.draw_pixel(x, y, color);
        }
    }

    /// Scanline fill of a solid triangle.
    ///
    /// Vertices are sorted by Y, then the flat-bottom half (top vertex to
    /// middle vertex) and the flat-top half (middle to bottom) are swept with
    /// inverse-slope edge trackers. Rows above the screen are skipped by
    /// advancing the trackers in one step; rows below it end the sweep.
    pub fn fill_triangle(&mut self, p1: Point, p2: Point, p3: Point, color: Color) {
        let (mut p1, mut p2, mut p3) = (p1, p2, p3);
        if p2.y < p1.y {
            std::mem::swap(&mut p1, &mut p2);
        }
        if p3.y < p1.y {
            std::mem::swap(&mut p1, &mut p3);
        }
        if p3.y < p2.y {
            std::mem::swap(&mut p2, &mut p3);
        }

        let dx12 = inverse_slope(p1, p2);
        let dx13 = inverse_slope(p1, p3);
        let dx23 = inverse_slope(p2, p3);

        let packed = self.format.encode(color);

        // Flat-bottom half: edges p1->p2 and p1->p3
        let first = p1.y.max(0);
        let skipped = rows_between(p1.y, first);
        let mut sx = p1.x as f32 + dx12 * skipped;
        let mut ex = p1.x as f32 + dx13 * skipped;
        for y in first..=p2.y.min(self.height - 1) {
            self.triangle_span(y, sx, ex, packed.as_bytes());
            sx += dx12;
            ex += dx13;
        }

        // Flat-top half: edges p2->p3 and p1->p3
        let first = p2.y.max(0);
        let mut sx = p2.x as f32 + dx23 * rows_between(p2.y, first);
        let mut ex = p1.x as f32 + dx13 * rows_between(p1.y, first);
        for y in first..=p3.y.min(self.height - 1) {
            self.triangle_span(y, sx, ex, packed.as_bytes());
            sx += dx23;
            ex += dx13;
        }
    }

    /// Fill one triangle row between two edge intercepts, both ends included.
    ///
    /// Intercepts round half to even.
    fn triangle_span(&mut self, y: i32, a: f32, b: f32, bytes: &[u8]) {
        if y < 0 || y >= self.height {
            return;
        }
        let a = a.round_ties_even() as i32;
        let b = b.round_ties_even() as i32;
        let start = a.min(b).max(0);
        let end = a.max(b).min(self.width - 1);
        if start > end {
            return;
        }
        self.write_span(y, start, end + 1, bytes);
    }

    /// Draw one character; every set glyph bit becomes a square block of
    /// `round(font_size / 8)` pixels.
    pub fn draw_char(&mut self, x: i32, y: i32, ch: char, color: Color, font_size: i32) {
        let font_size = font_size.max(MIN_FONT_SIZE);
        let scale = font_size as f32 / GLYPH_SIZE as f32;
        let block = scale.round() as i32;

        for (row, bits) in font::glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = x.saturating_add((col as f32 * scale) as i32);
                let py = y.saturating_add((row as f32 * scale) as i32);
                self.clear_rect(Rect::new(px, py, block, block), color);
            }
        }
    }

    /// Draw `text` left to right, advancing `font_size` pixels per character,
    /// and record the string's bounding box as dirty.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color, font_size: i32) {
        let font_size = font_size.max(MIN_FONT_SIZE);
        let mut count: i64 = 0;
        for ch in text.chars() {
            let pen = saturate(x as i64 + count * font_size as i64);
            self.draw_char(pen, y, ch, color, font_size);
            count += 1;
        }
        self.dirty
            .push(Rect::new(x, y, saturate(count * font_size as i64), font_size));
    }
}

#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Horizontal run per row along the edge `a -> b`; 0 for flat edges.
fn inverse_slope(a: Point, b: Point) -> f32 {
    let dy = b.y as i64 - a.y as i64;
    if dy > 0 {
        (b.x as i64 - a.x as i64) as f32 / dy as f32
    } else {
        0.0
    }
}

/// Rows from `from` down to `to`, as a tracker multiplier.
#[inline]
fn rows_between(from: i32, to: i32) -> f32 {
    (to as i64 - from as i64) as f32
}
