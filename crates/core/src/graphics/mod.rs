//! Pixel-level building blocks shared by the raster canvas
//!
//! Colors and their device encodings, rectangles, and the bitmap font.

pub mod color;
pub mod font;
pub mod rect;

pub use color::{Color, PackedPixel, PixelFormat};
pub use rect::{Point, Rect};
