//! Colors and the pixel codec
//!
//! Converts 8-bit-per-channel RGB into the byte layout the framebuffer
//! expects. Two layouts are supported:
//!
//! - 32-bit: bytes `B, G, R, 0xFF` (little-endian XRGB8888, alpha unused)
//! - 16-bit: RGB565 packed as `RRRRRGGG GGGBBBBB`, written little-endian
//!
//! Channel reduction truncates low bits; it never rounds.

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(50, 50, 50);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Device byte layout of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16 bits per pixel, RGB565 little-endian
    Rgb565,
    /// 32 bits per pixel, B G R X byte order
    Bgra8888,
}

/// One encoded pixel; only the first `len` bytes are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedPixel {
    bytes: [u8; 4],
    len: u8,
}

impl PackedPixel {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl PixelFormat {
    pub fn from_depth(depth: u32) -> Result<Self, DeviceError> {
        match depth {
            16 => Ok(PixelFormat::Rgb565),
            32 => Ok(PixelFormat::Bgra8888),
            other => Err(DeviceError::UnsupportedColorDepth(other)),
        }
    }

    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Bgra8888 => 4,
        }
    }

    #[inline]
    pub fn encode(self, color: Color) -> PackedPixel {
        match self {
            PixelFormat::Rgb565 => {
                let [lo, hi] = pack_rgb565(color).to_le_bytes();
                PackedPixel {
                    bytes: [lo, hi, 0, 0],
                    len: 2,
                }
            }
            PixelFormat::Bgra8888 => PackedPixel {
                bytes: [color.b, color.g, color.r, 0xFF],
                len: 4,
            },
        }
    }

    /// Inverse of [`encode`](Self::encode) up to the truncated low bits.
    ///
    /// `bytes` must hold at least one pixel.
    pub fn decode(self, bytes: &[u8]) -> Color {
        match self {
            PixelFormat::Rgb565 => {
                let value = u16::from_le_bytes([bytes[0], bytes[1]]);
                Color::rgb(
                    ((value >> 11) as u8 & 0x1F) << 3,
                    ((value >> 5) as u8 & 0x3F) << 2,
                    (value as u8 & 0x1F) << 3,
                )
            }
            PixelFormat::Bgra8888 => Color::rgb(bytes[2], bytes[1], bytes[0]),
        }
    }
}

#[inline]
fn pack_rgb565(color: Color) -> u16 {
    let r = (color.r >> 3) as u16 & 0x1F;
    let g = (color.g >> 2) as u16 & 0x3F;
    let b = (color.b >> 3) as u16 & 0x1F;
    (r << 11) | (g << 5) | b
}
