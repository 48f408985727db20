//! Display descriptor: the geometry and pixel layout of a framebuffer.
//!
//! The descriptor is produced outside the core (for example from `fbset`
//! output or a config file) and handed over once at construction time.

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::graphics::PixelFormat;

/// Bit length and offset of one color channel inside a pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub length: u32,
    pub offset: u32,
}

/// Channel layout as reported by the framebuffer driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbaLayout {
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
    pub alpha: Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    /// Mode label such as "1920x1080"
    #[serde(default)]
    pub mode: Option<String>,
    pub width: u32,
    pub height: u32,
    pub virtual_width: u32,
    pub virtual_height: u32,
    /// Bits per pixel; only 16 and 32 are drawable
    pub depth: u32,
    #[serde(default)]
    pub timings: [u32; 7],
    #[serde(default)]
    pub rgba: Option<RgbaLayout>,
}

impl DisplayDescriptor {
    /// Descriptor for a single-page display with no timing information.
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            mode: Some(format!("{}x{}", width, height)),
            width,
            height,
            virtual_width: width,
            virtual_height: height,
            depth,
            timings: [0; 7],
            rgba: None,
        }
    }

    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.width == 0 || self.height == 0 {
            return Err(DeviceError::InvalidGeometry {
                width: self.width,
                height: self.height,
            });
        }
        self.pixel_format().map(|_| ())
    }

    pub fn pixel_format(&self) -> Result<PixelFormat, DeviceError> {
        PixelFormat::from_depth(self.depth)
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.depth / 8) as usize
    }

    /// Size of the software back buffer: only the visible area.
    pub fn back_buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel()
    }

    /// Size of the device mapping: the full virtual height.
    pub fn mapping_len(&self) -> usize {
        let rows = self.virtual_height.max(self.height) as usize;
        self.width as usize * rows * self.bytes_per_pixel()
    }
}

impl Default for DisplayDescriptor {
    fn default() -> Self {
        Self::new(1920, 1080, 32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_follow_depth_and_virtual_height() {
        let mut desc = DisplayDescriptor::new(800, 600, 16);
        desc.virtual_height = 1200;

        assert_eq!(desc.bytes_per_pixel(), 2);
        assert_eq!(desc.back_buffer_len(), 800 * 600 * 2);
        assert_eq!(desc.mapping_len(), 800 * 1200 * 2);
    }

    #[test]
    fn test_short_virtual_height_maps_visible_area() {
        let mut desc = DisplayDescriptor::new(64, 48, 32);
        desc.virtual_height = 0;
        assert_eq!(desc.mapping_len(), desc.back_buffer_len());
    }

    #[test]
    fn test_validate_rejects_unsupported_depth() {
        let desc = DisplayDescriptor::new(640, 480, 24);
        assert!(matches!(
            desc.validate(),
            Err(DeviceError::UnsupportedColorDepth(24))
        ));
        assert!(DisplayDescriptor::new(640, 480, 16).validate().is_ok());
        assert!(DisplayDescriptor::new(640, 480, 32).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_geometry() {
        let desc = DisplayDescriptor::new(0, 480, 32);
        assert!(matches!(
            desc.validate(),
            Err(DeviceError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_descriptor_deserializes_without_optional_fields() {
        let json = r#"{
            "width": 320, "height": 240,
            "virtual_width": 320, "virtual_height": 480,
            "depth": 16
        }"#;
        let desc: DisplayDescriptor = serde_json::from_str(json).expect("deserialize");
        assert_eq!(desc.mode, None);
        assert_eq!(desc.timings, [0; 7]);
        assert_eq!(desc.rgba, None);
        assert_eq!(desc.virtual_height, 480);
    }
}
