//! Memory-mapped framebuffer device
//!
//! [`FrameBuffer`] pairs a [`Canvas`] with a shared writable mapping of the
//! display device (conventionally `/dev/fb0`). Drawing only touches the
//! canvas; [`FrameBuffer::swap_buffers`] is the single point at which pixels
//! become visible.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use crate::display::DisplayDescriptor;
use crate::error::{DeviceError, VIDEO_GROUP_HINT};
use crate::logging::{log, LogCategory, LogLevel};
use crate::raster::Canvas;

pub struct FrameBuffer {
    // Field order is drop order: the mapping goes before the device handle.
    mapping: MmapMut,
    _device: File,
    canvas: Canvas,
    descriptor: DisplayDescriptor,
    path: PathBuf,
}

impl FrameBuffer {
    /// Open `path` read-write and map `descriptor.mapping_len()` bytes of it.
    pub fn open(path: impl AsRef<Path>, descriptor: DisplayDescriptor) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        descriptor.validate()?;

        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| DeviceError::from_open(path, err, VIDEO_GROUP_HINT))?;

        let len = descriptor.mapping_len();
        // SAFETY: the mapping is shared with the device driver, which never
        // shrinks the framebuffer while it is open; we only access it through
        // this struct and unmap before closing the file.
        let mapping = unsafe { MmapOptions::new().len(len).map_mut(&device) }.map_err(|source| {
            DeviceError::Map {
                path: path.to_path_buf(),
                len,
                source,
            }
        })?;

        let canvas = Canvas::new(&descriptor)?;

        log(LogCategory::Display, LogLevel::Info, || {
            format!(
                "mapped {} ({}x{} virtual {}x{}, {}-bit, {} bytes)",
                path.display(),
                descriptor.width,
                descriptor.height,
                descriptor.virtual_width,
                descriptor.virtual_height,
                descriptor.depth,
                len
            )
        });

        Ok(Self {
            mapping,
            _device: device,
            canvas,
            descriptor,
            path: path.to_path_buf(),
        })
    }

    pub fn descriptor(&self) -> &DisplayDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Copy the whole back buffer into the device mapping in one pass.
    ///
    /// Only the visible rows at the start of the mapping are written. The
    /// dirty-region list is reset afterwards.
    pub fn swap_buffers(&mut self) {
        let frame = self.canvas.as_bytes();
        self.mapping[..frame.len()].copy_from_slice(frame);
        self.canvas.clear_dirty();
    }

    /// Flush the mapping to the backing file.
    ///
    /// Character devices do not need this; it makes regular-file targets
    /// (screenshots, tests) durable.
    pub fn flush(&self) -> Result<(), DeviceError> {
        self.mapping.flush().map_err(DeviceError::Commit)
    }

    /// Bytes currently visible on the device.
    pub fn front_buffer(&self) -> &[u8] {
        &self.mapping[..self.canvas.as_bytes().len()]
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        log(LogCategory::Display, LogLevel::Debug, || {
            format!("unmapping {}", self.path.display())
        });
    }
}
