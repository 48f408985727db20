//! Raw framebuffer drawing and Linux input primitives.
//!
//! Drawing happens on a software [`Canvas`] that is copied to the mapped
//! device in one pass per frame. Input devices are read on background
//! threads and folded into state the frame loop polls through
//! [`InputQuery`].

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod graphics;
pub mod input;
pub mod logging;
pub mod raster;
pub mod renderer;

pub use config::{EngineConfig, EngineOptions};
pub use display::DisplayDescriptor;
pub use engine::{RenderEngine, Scene};
pub use error::{ConfigError, DeviceError};
pub use framebuffer::FrameBuffer;
pub use graphics::{Color, PixelFormat, Point, Rect};
pub use input::{InputDevices, InputHub, InputQuery};
pub use raster::Canvas;
pub use renderer::{HeadlessRenderer, Renderer};
