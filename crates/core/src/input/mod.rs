//! Raw Linux input devices
//!
//! Each device file (`/dev/input/event*`) gets its own [`DeviceReader`]
//! running a blocking read loop on a background thread. Decoded records are
//! handed to an [`EventHandler`] that folds them into per-device aggregate
//! state (held keys, pointer deltas, touch position). The render loop reads
//! that state through [`InputQuery`] without ever blocking on a device.

pub mod event;
pub mod hub;
pub mod keyboard;
pub mod keys;
pub mod mouse;
pub mod reader;
pub mod touch;

pub use event::{EventType, InputEvent, Record};
pub use hub::{InputDevices, InputHub, TouchDevice};
pub use keyboard::KeyTracker;
pub use mouse::{MouseButtons, PointerDelta, PointerTracker};
pub use reader::{DeviceReader, EventHandler};
pub use touch::{TouchSample, TouchTracker};

/// Polling surface for input consumers.
///
/// Scenes receive this explicitly instead of reaching for a global.
pub trait InputQuery {
    fn is_key_down(&self, code: u16) -> bool;

    /// Pointer motion since the previous call; resets the accumulators.
    fn take_mouse_delta(&self) -> PointerDelta;

    fn mouse_buttons(&self) -> MouseButtons;

    /// Touch position normalized to `[0, 1]` on both axes.
    fn touch_state(&self) -> TouchSample;
}
