//! Facade over the keyboard, pointer and touch readers

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::input::event::InputEvent;
use crate::input::keyboard::KeyTracker;
use crate::input::mouse::{MouseButtons, PointerDelta, PointerTracker};
use crate::input::reader::{DeviceReader, EventHandler};
use crate::input::touch::{TouchSample, TouchTracker};
use crate::input::InputQuery;
use crate::logging::{log, LogCategory, LogLevel};

/// Touch device path plus the raw extents used for normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchDevice {
    pub path: PathBuf,
    pub max_x: i32,
    pub max_y: i32,
}

/// Device paths for each input role, resolved by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDevices {
    pub keyboard: Option<PathBuf>,
    pub mouse: Option<PathBuf>,
    pub touch: Option<TouchDevice>,
}

type KeyboardReader = DeviceReader<InputEvent, KeyTracker>;
type MouseReader = DeviceReader<InputEvent, PointerTracker>;
type TouchReader = DeviceReader<InputEvent, TouchTracker>;

/// Owns one reader per configured device.
///
/// Roles without a device report neutral state: no keys held, zero motion,
/// no touch.
pub struct InputHub {
    keyboard: Option<KeyboardReader>,
    mouse: Option<MouseReader>,
    touch: Option<TouchReader>,
}

impl InputHub {
    /// Open every configured device and start its read loop.
    ///
    /// On failure, readers already started are stopped before returning.
    pub fn open(devices: &InputDevices) -> Result<Self, DeviceError> {
        let mut hub = Self {
            keyboard: None,
            mouse: None,
            touch: None,
        };

        if let Some(path) = &devices.keyboard {
            hub.keyboard = Some(start(DeviceReader::new(path.clone(), KeyTracker::new()))?);
        }
        if let Some(path) = &devices.mouse {
            hub.mouse = Some(start(DeviceReader::new(path.clone(), PointerTracker::new()))?);
        }
        if let Some(touch) = &devices.touch {
            let tracker = TouchTracker::new(touch.max_x, touch.max_y);
            hub.touch = Some(start(DeviceReader::new(touch.path.clone(), tracker))?);
        }

        Ok(hub)
    }

    /// Assemble a hub from readers that are already running.
    pub fn from_readers(
        keyboard: Option<KeyboardReader>,
        mouse: Option<MouseReader>,
        touch: Option<TouchReader>,
    ) -> Self {
        Self {
            keyboard,
            mouse,
            touch,
        }
    }

    pub fn has_keyboard(&self) -> bool {
        self.keyboard.is_some()
    }

    pub fn has_mouse(&self) -> bool {
        self.mouse.is_some()
    }

    pub fn has_touch(&self) -> bool {
        self.touch.is_some()
    }

    /// Stop every read loop and wait for them to exit.
    ///
    /// Device handles are closed when the hub is dropped.
    pub fn shutdown(&mut self) {
        if let Some(reader) = self.keyboard.as_mut() {
            reader.stop_event_loop();
        }
        if let Some(reader) = self.mouse.as_mut() {
            reader.stop_event_loop();
        }
        if let Some(reader) = self.touch.as_mut() {
            reader.stop_event_loop();
        }
        log(LogCategory::Input, LogLevel::Debug, || {
            "input readers stopped".to_string()
        });
    }
}

fn start<H>(mut reader: DeviceReader<InputEvent, H>) -> Result<DeviceReader<InputEvent, H>, DeviceError>
where
    H: EventHandler<InputEvent>,
{
    reader.initialize()?;
    reader.start_event_loop()?;
    Ok(reader)
}

impl InputQuery for InputHub {
    fn is_key_down(&self, code: u16) -> bool {
        self.keyboard
            .as_ref()
            .is_some_and(|reader| reader.handler().is_key_down(code))
    }

    fn take_mouse_delta(&self) -> PointerDelta {
        self.mouse
            .as_ref()
            .map(|reader| reader.handler().take_deltas())
            .unwrap_or_default()
    }

    fn mouse_buttons(&self) -> MouseButtons {
        self.mouse
            .as_ref()
            .map(|reader| reader.handler().buttons())
            .unwrap_or_default()
    }

    fn touch_state(&self) -> TouchSample {
        self.touch
            .as_ref()
            .map(|reader| reader.handler().touch_state())
            .unwrap_or_default()
    }
}

impl Drop for InputHub {
    fn drop(&mut self) {
        self.shutdown();
    }
}
