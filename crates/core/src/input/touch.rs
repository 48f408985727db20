//! Absolute touch position tracking

use std::sync::{Mutex, PoisonError};

use crate::input::event::{
    EventType, InputEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_X, ABS_Y, BTN_TOUCH,
};
use crate::input::reader::EventHandler;

/// Touch position normalized to the device extents
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchSample {
    pub x: f32,
    pub y: f32,
    pub touching: bool,
}

#[derive(Debug, Default)]
struct TouchState {
    x: i32,
    y: i32,
    touching: bool,
}

/// Last absolute position and contact flag of one touch device.
///
/// Single-touch (`ABS_X`/`ABS_Y`) and multi-touch slot positions
/// (`ABS_MT_POSITION_*`) update the same coordinates.
#[derive(Debug)]
pub struct TouchTracker {
    max_x: i32,
    max_y: i32,
    state: Mutex<TouchState>,
}

impl TouchTracker {
    pub fn new(max_x: i32, max_y: i32) -> Self {
        Self {
            max_x,
            max_y,
            state: Mutex::new(TouchState::default()),
        }
    }

    /// Raw (x, y) in device units.
    pub fn raw_position(&self) -> (i32, i32) {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        (state.x, state.y)
    }

    /// Position divided by the maximum extents and clamped to `[0, 1]`.
    ///
    /// A zero or negative extent yields 0 on that axis.
    pub fn touch_state(&self) -> TouchSample {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        TouchSample {
            x: normalize(state.x, self.max_x),
            y: normalize(state.y, self.max_y),
            touching: state.touching,
        }
    }
}

fn normalize(value: i32, max: i32) -> f32 {
    if max <= 0 {
        return 0.0;
    }
    (value as f32 / max as f32).clamp(0.0, 1.0)
}

impl EventHandler<InputEvent> for TouchTracker {
    fn handle(&self, event: &InputEvent) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match (event.kind, event.code) {
            (EventType::ABS, ABS_X | ABS_MT_POSITION_X) => state.x = event.value,
            (EventType::ABS, ABS_Y | ABS_MT_POSITION_Y) => state.y = event.value,
            (EventType::KEY, BTN_TOUCH) => state.touching = event.value != 0,
            _ => {}
        }
    }
}
