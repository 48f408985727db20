//! Relative pointer accumulation for mice and touchpads in relative mode

use std::sync::{Mutex, PoisonError};

use crate::input::event::{
    EventType, InputEvent, BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, REL_WHEEL, REL_X, REL_Y,
};
use crate::input::reader::EventHandler;

/// Motion accumulated since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerDelta {
    pub dx: i32,
    pub dy: i32,
    pub wheel: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

#[derive(Debug, Default)]
struct PointerState {
    delta: PointerDelta,
    buttons: MouseButtons,
}

/// Aggregates relative motion and button state from one pointer device.
#[derive(Debug, Default)]
pub struct PointerTracker {
    state: Mutex<PointerState>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and zero all three accumulators in one critical section.
    pub fn take_deltas(&self) -> PointerDelta {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut state.delta)
    }

    pub fn buttons(&self) -> MouseButtons {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .buttons
    }
}

impl EventHandler<InputEvent> for PointerTracker {
    fn handle(&self, event: &InputEvent) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match (event.kind, event.code) {
            (EventType::REL, REL_X) => state.delta.dx = state.delta.dx.wrapping_add(event.value),
            (EventType::REL, REL_Y) => state.delta.dy = state.delta.dy.wrapping_add(event.value),
            (EventType::REL, REL_WHEEL) => {
                state.delta.wheel = state.delta.wheel.wrapping_add(event.value)
            }
            (EventType::KEY, BTN_LEFT) => state.buttons.left = event.value != 0,
            (EventType::KEY, BTN_MIDDLE) => state.buttons.middle = event.value != 0,
            (EventType::KEY, BTN_RIGHT) => state.buttons.right = event.value != 0,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_accumulates_and_resets() {
        let pointer = PointerTracker::new();
        for _ in 0..25 {
            pointer.handle(&InputEvent::rel(REL_X, 1));
        }
        pointer.handle(&InputEvent::rel(REL_Y, -7));
        pointer.handle(&InputEvent::rel(REL_WHEEL, 2));

        assert_eq!(
            pointer.take_deltas(),
            PointerDelta {
                dx: 25,
                dy: -7,
                wheel: 2
            }
        );
        assert_eq!(pointer.take_deltas(), PointerDelta::default());
    }

    #[test]
    fn test_buttons_follow_last_event() {
        let pointer = PointerTracker::new();
        pointer.handle(&InputEvent::key(BTN_LEFT, 1));
        pointer.handle(&InputEvent::key(BTN_RIGHT, 1));
        pointer.handle(&InputEvent::key(BTN_RIGHT, 0));
        pointer.handle(&InputEvent::key(BTN_MIDDLE, 2));

        assert_eq!(
            pointer.buttons(),
            MouseButtons {
                left: true,
                middle: true,
                right: false
            }
        );
        // Buttons are not part of the delta reset.
        pointer.take_deltas();
        assert!(pointer.buttons().left);
    }

    #[test]
    fn test_ignores_unrelated_codes() {
        let pointer = PointerTracker::new();
        pointer.handle(&InputEvent::rel(0x06, 5));
        pointer.handle(&InputEvent::abs(REL_X, 5));
        pointer.handle(&InputEvent::key(30, 1));
        assert_eq!(pointer.take_deltas(), PointerDelta::default());
        assert_eq!(pointer.buttons(), MouseButtons::default());
    }

    #[test]
    fn test_concurrent_reset_never_loses_motion() {
        let pointer = Arc::new(PointerTracker::new());
        let writer = {
            let pointer = Arc::clone(&pointer);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    pointer.handle(&InputEvent::rel(REL_X, 1));
                    pointer.handle(&InputEvent::rel(REL_Y, 1));
                }
            })
        };

        let mut total = PointerDelta::default();
        while !writer.is_finished() {
            let delta = pointer.take_deltas();
            assert!((delta.dx - delta.dy).abs() <= 1, "torn read {:?}", delta);
            total.dx += delta.dx;
            total.dy += delta.dy;
        }
        writer.join().unwrap();
        let rest = pointer.take_deltas();
        total.dx += rest.dx;
        total.dy += rest.dy;

        assert_eq!(total.dx, 10_000);
        assert_eq!(total.dy, 10_000);
    }
}
