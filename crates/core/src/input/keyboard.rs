//! Held-key tracking for keyboards

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::input::event::{EventType, InputEvent};
use crate::input::reader::EventHandler;

/// Set of key codes currently held down.
///
/// A key event with value 0 releases the code; any positive value (press or
/// auto-repeat) marks it held.
#[derive(Debug, Default)]
pub struct KeyTracker {
    down: Mutex<HashSet<u16>>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_key_down(&self, code: u16) -> bool {
        self.down
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&code)
    }

    /// Snapshot of every held key, in ascending code order.
    pub fn pressed_keys(&self) -> Vec<u16> {
        let mut keys: Vec<u16> = self
            .down
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        keys.sort_unstable();
        keys
    }
}

impl EventHandler<InputEvent> for KeyTracker {
    fn handle(&self, event: &InputEvent) {
        if event.kind != EventType::KEY {
            return;
        }
        let mut down = self.down.lock().unwrap_or_else(PoisonError::into_inner);
        if event.value == 0 {
            down.remove(&event.code);
        } else if event.value > 0 {
            down.insert(event.code);
        }
    }
}
