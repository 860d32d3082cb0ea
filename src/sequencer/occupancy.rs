use crate::error::{KeyTraceError, KtResult};
use crate::finder::KeyPress;
use std::collections::BTreeMap;

/// Which finger is currently holding which key.
///
/// Cheap to clone; feasibility checks run against a copy so the live state is
/// never touched by a probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Occupancy {
    held: BTreeMap<u8, KeyPress>,
    shift_finger: Option<u8>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&mut self, key: KeyPress) {
        if key.is_shift() && self.shift_finger.is_none() {
            self.shift_finger = Some(key.finger);
        }
        self.held.insert(key.finger, key);
    }

    /// Blocks `finger` with a placeholder that produces nothing.
    pub fn reserve(&mut self, finger: u8) {
        self.held.insert(
            finger,
            KeyPress {
                finger,
                index: 0,
                layer: 0,
                shifted: false,
                value: String::new(),
            },
        );
    }

    pub fn release(&mut self, finger: u8) -> Option<KeyPress> {
        if self.shift_finger == Some(finger) {
            self.shift_finger = None;
        }
        self.held.remove(&finger)
    }

    pub fn get(&self, finger: u8) -> Option<&KeyPress> {
        self.held.get(&finger)
    }

    pub fn is_occupied(&self, finger: u8) -> bool {
        self.held.contains_key(&finger)
    }

    pub fn shifted(&self) -> bool {
        self.shift_finger.is_some()
    }

    pub fn shift_finger(&self) -> Option<u8> {
        self.shift_finger
    }

    /// The held shift key, if shift is active.
    ///
    /// Errors when shift is recorded as active but the recorded finger is not
    /// holding a shift key.
    pub fn active_shift(&self) -> KtResult<Option<&KeyPress>> {
        let Some(finger) = self.shift_finger else {
            return Ok(None);
        };

        match self.held.get(&finger) {
            Some(key) if key.is_shift() => Ok(Some(key)),
            _ => Err(KeyTraceError::InvariantViolation(format!(
                "sequencer shifted but finger {} is not holding a shift key",
                finger
            ))),
        }
    }

    pub fn fingers(&self) -> Vec<u8> {
        self.held.keys().copied().collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &KeyPress> {
        self.held.values()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}
