#![allow(dead_code)]

use keytrace::api::AnalysisSession;
use keytrace::config::Config;
use keytrace::finder::KeyFinder;
use keytrace::geometry::{Fingermap, KeyPosition, Layout};
use keytrace::keymap::{KeyDescriptor, Keymap};
use keytrace::sequencer::{Action, SequenceEvent, Sequencer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Layout + fingermap + keymap for one test keyboard.
pub struct Board {
    pub layout: Arc<Layout>,
    pub fingermap: Fingermap,
    pub keymap: Keymap,
}

impl Board {
    pub fn finder(&self) -> Arc<KeyFinder> {
        Arc::new(KeyFinder::new(&self.keymap.layers, &self.fingermap).unwrap())
    }

    pub fn sequencer(&self) -> Sequencer {
        Sequencer::new(self.finder(), Arc::clone(&self.layout))
    }

    pub fn session(&self, config: Config) -> AnalysisSession {
        AnalysisSession::new(Arc::clone(&self.layout), &self.fingermap, &self.keymap, config)
            .unwrap()
    }

    /// Writes layout.json, fingermap.json and keymap.json into `dir`.
    pub fn write_files(&self, dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        let layout = dir.join("layout.json");
        let fingermap = dir.join("fingermap.json");
        let keymap = dir.join("keymap.json");

        fs::write(&layout, serde_json::to_string(&*self.layout).unwrap()).unwrap();
        fs::write(&fingermap, serde_json::to_string(&self.fingermap).unwrap()).unwrap();
        fs::write(&keymap, serde_json::to_string(&self.keymap).unwrap()).unwrap();

        (layout, fingermap, keymap)
    }
}

/// Adds physical keys one at a time; descriptors default to empty on
/// every layer except the ones given.
pub struct BoardBuilder {
    name: String,
    keys: Vec<KeyPosition>,
    fingers: Vec<u8>,
    layers: Vec<Vec<KeyDescriptor>>,
}

impl BoardBuilder {
    pub fn new(layer_count: usize) -> Self {
        Self {
            name: "test".to_string(),
            keys: Vec::new(),
            fingers: Vec::new(),
            layers: vec![Vec::new(); layer_count],
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn key(mut self, finger: u8, x: f32, y: f32, base: KeyDescriptor) -> Self {
        self.keys.push(KeyPosition::new(x, y));
        self.fingers.push(finger);
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.push(if i == 0 {
                base.clone()
            } else {
                KeyDescriptor::default()
            });
        }
        self
    }

    /// Sets what the most recently added key produces on `layer`.
    pub fn on_layer(mut self, layer: usize, descriptor: KeyDescriptor) -> Self {
        if let Some(slot) = self.layers[layer].last_mut() {
            *slot = descriptor;
        }
        self
    }

    pub fn build(self) -> Board {
        let mut keymap = Keymap::new(self.layers);
        keymap.name = self.name;
        Board {
            layout: Arc::new(Layout::new(self.keys)),
            fingermap: Fingermap::new(self.fingers),
            keymap,
        }
    }
}

pub fn shift_hold(value: &str) -> KeyDescriptor {
    KeyDescriptor {
        hold: value.to_string(),
        ..Default::default()
    }
}

pub fn layer_hold(directive: &str) -> KeyDescriptor {
    KeyDescriptor {
        hold: directive.to_string(),
        ..Default::default()
    }
}

/// Two-layer board used by most tests.
///
/// Layer 0: shifted letters a b e h l o, space, both shifts, `MO 1` on the
/// right thumb. Layer 1: digits 1 and 2 on the h and l keys.
pub fn standard_board() -> Board {
    BoardBuilder::new(2)
        .name("standard")
        .key(1, 0.0, 2.0, shift_hold("lsft"))
        .key(2, 1.0, 1.0, KeyDescriptor::shifted("a", "A"))
        .key(3, 2.0, 1.0, KeyDescriptor::shifted("e", "E"))
        .key(4, 3.0, 1.0, KeyDescriptor::shifted("b", "B"))
        .key(5, 4.0, 3.0, KeyDescriptor::tap("space"))
        .key(6, 5.0, 3.0, layer_hold("MO 1"))
        .key(7, 6.0, 1.0, KeyDescriptor::shifted("h", "H"))
        .on_layer(1, KeyDescriptor::tap("1"))
        .key(8, 7.0, 1.0, KeyDescriptor::shifted("l", "L"))
        .on_layer(1, KeyDescriptor::tap("2"))
        .key(9, 8.0, 1.0, KeyDescriptor::shifted("o", "O"))
        .key(10, 9.0, 2.0, shift_hold("rsft"))
        .build()
}

/// Every symbol `standard_board` can type.
pub const STANDARD_ALPHABET: &[char] = &[
    'a', 'b', 'e', 'h', 'l', 'o', 'A', 'B', 'E', 'H', 'L', 'O', ' ', '1', '2',
];

pub fn actions(events: &[SequenceEvent]) -> Vec<Action> {
    events.iter().map(|e| e.action).collect()
}

/// `"press:a"`-style rendering of an event log for compact assertions.
pub fn describe(events: &[SequenceEvent]) -> Vec<String> {
    events
        .iter()
        .map(|e| format!("{}:{}", e.action, e.key.value))
        .collect()
}

/// Checks that no finger is pressed twice without a release in between and
/// that the log ends with nothing held. Returns the first problem found.
pub fn check_occupancy(events: &[SequenceEvent]) -> Result<(), String> {
    let mut held: HashMap<u8, &str> = HashMap::new();

    for (i, e) in events.iter().enumerate() {
        match e.action {
            Action::Press | Action::PressLayerAdd => {
                if let Some(prev) = held.insert(e.key.finger, &e.key.value) {
                    return Err(format!(
                        "event {}: finger {} pressed '{}' while holding '{}'",
                        i, e.key.finger, e.key.value, prev
                    ));
                }
            }
            Action::Release | Action::LayerRelease => {
                if held.remove(&e.key.finger).is_none() {
                    return Err(format!(
                        "event {}: finger {} released '{}' without a press",
                        i, e.key.finger, e.key.value
                    ));
                }
            }
        }
    }

    if held.is_empty() {
        Ok(())
    } else {
        Err(format!("log ends with fingers held: {:?}", held))
    }
}

/// Depth of held layers after every event; errors if it ever goes negative
/// or does not return to zero.
pub fn check_layer_balance(events: &[SequenceEvent]) -> Result<(), String> {
    let mut depth: i32 = 0;
    for (i, e) in events.iter().enumerate() {
        match e.action {
            Action::PressLayerAdd => depth += 1,
            Action::LayerRelease => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return Err(format!("event {}: layer released below the base", i));
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(format!("{} layers still held at the end", depth))
    }
}
