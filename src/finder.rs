use crate::consts::{FINGER_COUNT, LAYER_CHANGE_KEY, LEFT_SHIFT, RIGHT_SHIFT, SHIFT_MARKER};
use crate::error::{KeyTraceError, KtResult};
use crate::geometry::Fingermap;
use crate::keymap::{HoldDirective, KeyDescriptor};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One way of producing a symbol: which finger presses which key on which layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPress {
    pub finger: u8,
    pub index: usize,
    pub layer: usize,
    pub shifted: bool,
    pub value: String,
}

impl KeyPress {
    pub fn is_shift(&self) -> bool {
        self.value.contains(SHIFT_MARKER)
    }
}

/// Symbol -> every candidate keypress that produces it.
///
/// Candidate lists keep insertion order (layer-major, key-index-minor); that
/// order is the tie-break for every selection made by the sequencer.
#[derive(Debug, Clone, Default)]
pub struct KeyFinder {
    entries: HashMap<String, Vec<KeyPress>>,
    layer_count: usize,
}

impl KeyFinder {
    pub fn new(layers: &[Vec<KeyDescriptor>], fingermap: &Fingermap) -> KtResult<Self> {
        let mut finder = KeyFinder {
            entries: HashMap::new(),
            layer_count: layers.len(),
        };

        for (layer, descriptors) in layers.iter().enumerate() {
            if descriptors.len() != fingermap.len() {
                return Err(KeyTraceError::Validation(format!(
                    "Layer {} has {} keys but fingermap has {}",
                    layer,
                    descriptors.len(),
                    fingermap.len()
                )));
            }

            for (index, kc) in descriptors.iter().enumerate() {
                let finger = fingermap.keys[index];
                if finger == 0 || finger as usize > FINGER_COUNT {
                    return Err(KeyTraceError::Validation(format!(
                        "Key {} has finger {}, expected 1..={}",
                        index, finger, FINGER_COUNT
                    )));
                }
                let press = |value: &str, shifted: bool| KeyPress {
                    finger,
                    index,
                    layer,
                    shifted,
                    value: value.to_string(),
                };

                if !kc.default.is_empty() {
                    finder.add_key(&kc.default, press(&kc.default, false));
                }

                if !kc.shift.is_empty() && kc.shift != kc.default {
                    finder.add_key(&kc.shift, press(&kc.shift, true));
                }

                if !kc.hold.is_empty() {
                    if HoldDirective::is_layer_change(&kc.hold) {
                        finder.add_key(LAYER_CHANGE_KEY, press(&kc.hold, false));
                    } else {
                        finder.add_key(&kc.hold, press(&kc.hold, false));
                    }
                }
            }
        }

        Ok(finder)
    }

    pub fn add_key(&mut self, key: &str, key_press: KeyPress) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(key_press);
    }

    pub fn get(&self, symbol: &str) -> Option<&[KeyPress]> {
        self.entries.get(symbol).map(|v| v.as_slice())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    pub fn layer_keys(&self) -> &[KeyPress] {
        self.get(LAYER_CHANGE_KEY).unwrap_or(&[])
    }

    /// Left shift candidates followed by right shift candidates.
    pub fn shift_keys(&self) -> Vec<KeyPress> {
        [LEFT_SHIFT, RIGHT_SHIFT]
            .iter()
            .filter_map(|k| self.get(k))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Finger that types `symbol` by default: its first unshifted candidate.
    pub fn primary_finger(&self, symbol: &str) -> Option<u8> {
        self.get(symbol)?
            .iter()
            .find(|kp| !kp.shifted)
            .map(|kp| kp.finger)
    }

    /// Keeps the n-grams whose every symbol is typed by the same finger.
    pub fn same_finger_ngrams(&self, ngrams: &[String]) -> Vec<String> {
        ngrams
            .iter()
            .filter(|ngram| {
                let fingers: Option<Vec<u8>> = ngram
                    .chars()
                    .map(|c| self.primary_finger(&c.to_string()))
                    .collect();
                matches!(fingers, Some(f) if !f.is_empty() && f.iter().all_equal())
            })
            .cloned()
            .collect()
    }
}

/// All ordered arrangements of `n` distinct symbols.
pub fn make_ngrams(symbols: &[&str], n: usize) -> Vec<String> {
    if n == 0 || symbols.len() < n {
        return Vec::new();
    }

    symbols
        .iter()
        .permutations(n)
        .map(|p| p.into_iter().copied().collect::<String>())
        .collect()
}
