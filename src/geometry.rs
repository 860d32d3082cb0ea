use crate::consts::FINGER_COUNT;
use crate::error::{KeyTraceError, KtResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One physical key. Coordinates are in key units (1u = one key pitch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPosition {
    pub x: f32,
    pub y: f32,

    #[serde(default = "default_size")]
    pub w: f32,
    #[serde(default = "default_size")]
    pub h: f32,

    #[serde(default)]
    pub matrix: Option<[usize; 2]>,
}

fn default_size() -> f32 {
    1.0
}

impl KeyPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            w: 1.0,
            h: 1.0,
            matrix: None,
        }
    }

    pub fn distance(&self, other: &KeyPosition) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ordered physical key positions. The index into this list is the key index
/// used by fingermaps, keymaps and the sequencer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    pub keys: Vec<KeyPosition>,
}

#[derive(Debug, Clone, Deserialize)]
struct LayoutEntry {
    layout: Vec<KeyPosition>,
}

/// QMK `info.json` shape.
#[derive(Debug, Clone, Deserialize)]
struct LayoutData {
    #[serde(default)]
    keyboard_name: String,
    #[serde(default)]
    layouts: HashMap<String, LayoutEntry>,
}

impl Layout {
    pub fn new(keys: Vec<KeyPosition>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KeyPosition> {
        self.keys.get(index)
    }

    /// Parses either a bare array of positions or a QMK `info.json`.
    /// `name` selects the layout inside an `info.json`; it may be omitted
    /// when the file defines exactly one.
    pub fn from_json_str(content: &str, name: Option<&str>) -> KtResult<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;

        if value.is_array() {
            return Ok(Self::new(serde_json::from_value(value)?));
        }

        let data: LayoutData = serde_json::from_value(value)?;
        let entry = match name {
            Some(n) => data.layouts.get(n).ok_or_else(|| {
                KeyTraceError::Validation(format!(
                    "Could not find layout {} in layout map for keyboard '{}'",
                    n, data.keyboard_name
                ))
            })?,
            None => {
                if data.layouts.len() != 1 {
                    return Err(KeyTraceError::Validation(format!(
                        "Keyboard '{}' defines {} layouts; a layout name is required",
                        data.keyboard_name,
                        data.layouts.len()
                    )));
                }
                data.layouts.values().next().ok_or_else(|| {
                    KeyTraceError::Validation("No layouts defined".to_string())
                })?
            }
        };

        Ok(Self::new(entry.layout.clone()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, name: Option<&str>) -> KtResult<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_json_str(&content, name)
    }
}

/// Finger (1..=10) assigned to each key index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fingermap {
    #[serde(rename = "mappings")]
    pub keys: Vec<u8>,
}

impl Fingermap {
    pub fn new(keys: Vec<u8>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KtResult<Self> {
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self, layout: &Layout) -> KtResult<()> {
        if self.keys.len() != layout.len() {
            return Err(KeyTraceError::Validation(format!(
                "Fingermap has {} entries but layout has {} keys",
                self.keys.len(),
                layout.len()
            )));
        }

        if let Some((idx, f)) = self
            .keys
            .iter()
            .enumerate()
            .find(|&(_, &f)| f == 0 || f as usize > FINGER_COUNT)
        {
            return Err(KeyTraceError::Validation(format!(
                "Key {} has finger {}, expected 1..={}",
                idx, f, FINGER_COUNT
            )));
        }

        Ok(())
    }
}
