use crate::error::{KeyTraceError, KtResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// What a single key produces on one layer. Empty strings mean "nothing".
///
/// `hold` is either a plain modifier value (`"lsft"`) or a layer directive
/// such as `"LT 1"` / `"MO 2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDescriptor {
    pub default: String,
    pub shift: String,
    pub hold: String,
}

impl KeyDescriptor {
    pub fn tap(default: &str) -> Self {
        Self {
            default: default.to_string(),
            ..Default::default()
        }
    }

    pub fn shifted(default: &str, shift: &str) -> Self {
        Self {
            default: default.to_string(),
            shift: shift.to_string(),
            ..Default::default()
        }
    }

    pub fn hold(default: &str, hold: &str) -> Self {
        Self {
            default: default.to_string(),
            hold: hold.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.shift.is_empty() && self.hold.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
pub enum LayerKind {
    #[strum(serialize = "LT")]
    LayerTap,
    #[strum(serialize = "MO")]
    Momentary,
    #[strum(serialize = "TG")]
    Toggle,
    #[strum(serialize = "TO")]
    To,
    #[strum(serialize = "DF")]
    DefaultLayer,
    #[strum(to_string = "OSL", serialize = "OS")]
    OneShot,
}

impl LayerKind {
    /// Only held layer keys are modelled by the layer stack.
    pub fn is_momentary(&self) -> bool {
        matches!(self, LayerKind::LayerTap | LayerKind::Momentary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldDirective {
    Modifier(String),
    Layer { kind: LayerKind, target: usize },
}

impl HoldDirective {
    /// Returns `None` for an empty hold.
    pub fn parse(hold: &str) -> KtResult<Option<Self>> {
        let hold = hold.trim();
        if hold.is_empty() {
            return Ok(None);
        }

        let parts: Vec<&str> = hold.split_whitespace().collect();
        match parts.as_slice() {
            [modifier] => Ok(Some(HoldDirective::Modifier(modifier.to_string()))),
            [kind, target] => {
                let kind = LayerKind::from_str(kind).map_err(|_| {
                    KeyTraceError::Validation(format!("Unknown layer directive '{}'", hold))
                })?;
                let target = target.parse().map_err(|_| {
                    KeyTraceError::Validation(format!("Invalid layer number in '{}'", hold))
                })?;
                Ok(Some(HoldDirective::Layer { kind, target }))
            }
            _ => Err(KeyTraceError::Validation(format!(
                "Malformed hold directive '{}'",
                hold
            ))),
        }
    }

    pub fn is_layer_change(hold: &str) -> bool {
        hold.split_whitespace().count() > 1
    }
}

/// Per-layer descriptor table, one descriptor per key index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keymap {
    #[serde(default)]
    pub name: String,
    pub layers: Vec<Vec<KeyDescriptor>>,
}

impl Keymap {
    pub fn new(layers: Vec<Vec<KeyDescriptor>>) -> Self {
        Self {
            name: String::new(),
            layers,
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KtResult<Self> {
        let content = fs::read_to_string(&path)?;
        let mut keymap: Keymap = serde_json::from_str(&content)?;
        if keymap.name.is_empty() {
            keymap.name = path
                .as_ref()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(keymap)
    }

    pub fn validate(&self, key_count: usize) -> KtResult<()> {
        if self.layers.is_empty() {
            return Err(KeyTraceError::Validation(
                "Keymap defines no layers".to_string(),
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.len() != key_count {
                return Err(KeyTraceError::Validation(format!(
                    "Layer {} has {} keys, expected {}",
                    i,
                    layer.len(),
                    key_count
                )));
            }
        }

        Ok(())
    }
}
