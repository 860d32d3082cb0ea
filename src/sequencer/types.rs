use crate::finder::KeyPress;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Press,
    Release,
    PressLayerAdd,
    LayerRelease,
}

impl Action {
    pub fn is_layer(&self) -> bool {
        matches!(self, Action::PressLayerAdd | Action::LayerRelease)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEvent {
    pub action: Action,
    #[serde(flatten)]
    pub key: KeyPress,
}

impl SequenceEvent {
    pub fn new(action: Action, key: KeyPress) -> Self {
        Self { action, key }
    }

    pub fn press(key: KeyPress) -> Self {
        Self::new(Action::Press, key)
    }

    pub fn release(key: KeyPress) -> Self {
        Self::new(Action::Release, key)
    }
}

/// One hop of a layer change, as planned before anything is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStep {
    /// Release the layer key holding the top of the stack.
    Pop,
    /// Hold a layer key that moves from the active layer to the target.
    Push(usize),
}
