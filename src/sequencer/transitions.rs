use super::types::{Action, LayerStep, SequenceEvent};
use crate::finder::KeyFinder;
use crate::keymap::HoldDirective;
use std::collections::HashMap;
use tracing::warn;

/// Direct, one-hop layer transitions keyed by `(from, to)`.
///
/// Every momentary layer key on layer `L` targeting `T` contributes a
/// press-layer-add edge `(L, T)` and a layer-release edge `(T, L)`.
#[derive(Debug, Clone, Default)]
pub struct LayerTransitions {
    edges: HashMap<(usize, usize), Vec<SequenceEvent>>,
}

impl LayerTransitions {
    pub fn from_finder(finder: &KeyFinder) -> Self {
        let mut table = Self::default();

        for key_press in finder.layer_keys() {
            let directive = match HoldDirective::parse(&key_press.value) {
                Ok(Some(d)) => d,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping layer key at {}: {}", key_press.index, e);
                    continue;
                }
            };

            match directive {
                HoldDirective::Layer { kind, target } if kind.is_momentary() => {
                    let current = key_press.layer;
                    table.add(
                        current,
                        target,
                        SequenceEvent::new(Action::PressLayerAdd, key_press.clone()),
                    );

                    let mut released = key_press.clone();
                    released.layer = target;
                    table.add(
                        target,
                        current,
                        SequenceEvent::new(Action::LayerRelease, released),
                    );
                }
                HoldDirective::Layer { kind, .. } => {
                    warn!("Unimplemented layer directive: {}", kind);
                }
                HoldDirective::Modifier(_) => {}
            }
        }

        table
    }

    fn add(&mut self, from: usize, to: usize, event: SequenceEvent) {
        self.edges.entry((from, to)).or_default().push(event);
    }

    pub fn get(&self, from: usize, to: usize) -> Option<&[SequenceEvent]> {
        self.edges.get(&(from, to)).map(|v| v.as_slice())
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges.contains_key(&(from, to))
    }

    pub fn press_events(&self, from: usize, to: usize) -> Vec<SequenceEvent> {
        self.get(from, to)
            .unwrap_or(&[])
            .iter()
            .filter(|e| e.action == Action::PressLayerAdd)
            .cloned()
            .collect()
    }

    pub fn has_press(&self, from: usize, to: usize) -> bool {
        self.get(from, to)
            .is_some_and(|events| events.iter().any(|e| e.action == Action::PressLayerAdd))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Finds the steps that take `stack` to `target` without mutating anything.
    ///
    /// Layers are treated as nested holds: if no direct edge leaves the active
    /// layer, the top of the stack is released and the search retries from the
    /// layer underneath. Returns `None` once the base layer is reached without
    /// an edge.
    pub fn plan(&self, stack: &[usize], target: usize) -> Option<Vec<LayerStep>> {
        let mut steps = Vec::new();
        let mut depth = stack.len();

        while depth > 0 {
            let active = stack[depth - 1];
            if active == target {
                return Some(steps);
            }

            if depth >= 2 && stack[depth - 2] == target {
                steps.push(LayerStep::Pop);
                return Some(steps);
            }

            if self.has_press(active, target) {
                steps.push(LayerStep::Push(target));
                return Some(steps);
            }

            if depth == 1 {
                break;
            }

            steps.push(LayerStep::Pop);
            depth -= 1;
        }

        None
    }
}
