pub mod occupancy;
pub mod playback;
pub mod transitions;
pub mod types;

pub use self::occupancy::Occupancy;
pub use self::transitions::LayerTransitions;
pub use self::types::{Action, LayerStep, SequenceEvent};

use crate::analyzer::{self, AnalysisData};
use crate::config::MovementCost;
use crate::consts::{remap_char, FINGER_COUNT};
use crate::error::{KeyTraceError, KtResult};
use crate::finder::{KeyFinder, KeyPress};
use crate::geometry::Layout;
use std::sync::Arc;
use tracing::debug;

/// Maps a finger id (1..=10) to its slot in per-finger arrays.
pub fn finger_slot(finger: u8) -> Option<usize> {
    match finger as usize {
        f @ 1..=FINGER_COUNT => Some(f - 1),
        _ => None,
    }
}

/// Simulates typing text on one keymap, one symbol at a time.
///
/// The key finder, transition table and layout are shared read-only; all
/// mutable state (layer stack, held keys, event log) belongs to this instance.
pub struct Sequencer {
    finder: Arc<KeyFinder>,
    transitions: Arc<LayerTransitions>,
    layout: Arc<Layout>,
    movement_weights: [MovementCost; FINGER_COUNT],

    default_layer: usize,
    layer_stack: Vec<usize>,
    // Key holding each layer above the base, parallel to layer_stack[1..]
    layer_holds: Vec<KeyPress>,
    occupied: Occupancy,
    last_location: [Option<usize>; FINGER_COUNT],
    sequence: Vec<SequenceEvent>,
}

impl Sequencer {
    pub fn new(finder: Arc<KeyFinder>, layout: Arc<Layout>) -> Self {
        let transitions = Arc::new(LayerTransitions::from_finder(&finder));
        Self::with_transitions(finder, transitions, layout)
    }

    pub fn with_transitions(
        finder: Arc<KeyFinder>,
        transitions: Arc<LayerTransitions>,
        layout: Arc<Layout>,
    ) -> Self {
        Self {
            finder,
            transitions,
            layout,
            movement_weights: [MovementCost { x: 1.0, y: 1.0 }; FINGER_COUNT],
            default_layer: 0,
            layer_stack: vec![0],
            layer_holds: Vec::new(),
            occupied: Occupancy::new(),
            last_location: [None; FINGER_COUNT],
            sequence: Vec::new(),
        }
    }

    pub fn with_movement_weights(mut self, weights: [MovementCost; FINGER_COUNT]) -> Self {
        self.movement_weights = weights;
        self
    }

    pub fn reset(&mut self, keep_sequence: bool) {
        self.layer_stack = vec![self.default_layer];
        self.layer_holds.clear();
        self.occupied = Occupancy::new();
        self.last_location = [None; FINGER_COUNT];
        if !keep_sequence {
            self.sequence.clear();
        }
    }

    pub fn set_default_layer(&mut self, layer: usize) {
        self.default_layer = layer;
        if let Some(base) = self.layer_stack.first_mut() {
            *base = layer;
        }
    }

    // --- Queries ---

    pub fn active_layer(&self) -> usize {
        self.layer_stack
            .last()
            .copied()
            .unwrap_or(self.default_layer)
    }

    pub fn layer_stack(&self) -> &[usize] {
        &self.layer_stack
    }

    pub fn occupied(&self) -> &Occupancy {
        &self.occupied
    }

    pub fn sequence(&self) -> &[SequenceEvent] {
        &self.sequence
    }

    pub fn into_sequence(self) -> Vec<SequenceEvent> {
        self.sequence
    }

    pub fn finder(&self) -> &KeyFinder {
        &self.finder
    }

    pub fn transitions(&self) -> &LayerTransitions {
        &self.transitions
    }

    pub fn shifted(&self) -> bool {
        self.occupied.shifted()
    }

    pub fn shift_keys(&self) -> Vec<KeyPress> {
        self.finder.shift_keys()
    }

    pub fn in_layer(&self, options: &[KeyPress]) -> Vec<KeyPress> {
        let layer = self.active_layer();
        options
            .iter()
            .filter(|kp| kp.layer == layer)
            .cloned()
            .collect()
    }

    // --- Feasibility ---

    /// Whether `key` could be pressed right now, shift handling included.
    ///
    /// Runs against a copy of the held keys; the live state is left untouched.
    pub fn can_be_played(&self, key: &KeyPress) -> KtResult<bool> {
        let mut occupied = self.occupied.clone();
        self.probe(&mut occupied, key)
    }

    fn probe(&self, occupied: &mut Occupancy, key: &KeyPress) -> KtResult<bool> {
        // Check as if shift were about to be released
        if occupied.shifted() && !key.shifted {
            let finger = match occupied.active_shift()? {
                Some(shift) => shift.finger,
                None => {
                    return Err(KeyTraceError::InvariantViolation(
                        "shift active without a held shift key".to_string(),
                    ))
                }
            };
            occupied.release(finger);
        }

        match occupied.get(key.finger).map(|held| held.is_shift()) {
            Some(true) => {
                occupied.release(key.finger);
            }
            Some(false) => return Ok(false),
            None => {}
        }

        if key.layer != self.active_layer() {
            return Ok(false);
        }

        if key.shifted && !occupied.shifted() {
            occupied.hold(key.clone());
            for shift in self.in_layer(&self.shift_keys()) {
                if self.probe(&mut occupied.clone(), &shift)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        Ok(true)
    }

    pub fn filter_playable(&self, options: &[KeyPress]) -> KtResult<Vec<KeyPress>> {
        let mut playable = Vec::new();
        for kp in options {
            if self.can_be_played(kp)? {
                playable.push(kp.clone());
            }
        }
        Ok(playable)
    }

    pub fn event_can_be_played(&self, event: &SequenceEvent) -> bool {
        match event.action {
            Action::Release | Action::LayerRelease => true,
            Action::Press | Action::PressLayerAdd => !self.occupied.is_occupied(event.key.finger),
        }
    }

    pub fn playable_events(&self, events: &[SequenceEvent]) -> Vec<SequenceEvent> {
        events
            .iter()
            .filter(|e| self.event_can_be_played(e))
            .cloned()
            .collect()
    }

    // --- Selection ---

    /// Weighted cost of moving `finger` from its last key to `target_index`.
    ///
    /// Uses absolute deltas, so moving left costs the same as moving right.
    /// A finger with no previous press moves for free.
    pub fn finger_move_cost(&self, target_index: usize, finger: u8) -> f32 {
        let Some(slot) = finger_slot(finger) else {
            return 0.0;
        };
        let Some(last) = self.last_location[slot] else {
            return 0.0;
        };
        let (Some(from), Some(to)) = (self.layout.get(last), self.layout.get(target_index)) else {
            return 0.0;
        };

        let w = self.movement_weights[slot];
        (to.x - from.x).abs() * w.x + (to.y - from.y).abs() * w.y
    }

    /// Cheapest candidate by finger movement; ties keep the earliest.
    pub fn choose_optimal(&self, options: &[KeyPress]) -> Option<KeyPress> {
        let mut best: Option<(&KeyPress, f32)> = None;
        for option in options {
            let cost = self.finger_move_cost(option.index, option.finger);
            let better = match best {
                Some((_, best_cost)) => cost < best_cost,
                None => true,
            };
            if better {
                best = Some((option, cost));
            }
        }
        best.map(|(kp, _)| kp.clone())
    }

    // --- Mutation ---

    pub fn add_event(&mut self, event: SequenceEvent) {
        if matches!(event.action, Action::Press | Action::PressLayerAdd) {
            if let Some(slot) = finger_slot(event.key.finger) {
                self.last_location[slot] = Some(event.key.index);
            }
        }
        self.sequence.push(event);
    }

    /// Releases the held shift, or presses the best available shift key
    /// without using `next_finger`.
    pub fn toggle_shift(&mut self, next_finger: u8) -> KtResult<()> {
        if let Some(shift) = self.occupied.active_shift()?.cloned() {
            debug!("Releasing {} on finger {}", shift.value, shift.finger);
            self.occupied.release(shift.finger);
            self.add_event(SequenceEvent::release(shift));
            return Ok(());
        }

        let mut reserved = self.occupied.clone();
        reserved.reserve(next_finger);

        let mut options = Vec::new();
        for shift in self.shift_keys() {
            if self.probe(&mut reserved.clone(), &shift)? {
                options.push(shift);
            }
        }

        let chosen = self
            .choose_optimal(&options)
            .ok_or_else(|| KeyTraceError::Unplayable {
                symbol: "shift".to_string(),
                occupied: reserved.fingers(),
            })?;

        debug!("Pressing {} on finger {}", chosen.value, chosen.finger);
        self.occupied.hold(chosen.clone());
        self.add_event(SequenceEvent::press(chosen));
        Ok(())
    }

    /// Emits a tap of `key`, adjusting shift first when needed.
    pub fn add_key_press(&mut self, key: KeyPress) -> KtResult<()> {
        if key.shifted != self.shifted() {
            self.toggle_shift(key.finger)?;
        } else if key.shifted && self.occupied.shift_finger() == Some(key.finger) {
            // Shift is held by the finger that has to tap; move it elsewhere
            self.toggle_shift(key.finger)?;
            self.toggle_shift(key.finger)?;
        }

        self.add_event(SequenceEvent::press(key.clone()));
        self.add_event(SequenceEvent::release(key));
        Ok(())
    }

    // --- Layers ---

    pub fn plan_layer_change(&self, target: usize) -> KtResult<Vec<LayerStep>> {
        self.transitions
            .plan(&self.layer_stack, target)
            .ok_or_else(|| KeyTraceError::UnreachableLayer {
                target,
                stack: self.layer_stack.clone(),
            })
    }

    pub fn do_layer_change(&mut self, target: usize) -> KtResult<()> {
        let steps = self.plan_layer_change(target)?;
        debug!(
            "Layer change {:?} -> {}: {:?}",
            self.layer_stack, target, steps
        );

        for step in steps {
            self.apply_layer_step(step)?;
        }
        Ok(())
    }

    pub fn apply_layer_step(&mut self, step: LayerStep) -> KtResult<()> {
        match step {
            LayerStep::Pop => {
                if self.layer_stack.len() < 2 {
                    return Err(KeyTraceError::InvariantViolation(
                        "attempted to release the base layer".to_string(),
                    ));
                }
                let (Some(from), Some(mut hold)) = (self.layer_stack.pop(), self.layer_holds.pop())
                else {
                    return Err(KeyTraceError::InvariantViolation(
                        "layer stack and layer holds out of step".to_string(),
                    ));
                };

                self.occupied.release(hold.finger);
                hold.layer = from;
                self.add_event(SequenceEvent::new(Action::LayerRelease, hold));
            }
            LayerStep::Push(target) => {
                let active = self.active_layer();
                let candidates = self.transitions.press_events(active, target);
                let playable = self.playable_events(&candidates).into_iter().next();

                let event = match playable {
                    Some(event) => event,
                    None => {
                        // A held shift is the only thing in the way: let go of it first
                        let shift_finger = self.occupied.shift_finger();
                        let blocked_by_shift = candidates
                            .iter()
                            .find(|e| shift_finger == Some(e.key.finger))
                            .cloned();

                        match blocked_by_shift {
                            Some(event) => {
                                self.toggle_shift(event.key.finger)?;
                                event
                            }
                            None => {
                                return Err(KeyTraceError::Unplayable {
                                    symbol: format!("layer {}", target),
                                    occupied: self.occupied.fingers(),
                                })
                            }
                        }
                    }
                };

                self.occupied.hold(event.key.clone());
                self.layer_stack.push(target);
                self.layer_holds.push(event.key.clone());
                self.add_event(event);
            }
        }
        Ok(())
    }

    /// First layer reachable in a single hop, else the first option.
    pub fn find_closest_layer(&self, options: &[usize]) -> Option<usize> {
        options
            .iter()
            .copied()
            .find(|&layer| {
                self.transitions
                    .plan(&self.layer_stack, layer)
                    .is_some_and(|steps| steps.len() == 1)
            })
            .or_else(|| options.first().copied())
    }

    /// Moves to the best layer holding one of `options` and returns the
    /// candidates on that layer.
    pub fn do_optimal_layer_change(&mut self, options: &[KeyPress]) -> KtResult<Vec<KeyPress>> {
        let mut groups: Vec<(usize, Vec<KeyPress>)> = Vec::new();
        for kp in options {
            match groups.iter_mut().find(|(layer, _)| *layer == kp.layer) {
                Some((_, group)) => group.push(kp.clone()),
                None => groups.push((kp.layer, vec![kp.clone()])),
            }
        }

        let layers: Vec<usize> = groups.iter().map(|(layer, _)| *layer).collect();
        let target = if layers.len() == 1 {
            layers[0]
        } else {
            self.find_closest_layer(&layers).ok_or_else(|| {
                KeyTraceError::InvariantViolation("layer change without candidates".to_string())
            })?
        };

        self.do_layer_change(target)?;

        Ok(groups
            .into_iter()
            .find(|(layer, _)| *layer == target)
            .map(|(_, group)| group)
            .unwrap_or_default())
    }

    // --- Driver ---

    /// Simulates typing `text` from a clean state and returns the event log.
    pub fn build(&mut self, text: &str) -> KtResult<&[SequenceEvent]> {
        self.reset(false);
        let finder = Arc::clone(&self.finder);

        for c in text.chars() {
            let symbol = remap_char(c)
                .map(str::to_string)
                .unwrap_or_else(|| c.to_string());

            let all_matches = finder
                .get(&symbol)
                .ok_or_else(|| KeyTraceError::UnmappableSymbol {
                    symbol: symbol.clone(),
                })?;

            let mut in_layer = self.in_layer(all_matches);
            if in_layer.is_empty() {
                in_layer = self.do_optimal_layer_change(all_matches)?;
            }

            let playable = self.filter_playable(&in_layer)?;
            let optimal =
                self.choose_optimal(&playable)
                    .ok_or_else(|| KeyTraceError::Unplayable {
                        symbol: symbol.clone(),
                        occupied: self.occupied.fingers(),
                    })?;

            self.add_key_press(optimal)?;
        }

        self.release_all()?;
        Ok(self.sequence.as_slice())
    }

    /// Releases shift, unwinds every held layer, then frees anything left.
    pub fn release_all(&mut self) -> KtResult<()> {
        if let Some(shift) = self.occupied.active_shift()?.cloned() {
            self.occupied.release(shift.finger);
            self.add_event(SequenceEvent::release(shift));
        }

        while self.layer_stack.len() > 1 {
            self.apply_layer_step(LayerStep::Pop)?;
        }

        let remaining: Vec<KeyPress> = self.occupied.keys().cloned().collect();
        for key in remaining {
            self.occupied.release(key.finger);
            self.add_event(SequenceEvent::release(key));
        }

        Ok(())
    }

    // --- Output ---

    pub fn play(&self, text_only: bool) -> String {
        playback::play(&self.sequence, text_only)
    }

    pub fn analyze(&self, include_repeated: bool) -> AnalysisData {
        analyzer::analyze(&self.sequence, &self.layout, include_repeated)
    }
}
