use crate::consts::{FINGER_COUNT, KEY_PITCH_MM};
use crate::geometry::Layout;
use crate::sequencer::{finger_slot, Action, SequenceEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    // Sorted by count, descending; ties keep first-seen order
    pub sfb_counts: Vec<CountEntry>,
    pub sfb_finger_counts: [u32; FINGER_COUNT],
    pub sfb_total: u32,
    pub layer_switches: u32,
    // Presses per layer
    pub layer_counts: Vec<u32>,
    // Millimetres, rounded
    pub finger_travel: [f32; FINGER_COUNT],
}

impl AnalysisData {
    pub fn total_travel(&self) -> f32 {
        self.finger_travel.iter().sum()
    }

    pub fn total_presses(&self) -> u32 {
        self.layer_counts.iter().sum()
    }
}

/// Label used for a key in bigram names: `a`, or `<space>` for named keys.
pub fn bigram_label(value: &str) -> String {
    if value.chars().count() > 1 {
        format!("<{}>", value)
    } else {
        value.to_string()
    }
}

/// Replays a finished event log and collects ergonomics statistics.
///
/// Only presses are measured. Every layer event counts as one layer switch.
/// Consecutive presses by the same finger form a same-finger bigram, unless
/// both presses produce the same value and `include_repeated` is false.
pub fn analyze(sequence: &[SequenceEvent], layout: &Layout, include_repeated: bool) -> AnalysisData {
    let mut data = AnalysisData::default();
    let mut sfb_index: HashMap<String, usize> = HashMap::new();
    let mut last_location: [Option<usize>; FINGER_COUNT] = [None; FINGER_COUNT];
    let mut last_press: Option<(u8, &str)> = None;

    for event in sequence {
        match event.action {
            Action::Release => continue,
            Action::PressLayerAdd | Action::LayerRelease => {
                data.layer_switches += 1;
                continue;
            }
            Action::Press => {}
        }

        let key = &event.key;

        if data.layer_counts.len() <= key.layer {
            data.layer_counts.resize(key.layer + 1, 0);
        }
        data.layer_counts[key.layer] += 1;

        let slot = finger_slot(key.finger);

        if let Some(slot) = slot {
            if let Some(prev) = last_location[slot] {
                if let (Some(p1), Some(p2)) = (layout.get(prev), layout.get(key.index)) {
                    data.finger_travel[slot] += p1.distance(p2) * KEY_PITCH_MM;
                }
            }
            last_location[slot] = Some(key.index);
        }

        if let Some((last_finger, last_value)) = last_press {
            if last_finger == key.finger && (last_value != key.value || include_repeated) {
                let label = format!("{}{}", bigram_label(last_value), bigram_label(&key.value));

                match sfb_index.get(&label) {
                    Some(&i) => data.sfb_counts[i].value += 1,
                    None => {
                        sfb_index.insert(label.clone(), data.sfb_counts.len());
                        data.sfb_counts.push(CountEntry { label, value: 1 });
                    }
                }

                data.sfb_total += 1;
                if let Some(slot) = slot {
                    data.sfb_finger_counts[slot] += 1;
                }
            }
        }

        last_press = Some((key.finger, key.value.as_str()));
    }

    // Stable: equal counts stay in first-seen order
    data.sfb_counts.sort_by(|a, b| b.value.cmp(&a.value));

    for travel in data.finger_travel.iter_mut() {
        *travel = travel.round();
    }

    data
}
