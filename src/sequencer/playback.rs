use super::types::{Action, SequenceEvent};
use crate::consts::unremap_value;

/// Replays an event log back into text.
///
/// Single-character values are written as-is. Multi-character values
/// (modifiers, named keys) become `<name>` on press and `</name>` on release
/// unless `text_only` is set. Layer events never produce output.
pub fn play(sequence: &[SequenceEvent], text_only: bool) -> String {
    let mut out = String::new();

    for event in sequence {
        let value = unremap_value(&event.key.value).unwrap_or(&event.key.value);
        let single = value.chars().count() == 1;

        match event.action {
            Action::Press if single => out.push_str(value),
            Action::Press if !text_only && !value.is_empty() => {
                out.push('<');
                out.push_str(value);
                out.push('>');
            }
            Action::Release if !single && !text_only && !value.is_empty() => {
                out.push_str("</");
                out.push_str(value);
                out.push('>');
            }
            _ => {}
        }
    }

    out
}
