/// Fingers are numbered 1..=10 (left pinky .. right pinky).
pub const FINGER_COUNT: usize = 10;

/// Physical distance between adjacent 1u key centres, in millimetres.
pub const KEY_PITCH_MM: f32 = 19.05;

/// KeyFinder bucket holding every momentary layer-change hold.
pub const LAYER_CHANGE_KEY: &str = "<layer>";

pub const LEFT_SHIFT: &str = "lsft";
pub const RIGHT_SHIFT: &str = "rsft";

/// Marker shared by every shift keycode value.
pub const SHIFT_MARKER: &str = "sft";

/// Characters that cannot appear as literal keymap values.
pub fn remap_char(c: char) -> Option<&'static str> {
    match c {
        ' ' => Some("space"),
        '\n' => Some("enter"),
        _ => None,
    }
}

/// Inverse of [`remap_char`], used when replaying a sequence as text.
pub fn unremap_value(value: &str) -> Option<&'static str> {
    match value {
        "space" => Some(" "),
        "enter" => Some("\n"),
        _ => None,
    }
}
