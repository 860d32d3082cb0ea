use crate::consts::FINGER_COUNT;
use crate::error::{KeyTraceError, KtResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_WEIGHTS: &str = "1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0,1.0";

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub sequencer: SequencerConfig,
    #[command(flatten)]
    pub analysis: AnalysisConfig,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    // Horizontal movement cost per finger (1..=10)
    #[arg(long, default_value = DEFAULT_WEIGHTS)]
    pub movement_weights_x: String,

    // Vertical movement cost per finger (1..=10)
    #[arg(long, default_value = DEFAULT_WEIGHTS)]
    pub movement_weights_y: String,

    #[arg(long, default_value_t = 0)]
    pub default_layer: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            movement_weights_x: DEFAULT_WEIGHTS.to_string(),
            movement_weights_y: DEFAULT_WEIGHTS.to_string(),
            default_layer: 0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Count "ll" style repeats of the same key as same-finger bigrams.
    #[arg(long, default_value_t = false)]
    pub include_repeats: bool,

    #[arg(long, default_value_t = 15)]
    pub top_sfbs: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_repeats: false,
            top_sfbs: 15,
        }
    }
}

/// Per-finger cost of moving one unit along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementCost {
    pub x: f32,
    pub y: f32,
}

impl SequencerConfig {
    pub fn movement_weights(&self) -> KtResult<[MovementCost; FINGER_COUNT]> {
        let xs = parse_f32_array::<FINGER_COUNT>(&self.movement_weights_x, "movement_weights_x")?;
        let ys = parse_f32_array::<FINGER_COUNT>(&self.movement_weights_y, "movement_weights_y")?;

        let mut weights = [MovementCost::default(); FINGER_COUNT];
        for (i, w) in weights.iter_mut().enumerate() {
            *w = MovementCost { x: xs[i], y: ys[i] };
        }
        Ok(weights)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KtResult<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            KeyTraceError::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Applies only the flags the user actually typed on top of `self`.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(sequencer, movement_weights_x);
        update_if_present!(sequencer, movement_weights_y);
        update_if_present!(sequencer, default_layer);

        update_if_present!(analysis, include_repeats);
        update_if_present!(analysis, top_sfbs);
    }
}

fn parse_f32_array<const N: usize>(s: &str, name: &str) -> KtResult<[f32; N]> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != N {
        return Err(KeyTraceError::Config(format!(
            "--{} requires {} values, got {}",
            name.replace('_', "-"),
            N,
            parts.len()
        )));
    }

    let mut arr = [0.0; N];
    for (i, p) in parts.iter().enumerate() {
        arr[i] = p.trim().parse().map_err(|_| {
            KeyTraceError::Config(format!("Invalid number '{}' in {}", p.trim(), name))
        })?;
    }
    Ok(arr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_uniform() {
        let weights = SequencerConfig::default().movement_weights().unwrap();
        assert!(weights.iter().all(|w| w.x == 1.0 && w.y == 1.0));
    }

    #[test]
    fn test_weight_count_mismatch() {
        let cfg = SequencerConfig {
            movement_weights_x: "1.0,2.0".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.movement_weights(),
            Err(KeyTraceError::Config(_))
        ));
    }

    #[test]
    fn test_weight_bad_number() {
        let cfg = SequencerConfig {
            movement_weights_y: "1,1,1,1,x,1,1,1,1,1".to_string(),
            ..Default::default()
        };
        assert!(cfg.movement_weights().is_err());
    }
}
