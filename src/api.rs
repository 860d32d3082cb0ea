use crate::analyzer::AnalysisData;
use crate::config::Config;
use crate::error::{KeyTraceError, KtResult};
use crate::finder::KeyFinder;
use crate::geometry::{Fingermap, Layout};
use crate::keymap::Keymap;
use crate::sequencer::{LayerTransitions, Sequencer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub keymap: String,
    pub text: String,
    /// Event log replayed with non-printable keys annotated.
    pub replay: String,
    pub events: usize,
    pub analysis: AnalysisData,
}

/// Everything needed to simulate typing on one keymap.
///
/// The finder, transition table and layout are built once and shared; each
/// [`AnalysisSession::sequencer`] call hands out a fresh, independent state
/// machine.
pub struct AnalysisSession {
    pub name: String,
    pub config: Config,
    finder: Arc<KeyFinder>,
    transitions: Arc<LayerTransitions>,
    layout: Arc<Layout>,
}

impl AnalysisSession {
    pub fn new(
        layout: Arc<Layout>,
        fingermap: &Fingermap,
        keymap: &Keymap,
        config: Config,
    ) -> KtResult<Self> {
        fingermap.validate(&layout)?;
        keymap.validate(layout.len())?;

        if config.sequencer.default_layer >= keymap.layers.len() {
            return Err(KeyTraceError::Config(format!(
                "Default layer {} does not exist; keymap '{}' has {} layers",
                config.sequencer.default_layer,
                keymap.name,
                keymap.layers.len()
            )));
        }

        let finder = Arc::new(KeyFinder::new(&keymap.layers, fingermap)?);
        let transitions = Arc::new(LayerTransitions::from_finder(&finder));

        Ok(Self {
            name: keymap.name.clone(),
            config,
            finder,
            transitions,
            layout,
        })
    }

    pub fn finder(&self) -> &KeyFinder {
        &self.finder
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn sequencer(&self) -> KtResult<Sequencer> {
        let weights = self.config.sequencer.movement_weights()?;
        let mut sequencer = Sequencer::with_transitions(
            Arc::clone(&self.finder),
            Arc::clone(&self.transitions),
            Arc::clone(&self.layout),
        )
        .with_movement_weights(weights);
        sequencer.set_default_layer(self.config.sequencer.default_layer);
        Ok(sequencer)
    }

    /// Builds and analyzes `text` in one pass.
    pub fn run(&self, text: &str) -> KtResult<SessionReport> {
        let mut sequencer = self.sequencer()?;
        let events = sequencer.build(text)?.len();
        let analysis = sequencer.analyze(self.config.analysis.include_repeats);

        info!(
            "{}: {} events, {} SFBs, {} layer switches",
            self.name, events, analysis.sfb_total, analysis.layer_switches
        );

        Ok(SessionReport {
            keymap: self.name.clone(),
            text: text.to_string(),
            replay: sequencer.play(false),
            events,
            analysis,
        })
    }
}

fn run_keymap(
    layout: &Arc<Layout>,
    fingermap: &Fingermap,
    keymap: &Keymap,
    config: &Config,
    text: &str,
) -> KtResult<SessionReport> {
    AnalysisSession::new(Arc::clone(layout), fingermap, keymap, config.clone())
        .and_then(|session| session.run(text))
}

fn log_failure(name: &str, result: &KtResult<SessionReport>) {
    if let Err(e) = result {
        if e.is_fatal() {
            warn!("Keymap '{}' is malformed: {}", name, e);
        } else {
            warn!("Keymap '{}' failed: {}", name, e);
        }
    }
}

/// Runs one independent session per keymap in parallel.
///
/// Results come back in input order. A keymap that fails to build reports
/// its own error; the others still run.
pub fn compare_keymaps(
    layout: Arc<Layout>,
    fingermap: &Fingermap,
    keymaps: &[Keymap],
    config: &Config,
    text: &str,
) -> Vec<(String, KtResult<SessionReport>)> {
    keymaps
        .par_iter()
        .map(|keymap| {
            let result = run_keymap(&layout, fingermap, keymap, config, text);
            log_failure(&keymap.name, &result);
            (keymap.name.clone(), result)
        })
        .collect()
}

/// Like [`compare_keymaps`], but each keymap is read from its own file.
///
/// A file that cannot be read or parsed is reported under its path; the
/// other keymaps still run.
pub fn compare_keymap_files<P: AsRef<Path> + Sync>(
    layout: Arc<Layout>,
    fingermap: &Fingermap,
    paths: &[P],
    config: &Config,
    text: &str,
) -> Vec<(String, KtResult<SessionReport>)> {
    paths
        .par_iter()
        .map(|path| match Keymap::load_from_file(path) {
            Ok(keymap) => {
                let result = run_keymap(&layout, fingermap, &keymap, config, text);
                log_failure(&keymap.name, &result);
                (keymap.name, result)
            }
            Err(e) => {
                let name = path.as_ref().display().to_string();
                warn!("Keymap '{}' could not be loaded: {}", name, e);
                (name, Err(e))
            }
        })
        .collect()
}
