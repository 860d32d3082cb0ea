pub mod analyzer;
pub mod api;
pub mod config;
pub mod consts;
pub mod error;
pub mod finder;
pub mod geometry;
pub mod keymap;
pub mod sequencer;

pub use error::{KeyTraceError, KtResult};
