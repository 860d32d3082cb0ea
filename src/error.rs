use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyTraceError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Could not find '{symbol}' on keyboard")]
    UnmappableSymbol { symbol: String },

    #[error("'{symbol}' found but not playable due to occupied fingers: {occupied:?}")]
    Unplayable { symbol: String, occupied: Vec<u8> },

    /// The keymap has a layer that cannot be reached through nested holds.
    #[error("Could not find a path to layer {target} from layer stack {stack:?}")]
    UnreachableLayer { target: usize, stack: Vec<usize> },

    /// Internal state machine bug, never caused by user input.
    #[error("Sequencer invariant violated: {0}")]
    InvariantViolation(String),
}

impl KeyTraceError {
    /// Fatal errors describe a malformed keymap or a sequencer bug rather than
    /// a single untypeable character.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KeyTraceError::UnreachableLayer { .. } | KeyTraceError::InvariantViolation(_)
        )
    }
}

pub type KtResult<T> = Result<T, KeyTraceError>;
