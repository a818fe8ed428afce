//! Error taxonomy shared by the model store, the sampler, the scorers and the loader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HmmError {
    /// No `from -> to` entry in the transition table.
    #[error("missing transition probability {from} -> {to}")]
    MissingTransition { from: String, to: String },

    /// No `state -> observation` entry in the emission table.
    #[error("missing emission probability {state} -> {observation}")]
    MissingEmission { state: String, observation: String },

    /// No `# -> state` entry in the initial distribution.
    #[error("missing initial probability for state {state}")]
    MissingInitial { state: String },

    #[error("observation sequence is empty")]
    EmptySequence,

    #[error("sequence length must be at least 1, got {0}")]
    InvalidLength(usize),

    /// Weighted choice over a row with no usable weight.
    #[error("invalid weights in {context}")]
    InvalidWeights { context: String },

    #[error("state sequence has length {states} but observation sequence has length {observations}")]
    LengthMismatch { states: usize, observations: usize },

    #[error("inconsistent model: {0}")]
    InconsistentModel(String),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HmmError {
    /// True for the lookup failures that signal an incomplete model.
    pub fn is_missing_entry(&self) -> bool {
        matches!(
            self,
            HmmError::MissingTransition { .. }
                | HmmError::MissingEmission { .. }
                | HmmError::MissingInitial { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HmmError>;
