//! Discrete hidden Markov models over string-labelled states and symbols:
//! sampling, forward scoring and Viterbi decoding.

// NB declare the public modules.
pub mod error;
pub mod model;
pub mod sequence;
pub mod lattice;
pub mod sampler;
pub mod forward;
pub mod viterbi;
pub mod loader;

pub use error::{HmmError, Result};
pub use forward::{forward, forward_lattice, most_likely_final_state, ForwardResult};
pub use lattice::Lattice;
pub use model::{Model, ModelBuilder, INITIAL};
pub use sampler::{generate, weighted_choice};
pub use sequence::Sequence;
pub use viterbi::{most_likely_path, path_probability, viterbi, ViterbiPath};
