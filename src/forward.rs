//! Forward (sum-product) scoring of an observation sequence.
//!
//! `alpha[t][s]` is the total probability of every state path that ends in
//! `s` at time `t` and emits `observations[0..=t]`. Scores stay in
//! probability space and are not rescaled, so very long sequences underflow
//! to zero.

use log::debug;

use crate::error::{HmmError, Result};
use crate::lattice::{argmax_first, fill_row, Lattice};
use crate::model::Model;

/// Most likely final state, together with the whole final row it was picked from.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardResult {
    pub state: String,
    /// `(state, alpha[T-1][state])` in model enumeration order.
    pub final_scores: Vec<(String, f64)>,
    /// P(observations), the sum of the final row.
    pub likelihood: f64,
}

pub fn forward_lattice<S: AsRef<str>>(model: &Model, observations: &[S]) -> Result<Lattice> {
    if observations.is_empty() {
        return Err(HmmError::EmptySequence);
    }
    let obs = model.encode_observations(observations)?;
    let n_states = model.n_states();
    let chain_len = obs.len();

    debug!("Forward lattice over {chain_len} steps and {n_states} states.");

    let mut alpha = Lattice::with_capacity(chain_len);

    // Init alpha
    alpha.push(fill_row(n_states, |s| {
        Ok(model.initial_at(s)? * model.emit_at(s, obs[0])?)
    })?);

    // Recursion
    for t in 1..chain_len {
        let prev = alpha.last_row();
        let row = fill_row(n_states, |j| {
            let mut p = 0.0;
            for (i, a) in prev.iter().enumerate() {
                p += a * model.trans_at(i, j)?;
            }
            Ok(p * model.emit_at(j, obs[t])?)
        })?;
        alpha.push(row);
    }
    Ok(alpha)
}

/// Arg-max of the final forward row; ties go to the earlier state.
pub fn forward<S: AsRef<str>>(model: &Model, observations: &[S]) -> Result<ForwardResult> {
    let alpha = forward_lattice(model, observations)?;
    let last = alpha.last_row();

    let best = argmax_first(last);
    let final_scores = model
        .states()
        .iter()
        .cloned()
        .zip(last.iter().copied())
        .collect();

    Ok(ForwardResult {
        state: model.states()[best].clone(),
        final_scores,
        likelihood: last.iter().sum(),
    })
}

pub fn most_likely_final_state<S: AsRef<str>>(model: &Model, observations: &[S]) -> Result<String> {
    Ok(forward(model, observations)?.state)
}
