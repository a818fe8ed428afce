//! Ancestral sampling of (state, observation) sequences.

use log::debug;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

pub use rand::distr::weighted::Error as WeightError;

use crate::error::{HmmError, Result};
use crate::model::Model;
use crate::sequence::Sequence;

/// Picks one outcome with probability proportional to its weight.
///
/// Weights need not be normalized but must be finite, non-negative and not
/// all zero.
pub fn weighted_choice<'a, T, R>(rng: &mut R, row: &'a [(T, f64)]) -> std::result::Result<&'a T, WeightError>
where
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::<f64>::new(row.iter().map(|(_, w)| *w))?;
    Ok(&row[dist.sample(rng)].0)
}

/// Draws an `n`-step sequence: the first state from the `#` row, each later
/// state from the previous state's transition row, and every observation
/// from the emission row of the state it belongs to.
///
/// Reproducible only for an identically seeded `rng`.
pub fn generate<R: Rng + ?Sized>(model: &Model, n: usize, rng: &mut R) -> Result<Sequence> {
    if n < 1 {
        return Err(HmmError::InvalidLength(n));
    }

    let mut states = Vec::with_capacity(n);
    let mut observations = Vec::with_capacity(n);

    // NB no `#` row at all is a missing entry, not a bad weight vector.
    let initial = model.initial_distribution();
    if initial.is_empty() {
        return Err(HmmError::MissingInitial {
            state: model.states()[0].clone(),
        });
    }
    let mut current = *weighted_choice(rng, &initial).map_err(|e| HmmError::InvalidWeights {
        context: format!("initial distribution: {e}"),
    })?;

    for t in 0..n {
        if t > 0 {
            let row = model.transition_row(current)?;
            current = *weighted_choice(rng, &row).map_err(|e| HmmError::InvalidWeights {
                context: format!("transition row of {current}: {e}"),
            })?;
        }

        let row = model.emission_row(current)?;
        let observation = *weighted_choice(rng, &row).map_err(|e| HmmError::InvalidWeights {
            context: format!("emission row of {current}: {e}"),
        })?;

        states.push(current.to_string());
        observations.push(observation.to_string());
    }

    debug!("Sampled a sequence of length {n}.");

    Sequence::new(states, observations)
}
