//! Viterbi (max-product) decoding of the single most probable state path.

use log::debug;

use crate::error::{HmmError, Result};
use crate::lattice::{argmax_first, fill_row, Lattice};
use crate::model::Model;

#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiPath {
    /// One state per observation.
    pub states: Vec<String>,
    /// Joint probability of `states` and the observations.
    pub score: f64,
}

// NB None marks the start of a path, the `#` row; it is never followed.
type Backpointers = Vec<Vec<Option<usize>>>;

fn viterbi_lattice(model: &Model, obs: &[usize]) -> Result<(Lattice, Backpointers)> {
    let n_states = model.n_states();
    let chain_len = obs.len();

    let mut delta = Lattice::with_capacity(chain_len);
    let mut back: Backpointers = Vec::with_capacity(chain_len);

    delta.push(fill_row(n_states, |s| {
        Ok(model.initial_at(s)? * model.emit_at(s, obs[0])?)
    })?);
    back.push(vec![None; n_states]);

    for t in 1..chain_len {
        let prev = delta.last_row();
        let cells = fill_row(n_states, |j| {
            let candidates = prev
                .iter()
                .enumerate()
                .map(|(i, d)| Ok(d * model.trans_at(i, j)?))
                .collect::<Result<Vec<f64>>>()?;
            let i = argmax_first(&candidates);
            Ok((candidates[i] * model.emit_at(j, obs[t])?, i))
        })?;

        let (row, from): (Vec<f64>, Vec<usize>) = cells.into_iter().unzip();
        delta.push(row);
        back.push(from.into_iter().map(Some).collect());
    }
    Ok((delta, back))
}

/// Most probable state path and its probability; ties go to the earlier state.
pub fn viterbi<S: AsRef<str>>(model: &Model, observations: &[S]) -> Result<ViterbiPath> {
    if observations.is_empty() {
        return Err(HmmError::EmptySequence);
    }
    let obs = model.encode_observations(observations)?;

    debug!("Viterbi lattice over {} steps and {} states.", obs.len(), model.n_states());

    let (delta, back) = viterbi_lattice(model, &obs)?;

    let last = delta.last_row();
    let mut s = argmax_first(last);
    let score = last[s];

    // Backtrack
    let mut path = vec![0; obs.len()];
    for t in (0..obs.len()).rev() {
        path[t] = s;
        match back[t][s] {
            Some(prev) => s = prev,
            None => break,
        }
    }

    Ok(ViterbiPath {
        states: path.into_iter().map(|i| model.states()[i].clone()).collect(),
        score,
    })
}

pub fn most_likely_path<S: AsRef<str>>(model: &Model, observations: &[S]) -> Result<Vec<String>> {
    Ok(viterbi(model, observations)?.states)
}

/// Joint probability of a state path and the observations it emits.
pub fn path_probability<S, O>(model: &Model, states: &[S], observations: &[O]) -> Result<f64>
where
    S: AsRef<str>,
    O: AsRef<str>,
{
    if states.len() != observations.len() {
        return Err(HmmError::LengthMismatch {
            states: states.len(),
            observations: observations.len(),
        });
    }
    let Some((first, first_obs)) = states.first().zip(observations.first()) else {
        return Err(HmmError::EmptySequence);
    };

    let mut p = model.initial_prob(first.as_ref())? * model.emission_prob(first.as_ref(), first_obs.as_ref())?;
    for t in 1..states.len() {
        let (from, to) = (states[t - 1].as_ref(), states[t].as_ref());
        p = p * model.transition_prob(from, to)? * model.emission_prob(to, observations[t].as_ref())?;
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::forward;
    use crate::model::{get_test_cat, get_test_chain, ModelBuilder};

    #[test]
    fn test_viterbi_cat() {
        let model = get_test_cat().unwrap();
        let obs = ["silent", "meow"];

        // NB delta[0] = (0.1, 0.25, 0)
        //    delta[1][happy]  = max(0.05, 0.15)  * 0.3 = 0.045  <- grumpy
        //    delta[1][grumpy] = max(0.01, 0.075) * 0.4 = 0.03   <- grumpy
        //    delta[1][hungry] = max(0.04, 0.025) * 0.6 = 0.024  <- happy
        let res = viterbi(&model, &obs).unwrap();
        assert_eq!(res.states, ["grumpy", "happy"]);
        assert!((res.score - 0.045).abs() < 1e-12);

        assert_eq!(most_likely_path(&model, &obs).unwrap(), ["grumpy", "happy"]);
    }

    #[test]
    fn test_viterbi_path_score_is_consistent() {
        let model = get_test_chain(4, 3, 17).unwrap();
        let obs: Vec<String> = (0..40).map(|t| format!("o{}", (t * 5 + t / 3) % 3)).collect();

        let res = viterbi(&model, &obs).unwrap();
        assert_eq!(res.states.len(), obs.len());
        assert!(res.states.iter().all(|s| model.state_index(s).is_some()));

        let p = path_probability(&model, &res.states, &obs).unwrap();
        assert_eq!(p, res.score);
    }

    #[test]
    fn test_viterbi_path_beats_enumeration() {
        let model = get_test_chain(3, 2, 5).unwrap();
        let obs = ["o0", "o1", "o1", "o0"];
        let res = viterbi(&model, &obs).unwrap();

        let states = model.states();
        let n = states.len();
        let mut best = 0.0;
        for config_idx in 0..n.pow(obs.len() as u32) {
            let mut tmp = config_idx;
            let path: Vec<&str> = (0..obs.len())
                .map(|_| {
                    let s = states[tmp % n].as_str();
                    tmp /= n;
                    s
                })
                .collect();
            let p = path_probability(&model, &path, &obs).unwrap();
            if p > best {
                best = p;
            }
        }
        assert!((res.score - best).abs() < 1e-15);
    }

    #[test]
    fn test_viterbi_never_exceeds_forward() {
        let model = get_test_chain(3, 3, 23).unwrap();
        let obs = ["o2", "o0", "o0", "o1", "o2", "o1"];

        let v = viterbi(&model, &obs).unwrap();
        let f = forward(&model, &obs).unwrap();
        assert!(v.score <= f.likelihood);
    }

    #[test]
    fn test_viterbi_tie_break() {
        let mut b = ModelBuilder::new();
        for s in ["y", "x"] {
            b.initial(s, 0.5);
            for t in ["y", "x"] {
                b.transition(s, t, 0.5);
            }
            b.emission(s, "o", 1.0);
        }
        let model = b.build().unwrap();

        for _ in 0..10 {
            assert_eq!(most_likely_path(&model, &["o", "o", "o"]).unwrap(), ["y", "y", "y"]);
        }
    }

    #[test]
    fn test_viterbi_zero_emission_keeps_best_predecessor() {
        let mut b = ModelBuilder::new();
        b.initial("a", 0.5).initial("b", 0.5);
        for s in ["a", "b"] {
            for t in ["a", "b"] {
                b.transition(s, t, 0.5);
            }
        }
        b.emission("a", "x", 0.2)
            .emission("a", "y", 0.8)
            .emission("a", "z", 0.0)
            .emission("b", "x", 0.8)
            .emission("b", "y", 0.2)
            .emission("b", "z", 0.0);
        let model = b.build().unwrap();

        // NB every final score is zero, so the final state falls to `a`, but
        //    the predecessor is picked before the zero emission: b (0.4) over a (0.1).
        let res = viterbi(&model, &["x", "z"]).unwrap();
        assert_eq!(res.states, ["b", "a"]);
        assert_eq!(res.score, 0.0);
    }

    #[test]
    fn test_viterbi_single_step() {
        let model = get_test_cat().unwrap();
        let res = viterbi(&model, &["purr"]).unwrap();
        // NB delta[0] = (0.25, 0.05, 0.0)
        assert_eq!(res.states, ["happy"]);
        assert!((res.score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_viterbi_errors() {
        let model = get_test_cat().unwrap();
        let empty: [&str; 0] = [];
        assert!(matches!(viterbi(&model, &empty), Err(HmmError::EmptySequence)));
        assert!(viterbi(&model, &["bark"]).unwrap_err().is_missing_entry());

        assert!(matches!(
            path_probability(&model, &["happy"], &["purr", "meow"]),
            Err(HmmError::LengthMismatch { .. })
        ));
        assert!(matches!(
            path_probability(&model, &empty, &empty),
            Err(HmmError::EmptySequence)
        ));
    }
}
