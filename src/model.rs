//! Model store: initial, transition and emission tables of a discrete HMM.
//!
//! Labels are interned once at build time. States are indexed in order of
//! their first appearance as a transition source, observation symbols in
//! order of their first appearance in the emission table. The state order is
//! the enumeration order every arg-max in this crate breaks ties with.
//!
//! Tables are dense and row-major, but an entry that was never supplied stays
//! `None` and is reported as a missing entry on lookup rather than read as a
//! zero probability.

use std::collections::HashMap;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{HmmError, Result};

/// Reserved source label keying the initial-state distribution.
pub const INITIAL: &str = "#";

#[derive(Debug, Clone)]
pub struct Model {
    states: Vec<String>,
    state_index: HashMap<String, usize>,
    symbols: Vec<String>,
    symbol_index: HashMap<String, usize>,
    initial: Vec<Option<f64>>, // [state]
    trans: Vec<Option<f64>>,   // [from * n_states + to]
    emit: Vec<Option<f64>>,    // [state * n_symbols + symbol]
}

impl Model {
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// Real states in enumeration order; never contains `#`.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Observation symbols in the order they were first emitted.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn state_index(&self, state: &str) -> Option<usize> {
        self.state_index.get(state).copied()
    }

    pub fn symbol_index(&self, observation: &str) -> Option<usize> {
        self.symbol_index.get(observation).copied()
    }

    pub fn initial_prob(&self, state: &str) -> Result<f64> {
        self.state_index(state)
            .and_then(|i| self.initial[i])
            .ok_or_else(|| HmmError::MissingInitial { state: state.to_string() })
    }

    /// P(to | from). A `from` of `#` reads the initial distribution.
    pub fn transition_prob(&self, from: &str, to: &str) -> Result<f64> {
        if from == INITIAL {
            return self.initial_prob(to);
        }
        match (self.state_index(from), self.state_index(to)) {
            (Some(i), Some(j)) => self.trans_at(i, j),
            _ => Err(HmmError::MissingTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    /// P(observation | state).
    pub fn emission_prob(&self, state: &str, observation: &str) -> Result<f64> {
        match (self.state_index(state), self.symbol_index(observation)) {
            (Some(i), Some(k)) => self.emit_at(i, k),
            _ => Err(HmmError::MissingEmission {
                state: state.to_string(),
                observation: observation.to_string(),
            }),
        }
    }

    /// The `#` row, in state order, skipping states it does not mention.
    pub fn initial_distribution(&self) -> Vec<(&str, f64)> {
        self.states
            .iter()
            .zip(&self.initial)
            .filter_map(|(s, p)| p.map(|p| (s.as_str(), p)))
            .collect()
    }

    /// Outgoing transitions of `state`, in state order.
    pub fn transition_row(&self, state: &str) -> Result<Vec<(&str, f64)>> {
        let i = self.state_index(state).ok_or_else(|| HmmError::MissingTransition {
            from: state.to_string(),
            to: "*".to_string(),
        })?;
        Ok(self.row_at(i))
    }

    /// Emission distribution of `state`, in symbol order.
    pub fn emission_row(&self, state: &str) -> Result<Vec<(&str, f64)>> {
        let i = self.state_index(state).ok_or_else(|| HmmError::MissingEmission {
            state: state.to_string(),
            observation: "*".to_string(),
        })?;
        Ok(self.emission_row_at(i))
    }

    /// Maps observation labels to symbol indices.
    ///
    /// A label the model never emits has no emission entry in any state, so
    /// it is reported against the first state, the first lookup a recurrence
    /// would make.
    pub fn encode_observations<S: AsRef<str>>(&self, observations: &[S]) -> Result<Vec<usize>> {
        observations
            .iter()
            .map(|o| {
                let o = o.as_ref();
                self.symbol_index(o).ok_or_else(|| HmmError::MissingEmission {
                    state: self.states[0].clone(),
                    observation: o.to_string(),
                })
            })
            .collect()
    }

    pub(crate) fn initial_at(&self, i: usize) -> Result<f64> {
        self.initial[i].ok_or_else(|| HmmError::MissingInitial {
            state: self.states[i].clone(),
        })
    }

    pub(crate) fn trans_at(&self, i: usize, j: usize) -> Result<f64> {
        self.trans[i * self.n_states() + j].ok_or_else(|| HmmError::MissingTransition {
            from: self.states[i].clone(),
            to: self.states[j].clone(),
        })
    }

    pub(crate) fn emit_at(&self, i: usize, k: usize) -> Result<f64> {
        self.emit[i * self.n_symbols() + k].ok_or_else(|| HmmError::MissingEmission {
            state: self.states[i].clone(),
            observation: self.symbols[k].clone(),
        })
    }

    pub(crate) fn row_at(&self, i: usize) -> Vec<(&str, f64)> {
        let n = self.n_states();
        self.states
            .iter()
            .zip(&self.trans[i * n..(i + 1) * n])
            .filter_map(|(s, p)| p.map(|p| (s.as_str(), p)))
            .collect()
    }

    pub(crate) fn emission_row_at(&self, i: usize) -> Vec<(&str, f64)> {
        let m = self.n_symbols();
        self.symbols
            .iter()
            .zip(&self.emit[i * m..(i + 1) * m])
            .filter_map(|(o, p)| p.map(|p| (o.as_str(), p)))
            .collect()
    }
}

/// Collects flat `(source, target, probability)` records and builds a [`Model`].
///
/// Probabilities are taken as given; rows are neither renormalized nor
/// checked to sum to one.
#[derive(Debug, Default, Clone)]
pub struct ModelBuilder {
    transitions: Vec<(String, String, f64)>,
    emissions: Vec<(String, String, f64)>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `P(to | from)`; a `from` of `#` adds to the initial distribution.
    pub fn transition(&mut self, from: &str, to: &str, prob: f64) -> &mut Self {
        self.transitions.push((from.to_string(), to.to_string(), prob));
        self
    }

    pub fn initial(&mut self, state: &str, prob: f64) -> &mut Self {
        self.transition(INITIAL, state, prob)
    }

    pub fn emission(&mut self, state: &str, observation: &str, prob: f64) -> &mut Self {
        self.emissions.push((state.to_string(), observation.to_string(), prob));
        self
    }

    pub fn build(&self) -> Result<Model> {
        // NB real states are exactly the non-# transition sources, first-seen order.
        let mut states: Vec<String> = Vec::new();
        let mut state_index: HashMap<String, usize> = HashMap::new();
        for (from, _, _) in &self.transitions {
            if from != INITIAL && !state_index.contains_key(from) {
                state_index.insert(from.clone(), states.len());
                states.push(from.clone());
            }
        }
        if states.is_empty() {
            return Err(HmmError::InconsistentModel("no states with outgoing transitions".into()));
        }

        let mut symbols: Vec<String> = Vec::new();
        let mut symbol_index: HashMap<String, usize> = HashMap::new();
        for (_, obs, _) in &self.emissions {
            if !symbol_index.contains_key(obs) {
                symbol_index.insert(obs.clone(), symbols.len());
                symbols.push(obs.clone());
            }
        }

        let n = states.len();
        let m = symbols.len();
        let mut initial = vec![None; n];
        let mut trans = vec![None; n * n];
        let mut emit = vec![None; n * m];

        let lookup = |label: &str, role: &str| {
            state_index.get(label).copied().ok_or_else(|| {
                HmmError::InconsistentModel(format!("{role} {label} has no outgoing transitions"))
            })
        };

        for (from, to, p) in &self.transitions {
            let j = lookup(to, "transition target")?;
            let slot = if from == INITIAL {
                &mut initial[j]
            } else {
                &mut trans[state_index[from] * n + j]
            };
            if slot.replace(*p).is_some() {
                warn!("Duplicate transition {from} -> {to}; keeping {p}");
            }
        }

        let mut has_emissions = vec![false; n];
        for (state, obs, p) in &self.emissions {
            let i = lookup(state, "emitting state")?;
            has_emissions[i] = true;
            if emit[i * m + symbol_index[obs]].replace(*p).is_some() {
                warn!("Duplicate emission {state} -> {obs}; keeping {p}");
            }
        }

        if let Some(i) = has_emissions.iter().position(|&has| !has) {
            return Err(HmmError::InconsistentModel(format!(
                "state {} has transitions but no emissions",
                states[i]
            )));
        }

        debug!("Built HMM with {n} states and {m} symbols.");

        Ok(Model {
            states,
            state_index,
            symbols,
            symbol_index,
            initial,
            trans,
            emit,
        })
    }
}

/// The three-state cat model: moods `happy`, `grumpy`, `hungry` emitting
/// `silent`, `meow`, `purr`.
pub fn get_test_cat() -> Result<Model> {
    let mut b = ModelBuilder::new();
    b.initial("happy", 0.5).initial("grumpy", 0.5).initial("hungry", 0.0);

    let trans = [
        ("happy", [0.5, 0.1, 0.4]),
        ("grumpy", [0.6, 0.3, 0.1]),
        ("hungry", [0.1, 0.6, 0.3]),
    ];
    for (from, row) in trans {
        for (to, p) in ["happy", "grumpy", "hungry"].iter().zip(row) {
            b.transition(from, to, p);
        }
    }

    let emit = [
        ("happy", [0.2, 0.3, 0.5]),
        ("grumpy", [0.5, 0.4, 0.1]),
        ("hungry", [0.2, 0.6, 0.2]),
    ];
    for (state, row) in emit {
        for (obs, p) in ["silent", "meow", "purr"].iter().zip(row) {
            b.emission(state, obs, p);
        }
    }
    b.build()
}

/// Dense random model with normalized rows; states are `s0..`, symbols `o0..`.
pub fn get_test_chain(n_states: usize, n_symbols: usize, seed: u64) -> Result<Model> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut random_row = |len: usize| -> Vec<f64> {
        let mut row: Vec<f64> = (0..len).map(|_| rng.random::<f64>() + 1e-3).collect();
        let norm: f64 = row.iter().sum();
        for v in &mut row {
            *v /= norm;
        }
        row
    };

    let states: Vec<String> = (0..n_states).map(|i| format!("s{i}")).collect();
    let symbols: Vec<String> = (0..n_symbols).map(|k| format!("o{k}")).collect();

    let mut b = ModelBuilder::new();
    for (s, p) in states.iter().zip(random_row(n_states)) {
        b.initial(s, p);
    }
    for from in &states {
        for (to, p) in states.iter().zip(random_row(n_states)) {
            b.transition(from, to, p);
        }
    }
    for s in &states {
        for (o, p) in symbols.iter().zip(random_row(n_symbols)) {
            b.emission(s, o, p);
        }
    }
    b.build()
}
