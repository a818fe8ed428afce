//! Time x state score tables shared by the forward and Viterbi recurrences.

use log::trace;
use rayon::prelude::*;

use crate::error::Result;

/// Rows with at least this many states are filled in parallel.
pub const PARALLEL_MIN_STATES: usize = 64;

/// Scores indexed `[t][state]`, states in model enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    rows: Vec<Vec<f64>>,
}

impl Lattice {
    pub(crate) fn with_capacity(chain_len: usize) -> Self {
        Self { rows: Vec::with_capacity(chain_len) }
    }

    pub(crate) fn push(&mut self, row: Vec<f64>) {
        trace!("Lattice row {}: {:?}", self.rows.len(), row);
        self.rows.push(row);
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, t: usize) -> Option<&[f64]> {
        self.rows.get(t).map(Vec::as_slice)
    }

    pub fn last_row(&self) -> &[f64] {
        self.rows.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Evaluates `cell` for every state of one time step.
///
/// Cells of a row only read the completed previous row, so wide rows are
/// computed with rayon; `collect` keeps state order either way.
pub(crate) fn fill_row<T, F>(n_states: usize, cell: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Send + Sync,
{
    if n_states >= PARALLEL_MIN_STATES {
        (0..n_states).into_par_iter().map(cell).collect()
    } else {
        (0..n_states).map(cell).collect()
    }
}

/// Index of the first maximum: a later entry must be strictly greater to win.
///
/// Returns 0 for an empty slice.
pub fn argmax_first(xs: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in xs.iter().enumerate().skip(1) {
        if x > xs[best] {
            best = i;
        }
    }
    best
}
