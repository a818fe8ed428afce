//! Reads a model from `<basename>.trans` and `<basename>.emit`.
//!
//! Both files hold one `source target probability` record per line, fields
//! separated by whitespace; blank lines are skipped. In the transition file a
//! source of `#` gives the initial-state distribution.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{HmmError, Result};
use crate::model::{Model, ModelBuilder};

fn parse_records(text: &str) -> Result<Vec<(&str, &str, f64)>> {
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let &[source, target, prob] = fields.as_slice() else {
            return Err(HmmError::Parse {
                line: line_no,
                message: format!("expected 3 fields, found {}", fields.len()),
            });
        };

        let p: f64 = prob.parse().map_err(|_| HmmError::Parse {
            line: line_no,
            message: format!("invalid probability {prob:?}"),
        })?;
        if !p.is_finite() || p < 0.0 {
            return Err(HmmError::Parse {
                line: line_no,
                message: format!("probability {p} is not a finite non-negative number"),
            });
        }
        records.push((source, target, p));
    }
    Ok(records)
}

/// Adds the records of a transition file to `builder`.
pub fn parse_transitions(builder: &mut ModelBuilder, text: &str) -> Result<()> {
    for (from, to, p) in parse_records(text)? {
        builder.transition(from, to, p);
    }
    Ok(())
}

/// Adds the records of an emission file to `builder`.
pub fn parse_emissions(builder: &mut ModelBuilder, text: &str) -> Result<()> {
    for (state, observation, p) in parse_records(text)? {
        builder.emission(state, observation, p);
    }
    Ok(())
}

pub fn parse_model(transitions: &str, emissions: &str) -> Result<Model> {
    let mut builder = ModelBuilder::new();
    parse_transitions(&mut builder, transitions)?;
    parse_emissions(&mut builder, emissions)?;
    builder.build()
}

// NB appended, not substituted: `pos.v1` becomes `pos.v1.trans`.
fn with_suffix(basename: &Path, suffix: &str) -> PathBuf {
    let mut path = basename.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

pub fn load<P: AsRef<Path>>(basename: P) -> Result<Model> {
    let trans_path = with_suffix(basename.as_ref(), ".trans");
    let emit_path = with_suffix(basename.as_ref(), ".emit");

    info!("Loading HMM from {} and {}", trans_path.display(), emit_path.display());

    let transitions = fs::read_to_string(&trans_path)?;
    let emissions = fs::read_to_string(&emit_path)?;
    parse_model(&transitions, &emissions)
}
