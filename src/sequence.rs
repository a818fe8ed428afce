use std::fmt;

use crate::error::{HmmError, Result};

/// Hidden states paired with the observations they emitted.
///
/// Sampled sequences carry both halves. Sequences built for scoring may
/// carry observations only, in which case `states` is empty and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    states: Vec<String>,
    observations: Vec<String>,
}

impl Sequence {
    pub fn new(states: Vec<String>, observations: Vec<String>) -> Result<Self> {
        if states.len() != observations.len() {
            return Err(HmmError::LengthMismatch {
                states: states.len(),
                observations: observations.len(),
            });
        }
        Ok(Self { states, observations })
    }

    pub fn from_observations<I, S>(observations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: Vec::new(),
            observations: observations.into_iter().map(Into::into).collect(),
        }
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn observations(&self) -> &[String] {
        &self.observations
    }

    /// Number of time steps, i.e. the number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Space-joined states, newline, space-joined observations, newline.
impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.states.join(" "))?;
        writeln!(f, "{}", self.observations.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_display() {
        let seq = Sequence::new(
            strings(&["happy", "grumpy", "grumpy"]),
            strings(&["purr", "silent", "meow"]),
        )
        .unwrap();
        assert_eq!(seq.to_string(), "happy grumpy grumpy\npurr silent meow\n");
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_length_mismatch() {
        let err = Sequence::new(strings(&["happy"]), strings(&["purr", "meow"])).unwrap_err();
        assert!(matches!(err, HmmError::LengthMismatch { states: 1, observations: 2 }));
    }

    #[test]
    fn test_observations_only() {
        let seq = Sequence::from_observations(["silent", "meow"]);
        assert_eq!(seq.len(), 2);
        assert!(seq.states().is_empty());
        assert!(!seq.is_empty());
        assert!(Sequence::from_observations(Vec::<String>::new()).is_empty());
    }
}
