//! Challenge-response sets.

use crate::error::{PufError, Result};
use crate::simulation::Simulation;
use crate::{random_inputs, validate_challenges};

/// N challenges with their N×m responses.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeResponseSet {
    pub challenges: Vec<Vec<i8>>,
    pub responses: Vec<Vec<f64>>,
}

impl ChallengeResponseSet {
    /// Build a set, checking that it is non-empty, rectangular and ±1-valued.
    pub fn new(challenges: Vec<Vec<i8>>, responses: Vec<Vec<f64>>) -> Result<Self> {
        let n = challenges.first().ok_or(PufError::Empty("challenges"))?.len();
        if n == 0 {
            return Err(PufError::InvalidParameter(
                "challenge length must be positive".to_string(),
            ));
        }
        if responses.len() != challenges.len() {
            return Err(PufError::LengthMismatch {
                what: "response rows",
                expected: challenges.len(),
                found: responses.len(),
            });
        }
        validate_challenges(&challenges, n)?;

        let m = responses[0].len();
        if m == 0 {
            return Err(PufError::Empty("response row"));
        }
        if let Some((row, r)) = responses.iter().enumerate().find(|(_, r)| r.len() != m) {
            return Err(PufError::RaggedRow {
                row,
                expected: m,
                found: r.len(),
            });
        }

        Ok(Self {
            challenges,
            responses,
        })
    }

    /// Query `sim` on `count` random challenges drawn with `seed`.
    pub fn from_simulation<S: Simulation + ?Sized>(
        sim: &S,
        count: usize,
        seed: u64,
    ) -> Result<Self> {
        let challenges = random_inputs(sim.challenge_length(), count, seed);
        let responses = sim.eval(&challenges)?;
        Self::new(challenges, responses)
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Width of the first challenge; 0 for an empty set.
    pub fn challenge_length(&self) -> usize {
        self.challenges.first().map_or(0, Vec::len)
    }

    /// Width of the first response row; 0 for an empty set.
    pub fn response_length(&self) -> usize {
        self.responses.first().map_or(0, Vec::len)
    }

    /// Split into (first ⌊fraction·N⌋ rows, remaining rows). Both halves must be non-empty.
    pub fn split(&self, fraction: f64) -> Result<(Self, Self)> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(PufError::InvalidParameter(format!(
                "split fraction {fraction} must lie strictly between 0 and 1"
            )));
        }
        let cut = (self.len() as f64 * fraction).floor() as usize;
        if cut == 0 || cut == self.len() {
            return Err(PufError::InvalidParameter(format!(
                "splitting {} rows at {fraction} leaves an empty side",
                self.len()
            )));
        }
        let head = Self {
            challenges: self.challenges[..cut].to_vec(),
            responses: self.responses[..cut].to_vec(),
        };
        let tail = Self {
            challenges: self.challenges[cut..].to_vec(),
            responses: self.responses[cut..].to_vec(),
        };
        Ok((head, tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChallengeResponseSet {
        ChallengeResponseSet::new(
            vec![vec![1, 1], vec![1, -1], vec![-1, 1], vec![-1, -1]],
            vec![vec![1.0], vec![-1.0], vec![-1.0], vec![1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_accessors() {
        let crps = sample();
        assert_eq!(crps.len(), 4);
        assert_eq!(crps.challenge_length(), 2);
        assert_eq!(crps.response_length(), 1);
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(matches!(
            ChallengeResponseSet::new(vec![], vec![]),
            Err(PufError::Empty("challenges"))
        ));
    }

    #[test]
    fn test_new_rejects_row_mismatch() {
        let err = ChallengeResponseSet::new(vec![vec![1], vec![-1]], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, PufError::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_new_rejects_binary_challenges() {
        let err = ChallengeResponseSet::new(vec![vec![0, 1]], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, PufError::NotPlusMinusOne { .. }));
    }

    #[test]
    fn test_new_rejects_ragged_responses() {
        let err = ChallengeResponseSet::new(
            vec![vec![1], vec![-1]],
            vec![vec![1.0, 1.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, PufError::RaggedRow { row: 1, expected: 2, found: 1 }));
    }

    #[test]
    fn test_lengths_of_unvalidated_empty_set() {
        let crps = ChallengeResponseSet {
            challenges: vec![],
            responses: vec![],
        };
        assert!(crps.is_empty());
        assert_eq!(crps.challenge_length(), 0);
        assert_eq!(crps.response_length(), 0);
    }

    #[test]
    fn test_split() {
        let (train, test) = sample().split(0.75).unwrap();
        assert_eq!(train.len(), 3);
        assert_eq!(test.len(), 1);
        assert_eq!(test.challenges[0], vec![-1, -1]);
        assert!(sample().split(0.1).is_err());
        assert!(sample().split(1.0).is_err());
    }
}
