//! The two seams every attack experiment is written against.

use crate::error::Result;

/// Anything that maps ±1 challenges to responses.
pub trait Simulation {
    /// Number of challenge bits n.
    fn challenge_length(&self) -> usize;

    /// Number of response values m per challenge.
    fn response_length(&self) -> usize;

    /// Evaluate a batch of challenges, returning an N×m response matrix.
    fn eval(&self, challenges: &[Vec<i8>]) -> Result<Vec<Vec<f64>>>;

    /// Evaluate every challenge `r` times, returning an N×m×r array.
    ///
    /// Noise-free simulations repeat `eval`; noisy ones override this and draw
    /// their noise from `seed`.
    fn r_eval(&self, r: usize, challenges: &[Vec<i8>], _seed: u64) -> Result<Vec<Vec<Vec<f64>>>> {
        let responses = self.eval(challenges)?;
        Ok(responses
            .into_iter()
            .map(|row| row.into_iter().map(|v| vec![v; r]).collect())
            .collect())
    }
}

/// Two-phase learning attack: construct with training data, then `fit`.
pub trait LearningAttack {
    type Model: Simulation;
    type Error: std::error::Error;

    /// Learn a model from the training data and keep it.
    fn fit(&mut self) -> std::result::Result<&Self::Model, Self::Error>;

    /// The model from the last successful `fit`, if any.
    fn model(&self) -> Option<&Self::Model>;
}
