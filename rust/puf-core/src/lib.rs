//! Shared types for challenge-response learning experiments.
//!
//! Challenges are ±1 vectors: bit b is encoded as (-1)^b, so 0 ↦ +1 and 1 ↦ -1.
//! Responses are N×m real matrices; Boolean simulations emit ±1 values.

pub mod arbiter;
pub mod crp;
pub mod error;
pub mod metrics;
pub mod simulation;
pub mod transform;

pub use arbiter::XorArbiterPuf;
pub use crp::ChallengeResponseSet;
pub use error::{PufError, Result};
pub use simulation::{LearningAttack, Simulation};
pub use transform::{key_from_u64, ChallengeTransform, TransformedPuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draw `count` uniformly random ±1 challenges of length `n` from a seeded RNG.
pub fn random_inputs(n: usize, count: usize, seed: u64) -> Vec<Vec<i8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            (0..n)
                .map(|_| if rng.gen::<bool>() { 1 } else { -1 })
                .collect()
        })
        .collect()
}

/// Enumerate the whole hypercube {-1,1}^n in binary counting order.
///
/// Column 0 is the most significant counter bit, so for n = 2 the rows are the
/// encodings of (0,0), (0,1), (1,0), (1,1).
///
/// # Panics
///
/// Panics if `n > 24`; the full cube would hold more than 2^24 rows.
pub fn all_inputs(n: usize) -> Vec<Vec<i8>> {
    assert!(n <= 24, "hypercube enumeration only feasible for n ≤ 24");
    (0..1usize << n)
        .map(|row| {
            (0..n)
                .map(|col| encode_bit(((row >> (n - 1 - col)) & 1) as u8))
                .collect()
        })
        .collect()
}

/// Encode a {0,1} bit as ±1.
#[inline]
pub fn encode_bit(bit: u8) -> i8 {
    if bit == 0 {
        1
    } else {
        -1
    }
}

/// Decode a ±1 value back to a {0,1} bit.
#[inline]
pub fn decode_bit(value: i8) -> u8 {
    (value < 0) as u8
}

/// Check that every challenge has exactly `n` entries, each exactly +1 or -1.
pub fn validate_challenges(challenges: &[Vec<i8>], n: usize) -> Result<()> {
    for (row, challenge) in challenges.iter().enumerate() {
        if challenge.len() != n {
            return Err(PufError::RaggedRow {
                row,
                expected: n,
                found: challenge.len(),
            });
        }
        if let Some((col, &value)) = challenge
            .iter()
            .enumerate()
            .find(|(_, &v)| v != 1 && v != -1)
        {
            return Err(PufError::NotPlusMinusOne { row, col, value });
        }
    }
    Ok(())
}
