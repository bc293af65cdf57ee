//! Keyed challenge transforms placed in front of a PUF.
//!
//! The attacker only sees the challenges it sent; the PUF answers the
//! transformed ones. Every transform returns the next key state so stateful
//! transforms (the T flip-flop chain) can be continued across batches.

use crate::error::{PufError, Result};
use crate::simulation::Simulation;
use crate::validate_challenges;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChallengeTransform {
    /// Challenges pass through unchanged.
    Identity,
    /// out_i = +1 if c_i ≠ k_i else -1.
    XorKey,
    /// Two XOR passes with keys built from the halves of the key, each half repeated twice.
    DoubleXor,
    /// Emit the running key, then flip the key bits where the challenge bit is +1.
    TffWithReset,
}

impl ChallengeTransform {
    pub const ALL: [ChallengeTransform; 4] = [
        ChallengeTransform::Identity,
        ChallengeTransform::XorKey,
        ChallengeTransform::DoubleXor,
        ChallengeTransform::TffWithReset,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChallengeTransform::Identity => "none",
            ChallengeTransform::XorKey => "xor",
            ChallengeTransform::DoubleXor => "double-xor",
            ChallengeTransform::TffWithReset => "tff",
        }
    }

    /// Transform `challenges` under `key`, returning (transformed, next key).
    ///
    /// Keyed transforms require the key length to equal the challenge length.
    pub fn apply(&self, challenges: &[Vec<i8>], key: &[i8]) -> Result<(Vec<Vec<i8>>, Vec<i8>)> {
        match self {
            ChallengeTransform::Identity => {
                if let Some(first) = challenges.first() {
                    validate_challenges(challenges, first.len())?;
                }
                Ok((challenges.to_vec(), key.to_vec()))
            }
            ChallengeTransform::XorKey => {
                keyed_width(challenges, key)?;
                Ok((
                    challenges.iter().map(|c| xor_with(c, key)).collect(),
                    key.to_vec(),
                ))
            }
            ChallengeTransform::DoubleXor => {
                let n = keyed_width(challenges, key)?;
                if n % 2 != 0 {
                    return Err(PufError::InvalidParameter(format!(
                        "double XOR needs an even key length, got {n}"
                    )));
                }
                let (lo, hi) = key.split_at(n / 2);
                let first = [lo, lo].concat();
                let second = [hi, hi].concat();
                Ok((
                    challenges
                        .iter()
                        .map(|c| xor_with(&xor_with(c, &first), &second))
                        .collect(),
                    key.to_vec(),
                ))
            }
            ChallengeTransform::TffWithReset => {
                keyed_width(challenges, key)?;
                let mut state = key.to_vec();
                let mut out = Vec::with_capacity(challenges.len());
                for c in challenges {
                    out.push(state.clone());
                    for (bit, &ci) in state.iter_mut().zip(c) {
                        if ci == 1 {
                            *bit = -*bit;
                        }
                    }
                }
                Ok((out, state))
            }
        }
    }
}

impl fmt::Display for ChallengeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChallengeTransform {
    type Err = PufError;

    fn from_str(s: &str) -> Result<Self> {
        ChallengeTransform::ALL
            .into_iter()
            .find(|t| t.name() == s.trim())
            .ok_or_else(|| {
                PufError::InvalidParameter(format!(
                    "unknown transform '{s}' (expected none|xor|double-xor|tff)"
                ))
            })
    }
}

/// A simulation queried through a challenge transform.
///
/// Every `eval` starts from the same initial key, so stateful transforms are
/// reset per batch.
#[derive(Debug, Clone)]
pub struct TransformedPuf<S> {
    inner: S,
    transform: ChallengeTransform,
    key: Vec<i8>,
}

impl<S: Simulation> TransformedPuf<S> {
    pub fn new(inner: S, transform: ChallengeTransform, key: Vec<i8>) -> Self {
        Self {
            inner,
            transform,
            key,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn transform(&self) -> ChallengeTransform {
        self.transform
    }
}

impl<S: Simulation> Simulation for TransformedPuf<S> {
    fn challenge_length(&self) -> usize {
        self.inner.challenge_length()
    }

    fn response_length(&self) -> usize {
        self.inner.response_length()
    }

    fn eval(&self, challenges: &[Vec<i8>]) -> Result<Vec<Vec<f64>>> {
        let (transformed, _) = self.transform.apply(challenges, &self.key)?;
        self.inner.eval(&transformed)
    }

    fn r_eval(&self, r: usize, challenges: &[Vec<i8>], seed: u64) -> Result<Vec<Vec<Vec<f64>>>> {
        let (transformed, _) = self.transform.apply(challenges, &self.key)?;
        self.inner.r_eval(r, &transformed, seed)
    }
}

/// ±1 key from the `n` low bits of `value`, most significant first; 0 ↦ -1, 1 ↦ +1.
pub fn key_from_u64(value: u64, n: usize) -> Vec<i8> {
    (0..n)
        .map(|i| {
            let shift = n - 1 - i;
            let bit = if shift < 64 { (value >> shift) & 1 } else { 0 };
            if bit == 1 {
                1
            } else {
                -1
            }
        })
        .collect()
}

fn xor_with(challenge: &[i8], key: &[i8]) -> Vec<i8> {
    challenge
        .iter()
        .zip(key)
        .map(|(&c, &k)| if c != k { 1 } else { -1 })
        .collect()
}

/// Check the key and the challenges against it, returning the shared width.
fn keyed_width(challenges: &[Vec<i8>], key: &[i8]) -> Result<usize> {
    if key.is_empty() {
        return Err(PufError::Empty("transform key"));
    }
    if key.iter().any(|&k| k != 1 && k != -1) {
        return Err(PufError::InvalidParameter(
            "transform key must be ±1-valued".to_string(),
        ));
    }
    validate_challenges(challenges, key.len())?;
    Ok(key.len())
}
