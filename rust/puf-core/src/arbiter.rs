//! XOR Arbiter PUF simulation (additive delay model).
//!
//! Each of the k chains is a linear threshold function over the parity feature
//! vector φ(c), where φ_i(c) = ∏_{j ≥ i} c_j for i < n and φ_n = 1 (bias).
//! The XOR of the chains is the product of their ±1 responses.

use crate::error::{PufError, Result};
use crate::simulation::Simulation;
use crate::validate_challenges;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone)]
pub struct XorArbiterPuf {
    n: usize,
    /// k × (n + 1) delay weights; the last column is the bias.
    weights: Vec<Vec<f64>>,
    noisiness: f64,
}

impl XorArbiterPuf {
    /// Noise-free k-XOR Arbiter PUF with N(0,1) weights drawn from `seed`.
    pub fn new(n: usize, k: usize, seed: u64) -> Result<Self> {
        Self::with_noisiness(n, k, seed, 0.0)
    }

    /// As [`XorArbiterPuf::new`], with evaluation noise σ = noisiness · √n in `r_eval`.
    pub fn with_noisiness(n: usize, k: usize, seed: u64, noisiness: f64) -> Result<Self> {
        if n == 0 || k == 0 {
            return Err(PufError::InvalidParameter(format!(
                "arbiter PUF needs n ≥ 1 and k ≥ 1, got n={n}, k={k}"
            )));
        }
        if !(noisiness.is_finite() && noisiness >= 0.0) {
            return Err(PufError::InvalidParameter(format!(
                "noisiness must be finite and non-negative, got {noisiness}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let normal = gaussian(1.0)?;
        let weights: Vec<Vec<f64>> = (0..k)
            .map(|_| (0..=n).map(|_| normal.sample(&mut rng)).collect())
            .collect();
        log::debug!("XOR arbiter PUF: n={n}, k={k}, noisiness={noisiness}, seed={seed}");

        Ok(Self {
            n,
            weights,
            noisiness,
        })
    }

    pub fn chains(&self) -> usize {
        self.weights.len()
    }

    pub fn noisiness(&self) -> f64 {
        self.noisiness
    }

    /// Standard deviation of the per-chain delay noise.
    pub fn sigma_noise(&self) -> f64 {
        self.noisiness * (self.n as f64).sqrt()
    }

    /// Parity feature vector φ(c) of length n + 1.
    pub fn features(challenge: &[i8]) -> Vec<f64> {
        let n = challenge.len();
        let mut phi = vec![1.0; n + 1];
        for i in (0..n).rev() {
            phi[i] = phi[i + 1] * challenge[i] as f64;
        }
        phi
    }

    /// Raw delay difference of every chain on one challenge.
    fn delays(&self, challenge: &[i8]) -> Vec<f64> {
        let phi = Self::features(challenge);
        self.weights
            .iter()
            .map(|w| w.iter().zip(&phi).map(|(a, b)| a * b).sum::<f64>())
            .collect()
    }
}

#[inline]
fn sign(v: f64) -> f64 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn gaussian(std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev)
        .map_err(|e| PufError::InvalidParameter(format!("normal distribution: {e}")))
}

impl Simulation for XorArbiterPuf {
    fn challenge_length(&self) -> usize {
        self.n
    }

    fn response_length(&self) -> usize {
        1
    }

    fn eval(&self, challenges: &[Vec<i8>]) -> Result<Vec<Vec<f64>>> {
        validate_challenges(challenges, self.n)?;
        Ok(challenges
            .iter()
            .map(|c| vec![self.delays(c).into_iter().map(sign).product::<f64>()])
            .collect())
    }

    fn r_eval(&self, r: usize, challenges: &[Vec<i8>], seed: u64) -> Result<Vec<Vec<Vec<f64>>>> {
        validate_challenges(challenges, self.n)?;
        let sigma = self.sigma_noise();
        if sigma == 0.0 {
            let responses = self.eval(challenges)?;
            return Ok(responses
                .into_iter()
                .map(|row| row.into_iter().map(|v| vec![v; r]).collect())
                .collect());
        }

        let noise = gaussian(sigma)?;
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(challenges
            .iter()
            .map(|c| {
                let delays = self.delays(c);
                let repeats: Vec<f64> = (0..r)
                    .map(|_| {
                        delays
                            .iter()
                            .map(|&d| sign(d + noise.sample(&mut rng)))
                            .product::<f64>()
                    })
                    .collect();
                vec![repeats]
            })
            .collect())
    }
}
