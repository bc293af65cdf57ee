//! Fourier coefficient estimation and the low-degree predictive model.
//!
//! For a target f: {-1,1}^n → R^m and a sample {(x_i, y_i)} of size N, the
//! coefficient of parity s for output j is estimated as
//!
//! ```text
//! f̂_j(s) = (1/N) Σ_i χ_s(x_i) · y_ij
//! ```
//!
//! and the model predicts Σ_s f̂_j(s) · χ_s(x) over the basis of degree ≤ deg,
//! optionally followed by a sign threshold for Boolean targets.

use crate::basis::{basis_size, BasisCache};
use crate::error::{LmnError, Result};
use crate::parity::evaluate;
use puf_core::{PufError, Simulation};
use serde::Serialize;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Output policy and responses
// ---------------------------------------------------------------------------

/// How the linear prediction is turned into an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OutputPolicy {
    /// +1 where the linear prediction is ≥ 0, -1 otherwise (zero maps to +1).
    #[default]
    Boolean,
    /// The linear prediction unchanged.
    Real,
}

impl OutputPolicy {
    #[inline]
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            OutputPolicy::Boolean => {
                if raw >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            OutputPolicy::Real => raw,
        }
    }
}

/// N×m training targets. A flat vector is read as an N×1 column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMatrix(Vec<Vec<f64>>);

impl ResponseMatrix {
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for ResponseMatrix {
    fn from(column: Vec<f64>) -> Self {
        Self(column.into_iter().map(|y| vec![y]).collect())
    }
}

impl From<Vec<Vec<f64>>> for ResponseMatrix {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }
}

// ---------------------------------------------------------------------------
// Fit
// ---------------------------------------------------------------------------

/// Estimate the degree-≤`degree` Fourier coefficients from parity evaluations.
///
/// `chis` is the N×k matrix produced by [`crate::parity::evaluate`] for the
/// basis (input_length, degree); `responses` holds the N matching targets.
/// The returned model uses [`OutputPolicy::Boolean`] and shares `cache` for
/// later predictions.
pub fn fit(
    chis: &[Vec<i8>],
    responses: impl Into<ResponseMatrix>,
    input_length: usize,
    degree: usize,
    cache: Arc<BasisCache>,
) -> Result<FourierModel> {
    let responses = responses.into();
    let k = expected_terms(input_length, degree)?;

    if chis.is_empty() {
        return Err(PufError::Empty("parity evaluations").into());
    }
    if responses.len() != chis.len() {
        return Err(LmnError::ShapeMismatch {
            what: "response rows",
            expected: chis.len(),
            found: responses.len(),
        });
    }
    let m = responses.rows()[0].len();
    if m == 0 {
        return Err(PufError::Empty("response row").into());
    }
    for (row, y) in responses.rows().iter().enumerate() {
        if y.len() != m {
            return Err(PufError::RaggedRow {
                row,
                expected: m,
                found: y.len(),
            }
            .into());
        }
    }
    if let Some(bad) = chis.iter().find(|row| row.len() != k) {
        return Err(LmnError::ShapeMismatch {
            what: "parity evaluations per row",
            expected: k,
            found: bad.len(),
        });
    }

    let mut coefficients = vec![vec![0.0f64; k]; m];
    for (chi, y) in chis.iter().zip(responses.rows()) {
        for (coef_j, &y_j) in coefficients.iter_mut().zip(y) {
            for (c, &x) in coef_j.iter_mut().zip(chi) {
                *c += x as f64 * y_j;
            }
        }
    }
    let n_samples = chis.len() as f64;
    for c in coefficients.iter_mut().flatten() {
        *c /= n_samples;
    }

    log::debug!(
        "Estimated {k} Fourier coefficients per output from {} samples \
         (n={input_length}, deg={degree}, m={m})",
        chis.len()
    );

    Ok(FourierModel {
        coefficients,
        degree,
        input_length,
        policy: OutputPolicy::default(),
        cache,
    })
}

/// Basis size for (n, deg) as a usize, validating the arguments on the way.
fn expected_terms(input_length: usize, degree: usize) -> Result<usize> {
    if input_length == 0 {
        return Err(LmnError::ZeroInputLength);
    }
    if degree > input_length {
        return Err(LmnError::InvalidDegree {
            n: input_length,
            deg: degree,
        });
    }
    let size = basis_size(input_length, degree);
    usize::try_from(size).map_err(|_| LmnError::BasisTooLarge {
        n: input_length,
        deg: degree,
        size,
        limit: usize::MAX,
    })
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// One estimated coefficient with its parity, for reports.
#[derive(Debug, Clone, Serialize)]
pub struct FourierTerm {
    /// Indicator string, position 0 rightmost.
    pub parity: String,
    pub positions: Vec<usize>,
    pub coefficient: f64,
}

/// Low-degree Fourier approximation of a challenge-response function.
#[derive(Debug, Clone, Serialize)]
pub struct FourierModel {
    /// m × k coefficient tensor, columns in basis order.
    coefficients: Vec<Vec<f64>>,
    degree: usize,
    input_length: usize,
    policy: OutputPolicy,
    #[serde(skip)]
    cache: Arc<BasisCache>,
}

impl FourierModel {
    /// Build a model from a known m × k coefficient tensor.
    pub fn from_coefficients(
        coefficients: Vec<Vec<f64>>,
        input_length: usize,
        degree: usize,
        cache: Arc<BasisCache>,
    ) -> Result<Self> {
        let k = expected_terms(input_length, degree)?;
        if coefficients.is_empty() {
            return Err(PufError::Empty("coefficient tensor").into());
        }
        if let Some(bad) = coefficients.iter().find(|row| row.len() != k) {
            return Err(LmnError::ShapeMismatch {
                what: "coefficients per output",
                expected: k,
                found: bad.len(),
            });
        }
        Ok(Self {
            coefficients,
            degree,
            input_length,
            policy: OutputPolicy::default(),
            cache,
        })
    }

    /// The same coefficients under a different output policy.
    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn input_length(&self) -> usize {
        self.input_length
    }

    pub fn policy(&self) -> OutputPolicy {
        self.policy
    }

    /// Σ_s f̂_j(s)² for each output j. Equals 1 for a ±1 function whose whole
    /// spectrum was recovered exactly.
    pub fn parseval_weight(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .map(|row| row.iter().map(|c| c * c).sum())
            .collect()
    }

    /// Linear prediction chis · coefficientsᵀ, before the output policy.
    pub fn predict_raw(&self, challenges: &[Vec<i8>]) -> Result<Vec<Vec<f64>>> {
        if let Some(bad) = challenges.iter().find(|c| c.len() != self.input_length) {
            return Err(LmnError::ShapeMismatch {
                what: "challenge width",
                expected: self.input_length,
                found: bad.len(),
            });
        }
        let basis = self.cache.generate_basis(self.input_length, self.degree)?;
        let k = self.coefficients.first().map_or(0, Vec::len);
        if basis.len() != k {
            return Err(LmnError::ShapeMismatch {
                what: "parity evaluations per row",
                expected: k,
                found: basis.len(),
            });
        }
        let chis = evaluate(challenges, &basis)?;

        Ok(chis
            .iter()
            .map(|chi| {
                self.coefficients
                    .iter()
                    .map(|coef| {
                        coef.iter()
                            .zip(chi)
                            .map(|(&c, &x)| c * x as f64)
                            .sum::<f64>()
                    })
                    .collect()
            })
            .collect())
    }

    /// N × m predictions with the output policy applied.
    pub fn predict(&self, challenges: &[Vec<i8>]) -> Result<Vec<Vec<f64>>> {
        let mut out = self.predict_raw(challenges)?;
        if self.policy != OutputPolicy::Real {
            for v in out.iter_mut().flatten() {
                *v = self.policy.apply(*v);
            }
        }
        Ok(out)
    }

    /// The `limit` largest-magnitude coefficients of output `output`.
    pub fn heaviest_terms(&self, output: usize, limit: usize) -> Result<Vec<FourierTerm>> {
        let Some(row) = self.coefficients.get(output) else {
            return Err(LmnError::ShapeMismatch {
                what: "output index",
                expected: self.coefficients.len(),
                found: output,
            });
        };
        let basis = self.cache.generate_basis(self.input_length, self.degree)?;

        let mut order: Vec<usize> = (0..row.len()).collect();
        order.sort_by(|&a, &b| row[b].abs().total_cmp(&row[a].abs()));
        Ok(order
            .into_iter()
            .take(limit)
            .filter_map(|s| {
                basis.get(s).map(|p| FourierTerm {
                    parity: p.to_string(),
                    positions: p.positions().to_vec(),
                    coefficient: row[s],
                })
            })
            .collect())
    }
}

impl Simulation for FourierModel {
    fn challenge_length(&self) -> usize {
        self.input_length
    }

    fn response_length(&self) -> usize {
        self.coefficients.len()
    }

    fn eval(&self, challenges: &[Vec<i8>]) -> puf_core::Result<Vec<Vec<f64>>> {
        Ok(self.predict(challenges)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
