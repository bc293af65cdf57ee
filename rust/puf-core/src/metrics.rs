//! Response-level metrics: similarity, accuracy, bias, reliability,
//! uniqueness, correlation and relative entropy.
//!
//! Response matrices are N×m; repeated evaluations are N×m×r. Every metric that
//! works per response bit returns one value per column.

use crate::crp::ChallengeResponseSet;
use crate::error::{PufError, Result};
use crate::random_inputs;
use crate::simulation::Simulation;

// ---------------------------------------------------------------------------
// Similarity and accuracy
// ---------------------------------------------------------------------------

/// Per-column fraction of rows where `responses1` and `responses2` agree.
pub fn similarity_data(responses1: &[Vec<f64>], responses2: &[Vec<f64>]) -> Result<Vec<f64>> {
    let m = check_same_shape(responses1, responses2)?;
    let mut equal = vec![0usize; m];
    for (a, b) in responses1.iter().zip(responses2) {
        for (j, (x, y)) in a.iter().zip(b).enumerate() {
            if x == y {
                equal[j] += 1;
            }
        }
    }
    let n = responses1.len() as f64;
    Ok(equal.into_iter().map(|c| c as f64 / n).collect())
}

/// Fraction of `test_set` responses the simulation reproduces, per response bit.
pub fn accuracy<S: Simulation + ?Sized>(
    simulation: &S,
    test_set: &ChallengeResponseSet,
) -> Result<Vec<f64>> {
    let predicted = simulation.eval(&test_set.challenges)?;
    similarity_data(&predicted, &test_set.responses)
}

/// Agreement of two simulations on `count` random challenges drawn with `seed`.
pub fn similarity<A, B>(instance1: &A, instance2: &B, seed: u64, count: usize) -> Result<Vec<f64>>
where
    A: Simulation + ?Sized,
    B: Simulation + ?Sized,
{
    if instance1.challenge_length() != instance2.challenge_length() {
        return Err(PufError::InvalidParameter(format!(
            "cannot compare instances with challenge lengths {} and {}",
            instance1.challenge_length(),
            instance2.challenge_length()
        )));
    }
    let inputs = random_inputs(instance1.challenge_length(), count, seed);
    similarity_data(&instance1.eval(&inputs)?, &instance2.eval(&inputs)?)
}

// ---------------------------------------------------------------------------
// Bias
// ---------------------------------------------------------------------------

/// Mean of each response column: b_l = E_x[f(x)_l].
pub fn bias_data(responses: &[Vec<f64>]) -> Result<Vec<f64>> {
    if responses.is_empty() {
        return Err(PufError::Empty("responses"));
    }
    Ok(column_means(responses))
}

/// Bias of a simulation estimated on `count` random challenges.
pub fn bias<S: Simulation + ?Sized>(instance: &S, seed: u64, count: usize) -> Result<Vec<f64>> {
    let challenges = random_inputs(instance.challenge_length(), count, seed);
    bias_data(&instance.eval(&challenges)?)
}

// ---------------------------------------------------------------------------
// Reliability
// ---------------------------------------------------------------------------

/// Per-challenge, per-bit reliability from N×m×r repeated responses.
///
/// With p = Pr[eval(x) = 1] = (E[eval(x)] + 1) / 2 the result is p² + (1 - p)².
pub fn reliability_data(responses: &[Vec<Vec<f64>>]) -> Vec<Vec<f64>> {
    responses
        .iter()
        .map(|row| {
            row.iter()
                .map(|repeats| {
                    let mean = repeats.iter().sum::<f64>() / repeats.len() as f64;
                    let p = (mean + 1.0) / 2.0;
                    p * p + (1.0 - p) * (1.0 - p)
                })
                .collect()
        })
        .collect()
}

/// Simulated reliability: `count` random challenges, each queried `r` times.
pub fn reliability<S: Simulation + ?Sized>(
    instance: &S,
    seed: u64,
    count: usize,
    r: usize,
) -> Result<Vec<Vec<f64>>> {
    if r == 0 {
        return Err(PufError::InvalidParameter(
            "reliability needs at least one repetition".to_string(),
        ));
    }
    let inputs = random_inputs(instance.challenge_length(), count, seed);
    let responses = instance.r_eval(r, &inputs, seed)?;
    Ok(reliability_data(&responses)
        .into_iter()
        .map(|row| row.into_iter().map(f64::abs).collect())
        .collect())
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

/// Uniqueness per response bit from an l×N×m array of responses of l instances:
/// 1 - 2·E_{f≠g}[|1/2 - Pr_x[f(x) = g(x)]|].
pub fn uniqueness_data(responses: &[Vec<Vec<f64>>]) -> Result<Vec<f64>> {
    if responses.len() < 2 {
        return Err(PufError::InvalidParameter(format!(
            "uniqueness needs at least two instances, got {}",
            responses.len()
        )));
    }
    let mut deviations = Vec::new();
    for (i, r1) in responses.iter().enumerate() {
        for r2 in &responses[i + 1..] {
            let sims = similarity_data(r1, r2)?;
            deviations.push(sims.into_iter().map(|s| (0.5 - s).abs()).collect::<Vec<_>>());
        }
    }
    Ok(column_means(&deviations)
        .into_iter()
        .map(|d| 1.0 - 2.0 * d)
        .collect())
}

/// Uniqueness of a group of simulations with equal challenge and response lengths.
pub fn uniqueness(instances: &[&dyn Simulation], seed: u64, count: usize) -> Result<Vec<f64>> {
    let first = instances.first().ok_or(PufError::Empty("instances"))?;
    let challenges = random_inputs(first.challenge_length(), count, seed);
    let responses = instances
        .iter()
        .map(|instance| instance.eval(&challenges))
        .collect::<Result<Vec<_>>>()?;
    uniqueness_data(&responses)
}

// ---------------------------------------------------------------------------
// Correlation and entropy
// ---------------------------------------------------------------------------

/// Pearson correlation of every response column. Constant columns yield NaN.
pub fn correlation_data(responses1: &[Vec<f64>], responses2: &[Vec<f64>]) -> Result<Vec<f64>> {
    let m = check_same_shape(responses1, responses2)?;
    Ok((0..m)
        .map(|j| {
            let a: Vec<f64> = responses1.iter().map(|row| row[j]).collect();
            let b: Vec<f64> = responses2.iter().map(|row| row[j]).collect();
            pearson(&a, &b)
        })
        .collect())
}

/// Base-2 Kullback–Leibler divergence D(p ‖ q) after normalising both vectors.
pub fn relative_entropy(p: &[f64], q: &[f64]) -> Result<f64> {
    if p.len() != q.len() {
        return Err(PufError::LengthMismatch {
            what: "distribution length",
            expected: p.len(),
            found: q.len(),
        });
    }
    let p_sum: f64 = p.iter().sum();
    let q_sum: f64 = q.iter().sum();
    if p.is_empty() || p_sum <= 0.0 || q_sum <= 0.0 {
        return Err(PufError::InvalidParameter(
            "relative entropy needs non-empty distributions with positive mass".to_string(),
        ));
    }
    Ok(p.iter()
        .zip(q)
        .map(|(&pi, &qi)| {
            let pi = pi / p_sum;
            let qi = qi / q_sum;
            if pi == 0.0 {
                0.0
            } else if qi == 0.0 {
                f64::INFINITY
            } else {
                pi * (pi / qi).log2()
            }
        })
        .sum())
}

/// How far a transform moves the challenge distribution.
///
/// Both challenge sets are flattened and mapped +1 ↦ 1, -1 ↦ 1e-20 before
/// taking their relative entropy.
pub fn transform_entropy(challenges: &[Vec<i8>], transformed: &[Vec<i8>]) -> Result<f64> {
    let flatten = |rows: &[Vec<i8>]| -> Vec<f64> {
        rows.iter()
            .flatten()
            .map(|&b| if b == 1 { 1.0 } else { 1e-20 })
            .collect()
    };
    relative_entropy(&flatten(challenges), &flatten(transformed))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_same_shape(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<usize> {
    if a.is_empty() {
        return Err(PufError::Empty("responses"));
    }
    if a.len() != b.len() {
        return Err(PufError::LengthMismatch {
            what: "response rows",
            expected: a.len(),
            found: b.len(),
        });
    }
    let m = a[0].len();
    for (row, (x, y)) in a.iter().zip(b).enumerate() {
        if x.len() != m {
            return Err(PufError::RaggedRow { row, expected: m, found: x.len() });
        }
        if y.len() != m {
            return Err(PufError::RaggedRow { row, expected: m, found: y.len() });
        }
    }
    Ok(m)
}

fn column_means(rows: &[Vec<f64>]) -> Vec<f64> {
    let m = rows.first().map_or(0, Vec::len);
    let mut sums = vec![0.0; m];
    for row in rows {
        for (s, v) in sums.iter_mut().zip(row) {
            *s += v;
        }
    }
    let n = rows.len() as f64;
    sums.into_iter().map(|s| s / n).collect()
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a) * (x - mean_a);
        var_b += (y - mean_b) * (y - mean_b);
    }
    cov / (var_a * var_b).sqrt()
}
