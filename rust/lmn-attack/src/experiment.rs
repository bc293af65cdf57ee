//! LMN attacks on an XOR Arbiter PUF behind keyed challenge transforms.
//!
//! For each (transform, degree) block the attacker draws training challenges,
//! the PUF answers their transformed versions, and LMN is fitted on the
//! challenges the attacker actually sent. Reported per block:
//!
//! ```text
//! similarity          agreement with the PUF seen through the transform
//! puf_similarity      agreement with the bare PUF
//! accuracy            on fresh CRPs, continuing the transform's key state
//! transform_entropy   relative entropy between challenges and their transforms
//! ```
//!
//! A transform that hides the PUF well drives `similarity` and `accuracy`
//! toward 0.5 for every degree.

use crate::attack::LmnAttack;
use crate::basis::{basis_size, BasisCache, DEFAULT_MAX_BASIS_SIZE};
use crate::error::Result;
use crate::fourier::FourierTerm;
use puf_core::metrics::{accuracy, similarity, transform_entropy};
use puf_core::{
    key_from_u64, random_inputs, ChallengeResponseSet, ChallengeTransform, LearningAttack,
    Simulation, TransformedPuf, XorArbiterPuf,
};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Configuration for an attack experiment.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Challenge length.
    pub n: usize,
    /// Number of XORed arbiter chains.
    pub k: usize,
    pub training_crps: usize,
    pub test_crps: usize,
    /// Random challenges used for the similarity measurements.
    pub similarity_samples: usize,
    /// LMN degrees to try.
    pub degrees: Vec<usize>,
    /// Response noise level of the PUF (0 = noise-free).
    pub noisiness: f64,
    pub transforms: Vec<ChallengeTransform>,
    /// Transform key; the n low bits are used, most significant first.
    pub key: u64,
    pub puf_seed: u64,
    pub challenge_seed: u64,
    pub similarity_seed: u64,
    pub test_seed: u64,
    pub entropy_seed: u64,
    /// Largest parity basis any block may request.
    pub max_basis_size: usize,
    /// Coefficients listed per block in the report.
    pub report_terms: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n: 64,
            k: 1,
            training_crps: 20_000,
            test_crps: 10_000,
            similarity_samples: 1000,
            degrees: vec![1, 2],
            noisiness: 0.0,
            transforms: ChallengeTransform::ALL.to_vec(),
            key: 0x9284_7583_0285_7311,
            puf_seed: 10,
            challenge_seed: 21,
            similarity_seed: 42,
            test_seed: 84,
            entropy_seed: 168,
            max_basis_size: DEFAULT_MAX_BASIS_SIZE,
            report_terms: 5,
        }
    }
}

/// Results for a single (transform, degree) block.
#[derive(Debug, Clone, Serialize)]
pub struct AttackResult {
    pub transform: ChallengeTransform,
    pub degree: usize,
    pub basis_size: usize,
    pub similarity: f64,
    pub puf_similarity: f64,
    pub accuracy: f64,
    pub transform_entropy: f64,
    /// Σ of squared estimated coefficients.
    pub parseval_weight: f64,
    pub heaviest_terms: Vec<FourierTerm>,
    pub fit_ms: f64,
}

/// Full experiment result.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentResult {
    pub n: usize,
    pub k: usize,
    pub training_crps: usize,
    pub test_crps: usize,
    pub noisiness: f64,
    pub results: Vec<AttackResult>,
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Run every (transform, degree) block of the experiment.
///
/// Blocks run in parallel with Rayon and share one basis cache. Any failing
/// block fails the whole run.
pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentResult> {
    let puf =
        XorArbiterPuf::with_noisiness(config.n, config.k, config.puf_seed, config.noisiness)?;
    let cache = Arc::new(BasisCache::with_max_basis_size(config.max_basis_size));
    log::info!(
        "Experiment: n={}, k={}, {} training CRPs, degrees {:?}, {} transforms",
        config.n,
        config.k,
        config.training_crps,
        config.degrees,
        config.transforms.len()
    );

    let work: Vec<(ChallengeTransform, usize)> = config
        .transforms
        .iter()
        .flat_map(|&t| config.degrees.iter().map(move |&d| (t, d)))
        .collect();

    let results = work
        .into_par_iter()
        .map(|(transform, degree)| run_block(config, &puf, &cache, transform, degree))
        .collect::<Result<Vec<AttackResult>>>()?;

    Ok(ExperimentResult {
        n: config.n,
        k: config.k,
        training_crps: config.training_crps,
        test_crps: config.test_crps,
        noisiness: config.noisiness,
        results,
    })
}

/// CRPs for `challenges` as seen by the attacker: the PUF answers the
/// transformed challenges once, with noise drawn from `seed`.
fn observe(
    puf: &XorArbiterPuf,
    transform: ChallengeTransform,
    challenges: Vec<Vec<i8>>,
    key: &[i8],
    seed: u64,
) -> Result<(ChallengeResponseSet, Vec<i8>)> {
    let (transformed, next_key) = transform.apply(&challenges, key)?;
    let responses = puf
        .r_eval(1, &transformed, seed)?
        .into_iter()
        .map(|row| row.into_iter().map(|reps| reps[0]).collect())
        .collect();
    Ok((ChallengeResponseSet::new(challenges, responses)?, next_key))
}

fn run_block(
    config: &ExperimentConfig,
    puf: &XorArbiterPuf,
    cache: &Arc<BasisCache>,
    transform: ChallengeTransform,
    degree: usize,
) -> Result<AttackResult> {
    let n = config.n;
    let initial_key = match transform {
        ChallengeTransform::Identity => Vec::new(),
        _ => key_from_u64(config.key, n),
    };

    let challenges = random_inputs(n, config.training_crps, config.challenge_seed);
    let (training, key) =
        observe(puf, transform, challenges, &initial_key, config.challenge_seed)?;

    let start = Instant::now();
    let mut attack = LmnAttack::new(training, degree, Arc::clone(cache));
    let model = attack.fit()?;
    let fit_ms = start.elapsed().as_secs_f64() * 1000.0;

    let observed = TransformedPuf::new(puf.clone(), transform, initial_key);
    let sim = similarity(model, &observed, config.similarity_seed, config.similarity_samples)?[0];
    let puf_sim = similarity(model, puf, config.similarity_seed, config.similarity_samples)?[0];

    // The key state carries on from training, as it would for a live device.
    let test_challenges = random_inputs(n, config.test_crps, config.test_seed);
    let (test_set, key) = observe(puf, transform, test_challenges, &key, config.test_seed)?;
    let acc = accuracy(model, &test_set)?[0];

    let entropy_challenges = random_inputs(n, config.test_crps, config.entropy_seed);
    let (entropy_transformed, _) = transform.apply(&entropy_challenges, &key)?;
    let entropy = transform_entropy(&entropy_challenges, &entropy_transformed)?;

    log::info!(
        "{transform} deg={degree}: similarity {sim:.3}, bare PUF {puf_sim:.3}, accuracy {acc:.3}"
    );

    Ok(AttackResult {
        transform,
        degree,
        basis_size: usize::try_from(basis_size(n, degree)).unwrap_or(usize::MAX),
        similarity: sim,
        puf_similarity: puf_sim,
        accuracy: acc,
        transform_entropy: entropy,
        parseval_weight: model.parseval_weight()[0],
        heaviest_terms: model.heaviest_terms(0, config.report_terms)?,
        fit_ms,
    })
}

// ---------------------------------------------------------------------------
// Summary printing
// ---------------------------------------------------------------------------

/// Print a human-readable summary of the experiment.
pub fn print_summary(result: &ExperimentResult) {
    println!("\n=== LMN attack on {}-XOR Arbiter PUF (n={}) ===", result.k, result.n);
    println!(
        "Config: {} training CRPs, {} test CRPs, noisiness={}\n",
        result.training_crps, result.test_crps, result.noisiness
    );

    println!(
        "{:>12} {:>4} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "transform", "deg", "terms", "similarity", "bare PUF", "accuracy", "entropy", "parseval"
    );
    println!("{}", "-".repeat(82));
    for r in &result.results {
        println!(
            "{:>12} {:>4} {:>8} {:>10.4} {:>10.4} {:>10.4} {:>10.3} {:>10.4}",
            r.transform.name(),
            r.degree,
            r.basis_size,
            r.similarity,
            r.puf_similarity,
            r.accuracy,
            r.transform_entropy,
            r.parseval_weight
        );
    }

    println!("\nHeaviest coefficients");
    for r in &result.results {
        let terms: Vec<String> = r
            .heaviest_terms
            .iter()
            .map(|t| format!("{:?}:{:+.3}", t.positions, t.coefficient))
            .collect();
        println!("  {:>12} deg={}  {}", r.transform.name(), r.degree, terms.join("  "));
    }
}
