//! The LMN learning attack over a challenge-response set.

use crate::basis::BasisCache;
use crate::error::{LmnError, Result};
use crate::fourier::{fit, FourierModel, OutputPolicy};
use crate::parity::evaluate_degree;
use puf_core::{ChallengeResponseSet, LearningAttack, PufError};
use std::sync::Arc;
use std::time::Instant;

/// Learns every Fourier coefficient of degree ≤ `degree` from the training set.
#[derive(Debug)]
pub struct LmnAttack {
    crps: ChallengeResponseSet,
    degree: usize,
    cache: Arc<BasisCache>,
    policy: OutputPolicy,
    model: Option<FourierModel>,
}

impl LmnAttack {
    pub fn new(crps: ChallengeResponseSet, degree: usize, cache: Arc<BasisCache>) -> Self {
        Self {
            crps,
            degree,
            cache,
            policy: OutputPolicy::default(),
            model: None,
        }
    }

    /// Output policy for the fitted model (Boolean unless changed).
    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn crps(&self) -> &ChallengeResponseSet {
        &self.crps
    }
}

impl LearningAttack for LmnAttack {
    type Model = FourierModel;
    type Error = LmnError;

    fn fit(&mut self) -> Result<&FourierModel> {
        if self.crps.is_empty() {
            return Err(PufError::Empty("challenges").into());
        }
        let n = self.crps.challenge_length();
        log::info!(
            "LMN fit: {} CRPs, n={n}, deg={}, {} outputs",
            self.crps.len(),
            self.degree,
            self.crps.response_length()
        );
        let start = Instant::now();

        let chis = evaluate_degree(&self.crps.challenges, self.degree, &self.cache)?;
        log::debug!("Evaluated {} parities per challenge", chis.first().map_or(0, Vec::len));

        let model = fit(
            &chis,
            self.crps.responses.clone(),
            n,
            self.degree,
            Arc::clone(&self.cache),
        )?
        .with_policy(self.policy);

        log::info!("LMN fit done in {:.1} ms", start.elapsed().as_secs_f64() * 1000.0);
        let model: &FourierModel = self.model.insert(model);
        Ok(model)
    }

    fn model(&self) -> Option<&FourierModel> {
        self.model.as_ref()
    }
}
