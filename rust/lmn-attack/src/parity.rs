//! Evaluation of a parity basis over a batch of ±1 inputs.

use crate::basis::{BasisCache, Parity};
use crate::error::Result;
use puf_core::validate_challenges;

/// N×k matrix of χ_{s_j}(x_i) for every input x_i and basis parity s_j.
///
/// The input width is taken from the basis; every row must have that many
/// entries, each exactly +1 or -1. An empty batch yields an empty matrix.
pub fn evaluate(inputs: &[Vec<i8>], basis: &[Parity]) -> Result<Vec<Vec<i8>>> {
    if let Some(first) = basis.first() {
        validate_challenges(inputs, first.input_length())?;
    }
    Ok(inputs
        .iter()
        .map(|x| basis.iter().map(|p| p.eval(x)).collect())
        .collect())
}

/// Like [`evaluate`], fetching the basis for (input width, `deg`) from `cache`.
pub fn evaluate_degree(
    inputs: &[Vec<i8>],
    deg: usize,
    cache: &BasisCache,
) -> Result<Vec<Vec<i8>>> {
    let Some(first) = inputs.first() else {
        return Ok(Vec::new());
    };
    let basis = cache.generate_basis(first.len(), deg)?;
    evaluate(inputs, &basis)
}
