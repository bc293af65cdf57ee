//! Low-degree (LMN) Fourier learning of challenge-response functions.
//!
//! A function f: {-1,1}^n → R^m whose Fourier mass sits on low-degree
//! parities is approximated by estimating every coefficient of degree ≤ deg
//! from samples and summing them back up:
//!
//! - [`basis`] enumerates the parities of degree ≤ deg and caches them per (n, deg).
//! - [`parity`] evaluates a basis over a batch of ±1 inputs.
//! - [`fourier`] estimates the coefficients and predicts with them.
//! - [`attack`] wraps the three as a learning attack on a CRP set.
//! - [`experiment`] runs the attack against a simulated XOR Arbiter PUF
//!   behind challenge transforms.

pub mod attack;
pub mod basis;
pub mod error;
pub mod experiment;
pub mod fourier;
pub mod parity;

pub use attack::LmnAttack;
pub use basis::{basis_size, enumerate_parities, BasisCache, Parity};
pub use error::{LmnError, Result};
pub use fourier::{fit, FourierModel, FourierTerm, OutputPolicy, ResponseMatrix};
pub use parity::{evaluate, evaluate_degree};
