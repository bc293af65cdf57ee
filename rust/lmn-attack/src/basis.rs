//! Parity basis generation and the (n, deg) basis cache.
//!
//! A parity χ_S(x) = ∏_{i ∈ S} x_i is identified by its subset S of bit
//! positions. The basis for (n, deg) lists every S with |S| ≤ deg, degree-major,
//! and lexicographically by position within each degree:
//!
//! ```text
//! n = 4, deg = 2:  {} {0} {1} {2} {3} {0,1} {0,2} {0,3} {1,2} {1,3} {2,3}
//! ```
//!
//! Its size is Σ_{d ≤ deg} C(n, d), which grows combinatorially; the cache
//! refuses to build bases above a configurable limit.

use crate::error::{LmnError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Default cap on the number of parities a cache will generate for one (n, deg).
pub const DEFAULT_MAX_BASIS_SIZE: usize = 1 << 22;

/// Bases above this size are logged as a warning when generated.
const LARGE_BASIS_WARNING: usize = 1 << 16;

// ---------------------------------------------------------------------------
// Parity
// ---------------------------------------------------------------------------

/// One parity function over n input bits, stored as its sorted positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Parity {
    n: usize,
    positions: Vec<usize>,
}

impl Parity {
    fn new(n: usize, positions: Vec<usize>) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(positions.last().map_or(true, |&p| p < n));
        Self { n, positions }
    }

    /// Number of selected positions.
    pub fn degree(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn input_length(&self) -> usize {
        self.n
    }

    /// 0/1 indicator vector indexed by bit position.
    pub fn indicator(&self) -> Vec<u8> {
        let mut ind = vec![0u8; self.n];
        for &p in &self.positions {
            ind[p] = 1;
        }
        ind
    }

    /// χ_S(x) for a ±1 input; the empty parity evaluates to 1.
    #[inline]
    pub fn eval(&self, x: &[i8]) -> i8 {
        self.positions.iter().fold(1i8, |acc, &p| acc * x[p])
    }
}

/// Renders the indicator with position 0 as the rightmost character.
impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.indicator().iter().rev() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// C(n, k), saturating at u128::MAX.
fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut c: u128 = 1;
    for i in 0..k {
        // c · (n - i) is divisible by (i + 1) at every step.
        c = match c.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    c
}

/// Number of parities of degree ≤ deg over n bits: Σ_{d ≤ deg} C(n, d).
pub fn basis_size(n: usize, deg: usize) -> u128 {
    (0..=deg.min(n)).fold(0u128, |acc, d| acc.saturating_add(binomial(n, d)))
}

fn check_arguments(n: usize, deg: usize) -> Result<()> {
    if n == 0 {
        return Err(LmnError::ZeroInputLength);
    }
    if deg > n {
        return Err(LmnError::InvalidDegree { n, deg });
    }
    Ok(())
}

/// Enumerate all k-subsets of {0, ..., n-1} in lexicographic order, appending to `out`.
fn subsets_of_size(n: usize, k: usize, out: &mut Vec<Parity>) {
    if k > n {
        return;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(Parity::new(n, idx.clone()));
        // Rightmost index that can still move right.
        let Some(i) = (0..k).rev().find(|&i| idx[i] < n - k + i) else {
            return;
        };
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Build the parity basis for (n, deg) without consulting any cache.
///
/// Fails when n == 0 or deg > n.  No size limit is applied; see
/// [`BasisCache::generate_basis`] for the guarded version.
pub fn enumerate_parities(n: usize, deg: usize) -> Result<Vec<Parity>> {
    check_arguments(n, deg)?;
    let capacity = usize::try_from(basis_size(n, deg)).unwrap_or(usize::MAX);
    let mut basis = Vec::with_capacity(capacity.min(DEFAULT_MAX_BASIS_SIZE));
    for d in 0..=deg {
        subsets_of_size(n, d, &mut basis);
    }
    Ok(basis)
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Memoised parity bases keyed by (n, deg).
///
/// Entries are write-once and shared through `Arc`.  Generation happens
/// outside the lock, so two threads racing on the same key may both build the
/// (identical) basis; the first insert wins.
#[derive(Debug)]
pub struct BasisCache {
    entries: RwLock<HashMap<(usize, usize), Arc<Vec<Parity>>>>,
    max_basis_size: usize,
}

impl Default for BasisCache {
    fn default() -> Self {
        Self::with_max_basis_size(DEFAULT_MAX_BASIS_SIZE)
    }
}

impl BasisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_basis_size(max_basis_size: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_basis_size,
        }
    }

    pub fn max_basis_size(&self) -> usize {
        self.max_basis_size
    }

    /// The basis for (n, deg), generated on first request and shared afterwards.
    pub fn generate_basis(&self, n: usize, deg: usize) -> Result<Arc<Vec<Parity>>> {
        check_arguments(n, deg)?;

        if let Some(basis) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(n, deg))
        {
            return Ok(Arc::clone(basis));
        }

        let size = basis_size(n, deg);
        if size > self.max_basis_size as u128 {
            return Err(LmnError::BasisTooLarge {
                n,
                deg,
                size,
                limit: self.max_basis_size,
            });
        }
        if size > LARGE_BASIS_WARNING as u128 {
            log::warn!("Generating large parity basis: n={n}, deg={deg}, {size} parities");
        }

        let basis = Arc::new(enumerate_parities(n, deg)?);
        log::debug!("Cached parity basis n={n}, deg={deg} ({} parities)", basis.len());

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry((n, deg)).or_insert(basis)))
    }

    /// Number of cached (n, deg) entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, n: usize, deg: usize) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(n, deg))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
