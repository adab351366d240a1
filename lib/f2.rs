//! Linear algebra over F<sub>2</sub> on bit-packed vectors.
//!
//! A vector in F<sub>2</sub><sup>*n*</sup> is a `usize` whose bit *j* is its
//! *j*-th coordinate, so that addition is XOR and the inner product is the
//! parity of the AND.

use num_complex::Complex64 as C64;

/// Inner product of `x` and `y` over F<sub>2</sub>: the parity of
/// `popcount(x & y)`.
#[inline]
pub fn mod2product(x: usize, y: usize) -> bool {
    (x & y).count_ones() & 1 == 1
}

/// `(-1)^(x·y)`.
#[inline]
pub fn sign_mod2product(x: usize, y: usize) -> f64 {
    if mod2product(x, y) { -1.0 } else { 1.0 }
}

/// `i^(x·y)`, where the exponent is the F<sub>2</sub> inner product (so the
/// result is only ever 1 or *i*).
#[inline]
pub fn imag_mod2product(x: usize, y: usize) -> C64 {
    if mod2product(x, y) { C64::i() } else { C64::from(1.0) }
}

/// Evaluate a multilinear polynomial over F<sub>2</sub> at `point`.
///
/// Each monomial is the bit-vector of the variables it contains; a monomial
/// contributes 1 iff all of its variables are set in `point`.
pub fn evaluate_poly(monomials: &[usize], point: usize) -> bool {
    monomials.iter()
        .fold(false, |acc, &m| acc ^ (point & m == m))
}

/// `(-1)^p(point)` for the polynomial `p` given by `monomials`.
pub fn sign_evaluate_poly(monomials: &[usize], point: usize) -> f64 {
    if evaluate_poly(monomials, point) { -1.0 } else { 1.0 }
}

/// Index of the highest set bit of `x`, or `None` if `x == 0`.
#[inline]
pub fn fast_log2(x: usize) -> Option<usize> {
    (x != 0).then(|| (usize::BITS - 1 - x.leading_zeros()) as usize)
}

/// Bit `k` of `x`.
#[inline]
pub fn get_bit_at(x: usize, k: usize) -> bool {
    (x >> k) & 1 == 1
}

/// XOR of `basis[j]` over every `j < dim` whose bit is set in `coeffs`.
pub fn get_vector_expansion(dim: usize, basis: &[usize], coeffs: usize) -> usize {
    basis.iter()
        .take(dim)
        .enumerate()
        .filter(|(j, _)| get_bit_at(coeffs, *j))
        .fold(0, |acc, (_, v)| acc ^ v)
}

/// Base-2 logarithm of `len` if it is a power of two.
#[inline]
pub fn exact_log2(len: usize) -> Option<usize> {
    len.is_power_of_two().then(|| len.trailing_zeros() as usize)
}

/// Dimension of the span of `vectors`.
pub fn rank(vectors: &[usize]) -> usize {
    // pivots[k] holds a reduced vector whose highest bit is k, if any
    let mut pivots = [0_usize; usize::BITS as usize];
    let mut r: usize = 0;
    for &v in vectors.iter() {
        let mut v = v;
        while let Some(k) = fast_log2(v) {
            if pivots[k] == 0 {
                pivots[k] = v;
                r += 1;
                break;
            }
            v ^= pivots[k];
        }
    }
    r
}

/// `true` if `vectors` are linearly independent.
pub fn is_independent(vectors: &[usize]) -> bool {
    rank(vectors) == vectors.len()
}

/// Walks the reflected Gray code on `dim` bits, starting after 0.
///
/// Yields `(index, flipped)` for each of the 2<sup>`dim`</sup> − 1 remaining
/// codewords, where `index` differs from the previous codeword in bit
/// `flipped` only.
#[derive(Clone, Debug)]
pub struct GrayCode {
    step: usize,
    end: usize,
}

impl GrayCode {
    /// Requires `dim < usize::BITS`.
    pub fn new(dim: usize) -> Self {
        Self { step: 1, end: 1 << dim }
    }
}

impl Iterator for GrayCode {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.end { return None; }
        let k = self.step;
        self.step += 1;
        Some((k ^ (k >> 1), k.trailing_zeros() as usize))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.end.saturating_sub(self.step);
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for GrayCode { }
