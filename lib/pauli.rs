//! *n*-qubit Pauli operators stored as a pair of bit-vectors and two phase
//! bits.
//!
//! The operator `Pauli { n, x, z, sign, imag }` is
//!
//! > (−1)<sup>`sign`</sup> (−*i*)<sup>`imag`</sup> *X*<sup>`x`</sup>
//! > *Z*<sup>`z`</sup>
//!
//! where *X*<sup>`x`</sup> is the tensor product of *X* on every qubit whose
//! bit is set in `x` (and likewise for *Z*). Its action on a computational
//! basis state is *P*∣*j*⟩ = phase · (−1)<sup>*j*·`z`</sup> ∣*j* ⊕ `x`⟩.

use std::{
    fmt,
    ops::{ Mul, MulAssign },
};
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::Rng;
use crate::{
    error::{ StabError, StabResult },
    f2::{ exact_log2, get_bit_at, mod2product, sign_mod2product },
    phase::{ approx_eq, is_zero, UnitPhase },
};

/// A single *n*-qubit Pauli operator with a phase.
///
/// Fields are public; `x` and `z` must be less than 2<sup>`n`</sup>.
/// Equality is structural.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pauli {
    pub n: usize,
    pub x: usize,
    pub z: usize,
    pub sign: bool,
    pub imag: bool,
}

impl fmt::Display for Pauli {
    /// Writes the overall phase followed by one letter per qubit, from qubit
    /// 0 to qubit *n* − 1. The `#` formatter writes identities as `.`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // XZ = -iY on every qubit carrying both parts
        let n_y = (self.x & self.z).count_ones();
        let phase = self.phase() * UnitPhase::MinusI.pow(n_y);
        write!(f, "{} ", phase)?;
        (0..self.n).try_for_each(|k| {
            match (get_bit_at(self.x, k), get_bit_at(self.z, k)) {
                (false, false) =>
                    write!(f, "{}", if f.alternate() { "." } else { "I" }),
                (true, false) => write!(f, "X"),
                (true, true) => write!(f, "Y"),
                (false, true) => write!(f, "Z"),
            }
        })
    }
}

impl Pauli {
    pub fn new(n: usize, x: usize, z: usize, sign: bool, imag: bool) -> Self {
        debug_assert!(n >= usize::BITS as usize || (x | z) >> n == 0);
        Self { n, x, z, sign, imag }
    }

    /// The identity on `n` qubits.
    pub fn identity(n: usize) -> Self { Self::new(n, 0, 0, false, false) }

    /// *X* on qubit `k`.
    pub fn x_at(n: usize, k: usize) -> Self { Self::new(n, 1 << k, 0, false, false) }

    /// *Z* on qubit `k`.
    pub fn z_at(n: usize, k: usize) -> Self { Self::new(n, 0, 1 << k, false, false) }

    /// The Hermitian operator with the given X and Z parts and a `+` sign.
    pub fn hermitian(n: usize, x: usize, z: usize) -> Self {
        Self::new(n, x, z, false, mod2product(x, z))
    }

    /// Sample a uniformly random Pauli operator, phase included.
    pub fn gen<R>(n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        let size: usize = 1 << n;
        Self::new(
            n,
            rng.gen_range(0..size),
            rng.gen_range(0..size),
            rng.gen(),
            rng.gen(),
        )
    }

    /// Overall phase factor (−1)<sup>`sign`</sup> (−*i*)<sup>`imag`</sup>.
    pub fn phase(&self) -> UnitPhase { UnitPhase::from_bits(self.sign, self.imag) }

    /// Multiply the operator by a unit phase.
    pub fn multiply_phase(&mut self, phase: UnitPhase) -> &mut Self {
        let (sign, imag) = (self.phase() * phase).to_bits();
        self.sign = sign;
        self.imag = imag;
        self
    }

    /// Replace `self` with the product `self · other`.
    ///
    /// *Panics* if the two operators act on different numbers of qubits.
    pub fn multiply_by_pauli_on_right(&mut self, other: &Pauli) -> &mut Self {
        assert_eq!(self.n, other.n, "multiplied Paulis on different numbers of qubits");
        // Z^z X^x' = (-1)^(z·x') X^x' Z^z and (-i)(-i) = -1
        self.sign ^= other.sign
            ^ mod2product(self.z, other.x)
            ^ (self.imag & other.imag);
        self.imag ^= other.imag;
        self.x ^= other.x;
        self.z ^= other.z;
        self
    }

    /// `true` if the operator equals its adjoint.
    pub fn is_hermitian(&self) -> bool { self.imag == mod2product(self.x, self.z) }

    pub fn anticommutes_with(&self, other: &Pauli) -> bool {
        mod2product(self.x, other.z) ^ mod2product(self.z, other.x)
    }

    pub fn commutes_with(&self, other: &Pauli) -> bool { !self.anticommutes_with(other) }

    /// Dense matrix of the operator, with `M[j ^ x, j] = phase · (−1)^(j·z)`.
    pub fn generate_matrix(&self) -> na::DMatrix<C64> {
        let size: usize = 1 << self.n;
        let phase = self.phase().as_complex();
        let mut mat: na::DMatrix<C64> = na::DMatrix::zeros(size, size);
        for j in 0..size {
            mat[(j ^ self.x, j)] = phase * sign_mod2product(j, self.z);
        }
        mat
    }

    /// Apply the operator to a dense vector.
    pub fn multiply_vector(&self, vector: &[C64]) -> StabResult<na::DVector<C64>> {
        let n = exact_log2(vector.len())
            .ok_or(StabError::NotPowerOfTwo { len: vector.len() })?;
        if n != self.n {
            return Err(StabError::QubitMismatch { expected: self.n, found: n });
        }
        Ok(self.apply(vector))
    }

    // requires vector.len() == 2^n
    pub(crate) fn apply(&self, vector: &[C64]) -> na::DVector<C64> {
        let phase = self.phase();
        let mut out: na::DVector<C64> = na::DVector::zeros(vector.len());
        for (j, a) in vector.iter().enumerate() {
            out[j ^ self.x] = phase.rotate(*a) * sign_mod2product(j, self.z);
        }
        out
    }

    /// Determine whether `vector` is a ±1 eigenvector of the operator.
    ///
    /// Returns `Some(false)` for eigenvalue +1, `Some(true)` for −1, and `None`
    /// if `vector` is zero, has the wrong length, or is not an eigenvector with
    /// a real eigenvalue. With `assume_equation_holds`, only the first nonzero
    /// pair of amplitudes is inspected.
    pub fn get_sign_eigenvalue(&self, vector: &[C64], assume_equation_holds: bool)
        -> Option<bool>
    {
        if vector.len() != 1 << self.n { return None; }
        // first index whose partner under x is nonzero; a nonzero amplitude
        // met earlier has no partner and cannot be an eigenvector component
        let mut idx: usize = 0;
        loop {
            if idx == vector.len() { return None; }
            if !is_zero(vector[idx ^ self.x]) { break; }
            if !is_zero(vector[idx]) { return None; }
            idx += 1;
        }
        // (P v)[idx] = phase (-1)^(z·(idx^x)) v[idx^x] = λ v[idx]
        let ratio = vector[idx] * sign_mod2product(self.z, idx ^ self.x)
            / vector[idx ^ self.x];
        let eigenvalue = UnitPhase::classify(ratio * self.phase().conj().as_complex())?;
        let is_negative = match eigenvalue {
            UnitPhase::One => false,
            UnitPhase::MinusOne => true,
            _ => { return None; },
        };
        if assume_equation_holds { return Some(is_negative); }
        let factor = (self.phase().conj() * eigenvalue).conj();
        let holds = (idx + 1..vector.len())
            .all(|r| {
                approx_eq(
                    vector[r] * sign_mod2product(self.z, r ^ self.x),
                    factor.rotate(vector[r ^ self.x]),
                )
            });
        holds.then_some(is_negative)
    }
}

impl MulAssign<Pauli> for Pauli {
    fn mul_assign(&mut self, rhs: Pauli) { self.multiply_by_pauli_on_right(&rhs); }
}

impl MulAssign<&Pauli> for Pauli {
    fn mul_assign(&mut self, rhs: &Pauli) { self.multiply_by_pauli_on_right(rhs); }
}

impl Mul for Pauli {
    type Output = Pauli;

    fn mul(mut self, rhs: Pauli) -> Self::Output {
        self *= rhs;
        self
    }
}
