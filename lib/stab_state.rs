//! Succinct description of a stabiliser state as a quadratic phase polynomial
//! over an affine subspace of F<sub>2</sub><sup>*n*</sup>.
//!
//! For logical coordinates *y* ∈ F<sub>2</sub><sup>dim</sup>, the state has
//! amplitude
//!
//! > *g* / √2<sup>dim</sup> · (−1)<sup>*Q*(*y*) + *L*·*y*</sup> ·
//! > *i*<sup>*I*·*y*</sup>
//!
//! at index `shift` ⊕ Σ<sub>*j*</sub> *y*<sub>*j*</sub> `vector_basis[j]`, and
//! zero everywhere else. *Q* is the [`QuadraticForm`], *L* and *I* are the
//! bit-vectors `real_linear_part` and `imaginary_part` (indexed by logical
//! coordinate, not qubit), and *g* is the global factor.

use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    check_matrix::CheckMatrix,
    error::StabResult,
    f2::{ GrayCode, fast_log2, get_bit_at, get_vector_expansion, mod2product },
    options::ConversionOptions,
    pauli::Pauli,
    phase::UnitPhase,
    quadratic::QuadraticForm,
    stab_from_vector::stabiliser_from_vector,
};

/// A stabiliser state on `n` qubits.
///
/// Fields are public; `vector_basis` must be linearly independent and every
/// bit-vector must fit in `n` bits.
#[derive(Clone, Debug, PartialEq)]
pub struct StabiliserState {
    pub n: usize,
    pub quadratic_form: QuadraticForm,
    pub real_linear_part: usize,
    pub imaginary_part: usize,
    pub vector_basis: Vec<usize>,
    pub shift: usize,
    pub global_factor: C64,
}

impl StabiliserState {
    /// Uniform superposition over `shift + span(vector_basis)`, with flat
    /// phase and unit global factor.
    pub fn new(n: usize, vector_basis: Vec<usize>, shift: usize) -> Self {
        Self {
            n,
            quadratic_form: QuadraticForm::new(vector_basis.len()),
            real_linear_part: 0,
            imaginary_part: 0,
            vector_basis,
            shift,
            global_factor: C64::from(1.0),
        }
    }

    /// Dimension of the support.
    pub fn dim(&self) -> usize { self.vector_basis.len() }

    /// Phase of the amplitude at logical coordinate `y`, relative to the one
    /// at `shift`.
    pub fn amplitude_phase(&self, y: usize) -> UnitPhase {
        let sign = self.quadratic_form.evaluate(y) ^ mod2product(self.real_linear_part, y);
        let imag = mod2product(self.imaginary_part, y);
        UnitPhase::from_int(2 * sign as i8 + imag as i8)
    }

    /// Basis-state index of logical coordinate `y`.
    pub fn support_index(&self, y: usize) -> usize {
        self.shift ^ get_vector_expansion(self.dim(), &self.vector_basis, y)
    }

    /// Walk the support in Gray-code order, yielding each index together with
    /// its [amplitude phase][Self::amplitude_phase].
    ///
    /// The first item is always `(shift, UnitPhase::One)`.
    pub fn phase_walk(&self) -> PhaseWalk<'_> {
        PhaseWalk {
            state: self,
            gray: GrayCode::new(self.dim()),
            started: false,
            y: 0,
            index: self.shift,
            phase: UnitPhase::One,
        }
    }

    /// Dense state vector of length 2<sup>`n`</sup>.
    pub fn get_state_vector(&self) -> na::DVector<C64> {
        let mut vector: na::DVector<C64> = na::DVector::zeros(1 << self.n);
        let scale = self.global_factor / ((1_usize << self.dim()) as f64).sqrt();
        for (index, phase) in self.phase_walk() {
            vector[index] = phase.rotate(scale);
        }
        vector
    }

    /// Bring `vector_basis` into reduced row-echelon form (every basis
    /// vector's highest bit is set in no other basis vector), updating the
    /// phase polynomial so that the state is unchanged.
    pub fn row_reduce_basis(&mut self) -> &mut Self {
        for i in 0..self.dim() {
            let Some(pivot) = fast_log2(self.vector_basis[i]) else { continue; };
            for j in 0..self.dim() {
                if j != i && get_bit_at(self.vector_basis[j], pivot) {
                    self.add_basis_vector(i, j);
                }
            }
        }
        self
    }

    // vector_basis[j] += vector_basis[i], with the matching change of
    // logical coordinates y_i <- y_i + y_j
    fn add_basis_vector(&mut self, i: usize, j: usize) {
        self.vector_basis[j] ^= self.vector_basis[i];
        let qij = self.quadratic_form.add_row(i, j);
        if get_bit_at(self.real_linear_part, i) ^ qij {
            self.real_linear_part ^= 1 << j;
        }
        if get_bit_at(self.imaginary_part, i) {
            self.imaginary_part ^= 1 << j;
        }
    }

    /// Row-reduce the basis and move `shift` to the least index in the
    /// support, absorbing the phase there into the global factor so that the
    /// state is unchanged.
    pub fn move_shift_to_least_support(&mut self) -> &mut Self {
        self.row_reduce_basis();
        // clear every pivot bit of the shift
        let y0 =
            self.vector_basis.iter()
            .enumerate()
            .filter(|(_, v)| {
                fast_log2(**v).is_some_and(|pivot| get_bit_at(self.shift, pivot))
            })
            .fold(0, |acc, (j, _)| acc | (1 << j));
        if y0 == 0 { return self; }
        self.global_factor = self.amplitude_phase(y0).rotate(self.global_factor);
        self.shift = self.support_index(y0);
        self.real_linear_part ^= self.quadratic_form.polarization(y0);
        if mod2product(self.imaginary_part, y0) {
            self.real_linear_part ^= self.imaginary_part;
        }
        self
    }

    /// A set of `n` generators of the state's stabiliser group, row-reduced.
    ///
    /// The global factor is not recorded.
    pub fn get_check_matrix(&self) -> CheckMatrix {
        let mut reduced = self.clone();
        reduced.row_reduce_basis();
        let StabiliserState {
            n,
            quadratic_form: q,
            real_linear_part: lin,
            imaginary_part: imag,
            vector_basis: basis,
            shift,
            ..
        } = reduced;
        let pivots: Vec<usize> =
            basis.iter().filter_map(|v| fast_log2(*v)).collect();

        let mut paulis: Vec<Pauli> = Vec::with_capacity(n);
        // one X-type generator per basis vector
        for (i, v) in basis.iter().enumerate() {
            let imag_i = get_bit_at(imag, i);
            let z =
                pivots.iter()
                .enumerate()
                .filter(|(j, _)| q.get(i, *j) ^ (imag_i && get_bit_at(imag, *j)))
                .fold(0, |acc, (_, p)| acc | (1 << *p));
            let sign = get_bit_at(lin, i) ^ imag_i ^ mod2product(z, shift);
            paulis.push(Pauli::new(n, *v, z, sign, imag_i));
        }
        // one Z-type generator per non-pivot qubit
        for k in (0..n).filter(|k| !pivots.contains(k)) {
            let z =
                basis.iter()
                .zip(&pivots)
                .filter(|(v, _)| get_bit_at(**v, k))
                .fold(1 << k, |acc, (_, p)| acc | (1 << *p));
            paulis.push(Pauli::new(n, 0, z, mod2product(z, shift), false));
        }
        let mut check_matrix = CheckMatrix::from_parts(n, paulis);
        check_matrix.row_reduce();
        check_matrix
    }

    /// Inverse of [`Self::get_check_matrix`], with the global factor set to 1
    /// at the least support index.
    pub fn from_check_matrix(check_matrix: &CheckMatrix) -> Self {
        check_matrix.get_stabiliser_state()
    }

    /// Like [`Self::from_check_matrix`], but rejects generator sets that do
    /// not [validate][CheckMatrix::validate] unless `options.assume_valid` is
    /// set.
    pub fn try_from_check_matrix(check_matrix: &CheckMatrix, options: ConversionOptions)
        -> StabResult<Self>
    {
        check_matrix.try_get_stabiliser_state(options)
    }

    /// Extract the state from a dense vector. See
    /// [`stab_from_vector`][crate::stab_from_vector].
    pub fn from_vector(vector: &[C64], options: ConversionOptions) -> StabResult<Self> {
        stabiliser_from_vector(vector, options)
    }
}

/// Iterator over the support of a [`StabiliserState`], created by
/// [`StabiliserState::phase_walk`].
///
/// Each step flips a single logical coordinate, so the phase is updated in
/// constant time.
#[derive(Clone, Debug)]
pub struct PhaseWalk<'a> {
    state: &'a StabiliserState,
    gray: GrayCode,
    started: bool,
    y: usize,
    index: usize,
    phase: UnitPhase,
}

impl<'a> Iterator for PhaseWalk<'a> {
    type Item = (usize, UnitPhase);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some((self.index, self.phase));
        }
        let (y_next, flipped) = self.gray.next()?;
        let state = self.state;
        self.index ^= state.vector_basis[flipped];
        // Q(y + e_b) = Q(y) + row_b·y
        if get_bit_at(state.real_linear_part, flipped)
            ^ mod2product(state.quadratic_form.row(flipped), self.y)
        {
            self.phase = -self.phase;
        }
        if get_bit_at(state.imaginary_part, flipped) {
            self.phase *=
                if mod2product(state.imaginary_part, self.y) {
                    UnitPhase::MinusI
                } else {
                    UnitPhase::I
                };
        }
        self.y = y_next;
        Some((self.index, self.phase))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.gray.len() + usize::from(!self.started);
        (rem, Some(rem))
    }
}

impl<'a> ExactSizeIterator for PhaseWalk<'a> { }

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ Rng, SeedableRng, rngs::StdRng };
    use crate::{
        f2::is_independent,
        phase::{ approx_eq, is_zero },
    };

    fn vec_approx_eq(a: &[C64], b: &[C64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx_eq(*x, *y))
    }

    fn fixture() -> StabiliserState {
        let mut state = StabiliserState::new(5, vec![17, 20, 30], 1);
        state.real_linear_part = 0b101;
        state.imaginary_part = 0b101;
        state.quadratic_form = QuadraticForm::from_monomials(3, &[0b110, 0b011]);
        state
    }

    fn random_state<R: Rng>(n: usize, rng: &mut R) -> StabiliserState {
        let dim = rng.gen_range(0..=n);
        let basis: Vec<usize> = loop {
            let basis: Vec<usize> =
                (0..dim).map(|_| rng.gen_range(0..1_usize << n)).collect();
            if is_independent(&basis) { break basis; }
        };
        let mut state = StabiliserState::new(n, basis, rng.gen_range(0..1 << n));
        state.real_linear_part = rng.gen_range(0..1 << dim);
        state.imaginary_part = rng.gen_range(0..1 << dim);
        for a in 0..dim {
            for b in a + 1..dim {
                state.quadratic_form.set(a, b, rng.gen());
            }
        }
        state.global_factor = C64::from_polar(1.0, rng.gen_range(0.0..6.28));
        state
    }

    #[test]
    fn state_vector_literal() {
        let state = fixture();
        let i = C64::i();
        let l = C64::from(1.0);
        let mut expected = vec![C64::from(0.0); 32];
        expected[1] = l;
        expected[4] = i;
        expected[11] = i;
        expected[14] = l;
        expected[16] = -i;
        expected[21] = l;
        expected[26] = l;
        expected[31] = -i;
        let scaled: Vec<C64> =
            state.get_state_vector().iter().map(|a| *a * 8.0_f64.sqrt()).collect();
        assert!(vec_approx_eq(&scaled, &expected));
    }

    #[test]
    fn phase_walk_matches_closed_form() {
        let mut rng = StdRng::seed_from_u64(1101);
        for n in 0..7 {
            let state = random_state(n, &mut rng);
            let walk: Vec<(usize, UnitPhase)> = state.phase_walk().collect();
            assert_eq!(walk.len(), 1 << state.dim());
            assert_eq!(walk[0], (state.shift, UnitPhase::One));
            for y in 0..1_usize << state.dim() {
                let item = (state.support_index(y), state.amplitude_phase(y));
                assert!(walk.contains(&item));
            }
        }
    }

    #[test]
    fn check_matrix_stabilises_state() {
        let state = fixture();
        let vector = state.get_state_vector();
        let check_matrix = state.get_check_matrix();
        assert!(check_matrix.is_valid());
        for p in check_matrix.paulis().iter() {
            assert_eq!(p.get_sign_eigenvalue(vector.as_slice(), false), Some(false));
        }
        let back = StabiliserState::from_check_matrix(&check_matrix);
        assert!(vec_approx_eq(back.get_state_vector().as_slice(), vector.as_slice()));
    }

    #[test]
    fn row_reduction_preserves_vector() {
        let mut rng = StdRng::seed_from_u64(1102);
        for n in 1..7 {
            for _ in 0..10 {
                let state = random_state(n, &mut rng);
                let mut reduced = state.clone();
                reduced.row_reduce_basis();
                assert!(vec_approx_eq(
                    reduced.get_state_vector().as_slice(),
                    state.get_state_vector().as_slice(),
                ));
                let pivots: Vec<usize> =
                    reduced.vector_basis.iter().filter_map(|v| fast_log2(*v)).collect();
                assert_eq!(pivots.len(), reduced.dim());
                for (j, p) in pivots.iter().enumerate() {
                    let holders = reduced.vector_basis.iter()
                        .filter(|v| get_bit_at(**v, *p))
                        .count();
                    assert_eq!(holders, 1, "pivot of basis vector {}", j);
                }
            }
        }
    }

    #[test]
    fn shift_moves_to_least_support() {
        let mut rng = StdRng::seed_from_u64(1103);
        for n in 1..7 {
            for _ in 0..10 {
                let state = random_state(n, &mut rng);
                let vector = state.get_state_vector();
                let least = vector.iter().position(|a| !is_zero(*a));
                let mut moved = state.clone();
                moved.move_shift_to_least_support();
                assert_eq!(Some(moved.shift), least);
                assert!(vec_approx_eq(
                    moved.get_state_vector().as_slice(),
                    vector.as_slice(),
                ));
            }
        }
    }

    #[test]
    fn check_matrix_roundtrip_up_to_global_factor() {
        let mut rng = StdRng::seed_from_u64(1104);
        for n in 1..7 {
            for _ in 0..10 {
                let mut state = random_state(n, &mut rng);
                state.move_shift_to_least_support();
                let check_matrix = state.get_check_matrix();
                assert!(check_matrix.is_valid());
                let mut back = StabiliserState::from_check_matrix(&check_matrix);
                assert_eq!(back.shift, state.shift);
                back.global_factor = state.global_factor;
                assert!(vec_approx_eq(
                    back.get_state_vector().as_slice(),
                    state.get_state_vector().as_slice(),
                ));
            }
        }
    }
}
