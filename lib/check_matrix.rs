//! Lists of *n* commuting, independent Pauli generators on *n* qubits, and
//! their conversion to and from [`StabiliserState`]s.
//!
//! Generators are split into those with a nonzero X part and those with only
//! a Z part. Row reduction works within each group by right-multiplying
//! generators (so that phases stay correct), pivoting on the highest set bit
//! of the X part (resp. Z part).

use itertools::Itertools;
use nalgebra as na;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    error::{ Rejection, StabError, StabResult },
    f2::{ fast_log2, get_bit_at, mod2product },
    options::ConversionOptions,
    pauli::Pauli,
    stab_state::StabiliserState,
};

/// A generating set for the stabiliser group of an *n*-qubit state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckMatrix {
    n: usize,
    paulis: Vec<Pauli>,
    // indices into `paulis`
    x_stabilisers: Vec<usize>,
    z_only_stabilisers: Vec<usize>,
    row_reduced: bool,
}

impl CheckMatrix {
    /// Collect `n` generators on `n` qubits.
    ///
    /// Fails if the generators act on different numbers of qubits, if their
    /// number differs from that of the qubits, or if a bit-vector does not fit
    /// in `n` bits. Commutation and independence are not checked here; see
    /// [`Self::is_valid`].
    pub fn new(paulis: Vec<Pauli>) -> StabResult<Self> {
        let n = paulis.len();
        if n >= usize::BITS as usize {
            return Err(StabError::TooManyQubits { n });
        }
        for p in paulis.iter() {
            if p.n != n {
                return Err(StabError::QubitMismatch { expected: n, found: p.n });
            }
            if let Some(top) = fast_log2(p.x | p.z) {
                if top >= n {
                    return Err(StabError::QubitMismatch { expected: n, found: top + 1 });
                }
            }
        }
        Ok(Self::from_parts(n, paulis))
    }

    // caller guarantees `paulis.len() == n` and that every generator fits
    pub(crate) fn from_parts(n: usize, paulis: Vec<Pauli>) -> Self {
        let (x_stabilisers, z_only_stabilisers): (Vec<usize>, Vec<usize>) =
            (0..paulis.len()).partition(|k| paulis[*k].x != 0);
        Self { n, paulis, x_stabilisers, z_only_stabilisers, row_reduced: false }
    }

    pub fn n(&self) -> usize { self.n }

    /// All generators, in storage order.
    pub fn paulis(&self) -> &[Pauli] { &self.paulis }

    pub fn into_paulis(self) -> Vec<Pauli> { self.paulis }

    /// Generators with a nonzero X part.
    pub fn x_stabilisers(&self) -> impl Iterator<Item = &Pauli> + '_ {
        self.x_stabilisers.iter().map(|k| &self.paulis[*k])
    }

    /// Generators with a zero X part.
    pub fn z_only_stabilisers(&self) -> impl Iterator<Item = &Pauli> + '_ {
        self.z_only_stabilisers.iter().map(|k| &self.paulis[*k])
    }

    pub fn is_row_reduced(&self) -> bool { self.row_reduced }

    /// Row-reduce both groups in place.
    ///
    /// Afterwards, the highest set bit of every X part is set in no other X
    /// part, and likewise for the Z parts of the Z-only generators.
    /// Generators whose X part is cancelled move to the Z-only group. The
    /// stabiliser group is unchanged.
    pub fn row_reduce(&mut self) -> &mut Self {
        let mut i: usize = 0;
        while i < self.x_stabilisers.len() {
            let pi = self.x_stabilisers[i];
            let Some(pivot) = fast_log2(self.paulis[pi].x) else {
                self.x_stabilisers.remove(i);
                self.z_only_stabilisers.push(pi);
                continue;
            };
            let row = self.paulis[pi];
            for &j in self.x_stabilisers.iter() {
                if j != pi && get_bit_at(self.paulis[j].x, pivot) {
                    self.paulis[j] *= &row;
                }
            }
            i += 1;
        }
        for &pi in self.z_only_stabilisers.iter() {
            let Some(pivot) = fast_log2(self.paulis[pi].z) else { continue; };
            let row = self.paulis[pi];
            for &j in self.z_only_stabilisers.iter() {
                if j != pi && get_bit_at(self.paulis[j].z, pivot) {
                    self.paulis[j] *= &row;
                }
            }
        }
        self.row_reduced = true;
        self
    }

    /// Check that every generator is Hermitian, all generators pairwise
    /// commute, and they are independent, reporting the first failure.
    pub fn validate(&self) -> Result<(), Rejection> {
        if let Some(k) = self.paulis.iter().position(|p| !p.is_hermitian()) {
            return Err(Rejection::NotHermitian(k));
        }
        let anticommuting =
            self.paulis.iter().enumerate()
            .tuple_combinations()
            .find(|((_, p), (_, q))| p.anticommutes_with(q));
        if let Some(((i, _), (j, _))) = anticommuting {
            return Err(Rejection::Anticommuting(i, j));
        }
        let mut reduced = self.clone();
        reduced.row_reduce();
        // a dependent set reduces some generator to ±1
        let independent = reduced.z_only_stabilisers().all(|p| p.z != 0);
        if independent { Ok(()) } else { Err(Rejection::DependentGenerators) }
    }

    /// `true` if [`Self::validate`] passes.
    pub fn is_valid(&self) -> bool { self.validate().is_ok() }

    /// The state stabilised by the generators, with its shift at the least
    /// support index and global factor 1.
    ///
    /// Assumes [`Self::is_valid`].
    pub fn get_stabiliser_state(&self) -> StabiliserState {
        let mut reduced = self.clone();
        if !reduced.row_reduced { reduced.row_reduce(); }

        let basis: Vec<usize> = reduced.x_stabilisers().map(|p| p.x).collect();
        // each Z-only generator fixes the shift at its pivot
        let shift =
            reduced.z_only_stabilisers()
            .filter(|p| p.sign)
            .filter_map(|p| fast_log2(p.z))
            .fold(0, |acc, pivot| acc | (1 << pivot));

        let mut state = StabiliserState::new(reduced.n, basis, shift);
        let generators: Vec<&Pauli> = reduced.x_stabilisers().collect();
        for (j, p) in generators.iter().enumerate() {
            if p.imag {
                state.imaginary_part |= 1 << j;
            }
            if p.sign ^ mod2product(p.z, p.x ^ shift) {
                state.real_linear_part |= 1 << j;
            }
            for (i, pi) in generators.iter().take(j).enumerate() {
                if mod2product(p.z, pi.x) ^ (p.imag && pi.imag) {
                    state.quadratic_form.toggle(i, j);
                }
            }
        }
        state.move_shift_to_least_support();
        state.global_factor = C64::from(1.0);
        state
    }

    /// Dense vector of the stabilised state. See
    /// [`Self::get_stabiliser_state`].
    pub fn get_state_vector(&self) -> na::DVector<C64> {
        self.get_stabiliser_state().get_state_vector()
    }

    /// Like [`Self::get_stabiliser_state`], but [validates][Self::validate]
    /// the generators first unless `options.assume_valid` is set.
    pub fn try_get_stabiliser_state(&self, options: ConversionOptions)
        -> StabResult<StabiliserState>
    {
        if options.verify() {
            if let Err(rejection) = self.validate() {
                debug!(n = self.n, reason = %rejection, "rejected check matrix");
                return Err(StabError::NotStabiliserState(rejection));
            }
        }
        Ok(self.get_stabiliser_state())
    }

    /// Like [`Self::get_state_vector`], with the checks of
    /// [`Self::try_get_stabiliser_state`].
    pub fn try_get_state_vector(&self, options: ConversionOptions)
        -> StabResult<na::DVector<C64>>
    {
        self.try_get_stabiliser_state(options).map(|state| state.get_state_vector())
    }

    /// Generators of the state's stabiliser group.
    pub fn from_stabiliser_state(state: &StabiliserState) -> Self {
        state.get_check_matrix()
    }
}
