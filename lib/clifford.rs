//! Clifford unitaries described by their conjugation action on the Pauli
//! generators.
//!
//! A Clifford *U* on *n* qubits is fixed up to a global phase by the images
//! *U Z<sub>k</sub> U*<sup>†</sup> and *U X<sub>k</sub> U*<sup>†</sup>, which
//! are themselves Pauli operators. The remaining phase is recorded as the
//! global factor of the stabiliser state *U*∣0⟩.

use itertools::Itertools;
use nalgebra as na;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    check_matrix::CheckMatrix,
    clifford_from_matrix::clifford_from_matrix,
    error::{ Rejection, StabError, StabResult },
    f2::{ GrayCode, fast_log2, get_bit_at },
    options::ConversionOptions,
    pauli::Pauli,
};

/// A Clifford operator on `n` qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct Clifford {
    pub n: usize,
    /// `z_conjugates[k]` = *U Z<sub>k</sub> U*<sup>†</sup>
    pub z_conjugates: Vec<Pauli>,
    /// `x_conjugates[k]` = *U X<sub>k</sub> U*<sup>†</sup>
    pub x_conjugates: Vec<Pauli>,
    /// Global factor of the first column of the matrix, i.e. √2<sup>dim</sup>
    /// times its entry at the least nonzero row.
    pub global_phase: C64,
}

impl Clifford {
    /// Collect the images of the generators.
    ///
    /// Fails if the numbers of conjugates and qubits disagree or if a
    /// bit-vector does not fit in `n` bits. The commutation relations are not
    /// checked here; see [`Self::is_valid`].
    pub fn new(z_conjugates: Vec<Pauli>, x_conjugates: Vec<Pauli>, global_phase: C64)
        -> StabResult<Self>
    {
        let n = z_conjugates.len();
        check_shape(n, &z_conjugates, &x_conjugates)?;
        Ok(Self { n, z_conjugates, x_conjugates, global_phase })
    }

    /// The identity on `n` qubits.
    pub fn identity(n: usize) -> Self {
        Self {
            n,
            z_conjugates: (0..n).map(|k| Pauli::z_at(n, k)).collect(),
            x_conjugates: (0..n).map(|k| Pauli::x_at(n, k)).collect(),
            global_phase: C64::from(1.0),
        }
    }

    /// `true` if the conjugates satisfy the canonical commutation relations:
    /// all are Hermitian, the Z images pairwise commute, the X images pairwise
    /// commute, and each X image anticommutes with exactly the Z image of the
    /// same qubit.
    pub fn is_valid(&self) -> bool { self.validate().is_ok() }

    /// [`Self::is_valid`] as a `Result`.
    pub fn validate(&self) -> Result<(), Rejection> {
        let hermitian =
            self.z_conjugates.iter()
            .chain(self.x_conjugates.iter())
            .all(|p| p.is_hermitian());
        let z_commute =
            self.z_conjugates.iter()
            .tuple_combinations()
            .all(|(a, b)| a.commutes_with(b));
        let x_commute =
            self.x_conjugates.iter()
            .tuple_combinations()
            .all(|(a, b)| a.commutes_with(b));
        let paired =
            self.x_conjugates.iter().enumerate()
            .cartesian_product(self.z_conjugates.iter().enumerate())
            .all(|((k, x), (j, z))| x.anticommutes_with(z) == (j == k));
        if hermitian && z_commute && x_commute && paired {
            Ok(())
        } else {
            Err(Rejection::CommutationRelations)
        }
    }

    /// *U P U*<sup>†</sup>.
    ///
    /// *Panics* if `pauli` acts on a different number of qubits.
    pub fn conjugate(&self, pauli: &Pauli) -> Pauli {
        assert_eq!(pauli.n, self.n, "conjugated a Pauli on a different number of qubits");
        // U (phase X^x Z^z) U† = phase (Π U X_k U†) (Π U Z_k U†)
        let mut image = Pauli::identity(self.n);
        image.multiply_phase(pauli.phase());
        for k in (0..self.n).filter(|k| get_bit_at(pauli.x, *k)) {
            image *= &self.x_conjugates[k];
        }
        for k in (0..self.n).filter(|k| get_bit_at(pauli.z, *k)) {
            image *= &self.z_conjugates[k];
        }
        image
    }

    /// Dense 2<sup>`n`</sup> × 2<sup>`n`</sup> matrix of the operator.
    ///
    /// The first column is the state stabilised by the Z images; every other
    /// column is reached from a neighbouring one (in Gray-code order) by the
    /// action of a single X image. Assumes [`Self::is_valid`].
    pub fn get_matrix(&self) -> na::DMatrix<C64> {
        let size: usize = 1 << self.n;
        let mut state =
            CheckMatrix::from_parts(self.n, self.z_conjugates.clone())
            .get_stabiliser_state();
        state.global_factor = self.global_phase;

        let mut matrix: na::DMatrix<C64> = na::DMatrix::zeros(size, size);
        let mut column = state.get_state_vector();
        matrix.set_column(0, &column);
        for (col, flipped) in GrayCode::new(self.n) {
            column = self.x_conjugates[flipped].apply(column.as_slice());
            matrix.set_column(col, &column);
        }
        matrix
    }

    /// Like [`Self::get_matrix`], but checks the number and width of the
    /// conjugates and, unless `options.assume_valid` is set, the canonical
    /// relations.
    pub fn try_get_matrix(&self, options: ConversionOptions)
        -> StabResult<na::DMatrix<C64>>
    {
        check_shape(self.n, &self.z_conjugates, &self.x_conjugates)?;
        if options.verify() {
            if let Err(rejection) = self.validate() {
                debug!(n = self.n, reason = %rejection, "rejected Clifford conjugates");
                return Err(StabError::NotClifford(rejection));
            }
        }
        Ok(self.get_matrix())
    }

    /// Recover the operator from its dense matrix. See
    /// [`clifford_from_matrix`][crate::clifford_from_matrix].
    pub fn from_matrix(matrix: &na::DMatrix<C64>, options: ConversionOptions)
        -> StabResult<Self>
    {
        clifford_from_matrix(matrix, options)
    }
}

fn check_shape(n: usize, z_conjugates: &[Pauli], x_conjugates: &[Pauli])
    -> StabResult<()>
{
    if n >= usize::BITS as usize {
        return Err(StabError::TooManyQubits { n });
    }
    for conjugates in [z_conjugates, x_conjugates] {
        if conjugates.len() != n {
            return Err(StabError::GeneratorCount { expected: n, found: conjugates.len() });
        }
    }
    for p in z_conjugates.iter().chain(x_conjugates.iter()) {
        if p.n != n {
            return Err(StabError::QubitMismatch { expected: n, found: p.n });
        }
        if let Some(top) = fast_log2(p.x | p.z) {
            if top >= n {
                return Err(StabError::QubitMismatch { expected: n, found: top + 1 });
            }
        }
    }
    Ok(())
}
