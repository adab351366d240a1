//! Error types for conversions between representations.

use thiserror::Error;

/// Errors returned by the public conversion API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StabError {
    /// A dense vector's length is not a power of two.
    #[error("expected a vector of length 2^n, got length {len}")]
    NotPowerOfTwo {
        /// Offending length.
        len: usize,
    },

    /// A dense matrix is not square with a power-of-two side.
    #[error("expected a 2^n × 2^n matrix, got {rows} × {cols}")]
    BadShape {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// An operator and its operand act on different numbers of qubits.
    #[error("expected an object on {expected} qubits, got {found}")]
    QubitMismatch {
        /// Number of qubits required.
        expected: usize,
        /// Number of qubits supplied.
        found: usize,
    },

    /// Wrong number of Pauli generators or conjugates.
    #[error("expected {expected} Pauli operators, got {found}")]
    GeneratorCount {
        /// Number required.
        expected: usize,
        /// Number supplied.
        found: usize,
    },

    /// More qubits than fit in a `usize` bit-vector.
    #[error("{n} qubits do not fit in a {} bit-vector", usize::BITS)]
    TooManyQubits {
        /// Requested number of qubits.
        n: usize,
    },

    /// A stabiliser state was requested from a vector that is not one.
    #[error("not a stabiliser state: {0}")]
    NotStabiliserState(Rejection),

    /// A Clifford operator was requested from a matrix that is not one.
    #[error("not a Clifford operator: {0}")]
    NotClifford(Rejection),
}

/// Result type for conversions.
pub type StabResult<T> = Result<T, StabError>;

/// The consistency check that caused a conversion to reject its input.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Rejection {
    /// Input length is not a power of two.
    #[error("length {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// Input matrix is not square with a power-of-two side.
    #[error("shape {0} × {1} is not 2^n × 2^n")]
    BadShape(usize, usize),

    /// Every amplitude rounds to zero.
    #[error("vector has empty support")]
    EmptySupport,

    /// The number of nonzero amplitudes is not a power of two.
    #[error("support size {0} is not a power of two")]
    SupportSize(usize),

    /// The support is not an affine subspace.
    #[error("support is not an affine subspace (first failure at logical index {0})")]
    SupportNotAffine(usize),

    /// The leading amplitude is not a valid stabiliser amplitude and global
    /// factors are disallowed.
    #[error("leading amplitude is not ±1/√N or ±i/√N")]
    GlobalFactor,

    /// A weight-one amplitude ratio is not a unit phase.
    #[error("linear phase for logical coordinate {0} is not one of ±1, ±i")]
    LinearTerm(usize),

    /// A weight-two amplitude ratio is not ±1.
    #[error("quadratic phase for coordinates ({0}, {1}) is not ±1")]
    QuadraticTerm(usize, usize),

    /// An amplitude disagrees with the reconstructed phase polynomial.
    #[error("amplitude at index {0} disagrees with the phase polynomial")]
    Amplitude(usize),

    /// A column is not a ±1 eigenvector of a candidate conjugate.
    #[error("column {column} is not an eigenvector of generator {generator}")]
    Eigenvector {
        /// Column index.
        column: usize,
        /// Generator (or qubit) index.
        generator: usize,
    },

    /// The sign patterns of the candidate Z-conjugates are dependent.
    #[error("sign patterns of the column-0 stabilisers are linearly dependent")]
    DependentPatterns,

    /// The phase of an X-conjugate candidate could not be fixed.
    #[error("phase probe for qubit {0} is not a unit phase")]
    PhaseProbe(usize),

    /// The relative phase of two X-conjugate candidates is not ±1.
    #[error("cross-phase probe for qubits ({0}, {1}) is not ±1")]
    CrossPhase(usize, usize),

    /// The recovered conjugates violate the canonical commutation relations.
    #[error("conjugates violate the canonical commutation relations")]
    CommutationRelations,

    /// A column disagrees with the one generated from the conjugates.
    #[error("column {0} disagrees with the conjugation action")]
    Column(usize),

    /// A generator is not Hermitian.
    #[error("generator {0} is not Hermitian")]
    NotHermitian(usize),

    /// Two generators anticommute.
    #[error("generators {0} and {1} anticommute")]
    Anticommuting(usize, usize),

    /// The generators are linearly dependent.
    #[error("generators are linearly dependent")]
    DependentGenerators,
}
