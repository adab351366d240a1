//! Conversions between the three standard descriptions of objects in the
//! stabiliser formalism on *n* qubits:
//!
//! - dense state vectors (length 2<sup>*n*</sup>) and unitary matrices
//!   (2<sup>*n*</sup> × 2<sup>*n*</sup>);
//! - succinct algebraic encodings: an affine subspace of F<sub>2</sub><sup>*n*</sup>
//!   carrying a quadratic phase polynomial for states ([`stab_state`]), and the
//!   conjugation action on the Pauli generators for Clifford unitaries
//!   ([`clifford`]);
//! - lists of commuting Pauli generators ([`check_matrix`]).
//!
//! All conversions run in time polynomial in the size of the dense data they
//! read, and every conversion from dense data comes in a verifying flavour
//! that rejects malformed input instead of producing garbage (see
//! [`options::ConversionOptions`]).
//!
//! Bit-vectors are plain `usize`s: bit *j* is the coefficient of the *j*-th
//! basis vector, so that qubit *j* corresponds to bit *j* of a basis-state
//! index.
//!
//! # Example
//! ```
//! use num_complex::Complex64 as C64;
//! use stabiliser_tools::{
//!     options::ConversionOptions,
//!     stab_from_vector::stabiliser_from_vector,
//! };
//!
//! let i = C64::i();
//! let zero = C64::from(0.0);
//! let one = C64::from(1.0);
//! let vector = [zero, -i, one, zero, i, zero, zero, one];
//! let state = stabiliser_from_vector(&vector, ConversionOptions::default())
//!     .unwrap();
//! assert_eq!(state.shift, 1);
//! assert_eq!(state.vector_basis, vec![3, 5]);
//! ```

pub mod error;
pub mod options;
pub mod f2;
pub mod phase;
pub mod pauli;
pub mod quadratic;
pub mod check_matrix;
pub mod stab_state;
pub mod stab_from_vector;
pub mod clifford;
pub mod clifford_from_matrix;
pub mod gate;

pub use error::{ Rejection, StabError, StabResult };
pub use options::{ ConversionOptions, XConjugateMethod };
pub use pauli::Pauli;
pub use check_matrix::CheckMatrix;
pub use stab_state::StabiliserState;
pub use clifford::Clifford;
