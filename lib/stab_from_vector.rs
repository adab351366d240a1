//! Recognise a dense vector as a stabiliser state and recover its
//! [`StabiliserState`] description.
//!
//! The support must be an affine subspace `shift + span(basis)` of size
//! 2<sup>dim</sup>. The phase polynomial is then read off from O(dim²) probe
//! amplitudes: the ratio at each weight-one logical coordinate fixes the linear
//! parts, and the residual ratio at each weight-two coordinate fixes the
//! quadratic form. Unless the input is trusted, every amplitude is finally
//! compared against the reconstructed polynomial in a single Gray-code pass.

use itertools::Itertools;
use num_complex::Complex64 as C64;
use tracing::{ debug, trace };
use crate::{
    error::{ Rejection, StabError, StabResult },
    f2::{ exact_log2, get_vector_expansion },
    options::ConversionOptions,
    phase::{ approx_eq, is_zero, UnitPhase },
    stab_state::StabiliserState,
};

/// Outcome of testing a vector for being a stabiliser state.
#[derive(Clone, Debug, PartialEq)]
pub struct StabiliserFromVector {
    result: Result<StabiliserState, Rejection>,
}

impl StabiliserFromVector {
    /// Run the extraction on `vector`.
    pub fn new(vector: &[C64], options: ConversionOptions) -> Self {
        let result = extract(vector, options);
        match &result {
            Ok(state) => {
                debug!(n = state.n, dim = state.dim(), "extracted stabiliser state");
            },
            Err(rejection) => {
                debug!(len = vector.len(), reason = %rejection, "rejected stabiliser state");
            },
        }
        Self { result }
    }

    /// `true` if the vector was accepted.
    pub fn is_stab_state(&self) -> bool { self.result.is_ok() }

    /// The failed check, if the vector was rejected.
    pub fn rejection(&self) -> Option<Rejection> { self.result.as_ref().err().copied() }

    /// The extracted state, or the reason the vector is not one.
    pub fn get_stab_state(&self) -> StabResult<StabiliserState> {
        self.result.clone().map_err(state_error)
    }

    /// Like [`Self::get_stab_state`], but without cloning.
    pub fn into_stab_state(self) -> StabResult<StabiliserState> {
        self.result.map_err(state_error)
    }
}

fn state_error(rejection: Rejection) -> StabError {
    match rejection {
        Rejection::NotPowerOfTwo(len) => StabError::NotPowerOfTwo { len },
        other => StabError::NotStabiliserState(other),
    }
}

/// Extract a stabiliser state from `vector`.
pub fn stabiliser_from_vector(vector: &[C64], options: ConversionOptions)
    -> StabResult<StabiliserState>
{
    StabiliserFromVector::new(vector, options).into_stab_state()
}

/// `true` if `vector` is a stabiliser state under `options`.
pub fn is_stabiliser_state(vector: &[C64], options: ConversionOptions) -> bool {
    StabiliserFromVector::new(vector, options).is_stab_state()
}

pub(crate) fn extract(vector: &[C64], options: ConversionOptions)
    -> Result<StabiliserState, Rejection>
{
    let n = exact_log2(vector.len())
        .ok_or(Rejection::NotPowerOfTwo(vector.len()))?;
    let support: Vec<usize> =
        vector.iter()
        .enumerate()
        .filter(|(_, a)| !is_zero(**a))
        .map(|(k, _)| k)
        .collect();
    let shift = *support.first().ok_or(Rejection::EmptySupport)?;
    let dim = exact_log2(support.len())
        .ok_or(Rejection::SupportSize(support.len()))?;

    // support relative to the shift, in ascending order; logical coordinate k
    // sits at position k when the support is affine
    let mut space: Vec<usize> = support.iter().map(|k| k ^ shift).collect();
    space.sort_unstable();
    let basis: Vec<usize> = (0..dim).map(|j| space[1 << j]).collect();
    if options.verify() && dim != n {
        let mismatch =
            space.iter()
            .enumerate()
            .find(|(k, v)| get_vector_expansion(dim, &basis, *k) != **v);
        if let Some((k, _)) = mismatch {
            return Err(Rejection::SupportNotAffine(k));
        }
    }

    let first = vector[shift];
    let norm = (support.len() as f64).sqrt();
    if options.verify()
        && !options.allow_global_factor
        && UnitPhase::classify(first * norm).is_none()
    {
        return Err(Rejection::GlobalFactor);
    }
    let amplitude = |k: usize| vector[space[k] ^ shift];

    let mut state = StabiliserState::new(n, basis, shift);
    for j in 0..dim {
        let ratio = UnitPhase::classify(amplitude(1 << j) / first)
            .ok_or(Rejection::LinearTerm(j))?;
        // ratio = (-1)^L_j i^I_j
        match ratio {
            UnitPhase::One => { },
            UnitPhase::MinusOne => { state.real_linear_part |= 1 << j; },
            UnitPhase::I => { state.imaginary_part |= 1 << j; },
            UnitPhase::MinusI => {
                state.real_linear_part |= 1 << j;
                state.imaginary_part |= 1 << j;
            },
        }
    }
    for (a, b) in (0..dim).tuple_combinations() {
        let idx = (1 << a) | (1 << b);
        // the pair's own coefficient is still zero here
        let linear = state.amplitude_phase(idx);
        match UnitPhase::classify(amplitude(idx) / linear.rotate(first)) {
            Some(UnitPhase::One) => { },
            Some(UnitPhase::MinusOne) => { state.quadratic_form.toggle(a, b); },
            _ => { return Err(Rejection::QuadraticTerm(a, b)); },
        }
    }

    if options.verify() {
        for (index, phase) in state.phase_walk() {
            if !approx_eq(vector[index], phase.rotate(first)) {
                return Err(Rejection::Amplitude(index));
            }
        }
        trace!(dim, "amplitude sweep passed");
    }
    state.global_factor = first * norm;
    Ok(state)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ Rng, SeedableRng, rngs::StdRng };
    use crate::gate::CliffordCircuit;

    fn vec_approx_eq(a: &[C64], b: &[C64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx_eq(*x, *y))
    }

    #[test]
    fn extracts_literal_state() {
        let i = C64::i();
        let o = C64::from(0.0);
        let l = C64::from(1.0);
        let vector = [o, -i, l, o, i, o, o, l];
        let state = stabiliser_from_vector(&vector, ConversionOptions::default()).unwrap();
        assert_eq!(state.n, 3);
        assert_eq!(state.shift, 1);
        assert_eq!(state.vector_basis, vec![3, 5]);
        assert_eq!(state.real_linear_part, 2);
        assert_eq!(state.imaginary_part, 1);
        assert_eq!(state.quadratic_form.monomials(), vec![3]);
        assert!(approx_eq(state.global_factor, -2.0 * i));
        assert!(vec_approx_eq(state.get_state_vector().as_slice(), &vector));

        // global factor -2i
        let strict = StabiliserFromVector::new(&vector, ConversionOptions::STRICT);
        assert!(!strict.is_stab_state());
        assert_eq!(strict.rejection(), Some(Rejection::GlobalFactor));
        assert_eq!(
            strict.get_stab_state(),
            Err(StabError::NotStabiliserState(Rejection::GlobalFactor)),
        );
        let halved: Vec<C64> = vector.iter().map(|a| *a * 0.5).collect();
        assert!(is_stabiliser_state(&halved, ConversionOptions::STRICT));
    }

    #[test]
    fn malformed_input() {
        let l = C64::from(1.0);
        let o = C64::from(0.0);
        assert_eq!(
            stabiliser_from_vector(&[l, l, l], ConversionOptions::default()),
            Err(StabError::NotPowerOfTwo { len: 3 }),
        );
        assert_eq!(
            stabiliser_from_vector(&[], ConversionOptions::default()),
            Err(StabError::NotPowerOfTwo { len: 0 }),
        );
        let empty = StabiliserFromVector::new(&[o, o, C64::new(1e-7, 0.0), o], ConversionOptions::default());
        assert_eq!(empty.rejection(), Some(Rejection::EmptySupport));
        let three = StabiliserFromVector::new(&[l, l, l, o], ConversionOptions::default());
        assert_eq!(three.rejection(), Some(Rejection::SupportSize(3)));
        // {0, 1, 2, 4} is not an affine subspace
        let mut v = vec![o; 8];
        for k in [0, 1, 2, 4] { v[k] = l * 0.5; }
        let curved = StabiliserFromVector::new(&v, ConversionOptions::default());
        assert_eq!(curved.rejection(), Some(Rejection::SupportNotAffine(3)));
    }

    #[test]
    fn phase_rejections() {
        let h = C64::from(0.5);
        let i = C64::i();
        // linear ratio e^{i pi/4}
        let twisted = [h, h * C64::from_polar(1.0, 0.785398), h, h];
        assert_eq!(
            StabiliserFromVector::new(&twisted, ConversionOptions::default()).rejection(),
            Some(Rejection::LinearTerm(0)),
        );
        // residual ratio i at the weight-two coordinate
        let quad = [h, h, h, h * i];
        assert_eq!(
            StabiliserFromVector::new(&quad, ConversionOptions::default()).rejection(),
            Some(Rejection::QuadraticTerm(0, 1)),
        );
        // only caught by the final sweep: cubic phase on three qubits
        let s = C64::from(8.0_f64.sqrt().recip());
        let mut cubic = vec![s; 8];
        cubic[7] = -s;
        assert_eq!(
            StabiliserFromVector::new(&cubic, ConversionOptions::default()).rejection(),
            Some(Rejection::Amplitude(7)),
        );
        // trusted input skips the sweep and returns a (wrong) state
        assert!(is_stabiliser_state(&cubic, ConversionOptions::TRUSTED));
    }

    #[test]
    fn random_states_roundtrip() {
        let mut rng = StdRng::seed_from_u64(3301);
        for n in 1..7 {
            for _ in 0..20 {
                let vector = CliffordCircuit::gen(n, &mut rng).state();
                for options in [ConversionOptions::default(), ConversionOptions::TRUSTED] {
                    let state = StabiliserState::from_vector(vector.as_slice(), options)
                        .unwrap();
                    assert_eq!(state.n, n);
                    assert!(vec_approx_eq(
                        state.get_state_vector().as_slice(),
                        vector.as_slice(),
                    ));
                }
            }
        }
    }

    #[test]
    fn random_corruptions_rejected() {
        let mut rng = StdRng::seed_from_u64(3302);
        let opts = ConversionOptions::default();
        for n in 1..6 {
            for _ in 0..20 {
                let circuit = CliffordCircuit::random(n, 40, &mut rng);
                let vector: Vec<C64> = circuit.state().iter().copied().collect();
                let support: Vec<usize> = (0..vector.len())
                    .filter(|k| !is_zero(vector[*k]))
                    .collect();
                let dim = support.len().trailing_zeros();
                let k = support[rng.gen_range(0..support.len())];

                let mut rotated = vector.clone();
                rotated[k] *= C64::from_polar(1.0, 0.3);
                assert_eq!(is_stabiliser_state(&rotated, opts), dim == 0);
                if dim < 2 { continue; }
                let mut zeroed = vector.clone();
                zeroed[k] = C64::from(0.0);
                assert!(!is_stabiliser_state(&zeroed, opts));
                let mut imag = vector.clone();
                imag[k] *= C64::i();
                assert!(!is_stabiliser_state(&imag, opts));
            }
        }
    }
}
