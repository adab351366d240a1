//! Recognise a dense unitary as a Clifford operator and recover its
//! [`Clifford`] description.
//!
//! The first column *U*∣0⟩ is a stabiliser state; its check matrix gives *n*
//! Pauli operators stabilising it. Comparing their eigenvalues on the columns
//! *U*∣*e<sub>j</sub>*⟩ and row-reducing the resulting sign patterns picks out
//! the products that equal *U Z<sub>k</sub> U*<sup>†</sup>. The images of the
//! *X<sub>k</sub>* are then found either by probing single matrix entries
//! ([`XConjugateMethod::PhaseProbe`]) or by repeating the above on
//! *U H*<sup>⊗*n*</sup> ([`XConjugateMethod::Hadamard`]).

use nalgebra as na;
use num_complex::Complex64 as C64;
use tracing::{ debug, trace };
use crate::{
    clifford::Clifford,
    error::{ Rejection, StabError, StabResult },
    f2::{ GrayCode, exact_log2, fast_log2, get_bit_at, sign_mod2product },
    options::{ ConversionOptions, XConjugateMethod },
    pauli::Pauli,
    phase::{ approx_eq, is_zero, UnitPhase },
    stab_from_vector::extract as extract_state,
    stab_state::StabiliserState,
};

/// Outcome of testing a matrix for being a Clifford operator.
#[derive(Clone, Debug, PartialEq)]
pub struct CliffordFromMatrix {
    result: Result<Clifford, Rejection>,
}

impl CliffordFromMatrix {
    /// Run the extraction on `matrix` with the default
    /// [`XConjugateMethod`].
    pub fn new(matrix: &na::DMatrix<C64>, options: ConversionOptions) -> Self {
        Self::with_method(matrix, options, XConjugateMethod::default())
    }

    /// Run the extraction on `matrix`, recovering the X images with `method`.
    pub fn with_method(
        matrix: &na::DMatrix<C64>,
        options: ConversionOptions,
        method: XConjugateMethod,
    ) -> Self
    {
        let result = extract(matrix, options, method);
        match &result {
            Ok(clifford) => {
                debug!(n = clifford.n, ?method, "extracted Clifford operator");
            },
            Err(rejection) => {
                debug!(
                    rows = matrix.nrows(),
                    ?method,
                    reason = %rejection,
                    "rejected Clifford operator"
                );
            },
        }
        Self { result }
    }

    /// `true` if the matrix was accepted.
    pub fn is_clifford(&self) -> bool { self.result.is_ok() }

    /// The failed check, if the matrix was rejected.
    pub fn rejection(&self) -> Option<Rejection> { self.result.as_ref().err().copied() }

    /// The extracted operator, or the reason the matrix is not one.
    pub fn get_clifford(&self) -> StabResult<Clifford> {
        self.result.clone().map_err(clifford_error)
    }

    /// Like [`Self::get_clifford`], but without cloning.
    pub fn into_clifford(self) -> StabResult<Clifford> {
        self.result.map_err(clifford_error)
    }
}

fn clifford_error(rejection: Rejection) -> StabError {
    match rejection {
        Rejection::BadShape(rows, cols) => StabError::BadShape { rows, cols },
        other => StabError::NotClifford(other),
    }
}

/// Extract a Clifford operator from `matrix`.
pub fn clifford_from_matrix(matrix: &na::DMatrix<C64>, options: ConversionOptions)
    -> StabResult<Clifford>
{
    CliffordFromMatrix::new(matrix, options).into_clifford()
}

/// `true` if `matrix` is a Clifford operator under `options`.
pub fn is_clifford_matrix(matrix: &na::DMatrix<C64>, options: ConversionOptions) -> bool {
    CliffordFromMatrix::new(matrix, options).is_clifford()
}

/// Right-multiply `matrix` by *H*<sup>⊗*n*</sup> in place, where
/// 2<sup>*n*</sup> is its number of columns.
pub fn multiply_by_hadamard_product(matrix: &mut na::DMatrix<C64>) -> StabResult<()> {
    let n = exact_log2(matrix.ncols())
        .ok_or(StabError::BadShape { rows: matrix.nrows(), cols: matrix.ncols() })?;
    hadamard_product(matrix, n);
    Ok(())
}

fn hadamard_product(matrix: &mut na::DMatrix<C64>, n: usize) {
    for index in 0..n {
        unscaled_multiply_by_hadamard_at(matrix, index);
    }
    let scale = ((1_usize << n) as f64).sqrt().recip();
    matrix.iter_mut().for_each(|a| { *a *= scale; });
}

/// Replace each pair of columns (*c*, *c* | 2<sup>`index`</sup>), with bit
/// `index` of *c* clear, by their sum and difference.
///
/// This is right-multiplication by √2 *H* on qubit `index`. Does nothing if
/// 2<sup>`index`</sup> is not below the number of columns.
pub fn unscaled_multiply_by_hadamard_at(matrix: &mut na::DMatrix<C64>, index: usize) {
    let nrows = matrix.nrows();
    let ncols = matrix.ncols();
    if index >= usize::BITS as usize || 1 << index >= ncols { return; }
    let mask: usize = 1 << index;
    let data = matrix.as_mut_slice();
    for c0 in (0..ncols).filter(|c| c & mask == 0) {
        let c1 = c0 | mask;
        let (head, tail) = data.split_at_mut(c1 * nrows);
        let left = &mut head[c0 * nrows..(c0 + 1) * nrows];
        let right = &mut tail[..nrows];
        for (a, b) in left.iter_mut().zip(right.iter_mut()) {
            let (sum, diff) = (*a + *b, *a - *b);
            *a = sum;
            *b = diff;
        }
    }
}

// column-major storage makes every column a contiguous slice
fn column(matrix: &na::DMatrix<C64>, c: usize) -> &[C64] {
    let nrows = matrix.nrows();
    &matrix.as_slice()[c * nrows..(c + 1) * nrows]
}

fn extract(
    matrix: &na::DMatrix<C64>,
    options: ConversionOptions,
    method: XConjugateMethod,
) -> Result<Clifford, Rejection>
{
    let (rows, cols) = matrix.shape();
    let n = exact_log2(rows)
        .filter(|_| rows == cols)
        .ok_or(Rejection::BadShape(rows, cols))?;

    let images = z_images(matrix, n, options)?;
    let x_conjugates =
        match method {
            XConjugateMethod::PhaseProbe => x_images_by_probe(matrix, n, &images)?,
            XConjugateMethod::Hadamard => {
                let mut transformed = matrix.clone();
                hadamard_product(&mut transformed, n);
                // the first column of U H^n is generally not normalised to a
                // stabiliser amplitude
                let options = options.allow_global_factor(true);
                z_images(&transformed, n, options)?.conjugates
            },
        };

    if options.verify() {
        verify_relations(&images.conjugates, &x_conjugates)?;
        verify_columns(matrix, n, &images.state, &x_conjugates)?;
    }
    Ok(Clifford {
        n,
        z_conjugates: images.conjugates,
        x_conjugates,
        global_phase: images.state.global_factor,
    })
}

// images of the Z_k, together with the first column's state and operators
// dual to the images
struct ZImages {
    state: StabiliserState,
    conjugates: Vec<Pauli>,
    duals: Vec<Pauli>,
}

fn z_images(matrix: &na::DMatrix<C64>, n: usize, options: ConversionOptions)
    -> Result<ZImages, Rejection>
{
    let state = extract_state(column(matrix, 0), options)?;
    let mut generators = state.get_check_matrix().into_paulis();
    let mut duals = dual_operators(&generators, n);

    // bit j of a pattern is the generator's sign on column e_j
    let mut patterns: Vec<usize> = Vec::with_capacity(n);
    for (g, p) in generators.iter().enumerate() {
        let mut pattern: usize = 0;
        for j in 0..n {
            let negative = p.get_sign_eigenvalue(column(matrix, 1 << j), !options.verify())
                .ok_or(Rejection::Eigenvector { column: 1 << j, generator: g })?;
            if negative { pattern |= 1 << j; }
        }
        patterns.push(pattern);
    }

    // reduce the patterns to unit vectors, carrying the generators along and
    // keeping the duals dual
    let mut pivots: Vec<usize> = vec![0; n];
    for i in 0..n {
        let pivot = fast_log2(patterns[i]).ok_or(Rejection::DependentPatterns)?;
        pivots[i] = pivot;
        for j in 0..n {
            if j != i && get_bit_at(patterns[j], pivot) {
                patterns[j] ^= patterns[i];
                let gi = generators[i];
                generators[j] *= &gi;
                let dj = duals[j];
                duals[i] *= &dj;
            }
        }
    }
    let mut conjugates: Vec<Pauli> = vec![Pauli::identity(n); n];
    let mut ordered_duals: Vec<Pauli> = vec![Pauli::identity(n); n];
    for (i, pivot) in pivots.into_iter().enumerate() {
        conjugates[pivot] = generators[i];
        ordered_duals[pivot] = duals[i];
    }

    if options.verify() {
        for c in 1..1_usize << n {
            let col = column(matrix, c);
            for (k, p) in conjugates.iter().enumerate() {
                if p.get_sign_eigenvalue(col, false) != Some(get_bit_at(c, k)) {
                    return Err(Rejection::Eigenvector { column: c, generator: k });
                }
            }
        }
        trace!(n, "column stabilisers verified");
    }
    Ok(ZImages { state, conjugates, duals: ordered_duals })
}

// for a row-reduced check matrix, one operator per generator that
// anticommutes with that generator and commutes with all the others
fn dual_operators(generators: &[Pauli], n: usize) -> Vec<Pauli> {
    generators.iter()
        .map(|p| {
            if let Some(pivot) = fast_log2(p.x) {
                return Pauli::z_at(n, pivot);
            }
            let Some(pivot) = fast_log2(p.z) else { return Pauli::identity(n); };
            // cancel the anticommutation with X-type generators holding the
            // pivot in their Z part
            let z =
                generators.iter()
                .filter(|q| get_bit_at(q.z, pivot))
                .filter_map(|q| fast_log2(q.x))
                .fold(0, |acc, xpivot| acc | (1 << xpivot));
            Pauli::new(n, 1 << pivot, z, false, false)
        })
        .collect()
}

fn x_images_by_probe(matrix: &na::DMatrix<C64>, n: usize, images: &ZImages)
    -> Result<Vec<Pauli>, Rejection>
{
    let shift = images.state.shift;
    let first = column(matrix, 0)[shift];
    let duals: Vec<Pauli> =
        images.duals.iter().map(|w| Pauli::hermitian(n, w.x, w.z)).collect();

    let mut x_conjugates: Vec<Pauli> = Vec::with_capacity(n);
    for (k, w) in duals.iter().enumerate() {
        // U X_k U† = φ W_k up to a product of Z images; fix φ from the entry
        // that W_k moves the shift to
        let base = w.phase().rotate(first * sign_mod2product(shift, w.z));
        let phase = UnitPhase::classify(column(matrix, 1 << k)[shift ^ w.x] / base)
            .ok_or(Rejection::PhaseProbe(k))?;
        let mut probe = *w;
        probe.multiply_phase(phase);

        let mut image = probe;
        for (j, wj) in duals.iter().enumerate().filter(|(j, _)| *j != k) {
            let row = shift ^ wj.x;
            let predicted =
                probe.phase().rotate(column(matrix, 1 << j)[row] * sign_mod2product(row, probe.z));
            if is_zero(predicted) { return Err(Rejection::CrossPhase(k, j)); }
            let actual = column(matrix, (1 << j) | (1 << k))[row ^ probe.x];
            match UnitPhase::classify(actual / predicted) {
                Some(UnitPhase::One) => { },
                Some(UnitPhase::MinusOne) => { image *= &images.conjugates[j]; },
                _ => { return Err(Rejection::CrossPhase(k, j)); },
            }
        }
        if !phase.is_real() { image *= &images.conjugates[k]; }
        x_conjugates.push(image);
    }
    Ok(x_conjugates)
}

fn verify_relations(z_conjugates: &[Pauli], x_conjugates: &[Pauli])
    -> Result<(), Rejection>
{
    let holds =
        x_conjugates.iter().enumerate()
        .all(|(k, x)| {
            x.is_hermitian()
                && x_conjugates.iter().all(|y| x.commutes_with(y))
                && z_conjugates.iter().enumerate()
                    .all(|(j, z)| x.anticommutes_with(z) == (j == k))
        });
    if holds { Ok(()) } else { Err(Rejection::CommutationRelations) }
}

// follow the image of the first column's shift entry through every column
fn verify_columns(
    matrix: &na::DMatrix<C64>,
    n: usize,
    state: &StabiliserState,
    x_conjugates: &[Pauli],
) -> Result<(), Rejection>
{
    let mut row = state.shift;
    let mut amplitude = column(matrix, 0)[row];
    for (col, flipped) in GrayCode::new(n) {
        let x = &x_conjugates[flipped];
        amplitude = x.phase().rotate(amplitude * sign_mod2product(row, x.z));
        row ^= x.x;
        if !approx_eq(matrix[(row, col)], amplitude) {
            return Err(Rejection::Column(col));
        }
    }
    trace!(n, "column phases verified");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ Rng, SeedableRng, rngs::StdRng };
    use crate::gate::{ CliffordCircuit, Gate };

    const METHODS: [XConjugateMethod; 2] =
        [XConjugateMethod::PhaseProbe, XConjugateMethod::Hadamard];

    fn mat_approx_eq(a: &na::DMatrix<C64>, b: &na::DMatrix<C64>) -> bool {
        a.shape() == b.shape()
            && a.iter().zip(b.iter()).all(|(x, y)| approx_eq(*x, *y))
    }

    fn hadamard_literal() -> na::DMatrix<C64> {
        let o = C64::from(0.0);
        let h = C64::from(0.5);
        let i = C64::new(0.0, 0.5);
        na::DMatrix::from_row_slice(8, 8, &[
             i,  i,  o,  o, -i, -i,  o,  o,
             o,  o,  i, -i,  o,  o, -i,  i,
             o,  o,  i,  i,  o,  o, -i, -i,
             i, -i,  o,  o, -i,  i,  o,  o,
             o,  o,  h,  h,  o,  o,  h,  h,
             h, -h,  o,  o,  h, -h,  o,  o,
             h,  h,  o,  o,  h,  h,  o,  o,
             o,  o,  h, -h,  o,  o,  h, -h,
        ])
    }

    #[test]
    fn literal_clifford() {
        let matrix = hadamard_literal();
        for method in METHODS {
            let clifford = CliffordFromMatrix::with_method(&matrix, ConversionOptions::STRICT, method)
                .into_clifford()
                .unwrap();
            assert_eq!(clifford.n, 3);
            assert_eq!(
                clifford.z_conjugates,
                vec![
                    Pauli::new(3, 3, 0, false, false),
                    Pauli::new(3, 0, 7, false, false),
                    Pauli::new(3, 6, 4, false, true),
                ],
            );
            assert_eq!(
                clifford.x_conjugates,
                vec![
                    Pauli::new(3, 0, 1, false, false),
                    Pauli::new(3, 2, 0, false, false),
                    Pauli::new(3, 0, 4, true, false),
                ],
            );
            assert!(approx_eq(clifford.global_phase, C64::i()));
            assert!(clifford.is_valid());
            assert!(mat_approx_eq(&clifford.get_matrix(), &matrix));
        }
    }

    #[test]
    fn literal_rejections() {
        let matrix = hadamard_literal();
        let mut twisted = matrix.clone();
        twisted.column_mut(7).iter_mut().for_each(|a| { *a *= C64::i(); });
        let probe = CliffordFromMatrix::new(&twisted, ConversionOptions::default());
        assert_eq!(probe.rejection(), Some(Rejection::Column(7)));
        let hadamard = CliffordFromMatrix::with_method(
            &twisted, ConversionOptions::default(), XConjugateMethod::Hadamard);
        assert!(!hadamard.is_clifford());

        let phased = matrix.map(|a| a * C64::new(1.0, 1.0) * std::f64::consts::FRAC_1_SQRT_2);
        for method in METHODS {
            let strict = CliffordFromMatrix::with_method(&phased, ConversionOptions::STRICT, method);
            assert_eq!(strict.rejection(), Some(Rejection::GlobalFactor));
            assert_eq!(
                strict.get_clifford(),
                Err(StabError::NotClifford(Rejection::GlobalFactor)),
            );
            let allowed = CliffordFromMatrix::with_method(&phased, ConversionOptions::default(), method);
            let clifford = allowed.get_clifford().unwrap();
            assert!(approx_eq(
                clifford.global_phase,
                C64::new(-1.0, 1.0) * std::f64::consts::FRAC_1_SQRT_2,
            ));
            assert!(mat_approx_eq(&clifford.get_matrix(), &phased));
        }
    }

    #[test]
    fn shapes_and_non_cliffords() {
        let rect: na::DMatrix<C64> = na::DMatrix::zeros(2, 4);
        assert_eq!(
            clifford_from_matrix(&rect, ConversionOptions::default()),
            Err(StabError::BadShape { rows: 2, cols: 4 }),
        );
        let odd: na::DMatrix<C64> = na::DMatrix::identity(3, 3);
        assert_eq!(
            clifford_from_matrix(&odd, ConversionOptions::default()),
            Err(StabError::BadShape { rows: 3, cols: 3 }),
        );
        // T gate
        let mut t: na::DMatrix<C64> = na::DMatrix::identity(2, 2);
        t[(1, 1)] = C64::from_polar(1.0, std::f64::consts::FRAC_PI_4);
        for method in METHODS {
            assert!(!CliffordFromMatrix::with_method(&t, ConversionOptions::default(), method).is_clifford());
        }
        // no qubits
        let scalar = na::DMatrix::from_element(1, 1, C64::i());
        let clifford = clifford_from_matrix(&scalar, ConversionOptions::STRICT).unwrap();
        assert_eq!(clifford.n, 0);
        assert!(approx_eq(clifford.global_phase, C64::i()));
    }

    #[test]
    fn hadamard_transforms() {
        let mut m: na::DMatrix<C64> = na::DMatrix::identity(4, 4);
        multiply_by_hadamard_product(&mut m).unwrap();
        let mut expected: na::DMatrix<C64> = na::DMatrix::identity(4, 4);
        CliffordCircuit::new(2, [Gate::H(0), Gate::H(1)]).unwrap()
            .apply_matrix(&mut expected);
        assert!(mat_approx_eq(&m, &expected));

        let mut m: na::DMatrix<C64> = na::DMatrix::from_fn(2, 2, |r, c| C64::from((2 * r + c) as f64));
        unscaled_multiply_by_hadamard_at(&mut m, 0);
        assert_eq!(m, na::DMatrix::from_row_slice(2, 2, &[
            C64::from(1.0), C64::from(-1.0),
            C64::from(5.0), C64::from(-1.0),
        ]));
        // out of range
        unscaled_multiply_by_hadamard_at(&mut m, 1);
        assert_eq!(m[(1, 0)], C64::from(5.0));
    }

    #[test]
    fn random_cliffords_roundtrip() {
        let mut rng = StdRng::seed_from_u64(5501);
        for n in 1..5 {
            for _ in 0..8 {
                let circuit =
                    if rng.gen() {
                        CliffordCircuit::gen(n, &mut rng)
                    } else {
                        CliffordCircuit::random(n, 30, &mut rng)
                    };
                let phase = UnitPhase::from_int(rng.gen_range(0..4)).as_complex();
                let unitary = circuit.unitary().map(|a| a * phase);
                for method in METHODS {
                    for options in [ConversionOptions::default(), ConversionOptions::TRUSTED] {
                        let clifford = CliffordFromMatrix::with_method(&unitary, options, method)
                            .into_clifford()
                            .unwrap();
                        assert!(clifford.is_valid());
                        assert!(mat_approx_eq(&clifford.get_matrix(), &unitary));
                    }
                }
                // images are U P U† exactly
                let clifford = clifford_from_matrix(&unitary, ConversionOptions::default()).unwrap();
                for k in 0..n {
                    let z = &unitary * Pauli::z_at(n, k).generate_matrix() * unitary.adjoint();
                    let x = &unitary * Pauli::x_at(n, k).generate_matrix() * unitary.adjoint();
                    assert!(mat_approx_eq(&clifford.z_conjugates[k].generate_matrix(), &z));
                    assert!(mat_approx_eq(&clifford.x_conjugates[k].generate_matrix(), &x));
                }
            }
        }
    }

    #[test]
    fn random_corruptions_rejected() {
        let mut rng = StdRng::seed_from_u64(5502);
        for n in 2..5 {
            for _ in 0..8 {
                let mut unitary = CliffordCircuit::gen(n, &mut rng).unitary();
                let last = unitary.ncols() - 1;
                unitary.column_mut(last).iter_mut().for_each(|a| { *a *= C64::i(); });
                for method in METHODS {
                    assert!(!CliffordFromMatrix::with_method(&unitary, ConversionOptions::default(), method)
                        .is_clifford());
                }
            }
        }
    }

    #[test]
    fn single_entry_corruptions_rejected() {
        let mut rng = StdRng::seed_from_u64(5503);
        let opts = ConversionOptions::default();
        for n in 1..5 {
            for _ in 0..8 {
                let unitary = CliffordCircuit::gen(n, &mut rng).unitary();
                let nonzero: Vec<(usize, usize)> =
                    (0..unitary.ncols())
                    .flat_map(|c| (0..unitary.nrows()).map(move |r| (r, c)))
                    .filter(|rc| !is_zero(unitary[*rc]))
                    .collect();
                let entry = nonzero[rng.gen_range(0..nonzero.len())];

                let mut zeroed = unitary.clone();
                zeroed[entry] = C64::from(0.0);
                let mut rotated = unitary.clone();
                rotated[entry] *= C64::from_polar(1.0, 0.3);
                // a single ×i is a valid Clifford on one qubit, e.g. S from I
                let mut imag = unitary.clone();
                imag[entry] *= C64::i();
                for method in METHODS {
                    assert!(!CliffordFromMatrix::with_method(&zeroed, opts, method).is_clifford());
                    assert!(!CliffordFromMatrix::with_method(&rotated, opts, method).is_clifford());
                    if n >= 2 {
                        assert!(!CliffordFromMatrix::with_method(&imag, opts, method).is_clifford());
                    }
                }
            }
        }
    }
}
