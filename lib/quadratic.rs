//! Symmetric bilinear forms over F<sub>2</sub> with zero diagonal, i.e. the
//! purely quadratic part *Q*(*y*) = Σ<sub>*a*<*b*</sub> *q*<sub>*ab*</sub>
//! *y*<sub>*a*</sub> *y*<sub>*b*</sub> of a stabiliser state's phase
//! polynomial.
//!
//! The form is stored as one bit-packed row per coordinate, so that both
//! evaluating *Q* and the congruence updates needed when changing basis are a
//! handful of word operations per row.

use crate::f2::{ get_bit_at, mod2product };

/// Symmetric, zero-diagonal `dim` × `dim` matrix over F<sub>2</sub>.
///
/// Bit `b` of `rows[a]` is *q*<sub>*ab*</sub> = *q*<sub>*ba*</sub>.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QuadraticForm {
    rows: Vec<usize>,
}

impl QuadraticForm {
    /// The zero form on `dim` coordinates.
    pub fn new(dim: usize) -> Self { Self { rows: vec![0; dim] } }

    /// Build from monomials packed as `(1 << a) | (1 << b)`.
    ///
    /// Monomials that do not name exactly two distinct coordinates below
    /// `dim` are ignored; repeated monomials cancel.
    pub fn from_monomials(dim: usize, monomials: &[usize]) -> Self {
        let mut form = Self::new(dim);
        for &m in monomials.iter() {
            if m.count_ones() != 2 || m >> dim != 0 { continue; }
            let a = m.trailing_zeros() as usize;
            let b = (usize::BITS - 1 - m.leading_zeros()) as usize;
            form.toggle(a, b);
        }
        form
    }

    pub fn dim(&self) -> usize { self.rows.len() }

    /// Bit-vector of the coordinates coupled to `a`.
    pub fn row(&self, a: usize) -> usize { self.rows[a] }

    pub fn get(&self, a: usize, b: usize) -> bool { get_bit_at(self.rows[a], b) }

    /// Flip *q*<sub>*ab*</sub> (and *q*<sub>*ba*</sub>). Does nothing if
    /// `a == b`.
    pub fn toggle(&mut self, a: usize, b: usize) -> &mut Self {
        if a != b {
            self.rows[a] ^= 1 << b;
            self.rows[b] ^= 1 << a;
        }
        self
    }

    pub fn set(&mut self, a: usize, b: usize, val: bool) -> &mut Self {
        if self.get(a, b) != val { self.toggle(a, b); }
        self
    }

    /// *Q*(*y*).
    pub fn evaluate(&self, y: usize) -> bool {
        self.rows.iter()
            .enumerate()
            .filter(|(a, _)| get_bit_at(y, *a))
            // pairs (a, b) with b < a
            .fold(false, |acc, (a, row)| acc ^ mod2product(*row & ((1 << a) - 1), y))
    }

    /// The monomials *y*<sub>*a*</sub>*y*<sub>*b*</sub> with nonzero
    /// coefficient, packed as `(1 << a) | (1 << b)` and sorted ascending.
    pub fn monomials(&self) -> Vec<usize> {
        let mut acc: Vec<usize> =
            self.rows.iter()
            .enumerate()
            .flat_map(|(a, row)| {
                (a + 1..self.dim())
                    .filter(move |b| get_bit_at(*row, *b))
                    .map(move |b| (1 << a) | (1 << b))
            })
            .collect();
        acc.sort_unstable();
        acc
    }

    /// Linear part picked up when the argument is shifted by `y0`:
    /// *Q*(*y* ⊕ *y*<sub>0</sub>) = *Q*(*y*) + *Q*(*y*<sub>0</sub>) + *ℓ*·*y*,
    /// where bit *a* of the returned *ℓ* is the parity of
    /// `row(a) & y0`.
    pub fn polarization(&self, y0: usize) -> usize {
        self.rows.iter()
            .enumerate()
            .filter(|(_, row)| mod2product(**row, y0))
            .fold(0, |acc, (a, _)| acc | (1 << a))
    }

    /// Congruence update for the change of variables *y*<sub>*i*</sub> ←
    /// *y*<sub>*i*</sub> ⊕ *y*<sub>*j*</sub> (equivalently, adding basis vector
    /// *i* onto basis vector *j*): *q*<sub>*jk*</sub> ^= *q*<sub>*ik*</sub> for
    /// every *k* ∉ {*i*, *j*}.
    ///
    /// Returns *q*<sub>*ij*</sub>, which the caller must fold into the linear
    /// part of coordinate *j* because *y*<sub>*j*</sub><sup>2</sup> =
    /// *y*<sub>*j*</sub>.
    pub fn add_row(&mut self, i: usize, j: usize) -> bool {
        if i == j { return false; }
        let qij = self.get(i, j);
        let delta = self.rows[i] & !(1 << j);
        self.rows[j] ^= delta;
        self.rows.iter_mut()
            .enumerate()
            .filter(|(k, _)| get_bit_at(delta, *k))
            .for_each(|(_, row)| { *row ^= 1 << j; });
        qij
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::f2::evaluate_poly;
    use rand::{ Rng, SeedableRng, rngs::StdRng };

    fn random_form<R: Rng>(dim: usize, rng: &mut R) -> QuadraticForm {
        let mut q = QuadraticForm::new(dim);
        for a in 0..dim {
            for b in a + 1..dim {
                q.set(a, b, rng.gen());
            }
        }
        q
    }

    fn is_symmetric(q: &QuadraticForm) -> bool {
        (0..q.dim()).all(|a| {
            !q.get(a, a) && (0..q.dim()).all(|b| q.get(a, b) == q.get(b, a))
        })
    }

    #[test]
    fn monomials_roundtrip() {
        let q = QuadraticForm::from_monomials(3, &[0b110, 0b011]);
        assert!(q.get(1, 2) && q.get(2, 1) && q.get(0, 1));
        assert!(!q.get(0, 2));
        assert_eq!(q.monomials(), vec![0b011, 0b110]);
        // ill-formed and cancelling monomials
        let q = QuadraticForm::from_monomials(3, &[0b001, 0b1001, 0b101, 0b101]);
        assert_eq!(q, QuadraticForm::new(3));
    }

    #[test]
    fn evaluate_matches_polynomial() {
        let mut rng = StdRng::seed_from_u64(57);
        for dim in 0..7 {
            let q = random_form(dim, &mut rng);
            let monomials = q.monomials();
            for y in 0..1_usize << dim {
                assert_eq!(q.evaluate(y), evaluate_poly(&monomials, y));
            }
        }
    }

    #[test]
    fn polarization_identity() {
        let mut rng = StdRng::seed_from_u64(58);
        for dim in 1..7 {
            let q = random_form(dim, &mut rng);
            for y0 in 0..1_usize << dim {
                let ell = q.polarization(y0);
                for y in 0..1_usize << dim {
                    assert_eq!(
                        q.evaluate(y ^ y0),
                        q.evaluate(y) ^ q.evaluate(y0) ^ mod2product(ell, y),
                    );
                }
            }
        }
    }

    #[test]
    fn add_row_is_a_change_of_variables() {
        let mut rng = StdRng::seed_from_u64(59);
        for dim in 2..7 {
            let q = random_form(dim, &mut rng);
            let i = rng.gen_range(0..dim);
            let j = (i + rng.gen_range(1..dim)) % dim;
            let mut p = q.clone();
            let qij = p.add_row(i, j);
            assert!(is_symmetric(&p));
            // new coordinates y' are related to the old ones by y_i = y'_i ^ y'_j
            for y_new in 0..1_usize << dim {
                let y_old = y_new ^ if get_bit_at(y_new, j) { 1 << i } else { 0 };
                assert_eq!(
                    q.evaluate(y_old),
                    p.evaluate(y_new) ^ (qij && get_bit_at(y_new, j)),
                );
            }
        }
    }
}
