//! Clifford gates acting on dense vectors and matrices, used as a source of
//! stabiliser states and Clifford unitaries with known structure.
//!
//! Qubit *k* is bit *k* of a basis-state index.
//!
//! See also: <https://en.wikipedia.org/wiki/Clifford_gates>

use std::f64::consts::FRAC_1_SQRT_2;
use itertools::Itertools;
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::Rng;

/// Description of a single gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Hadamard
    H(usize),
    /// π rotation about X
    X(usize),
    /// π rotation about Y
    Y(usize),
    /// π rotation about Z
    Z(usize),
    /// π/2 rotation about Z
    S(usize),
    /// Z-controlled π rotation about X.
    ///
    /// The first qubit index is the control.
    CX(usize, usize),
    /// Z-controlled π rotation about Z.
    CZ(usize, usize),
    /// Swap
    Swap(usize, usize),
}

impl Gate {
    /// Sample a random single-qubit gate (`H`, `X`, `Y`, `Z`, or `S`) for a
    /// given qubit index.
    pub fn sample_single<R>(idx: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        match rng.gen_range(0..5_usize) {
            0 => Self::H(idx),
            1 => Self::X(idx),
            2 => Self::Y(idx),
            3 => Self::Z(idx),
            4 => Self::S(idx),
            _ => unreachable!(),
        }
    }

    /// Sample a random gate on `n` qubits, two-qubit gates included when
    /// `n > 1`.
    ///
    /// *Panics* if `n == 0`.
    pub fn sample<R>(n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        let a = rng.gen_range(0..n);
        if n < 2 || rng.gen_bool(0.5) { return Self::sample_single(a, rng); }
        let b = (a + rng.gen_range(1..n)) % n;
        match rng.gen_range(0..3_usize) {
            0 => Self::CX(a, b),
            1 => Self::CZ(a, b),
            2 => Self::Swap(a, b),
            _ => unreachable!(),
        }
    }

    /// `true` if every qubit index is below `n` and two-qubit gates act on
    /// distinct qubits.
    pub fn fits(&self, n: usize) -> bool {
        match *self {
            Self::H(k)
            | Self::X(k)
            | Self::Y(k)
            | Self::Z(k)
            | Self::S(k)
            => k < n,
            Self::CX(a, b)
            | Self::CZ(a, b)
            | Self::Swap(a, b)
            => a < n && b < n && a != b,
        }
    }

    /// Apply the gate in place to a dense state vector.
    pub fn apply_vector(&self, vector: &mut [C64]) {
        match *self {
            Self::H(k) => {
                let m = 1 << k;
                for i in (0..vector.len()).filter(|i| i & m == 0) {
                    let (a, b) = (vector[i], vector[i | m]);
                    vector[i] = (a + b) * FRAC_1_SQRT_2;
                    vector[i | m] = (a - b) * FRAC_1_SQRT_2;
                }
            },
            Self::X(k) => {
                let m = 1 << k;
                for i in (0..vector.len()).filter(|i| i & m == 0) {
                    vector.swap(i, i | m);
                }
            },
            Self::Y(k) => {
                let m = 1 << k;
                for i in (0..vector.len()).filter(|i| i & m == 0) {
                    let (a, b) = (vector[i], vector[i | m]);
                    vector[i] = -C64::i() * b;
                    vector[i | m] = C64::i() * a;
                }
            },
            Self::Z(k) => {
                let m = 1 << k;
                for i in (0..vector.len()).filter(|i| i & m != 0) {
                    vector[i] = -vector[i];
                }
            },
            Self::S(k) => {
                let m = 1 << k;
                for i in (0..vector.len()).filter(|i| i & m != 0) {
                    vector[i] *= C64::i();
                }
            },
            Self::CX(c, t) => {
                let (mc, mt) = (1 << c, 1 << t);
                for i in (0..vector.len()).filter(|i| i & mc != 0 && i & mt == 0) {
                    vector.swap(i, i | mt);
                }
            },
            Self::CZ(a, b) => {
                let m = (1 << a) | (1 << b);
                for i in (0..vector.len()).filter(|i| i & m == m) {
                    vector[i] = -vector[i];
                }
            },
            Self::Swap(a, b) => {
                let (ma, mb) = (1 << a, 1 << b);
                for i in (0..vector.len()).filter(|i| i & ma != 0 && i & mb == 0) {
                    vector.swap(i, i ^ ma ^ mb);
                }
            },
        }
    }

    /// Left-multiply a dense matrix by the gate, in place.
    pub fn apply_matrix(&self, matrix: &mut na::DMatrix<C64>) {
        let nrows = matrix.nrows();
        if nrows == 0 { return; }
        matrix.as_mut_slice()
            .chunks_exact_mut(nrows)
            .for_each(|col| self.apply_vector(col));
    }
}

/// A series of [`Gate`]s on a fixed number of qubits.
///
/// All gates are guaranteed to apply to qubit indices less than `n` and all
/// two-qubit gate indices are guaranteed to be non-equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CliffordCircuit {
    n: usize,
    gates: Vec<Gate>,
}

impl IntoIterator for CliffordCircuit {
    type Item = Gate;
    type IntoIter = <Vec<Gate> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.gates.into_iter() }
}

impl<'a> IntoIterator for &'a CliffordCircuit {
    type Item = &'a Gate;
    type IntoIter = <&'a Vec<Gate> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.gates.iter() }
}

impl CliffordCircuit {
    /// Convert a series of gates to a new `n`-qubit circuit, verifying that
    /// every gate [fits][Gate::fits].
    ///
    /// If the above conditions do not hold, all gates are returned in a new
    /// vector.
    pub fn new<I>(n: usize, gates: I) -> Result<Self, Vec<Gate>>
    where I: IntoIterator<Item = Gate>
    {
        let gates: Vec<Gate> = gates.into_iter().collect();
        if gates.iter().all(|gate| gate.fits(n)) {
            Ok(Self { n, gates })
        } else {
            Err(gates)
        }
    }

    pub fn n(&self) -> usize { self.n }

    pub fn len(&self) -> usize { self.gates.len() }

    pub fn is_empty(&self) -> bool { self.gates.is_empty() }

    /// A circuit of `depth` independently sampled gates.
    pub fn random<R>(n: usize, depth: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        let gates =
            if n == 0 {
                Vec::new()
            } else {
                (0..depth).map(|_| Gate::sample(n, rng)).collect()
            };
        Self { n, gates }
    }

    /// Generates a random element of the `n`-qubit Clifford group as a
    /// particular sequence of [`Gate`]s.
    pub fn gen<R>(n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        // See arXiv:2008.06011v4 for details on the algorithm and
        // arXiv:0406196v5 for background.
        //
        // For each leading qubit, sample an anticommuting pair of Paulis on
        // the remaining qubits and record the gates that take the pair to
        // (X, Z) on the leading qubit.
        let mut tab = Tableau::new(n);
        let mut scratch: Vec<usize> = Vec::new();
        for llim in 0..n {
            let (p0, p1) = loop {
                // resample until the pair anticommutes on qubits llim..n
                let p0 = Letter::gen_nqubit(n, llim, rng);
                let p1 = Letter::gen_nqubit(n, llim, rng);
                let n_anti_comm =
                    p0.iter().zip(&p1).skip(llim)
                    .filter(|(a, b)| !a.commutes_with(**b))
                    .count();
                if n_anti_comm % 2 == 1 { break (p0, p1); }
            };
            tab.init_with(&p0, &p1, [rng.gen(), rng.gen()]);

            tab.clear_row(llim, 0, &mut scratch);
            // move the remaining x in the top row to the leading column
            if let Some(j) = scratch.pop() {
                if j != llim { tab.swap(j, llim); }
            }

            // bring the bottom row to Z on the leading qubit
            let bottom_is_z =
                !tab.tabx[llim][1]
                && tab.tabz[llim][1]
                && tab.iter_xz().skip(llim + 1).all(|(tx, tz)| !tx[1] && !tz[1]);
            if !bottom_is_z {
                tab.h(llim);
                tab.clear_row(llim, 1, &mut scratch);
                scratch.clear();
                tab.h(llim);
            }

            // clear signs
            match tab.sign {
                [false, false] => { },
                [false, true ] => { tab.circuit.push(Gate::X(llim)); },
                [true,  false] => { tab.circuit.push(Gate::Z(llim)); },
                [true,  true ] => { tab.circuit.push(Gate::Y(llim)); },
            }
        }
        Self { n, gates: tab.circuit }
    }

    /// Apply every gate in order to a dense state vector.
    pub fn apply_vector(&self, vector: &mut [C64]) {
        self.gates.iter().for_each(|gate| gate.apply_vector(vector));
    }

    /// Left-multiply a dense matrix by the whole circuit.
    pub fn apply_matrix(&self, matrix: &mut na::DMatrix<C64>) {
        self.gates.iter().for_each(|gate| gate.apply_matrix(matrix));
    }

    /// The output state of the circuit on ∣0...0⟩.
    pub fn state(&self) -> na::DVector<C64> {
        let mut state: na::DVector<C64> = na::DVector::zeros(1 << self.n);
        state[0] = C64::from(1.0);
        self.apply_vector(state.as_mut_slice());
        state
    }

    /// The unitary implemented by the circuit.
    pub fn unitary(&self) -> na::DMatrix<C64> {
        let size: usize = 1 << self.n;
        let mut unitary: na::DMatrix<C64> = na::DMatrix::identity(size, size);
        self.apply_matrix(&mut unitary);
        unitary
    }
}

// single-qubit Pauli letters for the tableau sampler
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Letter { I, X, Y, Z }

impl Letter {
    fn commutes_with(self, other: Self) -> bool {
        self == Self::I || other == Self::I || self == other
    }

    fn from_int(u: usize) -> Self {
        match u % 4 {
            0 => Self::I,
            1 => Self::X,
            2 => Self::Y,
            3 => Self::Z,
            _ => unreachable!(),
        }
    }

    // identity below `llim`
    fn gen_nqubit<R>(n: usize, llim: usize, rng: &mut R) -> Vec<Self>
    where R: Rng + ?Sized
    {
        (0..n)
            .map(|k| if k < llim { Self::I } else { Self::from_int(rng.gen_range(0..4)) })
            .collect()
    }
}

#[derive(Clone, Debug)]
struct Tableau {
    tabx: Vec<[bool; 2]>,
    tabz: Vec<[bool; 2]>,
    sign: [bool; 2],
    circuit: Vec<Gate>,
}

impl Tableau {
    fn new(n: usize) -> Self {
        Self {
            tabx: vec![[false; 2]; n],
            tabz: vec![[false; 2]; n],
            sign: [false; 2],
            circuit: Vec::new(),
        }
    }

    fn init_with(&mut self, p0: &[Letter], p1: &[Letter], sign: [bool; 2]) {
        let iter =
            p0.iter().zip(p1)
            .zip(self.tabx.iter_mut().zip(self.tabz.iter_mut()));
        for ((p0j, p1j), (txj, tzj)) in iter {
            for (row, letter) in [*p0j, *p1j].into_iter().enumerate() {
                txj[row] = matches!(letter, Letter::X | Letter::Y);
                tzj[row] = matches!(letter, Letter::Z | Letter::Y);
            }
        }
        self.sign = sign;
    }

    fn iter_xz(&self) -> impl Iterator<Item = (&[bool; 2], &[bool; 2])> + '_ {
        self.tabx.iter().zip(self.tabz.iter())
    }

    // clear the z part of `row` with H and S, then all but one x with CNOTs;
    // leaves the remaining x column in `scratch`
    fn clear_row(&mut self, llim: usize, row: usize, scratch: &mut Vec<usize>) {
        scratch.clear();
        scratch.extend(
            self.iter_xz().enumerate().skip(llim)
                .filter(|(_, (tx, tz))| tz[row] && !tx[row])
                .map(|(j, _)| j)
        );
        for j in scratch.drain(..) { self.h(j); }
        scratch.extend(
            self.iter_xz().enumerate().skip(llim)
                .filter(|(_, (tx, tz))| tz[row] && tx[row])
                .map(|(j, _)| j)
        );
        for j in scratch.drain(..) { self.s(j); }
        scratch.extend(
            self.iter_xz().enumerate().skip(llim)
                .filter(|(_, (tx, _))| tx[row])
                .map(|(j, _)| j)
        );
        // pairwise CNOT reduction, halving the list each round
        while scratch.len() > 1 {
            let next: Vec<usize> =
                scratch.iter().copied()
                .chunks(2).into_iter()
                .filter_map(|mut chunk| {
                    let a = chunk.next()?;
                    if let Some(b) = chunk.next() { self.cnot(a, b); }
                    Some(a)
                })
                .collect();
            *scratch = next;
        }
    }

    fn h(&mut self, j: usize) {
        std::mem::swap(&mut self.tabx[j], &mut self.tabz[j]);
        self.circuit.push(Gate::H(j));
    }

    fn s(&mut self, j: usize) {
        self.tabz[j][0] ^= self.tabx[j][0];
        self.tabz[j][1] ^= self.tabx[j][1];
        self.circuit.push(Gate::S(j));
    }

    fn cnot(&mut self, c: usize, j: usize) {
        self.tabx[j][0] ^= self.tabx[c][0];
        self.tabx[j][1] ^= self.tabx[c][1];
        self.tabz[c][0] ^= self.tabz[j][0];
        self.tabz[c][1] ^= self.tabz[j][1];
        self.circuit.push(Gate::CX(c, j));
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.tabx.swap(a, b);
        self.tabz.swap(a, b);
        self.circuit.push(Gate::Swap(a, b));
    }
}
