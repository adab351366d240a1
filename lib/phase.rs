//! Fixed-precision comparison of complex amplitudes and the four unit phases
//! that stabiliser amplitudes and Pauli operators can carry.
//!
//! Every floating-point comparison in this crate goes through this module:
//! real and imaginary parts are rounded independently to [`DECIMALS`] decimal
//! places before being compared.

use std::{
    fmt,
    ops::{ Neg, Mul, MulAssign, Div, DivAssign },
};
use num_complex::Complex64 as C64;

/// Number of decimal places kept when comparing floating-point values.
pub const DECIMALS: i32 = 5;

const SCALE: f64 = 1e5;

/// Round real and imaginary parts to [`DECIMALS`] decimal places.
pub fn round_to_tolerance(z: C64) -> C64 {
    C64::new((z.re * SCALE).round() / SCALE, (z.im * SCALE).round() / SCALE)
}

/// `true` if `z` rounds to zero.
#[inline]
pub fn is_zero(z: C64) -> bool {
    (z.re * SCALE).round() == 0.0 && (z.im * SCALE).round() == 0.0
}

/// `true` if `a - b` rounds to zero.
#[inline]
pub fn approx_eq(a: C64, b: C64) -> bool { is_zero(a - b) }

/// One of the four complex units 1, *i*, −1, −*i*.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitPhase {
    /// +1
    #[default]
    One,
    /// +*i*
    I,
    /// −1
    MinusOne,
    /// −*i*
    MinusI,
}

impl fmt::Display for UnitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::One => write!(f, "+1"),
            Self::I => write!(f, "+i"),
            Self::MinusOne => write!(f, "-1"),
            Self::MinusI => write!(f, "-i"),
        }
    }
}

impl UnitPhase {
    /// Exponent of *i*.
    pub fn to_int(self) -> u8 {
        match self {
            Self::One      => 0,
            Self::I        => 1,
            Self::MinusOne => 2,
            Self::MinusI   => 3,
        }
    }

    /// Convert from an exponent of *i* (modulo 4).
    pub fn from_int(i: i8) -> Self {
        match i.rem_euclid(4) {
            0 => Self::One,
            1 => Self::I,
            2 => Self::MinusOne,
            3 => Self::MinusI,
            _ => unreachable!(),
        }
    }

    /// Match `z` against the four units after rounding, returning `None` for
    /// anything else.
    pub fn classify(z: C64) -> Option<Self> {
        let re = (z.re * SCALE).round();
        let im = (z.im * SCALE).round();
        if im == 0.0 {
            if re == SCALE {
                Some(Self::One)
            } else if re == -SCALE {
                Some(Self::MinusOne)
            } else {
                None
            }
        } else if re == 0.0 {
            if im == SCALE {
                Some(Self::I)
            } else if im == -SCALE {
                Some(Self::MinusI)
            } else {
                None
            }
        } else {
            None
        }
    }

    pub fn as_complex(self) -> C64 {
        match self {
            Self::One      => C64::from(1.0),
            Self::I        => C64::i(),
            Self::MinusOne => C64::from(-1.0),
            Self::MinusI   => -C64::i(),
        }
    }

    /// Multiply `z` by `self` exactly, by swapping and negating components.
    pub fn rotate(self, z: C64) -> C64 {
        match self {
            Self::One      => z,
            Self::I        => C64::new(-z.im, z.re),
            Self::MinusOne => -z,
            Self::MinusI   => C64::new(z.im, -z.re),
        }
    }

    /// The phase (−1)<sup>`sign`</sup> (−*i*)<sup>`imag`</sup> of a Pauli
    /// operator with the given sign and imaginary bits.
    pub fn from_bits(sign: bool, imag: bool) -> Self {
        match (sign, imag) {
            (false, false) => Self::One,
            (true,  false) => Self::MinusOne,
            (false, true ) => Self::MinusI,
            (true,  true ) => Self::I,
        }
    }

    /// Inverse of [`Self::from_bits`], returning `(sign, imag)`.
    pub fn to_bits(self) -> (bool, bool) {
        match self {
            Self::One      => (false, false),
            Self::MinusOne => (true,  false),
            Self::MinusI   => (false, true ),
            Self::I        => (true,  true ),
        }
    }

    /// `true` for ±1.
    pub fn is_real(self) -> bool { matches!(self, Self::One | Self::MinusOne) }

    /// Complex conjugate (equivalently, the inverse).
    pub fn conj(self) -> Self { Self::from_int(-(self.to_int() as i8)) }

    /// `self^k`.
    pub fn pow(self, k: u32) -> Self {
        Self::from_int(((self.to_int() as u32 * (k % 4)) % 4) as i8)
    }
}

impl From<UnitPhase> for C64 {
    fn from(ph: UnitPhase) -> Self { ph.as_complex() }
}

impl Neg for UnitPhase {
    type Output = Self;

    fn neg(self) -> Self::Output { Self::from_int(self.to_int() as i8 + 2) }
}

macro_rules! impl_unit_phase_math {
    (
        $trait:ident,
        $trait_fn:ident,
        $trait_assign:ident,
        $trait_assign_fn:ident,
        $op:tt
    ) => {
        impl $trait for UnitPhase {
            type Output = Self;

            fn $trait_fn(self, rhs: Self) -> Self::Output {
                Self::from_int(self.to_int() as i8 $op rhs.to_int() as i8)
            }
        }

        impl $trait_assign for UnitPhase {
            fn $trait_assign_fn(&mut self, rhs: Self) {
                *self = $trait::$trait_fn(*self, rhs);
            }
        }
    }
}
// multiplying units adds their exponents
impl_unit_phase_math!(Mul, mul, MulAssign, mul_assign, +);
impl_unit_phase_math!(Div, div, DivAssign, div_assign, -);

#[cfg(test)]
mod test {
    use super::*;

    const ALL: [UnitPhase; 4] =
        [UnitPhase::One, UnitPhase::I, UnitPhase::MinusOne, UnitPhase::MinusI];

    #[test]
    fn classify_rounds_to_five_places() {
        assert_eq!(UnitPhase::classify(C64::new(1.000004, 0.0)), Some(UnitPhase::One));
        assert_eq!(UnitPhase::classify(C64::new(0.000001, -0.999999)), Some(UnitPhase::MinusI));
        assert_eq!(UnitPhase::classify(C64::new(1.00001, 0.0)), None);
        assert_eq!(UnitPhase::classify(C64::new(0.7071, 0.7071)), None);
        assert_eq!(UnitPhase::classify(C64::new(0.0, 0.0)), None);
        assert_eq!(UnitPhase::classify(C64::new(f64::NAN, 0.0)), None);
        for ph in ALL {
            assert_eq!(UnitPhase::classify(ph.as_complex()), Some(ph));
        }
    }

    #[test]
    fn zero_and_approx_eq() {
        assert!(is_zero(C64::new(4e-6, -4e-6)));
        assert!(!is_zero(C64::new(6e-6, 0.0)));
        assert!(approx_eq(C64::new(0.5, 0.25), C64::new(0.500001, 0.25)));
        assert!(!approx_eq(C64::new(0.5, 0.25), C64::new(0.5, -0.25)));
        assert_eq!(round_to_tolerance(C64::new(0.123456, -0.987654)), C64::new(0.12346, -0.98765));
    }

    #[test]
    fn arithmetic_matches_complex() {
        for a in ALL {
            assert_eq!(a.conj().as_complex(), a.as_complex().conj());
            assert_eq!((-a).as_complex(), -a.as_complex());
            for b in ALL {
                assert_eq!((a * b).as_complex(), a.as_complex() * b.as_complex());
                assert_eq!((a / b) * b, a);
                let z = C64::new(0.3, -1.7);
                assert_eq!(a.rotate(z), a.as_complex() * z);
            }
        }
        assert_eq!(UnitPhase::I.pow(3), UnitPhase::MinusI);
        assert_eq!(UnitPhase::MinusI.pow(0), UnitPhase::One);
    }

    #[test]
    fn assign_ops_match_binary_ops() {
        for a in ALL {
            for b in ALL {
                let mut prod = a;
                prod *= b;
                assert_eq!(prod, a * b);
                let mut quot = a;
                quot /= b;
                assert_eq!(quot, a / b);
            }
        }
        let mut ph = UnitPhase::I;
        ph *= UnitPhase::I;
        assert_eq!(ph, UnitPhase::MinusOne);
        ph /= UnitPhase::MinusI;
        assert_eq!(ph, UnitPhase::MinusI);
    }

    #[test]
    fn pauli_bits_roundtrip() {
        for ph in ALL {
            let (sign, imag) = ph.to_bits();
            assert_eq!(UnitPhase::from_bits(sign, imag), ph);
            let expected = C64::from(if sign { -1.0 } else { 1.0 })
                * if imag { -C64::i() } else { C64::from(1.0) };
            assert_eq!(ph.as_complex(), expected);
        }
    }
}
