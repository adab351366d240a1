//! Knobs shared by every conversion from dense data.

/// Controls how much a conversion trusts its input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConversionOptions {
    /// Accept an arbitrary overall scalar, recording it as the global
    /// factor/phase. When `false`, the leading amplitude times
    /// √(support size) must itself be one of ±1, ±i.
    pub allow_global_factor: bool,
    /// Skip every consistency sweep and trust that the input is valid.
    ///
    /// Conversions of invalid input in this mode still terminate without
    /// panicking, but their output is meaningless.
    pub assume_valid: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self { allow_global_factor: true, assume_valid: false }
    }
}

impl ConversionOptions {
    /// Verify everything and require stabiliser-valued leading amplitudes.
    pub const STRICT: Self =
        Self { allow_global_factor: false, assume_valid: false };

    /// Trust the input and accept any global factor.
    pub const TRUSTED: Self =
        Self { allow_global_factor: true, assume_valid: true };

    /// Same as [`Default::default`].
    pub fn new() -> Self { Self::default() }

    /// Set `allow_global_factor`.
    pub fn allow_global_factor(mut self, allow: bool) -> Self {
        self.allow_global_factor = allow;
        self
    }

    /// Set `assume_valid`.
    pub fn assume_valid(mut self, assume: bool) -> Self {
        self.assume_valid = assume;
        self
    }

    /// `true` if consistency sweeps should run.
    pub(crate) fn verify(&self) -> bool { !self.assume_valid }
}

/// How [`clifford_from_matrix`][crate::clifford_from_matrix] recovers the
/// images of the *X<sub>k</sub>*.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum XConjugateMethod {
    /// Build operators dual to the column-0 stabilisers and fix their phases
    /// by probing single entries of the matrix.
    #[default]
    PhaseProbe,
    /// Multiply the matrix by *H*<sup>⊗*n*</sup> on the right and rerun the
    /// Z-conjugate extraction on the result.
    Hadamard,
}
