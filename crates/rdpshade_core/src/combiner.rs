//! Color Combiner Selectors
//!
//! The RDP combiner evaluates `(A - B) * C + D` once per cycle, separately
//! for color and alpha. Each of the sixteen operand slots is a small index
//! into a slot-specific input table, packed into the 64-bit `SetCombine`
//! word.
//!
//! | Slot      | Width | Valid inputs                                             |
//! |-----------|-------|----------------------------------------------------------|
//! | color A   | 4     | combined, texel0/1, prim, shade, env, one, noise         |
//! | color B   | 4     | combined, texel0/1, prim, shade, env, center, K4         |
//! | color C   | 5     | ..., scale, the six alpha channels, LOD fractions, K5    |
//! | color D   | 3     | combined, texel0/1, prim, shade, env, one                |
//! | alpha A/B/D | 3   | combined, texel0/1, prim, shade, env, one                |
//! | alpha C   | 3     | LOD fraction, texel0/1, prim, shade, env, prim LOD       |
//!
//! Every encoding outside a slot's table reads as zero on hardware, so the
//! decoder maps them all to [`ColorInput::Zero`] / [`AlphaInput::Zero`].

/// Operand source for a color equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorInput {
    Combined,
    Texel0,
    Texel1,
    Primitive,
    Shade,
    Environment,
    One,
    Noise,
    Center,
    K4,
    Scale,
    CombinedAlpha,
    Texel0Alpha,
    Texel1Alpha,
    PrimitiveAlpha,
    ShadeAlpha,
    EnvironmentAlpha,
    LodFraction,
    PrimLodFraction,
    K5,
    #[default]
    Zero,
}

/// Operand source for an alpha equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaInput {
    Combined,
    Texel0,
    Texel1,
    Primitive,
    Shade,
    Environment,
    One,
    LodFraction,
    PrimLodFraction,
    #[default]
    Zero,
}

/// Common behavior of combiner operands, used by equation normalization.
pub trait CombinerInput: Copy + Eq + Default {
    /// The zero operand.
    const ZERO: Self;

    /// Reads the previous cycle's output.
    fn is_combined(self) -> bool;

    /// Samples texture unit `unit` (color or alpha channel).
    fn reads_texel(self, unit: usize) -> bool;

    /// Reads the LOD fraction computed by the mipmap helper.
    fn reads_lod_fraction(self) -> bool;

    /// Reads the per-pixel noise source.
    fn reads_noise(self) -> bool;
}

impl CombinerInput for ColorInput {
    const ZERO: Self = Self::Zero;

    fn is_combined(self) -> bool {
        matches!(self, Self::Combined | Self::CombinedAlpha)
    }

    fn reads_texel(self, unit: usize) -> bool {
        match unit {
            0 => matches!(self, Self::Texel0 | Self::Texel0Alpha),
            1 => matches!(self, Self::Texel1 | Self::Texel1Alpha),
            _ => false,
        }
    }

    fn reads_lod_fraction(self) -> bool {
        self == Self::LodFraction
    }

    fn reads_noise(self) -> bool {
        self == Self::Noise
    }
}

impl CombinerInput for AlphaInput {
    const ZERO: Self = Self::Zero;

    fn is_combined(self) -> bool {
        self == Self::Combined
    }

    fn reads_texel(self, unit: usize) -> bool {
        match unit {
            0 => self == Self::Texel0,
            1 => self == Self::Texel1,
            _ => false,
        }
    }

    fn reads_lod_fraction(self) -> bool {
        self == Self::LodFraction
    }

    fn reads_noise(self) -> bool {
        false
    }
}

// ─── Slot decode tables ──────────────────────────────────────────────────────

const COLOR_SHARED: [ColorInput; 6] = [
    ColorInput::Combined,
    ColorInput::Texel0,
    ColorInput::Texel1,
    ColorInput::Primitive,
    ColorInput::Shade,
    ColorInput::Environment,
];

const ALPHA_SHARED: [AlphaInput; 6] = [
    AlphaInput::Combined,
    AlphaInput::Texel0,
    AlphaInput::Texel1,
    AlphaInput::Primitive,
    AlphaInput::Shade,
    AlphaInput::Environment,
];

impl ColorInput {
    #[must_use]
    pub fn decode_a(raw: u32) -> Self {
        match raw {
            0..=5 => COLOR_SHARED[raw as usize],
            6 => Self::One,
            7 => Self::Noise,
            _ => Self::Zero,
        }
    }

    #[must_use]
    pub fn decode_b(raw: u32) -> Self {
        match raw {
            0..=5 => COLOR_SHARED[raw as usize],
            6 => Self::Center,
            7 => Self::K4,
            _ => Self::Zero,
        }
    }

    #[must_use]
    pub fn decode_c(raw: u32) -> Self {
        match raw {
            0..=5 => COLOR_SHARED[raw as usize],
            6 => Self::Scale,
            7 => Self::CombinedAlpha,
            8 => Self::Texel0Alpha,
            9 => Self::Texel1Alpha,
            10 => Self::PrimitiveAlpha,
            11 => Self::ShadeAlpha,
            12 => Self::EnvironmentAlpha,
            13 => Self::LodFraction,
            14 => Self::PrimLodFraction,
            15 => Self::K5,
            _ => Self::Zero,
        }
    }

    #[must_use]
    pub fn decode_d(raw: u32) -> Self {
        match raw {
            0..=5 => COLOR_SHARED[raw as usize],
            6 => Self::One,
            _ => Self::Zero,
        }
    }
}

impl AlphaInput {
    /// Decodes an alpha A, B or D slot.
    #[must_use]
    pub fn decode_abd(raw: u32) -> Self {
        match raw {
            0..=5 => ALPHA_SHARED[raw as usize],
            6 => Self::One,
            _ => Self::Zero,
        }
    }

    #[must_use]
    pub fn decode_c(raw: u32) -> Self {
        match raw {
            0 => Self::LodFraction,
            1..=5 => ALPHA_SHARED[raw as usize],
            6 => Self::PrimLodFraction,
            _ => Self::Zero,
        }
    }
}

// ─── Equations ───────────────────────────────────────────────────────────────

/// One `(A - B) * C + D` equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Equation<I> {
    pub a: I,
    pub b: I,
    pub c: I,
    pub d: I,
}

impl<I: CombinerInput> Equation<I> {
    #[must_use]
    pub const fn new(a: I, b: I, c: I, d: I) -> Self {
        Self { a, b, c, d }
    }

    /// An equation that forwards a single operand (`(0 - 0) * 0 + d`).
    #[must_use]
    pub fn passthrough(d: I) -> Self {
        Self::new(I::ZERO, I::ZERO, I::ZERO, d)
    }

    /// Collapses behaviorally identical encodings.
    ///
    /// In the first cycle there is no previous output, so `Combined`
    /// operands read as zero. A zero multiplier or `A == B` makes the
    /// product term vanish, leaving only `D`.
    #[must_use]
    pub fn normalized(self, first_cycle: bool) -> Self {
        let fix = |input: I| {
            if first_cycle && input.is_combined() {
                I::ZERO
            } else {
                input
            }
        };
        let (a, b, c, d) = (fix(self.a), fix(self.b), fix(self.c), fix(self.d));

        if c == I::ZERO || a == b {
            Self::passthrough(d)
        } else {
            Self::new(a, b, c, d)
        }
    }

    /// The product term `(A - B) * C` contributes to the result.
    #[must_use]
    pub fn has_product(&self) -> bool {
        self.c != I::ZERO && self.a != self.b
    }

    pub fn operands(&self) -> [I; 4] {
        [self.a, self.b, self.c, self.d]
    }

    #[must_use]
    pub fn reads(&self, pred: impl Fn(I) -> bool) -> bool {
        self.operands().into_iter().any(pred)
    }
}

/// Color and alpha equations for one combiner cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombineCycle {
    pub color: Equation<ColorInput>,
    pub alpha: Equation<AlphaInput>,
}

impl Default for CombineCycle {
    /// `color = texel0 * shade`, `alpha = texel0 * shade`: the usual
    /// "modulate" setup.
    fn default() -> Self {
        Self::modulate()
    }
}

impl CombineCycle {
    /// `texel0 * shade` on both channels.
    #[must_use]
    pub const fn modulate() -> Self {
        Self {
            color: Equation::new(
                ColorInput::Texel0,
                ColorInput::Zero,
                ColorInput::Shade,
                ColorInput::Zero,
            ),
            alpha: Equation::new(
                AlphaInput::Texel0,
                AlphaInput::Zero,
                AlphaInput::Shade,
                AlphaInput::Zero,
            ),
        }
    }

    /// Forwards the shade color unchanged.
    #[must_use]
    pub const fn shade() -> Self {
        Self {
            color: Equation::new(
                ColorInput::Zero,
                ColorInput::Zero,
                ColorInput::Zero,
                ColorInput::Shade,
            ),
            alpha: Equation::new(
                AlphaInput::Zero,
                AlphaInput::Zero,
                AlphaInput::Zero,
                AlphaInput::Shade,
            ),
        }
    }

    /// Forwards the previous cycle's output unchanged.
    #[must_use]
    pub const fn combined() -> Self {
        Self {
            color: Equation::new(
                ColorInput::Zero,
                ColorInput::Zero,
                ColorInput::Zero,
                ColorInput::Combined,
            ),
            alpha: Equation::new(
                AlphaInput::Zero,
                AlphaInput::Zero,
                AlphaInput::Zero,
                AlphaInput::Combined,
            ),
        }
    }

    #[must_use]
    pub fn normalized(self, first_cycle: bool) -> Self {
        Self {
            color: self.color.normalized(first_cycle),
            alpha: self.alpha.normalized(first_cycle),
        }
    }

    #[must_use]
    pub fn reads_texel(&self, unit: usize) -> bool {
        self.color.reads(|i| i.reads_texel(unit)) || self.alpha.reads(|i| i.reads_texel(unit))
    }

    #[must_use]
    pub fn reads_lod_fraction(&self) -> bool {
        self.color.reads(CombinerInput::reads_lod_fraction)
            || self.alpha.reads(CombinerInput::reads_lod_fraction)
    }

    #[must_use]
    pub fn reads_noise(&self) -> bool {
        self.color.reads(CombinerInput::reads_noise)
    }

    /// Some operand reads the previous cycle's color.
    #[must_use]
    pub fn reads_combined_color(&self) -> bool {
        self.color.reads(|i| i == ColorInput::Combined)
    }

    /// Some operand reads the previous cycle's alpha.
    #[must_use]
    pub fn reads_combined_alpha(&self) -> bool {
        self.color.reads(|i| i == ColorInput::CombinedAlpha)
            || self.alpha.reads(|i| i == AlphaInput::Combined)
    }

    /// Drops the channels of a first cycle that `next` never reads.
    #[must_use]
    pub fn pruned_for(self, next: &Self) -> Self {
        Self {
            color: if next.reads_combined_color() {
                self.color
            } else {
                Equation::passthrough(ColorInput::Zero)
            },
            alpha: if next.reads_combined_alpha() {
                self.alpha
            } else {
                Equation::passthrough(AlphaInput::Zero)
            },
        }
    }
}

/// Splits a `SetCombine` word into both cycles.
///
/// Returns the raw (un-normalized) equations; normalization happens when the
/// key is built.
#[must_use]
pub fn decode_combine(mux: u64) -> [CombineCycle; 2] {
    let field = |shift: u32, bits: u32| ((mux >> shift) & ((1 << bits) - 1)) as u32;

    let cycle0 = CombineCycle {
        color: Equation::new(
            ColorInput::decode_a(field(52, 4)),
            ColorInput::decode_b(field(28, 4)),
            ColorInput::decode_c(field(47, 5)),
            ColorInput::decode_d(field(15, 3)),
        ),
        alpha: Equation::new(
            AlphaInput::decode_abd(field(44, 3)),
            AlphaInput::decode_abd(field(12, 3)),
            AlphaInput::decode_c(field(41, 3)),
            AlphaInput::decode_abd(field(9, 3)),
        ),
    };
    let cycle1 = CombineCycle {
        color: Equation::new(
            ColorInput::decode_a(field(37, 4)),
            ColorInput::decode_b(field(24, 4)),
            ColorInput::decode_c(field(32, 5)),
            ColorInput::decode_d(field(6, 3)),
        ),
        alpha: Equation::new(
            AlphaInput::decode_abd(field(21, 3)),
            AlphaInput::decode_abd(field(3, 3)),
            AlphaInput::decode_c(field(18, 3)),
            AlphaInput::decode_abd(field(0, 3)),
        ),
    };
    [cycle0, cycle1]
}

/// Packs two cycles back into a `SetCombine` word.
///
/// Inputs that a slot cannot encode are written as that slot's zero
/// encoding. Used by tooling and tests to describe register states.
#[must_use]
pub fn encode_combine(cycles: &[CombineCycle; 2]) -> u64 {
    fn color_a(i: ColorInput) -> u64 {
        match i {
            ColorInput::One => 6,
            ColorInput::Noise => 7,
            other => color_shared(other).unwrap_or(15),
        }
    }
    fn color_b(i: ColorInput) -> u64 {
        match i {
            ColorInput::Center => 6,
            ColorInput::K4 => 7,
            other => color_shared(other).unwrap_or(15),
        }
    }
    fn color_c(i: ColorInput) -> u64 {
        match i {
            ColorInput::Scale => 6,
            ColorInput::CombinedAlpha => 7,
            ColorInput::Texel0Alpha => 8,
            ColorInput::Texel1Alpha => 9,
            ColorInput::PrimitiveAlpha => 10,
            ColorInput::ShadeAlpha => 11,
            ColorInput::EnvironmentAlpha => 12,
            ColorInput::LodFraction => 13,
            ColorInput::PrimLodFraction => 14,
            ColorInput::K5 => 15,
            other => color_shared(other).unwrap_or(31),
        }
    }
    fn color_d(i: ColorInput) -> u64 {
        match i {
            ColorInput::One => 6,
            other => color_shared(other).unwrap_or(7),
        }
    }
    fn color_shared(i: ColorInput) -> Option<u64> {
        COLOR_SHARED.iter().position(|&c| c == i).map(|p| p as u64)
    }
    fn alpha_abd(i: AlphaInput) -> u64 {
        match i {
            AlphaInput::One => 6,
            other => ALPHA_SHARED.iter().position(|&a| a == other).map_or(7, |p| p as u64),
        }
    }
    fn alpha_c(i: AlphaInput) -> u64 {
        match i {
            AlphaInput::LodFraction => 0,
            AlphaInput::PrimLodFraction => 6,
            AlphaInput::Combined | AlphaInput::One | AlphaInput::Zero => 7,
            other => ALPHA_SHARED.iter().position(|&a| a == other).map_or(7, |p| p as u64),
        }
    }

    let [c0, c1] = cycles;
    (color_a(c0.color.a) << 52)
        | (color_c(c0.color.c) << 47)
        | (alpha_abd(c0.alpha.a) << 44)
        | (alpha_c(c0.alpha.c) << 41)
        | (color_a(c1.color.a) << 37)
        | (color_c(c1.color.c) << 32)
        | (color_b(c0.color.b) << 28)
        | (color_b(c1.color.b) << 24)
        | (alpha_abd(c1.alpha.a) << 21)
        | (alpha_c(c1.alpha.c) << 18)
        | (color_d(c0.color.d) << 15)
        | (alpha_abd(c0.alpha.b) << 12)
        | (alpha_abd(c0.alpha.d) << 9)
        | (color_d(c1.color.d) << 6)
        | (alpha_abd(c1.alpha.b) << 3)
        | alpha_abd(c1.alpha.d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_table_encodings_read_as_zero() {
        for raw in 8..16 {
            assert_eq!(ColorInput::decode_a(raw), ColorInput::Zero);
            assert_eq!(ColorInput::decode_b(raw), ColorInput::Zero);
        }
        for raw in 16..32 {
            assert_eq!(ColorInput::decode_c(raw), ColorInput::Zero);
        }
        assert_eq!(ColorInput::decode_d(7), ColorInput::Zero);
        assert_eq!(AlphaInput::decode_abd(7), AlphaInput::Zero);
        assert_eq!(AlphaInput::decode_c(7), AlphaInput::Zero);
    }

    #[test]
    fn test_alpha_c_slot_has_its_own_table() {
        assert_eq!(AlphaInput::decode_c(0), AlphaInput::LodFraction);
        assert_eq!(AlphaInput::decode_abd(0), AlphaInput::Combined);
        assert_eq!(AlphaInput::decode_c(6), AlphaInput::PrimLodFraction);
    }

    #[test]
    fn test_encode_then_decode_preserves_cycles() {
        let cycles = [
            CombineCycle {
                color: Equation::new(
                    ColorInput::Texel0,
                    ColorInput::K4,
                    ColorInput::LodFraction,
                    ColorInput::One,
                ),
                alpha: Equation::new(
                    AlphaInput::Primitive,
                    AlphaInput::Shade,
                    AlphaInput::PrimLodFraction,
                    AlphaInput::Environment,
                ),
            },
            CombineCycle::combined(),
        ];
        assert_eq!(decode_combine(encode_combine(&cycles)), cycles);
    }

    #[test]
    fn test_zero_multiplier_drops_product() {
        let eq = Equation::new(
            ColorInput::Texel0,
            ColorInput::Primitive,
            ColorInput::Zero,
            ColorInput::Shade,
        );
        assert_eq!(eq.normalized(true), Equation::passthrough(ColorInput::Shade));
    }

    #[test]
    fn test_equal_subtrahends_drop_product() {
        let eq = Equation::new(
            ColorInput::Environment,
            ColorInput::Environment,
            ColorInput::Texel1,
            ColorInput::Zero,
        );
        let n = eq.normalized(false);
        assert!(!n.has_product());
        assert!(!n.reads(|i| i.reads_texel(1)));
    }

    #[test]
    fn test_first_cycle_combined_reads_zero() {
        let eq = Equation::new(
            ColorInput::Combined,
            ColorInput::Zero,
            ColorInput::Shade,
            ColorInput::Combined,
        );
        assert_eq!(eq.normalized(true), Equation::passthrough(ColorInput::Zero));
        assert_eq!(eq.normalized(false), eq);
    }
}
