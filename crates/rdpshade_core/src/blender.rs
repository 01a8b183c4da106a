//! Blender Mux
//!
//! The RDP blender computes `P * A + M * B` per cycle. The four selectors of
//! each cycle live in the upper half of the `other_mode_l` word:
//!
//! ```text
//! cycle 0: P[31:30] A[27:26] M[23:22] B[19:18]
//! cycle 1: P[29:28] A[25:24] M[21:20] B[17:16]
//! ```

/// Color source for the `P` and `M` terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendColor {
    /// Combiner output (or the first blender cycle's output).
    #[default]
    Input = 0,
    /// Framebuffer color. Not readable from the shader; evaluates to zero.
    Memory = 1,
    Blend = 2,
    Fog = 3,
}

/// Alpha source for the `A` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendAlpha {
    #[default]
    CombinedAlpha = 0,
    FogAlpha = 1,
    ShadeAlpha = 2,
    Zero = 3,
}

/// Alpha source for the `B` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendInvAlpha {
    #[default]
    OneMinusA = 0,
    MemoryAlpha = 1,
    One = 2,
    Zero = 3,
}

/// One blender cycle's selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendMux {
    pub p: BlendColor,
    pub a: BlendAlpha,
    pub m: BlendColor,
    pub b: BlendInvAlpha,
}

impl BlendMux {
    fn from_bits(p: u32, a: u32, m: u32, b: u32) -> Self {
        let color = |v: u32| match v & 3 {
            0 => BlendColor::Input,
            1 => BlendColor::Memory,
            2 => BlendColor::Blend,
            _ => BlendColor::Fog,
        };
        Self {
            p: color(p),
            a: match a & 3 {
                0 => BlendAlpha::CombinedAlpha,
                1 => BlendAlpha::FogAlpha,
                2 => BlendAlpha::ShadeAlpha,
                _ => BlendAlpha::Zero,
            },
            m: color(m),
            b: match b & 3 {
                0 => BlendInvAlpha::OneMinusA,
                1 => BlendInvAlpha::MemoryAlpha,
                2 => BlendInvAlpha::One,
                _ => BlendInvAlpha::Zero,
            },
        }
    }

    /// Decodes both cycles from an `other_mode_l` word.
    #[must_use]
    pub fn decode(other_mode_l: u32) -> [Self; 2] {
        let f = |shift: u32| (other_mode_l >> shift) & 3;
        [
            Self::from_bits(f(30), f(26), f(22), f(18)),
            Self::from_bits(f(28), f(24), f(20), f(16)),
        ]
    }

    /// Packs both cycles into the blender half of an `other_mode_l` word.
    #[must_use]
    pub fn encode(cycles: &[Self; 2]) -> u32 {
        let [c0, c1] = cycles;
        ((c0.p as u32) << 30)
            | ((c0.a as u32) << 26)
            | ((c0.m as u32) << 22)
            | ((c0.b as u32) << 18)
            | ((c1.p as u32) << 28)
            | ((c1.a as u32) << 24)
            | ((c1.m as u32) << 20)
            | ((c1.b as u32) << 16)
    }

    /// Collapses selectors that read the same mux value. The framebuffer
    /// alpha is not readable, so `MemoryAlpha` reads 1.0 like `One`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let b = match self.b {
            BlendInvAlpha::MemoryAlpha => BlendInvAlpha::One,
            other => other,
        };
        Self { b, ..self }
    }

    /// Blender selectors as `[P, A, M, B]` indices into the shader's mux
    /// tables.
    #[must_use]
    pub fn indices(&self) -> [u8; 4] {
        [self.p as u8, self.a as u8, self.m as u8, self.b as u8]
    }
}
