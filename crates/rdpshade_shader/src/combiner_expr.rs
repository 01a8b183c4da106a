//! Combiner equations as GLSL expressions.
//!
//! Each `(A - B) * C + D` equation becomes one clamped expression over the
//! locals declared at the top of the fragment `main()`:
//!
//! | Local            | Holds                                   |
//! |------------------|-----------------------------------------|
//! | `readtex0/1`     | texels from the read or mipmap helper   |
//! | `input_color`    | shade color after lighting              |
//! | `vec_color`      | `input_color` with shade alpha          |
//! | `combined_color` | first-cycle output (two-cycle only)     |
//! | `lod_frac`       | mipmap helper result                    |

use rdpshade_core::{AlphaInput, ColorInput, CombineCycle, CombinerInput, Equation};
use serde::Serialize;

/// GLSL spelling of a combiner operand.
pub trait GlslOperand: CombinerInput {
    fn glsl(self) -> &'static str;

    /// Multiplying by this operand is the identity.
    fn is_one(self) -> bool;
}

impl GlslOperand for ColorInput {
    fn glsl(self) -> &'static str {
        match self {
            Self::Combined => "combined_color.rgb",
            Self::Texel0 => "readtex0.rgb",
            Self::Texel1 => "readtex1.rgb",
            Self::Primitive => "uPrimColor.rgb",
            Self::Shade => "input_color",
            Self::Environment => "uEnvColor.rgb",
            Self::One => "vec3(1.0)",
            Self::Noise => "vec3(snoise())",
            Self::Center => "uCenterColor.rgb",
            Self::K4 => "vec3(uK4)",
            Self::Scale => "uScaleColor.rgb",
            Self::CombinedAlpha => "vec3(combined_color.a)",
            Self::Texel0Alpha => "vec3(readtex0.a)",
            Self::Texel1Alpha => "vec3(readtex1.a)",
            Self::PrimitiveAlpha => "vec3(uPrimColor.a)",
            Self::ShadeAlpha => "vec3(vec_color.a)",
            Self::EnvironmentAlpha => "vec3(uEnvColor.a)",
            Self::LodFraction => "vec3(lod_frac)",
            Self::PrimLodFraction => "vec3(uPrimLod)",
            Self::K5 => "vec3(uK5)",
            Self::Zero => "vec3(0.0)",
        }
    }

    fn is_one(self) -> bool {
        self == Self::One
    }
}

impl GlslOperand for AlphaInput {
    fn glsl(self) -> &'static str {
        match self {
            Self::Combined => "combined_color.a",
            Self::Texel0 => "readtex0.a",
            Self::Texel1 => "readtex1.a",
            Self::Primitive => "uPrimColor.a",
            Self::Shade => "vec_color.a",
            Self::Environment => "uEnvColor.a",
            Self::One => "1.0",
            Self::LodFraction => "lod_frac",
            Self::PrimLodFraction => "uPrimLod",
            Self::Zero => "0.0",
        }
    }

    fn is_one(self) -> bool {
        self == Self::One
    }
}

/// Builds the clamped expression for one equation.
///
/// Zero terms are folded away so that equivalent equations print the same.
#[must_use]
pub fn equation_expr<I: GlslOperand>(eq: &Equation<I>) -> String {
    if !eq.has_product() {
        return format!("clamp({}, 0.0, 1.0)", eq.d.glsl());
    }

    let diff = if eq.b == I::ZERO {
        eq.a.glsl().to_string()
    } else {
        format!("({} - {})", eq.a.glsl(), eq.b.glsl())
    };
    let product = if eq.c.is_one() {
        diff
    } else {
        format!("{diff} * {}", eq.c.glsl())
    };
    let sum = if eq.d == I::ZERO {
        product
    } else {
        format!("{product} + {}", eq.d.glsl())
    };
    format!("clamp({sum}, 0.0, 1.0)")
}

/// Color and alpha expressions of one cycle, as handed to `main.glsl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleExpr {
    pub color: String,
    pub alpha: String,
}

impl CycleExpr {
    #[must_use]
    pub fn new(cycle: &CombineCycle) -> Self {
        Self {
            color: equation_expr(&cycle.color),
            alpha: equation_expr(&cycle.alpha),
        }
    }
}
