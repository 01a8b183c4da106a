//! RDP Register Snapshot
//!
//! The subset of RDP/RSP state that influences generated shader source,
//! captured per draw call by the command-stream interpreter.
//!
//! Field layouts follow the `SetOtherMode` / `GeometryMode` words:
//!
//! | Word            | Bits  | Meaning                      |
//! |-----------------|-------|------------------------------|
//! | `other_mode_h`  | 21:20 | cycle type                   |
//! |                 | 19    | texture perspective          |
//! |                 | 18:17 | texture detail               |
//! |                 | 16    | texture LOD                  |
//! |                 | 13:12 | texture filter               |
//! | `other_mode_l`  | 31:16 | blender mux (see `blender`)  |
//! |                 | 14    | force blend                  |
//! |                 | 13    | alpha_cvg_sel                |
//! |                 | 1:0   | alpha compare                |

use bitflags::bitflags;

use crate::blender::BlendMux;
use crate::combiner::{CombineCycle, decode_combine};

pub const MDSFT_CYCLETYPE: u32 = 20;
pub const MDSFT_TEXTPERSP: u32 = 19;
pub const MDSFT_TEXTDETAIL: u32 = 17;
pub const MDSFT_TEXTLOD: u32 = 16;
pub const MDSFT_TEXTFILT: u32 = 12;

pub const AC_NONE: u32 = 0;
pub const AC_THRESHOLD: u32 = 1;
pub const AC_DITHER: u32 = 3;

pub const ALPHA_CVG_SEL: u32 = 0x2000;
pub const FORCE_BL: u32 = 0x4000;

bitflags! {
    /// RSP geometry mode bits that reach the pixel pipeline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GeometryMode: u32 {
        const FOG      = 0x0001_0000;
        const LIGHTING = 0x0002_0000;
    }
}

/// Raw `SetOtherMode` cycle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleType {
    One,
    Two,
    Copy,
    Fill,
}

impl CycleType {
    #[must_use]
    pub fn from_other_mode_h(other_mode_h: u32) -> Self {
        match (other_mode_h >> MDSFT_CYCLETYPE) & 3 {
            0 => Self::One,
            1 => Self::Two,
            2 => Self::Copy,
            _ => Self::Fill,
        }
    }

    /// Copy and fill bypass the combiner and blender entirely.
    #[must_use]
    pub fn is_fast_path(self) -> bool {
        matches!(self, Self::Copy | Self::Fill)
    }
}

/// How a framebuffer-sourced texture is reduced to a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Monochrome {
    #[default]
    Off,
    /// Broadcast the red channel.
    Red,
    /// Rec.709 luminance.
    Luminance,
}

/// Per-unit state supplied by the texture cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureUnitState {
    pub monochrome: Monochrome,
    /// The texture was copied out of a framebuffer without alpha.
    pub fixed_alpha: bool,
}

/// Register state relevant to shader generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RdpRegisters {
    /// `SetCombine` mux word.
    pub combine: u64,
    pub other_mode_h: u32,
    pub other_mode_l: u32,
    pub geometry_mode: GeometryMode,
    /// Light count from the last `MoveWord NUMLIGHT`.
    pub num_lights: u8,
    pub texture_units: [TextureUnitState; 2],
}

impl RdpRegisters {
    #[must_use]
    pub fn cycle_type(&self) -> CycleType {
        CycleType::from_other_mode_h(self.other_mode_h)
    }

    #[must_use]
    pub fn combiner(&self) -> [CombineCycle; 2] {
        decode_combine(self.combine)
    }

    #[must_use]
    pub fn blender(&self) -> [BlendMux; 2] {
        BlendMux::decode(self.other_mode_l)
    }

    #[must_use]
    pub fn texture_perspective(&self) -> bool {
        (self.other_mode_h >> MDSFT_TEXTPERSP) & 1 != 0
    }

    /// Two-bit detail field: bit 0 sharpen, bit 1 detail.
    #[must_use]
    pub fn texture_detail_bits(&self) -> u32 {
        (self.other_mode_h >> MDSFT_TEXTDETAIL) & 3
    }

    #[must_use]
    pub fn texture_lod(&self) -> bool {
        (self.other_mode_h >> MDSFT_TEXTLOD) & 1 != 0
    }

    /// Bilinear filtering is selected by the high filter bit; `AVERAGE`
    /// (both bits) filters like `BILERP`.
    #[must_use]
    pub fn texture_bilinear(&self) -> bool {
        (self.other_mode_h >> MDSFT_TEXTFILT) & 2 != 0
    }

    #[must_use]
    pub fn alpha_compare_bits(&self) -> u32 {
        self.other_mode_l & 3
    }

    #[must_use]
    pub fn alpha_cvg_sel(&self) -> bool {
        self.other_mode_l & ALPHA_CVG_SEL != 0
    }

    /// Per-cycle blender enables for the `uForceBlendCycleN` uniforms. The
    /// second blender cycle only runs in two-cycle mode.
    #[must_use]
    pub fn force_blend_cycles(&self) -> [bool; 2] {
        let force = self.other_mode_l & FORCE_BL != 0;
        [force, force && self.cycle_type() == CycleType::Two]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_type_decode() {
        assert_eq!(CycleType::from_other_mode_h(0), CycleType::One);
        assert_eq!(CycleType::from_other_mode_h(1 << 20), CycleType::Two);
        assert_eq!(CycleType::from_other_mode_h(2 << 20), CycleType::Copy);
        assert_eq!(CycleType::from_other_mode_h(3 << 20), CycleType::Fill);
        assert!(CycleType::Fill.is_fast_path());
        assert!(!CycleType::Two.is_fast_path());
    }

    #[test]
    fn test_force_blend_cycles() {
        let mut regs = RdpRegisters {
            other_mode_l: FORCE_BL,
            ..RdpRegisters::default()
        };
        assert_eq!(regs.force_blend_cycles(), [true, false]);
        regs.other_mode_h = 1 << MDSFT_CYCLETYPE;
        assert_eq!(regs.force_blend_cycles(), [true, true]);
        regs.other_mode_l = 0;
        assert_eq!(regs.force_blend_cycles(), [false, false]);
    }

    #[test]
    fn test_filter_bits() {
        let mut regs = RdpRegisters::default();
        assert!(!regs.texture_bilinear());
        regs.other_mode_h = 0x2000;
        assert!(regs.texture_bilinear());
        regs.other_mode_h = 0x3000;
        assert!(regs.texture_bilinear());
        regs.other_mode_h = 0x1000;
        assert!(!regs.texture_bilinear());
    }
}
