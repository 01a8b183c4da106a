//! State Descriptor Builder
//!
//! Turns a per-draw [`RdpRegisters`] snapshot into a [`ShaderStateKey`].
//! The builder only decodes and applies settings; all collapsing of
//! equivalent encodings happens in [`ShaderStateKey::new`].

use crate::errors::{ConfigurationError, Result};
use crate::key::{
    AlphaCompare, CycleCount, KeyDesc, LodState, RenderClass, ShaderStateKey, TextureDetail,
    TextureFilter,
};
use crate::registers::{AC_DITHER, AC_NONE, AC_THRESHOLD, CycleType, GeometryMode, RdpRegisters};
use crate::settings::{DeviceCaps, ShaderCacheSettings};

/// Builds keys for one graphics context.
///
/// Holds the settings and device capabilities that fold into every key, so
/// the per-draw call is a single `build(&regs)`.
#[derive(Debug, Clone, Default)]
pub struct KeyBuilder {
    settings: ShaderCacheSettings,
    caps: DeviceCaps,
}

impl KeyBuilder {
    #[must_use]
    pub fn new(settings: ShaderCacheSettings, caps: DeviceCaps) -> Self {
        Self { settings, caps }
    }

    #[must_use]
    pub fn settings(&self) -> &ShaderCacheSettings {
        &self.settings
    }

    #[must_use]
    pub fn caps(&self) -> DeviceCaps {
        self.caps
    }

    /// Replaces the capabilities after a context reset.
    pub fn set_caps(&mut self, caps: DeviceCaps) {
        self.caps = caps;
    }

    /// Derives the key for the current register state.
    ///
    /// Failures are logged here; the caller only needs to skip the draw.
    pub fn build(&self, regs: &RdpRegisters) -> Result<ShaderStateKey> {
        let key = self.describe(regs).and_then(ShaderStateKey::new);
        if let Err(err) = &key {
            log::error!(
                "Unrepresentable register state (omh={:#010x} oml={:#010x} lights={}): {err}",
                regs.other_mode_h,
                regs.other_mode_l,
                regs.num_lights
            );
        }
        key
    }

    /// Decodes registers into an un-normalized descriptor.
    pub fn describe(&self, regs: &RdpRegisters) -> Result<KeyDesc> {
        let cycle_type = regs.cycle_type();
        let render_class = if cycle_type.is_fast_path() {
            RenderClass::FastPath
        } else {
            RenderClass::Normal
        };
        let cycles = if cycle_type == CycleType::Two {
            CycleCount::Two
        } else {
            CycleCount::One
        };

        let alpha_compare = match regs.alpha_compare_bits() {
            AC_NONE if regs.alpha_cvg_sel() => AlphaCompare::Coverage,
            AC_NONE => AlphaCompare::None,
            AC_THRESHOLD => AlphaCompare::Threshold,
            AC_DITHER => AlphaCompare::Dither,
            reserved => return Err(ConfigurationError::ReservedAlphaCompare(reserved)),
        };

        let filter = match (regs.texture_bilinear(), self.settings.three_point_filter) {
            (true, true) => TextureFilter::ThreePoint,
            (true, false) => TextureFilter::Bilinear,
            (false, _) => TextureFilter::Point,
        };

        let lighting = regs.geometry_mode.contains(GeometryMode::LIGHTING) && self.settings.hardware_lighting;

        Ok(KeyDesc {
            render_class,
            cycles,
            combiner: regs.combiner(),
            blender: regs.blender(),
            filter,
            fog: regs.geometry_mode.contains(GeometryMode::FOG),
            alpha_compare,
            light_count: if lighting { regs.num_lights } else { 0 },
            perspective: regs.texture_perspective(),
            lod: LodState {
                enabled: regs.texture_lod(),
                detail: TextureDetail::from_bits(regs.texture_detail_bits()),
            },
            derivatives: self.settings.enable_lod && self.caps.supports_lod_chain(),
            textures: regs.texture_units,
            noise: self.settings.enable_noise,
            toonify: self.settings.toonify,
        })
    }
}

/// One-shot form of [`KeyBuilder::build`].
pub fn build_key(
    regs: &RdpRegisters,
    settings: &ShaderCacheSettings,
    caps: DeviceCaps,
) -> Result<ShaderStateKey> {
    KeyBuilder::new(settings.clone(), caps).build(regs)
}
