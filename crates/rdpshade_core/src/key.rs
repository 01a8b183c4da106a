//! Shader State Key
//!
//! [`ShaderStateKey`] is the canonical fingerprint of everything that changes
//! generated shader source. Two keys compare equal exactly when the
//! assemblers would produce byte-identical programs for them, so the key is
//! also the program cache's map key.
//!
//! Keys are only constructed through [`ShaderStateKey::new`], which
//! normalizes a loose [`KeyDesc`]: fields that cannot influence the source
//! for the given configuration collapse to fixed defaults.
//!
//! | Field            | Collapses when                                      |
//! |------------------|-----------------------------------------------------|
//! | combiner/blender | fast path; cycle 1 in one-cycle mode                |
//! | `lod`            | LOD fraction unused, or fake mipmap selected        |
//! | `derivatives`    | LOD fraction unused                                 |
//! | `filter`         | no texture read outside the mipmap helper           |
//! | `textures[n]`    | unit `n` not sampled by the texture-read helper     |
//! | `noise`          | no noise selector and no dither alpha compare       |
//! | lights, toonify, perspective | fast path                               |

use std::hash::BuildHasher;

use crate::blender::BlendMux;
use crate::combiner::CombineCycle;
use crate::errors::{ConfigurationError, Result};
use crate::registers::TextureUnitState;

/// Maximum number of directional lights the light helper evaluates.
pub const MAX_LIGHTS: u8 = 8;

// ─── Key Fields ──────────────────────────────────────────────────────────────

/// Render-state class: selects the vertex path and the fragment declaration
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderClass {
    /// One- or two-cycle rendering through the combiner and blender.
    #[default]
    Normal,
    /// Copy/fill rendering: shade color only, no texturing.
    FastPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CycleCount {
    #[default]
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    /// Nearest texel, snapped to the texel center.
    #[default]
    Point,
    Bilinear,
    /// N64 3-point filter.
    ThreePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaCompare {
    #[default]
    None,
    /// Discard below the blend color alpha.
    Threshold,
    /// Discard zero-coverage fragments (`alpha_cvg_sel`).
    Coverage,
    /// Discard against per-pixel noise.
    Dither,
}

/// Texture detail mode from `other_mode_h` bits 17–18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDetail {
    /// Clamp: tile 0 when magnifying, last tile when distant.
    #[default]
    Sharp = 0,
    /// Sharpen: blend fraction inverted when magnifying.
    Inverted = 1,
    /// Detail texture: reads are taken from neighboring LOD tiles.
    Detail = 2,
    /// Sharpen and detail combined.
    BlendNeighbors = 3,
}

impl TextureDetail {
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => Self::Sharp,
            1 => Self::Inverted,
            2 => Self::Detail,
            _ => Self::BlendNeighbors,
        }
    }

    #[inline]
    #[must_use]
    pub fn inverts_on_magnify(self) -> bool {
        matches!(self, Self::Inverted | Self::BlendNeighbors)
    }

    #[inline]
    #[must_use]
    pub fn reads_neighbor_tiles(self) -> bool {
        matches!(self, Self::Detail | Self::BlendNeighbors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LodState {
    /// Texture LOD enabled in `other_mode_h`.
    pub enabled: bool,
    pub detail: TextureDetail,
}

/// Which mipmap helper the fragment shader carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipmapVariant {
    /// Derivative-driven LOD chain with explicit-LOD sampling.
    Full,
    /// Constant fraction from max tile / min LOD.
    Fake,
}

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// Un-normalized description of a shader configuration.
///
/// Built by [`KeyBuilder`](crate::KeyBuilder) from registers, or directly by
/// tooling and tests. Pass it to [`ShaderStateKey::new`] to obtain a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyDesc {
    pub render_class: RenderClass,
    pub cycles: CycleCount,
    pub combiner: [CombineCycle; 2],
    pub blender: [BlendMux; 2],
    pub filter: TextureFilter,
    pub fog: bool,
    pub alpha_compare: AlphaCompare,
    pub light_count: u8,
    pub perspective: bool,
    pub lod: LodState,
    /// The context can run the full LOD chain and LOD emulation is on.
    pub derivatives: bool,
    pub textures: [TextureUnitState; 2],
    /// Noise emulation is enabled. The key only keeps it when something
    /// actually reads noise.
    pub noise: bool,
    pub toonify: bool,
}

impl Default for KeyDesc {
    fn default() -> Self {
        Self {
            render_class: RenderClass::Normal,
            cycles: CycleCount::One,
            combiner: [CombineCycle::modulate(), CombineCycle::combined()],
            blender: [BlendMux::default(); 2],
            filter: TextureFilter::Bilinear,
            fog: false,
            alpha_compare: AlphaCompare::None,
            light_count: 0,
            perspective: true,
            lod: LodState::default(),
            derivatives: true,
            textures: [TextureUnitState::default(); 2],
            noise: true,
            toonify: false,
        }
    }
}

// ─── Key ─────────────────────────────────────────────────────────────────────

/// Canonical configuration key. See the module docs for normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderStateKey {
    render_class: RenderClass,
    cycles: CycleCount,
    combiner: [CombineCycle; 2],
    blender: [BlendMux; 2],
    filter: TextureFilter,
    fog: bool,
    alpha_compare: AlphaCompare,
    light_count: u8,
    perspective: bool,
    lod: LodState,
    derivatives: bool,
    textures: [TextureUnitState; 2],
    noise: bool,
    toonify: bool,
}

impl ShaderStateKey {
    /// Normalizes a descriptor into a key.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::TooManyLights`] if `light_count` exceeds
    /// [`MAX_LIGHTS`].
    pub fn new(desc: KeyDesc) -> Result<Self> {
        if desc.light_count > MAX_LIGHTS {
            return Err(ConfigurationError::TooManyLights {
                count: desc.light_count,
                max: MAX_LIGHTS,
            });
        }

        if desc.render_class == RenderClass::FastPath {
            return Ok(Self::fast_path(desc));
        }

        let mut key = Self {
            render_class: RenderClass::Normal,
            cycles: desc.cycles,
            combiner: desc.combiner,
            blender: desc.blender,
            filter: desc.filter,
            fog: desc.fog,
            alpha_compare: desc.alpha_compare,
            light_count: desc.light_count,
            perspective: desc.perspective,
            lod: desc.lod,
            derivatives: desc.derivatives,
            textures: desc.textures,
            noise: false,
            toonify: desc.toonify,
        };

        if key.cycles == CycleCount::One {
            key.combiner[1] = CombineCycle::combined();
            key.blender[1] = BlendMux::default();
        }
        key.combiner[1] = key.combiner[1].normalized(false);
        key.combiner[0] = key.combiner[0].normalized(true).pruned_for(&key.combiner[1]);
        key.blender = key.blender.map(BlendMux::normalized);

        let mipmap = key.uses_lod_fraction();
        if !mipmap {
            key.derivatives = false;
        }
        if !key.derivatives {
            key.lod = LodState::default();
        }

        let read_tex = key.uses_read_tex();
        for unit in 0..2 {
            if !read_tex || !key.samples_texture(unit) {
                key.textures[unit] = TextureUnitState::default();
            }
        }
        if !read_tex {
            key.filter = TextureFilter::Point;
        }

        key.noise = desc.noise && (key.reads_noise_selector() || key.alpha_compare == AlphaCompare::Dither);
        Ok(key)
    }

    fn fast_path(desc: KeyDesc) -> Self {
        Self {
            render_class: RenderClass::FastPath,
            cycles: CycleCount::One,
            combiner: [CombineCycle::shade(), CombineCycle::combined()],
            blender: [BlendMux::default(); 2],
            filter: TextureFilter::Point,
            fog: desc.fog,
            alpha_compare: desc.alpha_compare,
            light_count: 0,
            perspective: false,
            lod: LodState::default(),
            derivatives: false,
            textures: [TextureUnitState::default(); 2],
            noise: desc.noise && desc.alpha_compare == AlphaCompare::Dither,
            toonify: false,
        }
    }

    /// The descriptor this key normalizes to itself from.
    #[must_use]
    pub fn desc(&self) -> KeyDesc {
        KeyDesc {
            render_class: self.render_class,
            cycles: self.cycles,
            combiner: self.combiner,
            blender: self.blender,
            filter: self.filter,
            fog: self.fog,
            alpha_compare: self.alpha_compare,
            light_count: self.light_count,
            perspective: self.perspective,
            lod: self.lod,
            derivatives: self.derivatives,
            textures: self.textures,
            noise: self.noise,
            toonify: self.toonify,
        }
    }

    /// A stable-per-process 64-bit hash, used to tag log lines.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        rustc_hash::FxBuildHasher.hash_one(self)
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn render_class(&self) -> RenderClass {
        self.render_class
    }

    #[inline]
    #[must_use]
    pub fn is_fast_path(&self) -> bool {
        self.render_class == RenderClass::FastPath
    }

    #[inline]
    #[must_use]
    pub fn cycles(&self) -> CycleCount {
        self.cycles
    }

    #[inline]
    #[must_use]
    pub fn combiner(&self) -> &[CombineCycle; 2] {
        &self.combiner
    }

    #[inline]
    #[must_use]
    pub fn blender(&self) -> &[BlendMux; 2] {
        &self.blender
    }

    #[inline]
    #[must_use]
    pub fn filter(&self) -> TextureFilter {
        self.filter
    }

    #[inline]
    #[must_use]
    pub fn fog(&self) -> bool {
        self.fog
    }

    #[inline]
    #[must_use]
    pub fn alpha_compare(&self) -> AlphaCompare {
        self.alpha_compare
    }

    #[inline]
    #[must_use]
    pub fn light_count(&self) -> u8 {
        self.light_count
    }

    #[inline]
    #[must_use]
    pub fn perspective(&self) -> bool {
        self.perspective
    }

    #[inline]
    #[must_use]
    pub fn lod(&self) -> LodState {
        self.lod
    }

    #[inline]
    #[must_use]
    pub fn derivatives(&self) -> bool {
        self.derivatives
    }

    #[inline]
    #[must_use]
    pub fn texture(&self, unit: usize) -> TextureUnitState {
        self.textures[unit]
    }

    #[inline]
    #[must_use]
    pub fn noise(&self) -> bool {
        self.noise
    }

    #[inline]
    #[must_use]
    pub fn toonify(&self) -> bool {
        self.toonify
    }

    // ─── Derived Queries ─────────────────────────────────────────────────────

    /// Active combiner cycles: one entry in one-cycle mode, two otherwise.
    #[must_use]
    pub fn active_cycles(&self) -> &[CombineCycle] {
        match self.cycles {
            CycleCount::One => &self.combiner[..1],
            CycleCount::Two => &self.combiner[..],
        }
    }

    /// Some active selector reads texture unit `unit`.
    #[must_use]
    pub fn samples_texture(&self, unit: usize) -> bool {
        !self.is_fast_path() && self.active_cycles().iter().any(|c| c.reads_texel(unit))
    }

    #[must_use]
    pub fn samples_any_texture(&self) -> bool {
        self.samples_texture(0) || self.samples_texture(1)
    }

    /// Some active selector reads the LOD fraction, so the mipmap helper is
    /// emitted.
    #[must_use]
    pub fn uses_lod_fraction(&self) -> bool {
        !self.is_fast_path() && self.active_cycles().iter().any(CombineCycle::reads_lod_fraction)
    }

    /// Textures are read through the texture-read helper rather than the
    /// mipmap helper.
    #[must_use]
    pub fn uses_read_tex(&self) -> bool {
        self.samples_any_texture() && !self.uses_lod_fraction()
    }

    #[must_use]
    pub fn mipmap_variant(&self) -> Option<MipmapVariant> {
        if !self.uses_lod_fraction() {
            return None;
        }
        Some(if self.derivatives {
            MipmapVariant::Full
        } else {
            MipmapVariant::Fake
        })
    }

    fn reads_noise_selector(&self) -> bool {
        self.active_cycles().iter().any(CombineCycle::reads_noise)
    }
}
