//! Source Fragment Library
//!
//! The fragment shader is composed from a fixed table of [`SourceFragment`]s.
//! Each fragment names the template that renders it, the category that fixes
//! its position in the output, and the [`Capability`] a key must have for
//! the fragment to be included.
//!
//! Helper fragments carry their [`Helper`], which supplies both the forward
//! declaration and the call sites in `main()`. A helper is therefore either
//! fully present (prototype, body, calls) or fully absent.

use bitflags::bitflags;
use smallvec::SmallVec;

use rdpshade_core::{CycleCount, MipmapVariant, ShaderStateKey, TextureFilter};

bitflags! {
    /// Features a key enables, used to select library fragments.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capability: u32 {
        const TEXTURED        = 1 << 0;
        const PLAIN           = 1 << 1;
        const TWO_CYCLE       = 1 << 2;
        const LIGHTING        = 1 << 3;
        const MIPMAP_FULL     = 1 << 4;
        const MIPMAP_FAKE     = 1 << 5;
        const NOISE           = 1 << 6;
        const NOISE_DUMMY     = 1 << 7;
        const TOONIFY         = 1 << 8;
        const READ_TEX        = 1 << 9;
        const READ_TEX_3POINT = 1 << 10;
    }
}

impl Capability {
    #[must_use]
    pub fn for_key(key: &ShaderStateKey) -> Self {
        let mut caps = if key.is_fast_path() {
            Self::PLAIN
        } else {
            Self::TEXTURED
        };

        caps.set(Self::TWO_CYCLE, key.cycles() == CycleCount::Two);
        caps.set(Self::LIGHTING, key.light_count() > 0);
        match key.mipmap_variant() {
            Some(MipmapVariant::Full) => caps |= Self::MIPMAP_FULL,
            Some(MipmapVariant::Fake) => caps |= Self::MIPMAP_FAKE,
            None => {}
        }
        caps |= if key.noise() {
            Self::NOISE
        } else {
            Self::NOISE_DUMMY
        };
        caps.set(Self::TOONIFY, key.toonify() && !key.is_fast_path());
        if key.uses_read_tex() {
            caps |= if key.filter() == TextureFilter::ThreePoint {
                Self::READ_TEX_3POINT
            } else {
                Self::READ_TEX
            };
        }
        caps
    }
}

/// Position of a fragment in the assembled source. Variants are declared in
/// output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FragmentCategory {
    Header,
    Declarations,
    BlendMux,
    /// Generated from the included helpers; no library fragment.
    ForwardDeclarations,
    Light,
    Mipmap,
    Noise,
    PostProcess,
    TextureRead,
    Main,
}

/// A function emitted by a helper fragment and called from `main()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    CalcLight,
    Mipmap,
    Noise,
    Toonify,
    ReadTex,
}

impl Helper {
    #[must_use]
    pub fn prototype(self) -> &'static str {
        match self {
            Self::CalcLight => {
                "void calc_light(in lowp float fLights, in lowp vec3 input_color, out lowp vec3 output_color)"
            }
            Self::Mipmap => "mediump float mipmap(out lowp vec4 readtex0, out lowp vec4 readtex1)",
            Self::Noise => "lowp float snoise()",
            Self::Toonify => "void toonify(in mediump float intensity)",
            Self::ReadTex => {
                "lowp vec4 readTex(in sampler2D tex, in mediump vec2 texCoord, in mediump vec2 texSize, in lowp int fbMonochrome, in lowp int fbFixedAlpha)"
            }
        }
    }
}

/// One named, immutable block of the fragment library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFragment {
    pub name: &'static str,
    pub category: FragmentCategory,
    /// Included when the key's capabilities contain all of these.
    pub requires: Capability,
    pub template: &'static str,
    pub helper: Option<Helper>,
}

const fn fragment(
    name: &'static str,
    category: FragmentCategory,
    requires: Capability,
    template: &'static str,
    helper: Option<Helper>,
) -> SourceFragment {
    SourceFragment {
        name,
        category,
        requires,
        template,
        helper,
    }
}

/// The fragment library, in output order.
pub static FRAGMENT_LIBRARY: &[SourceFragment] = &[
    fragment("header", FragmentCategory::Header, Capability::empty(), "fragment/header", None),
    fragment(
        "decls_textured",
        FragmentCategory::Declarations,
        Capability::TEXTURED,
        "fragment/decls_textured",
        None,
    ),
    fragment(
        "decls_plain",
        FragmentCategory::Declarations,
        Capability::PLAIN,
        "fragment/decls_plain",
        None,
    ),
    fragment(
        "blend_mux_cycle2",
        FragmentCategory::BlendMux,
        Capability::TWO_CYCLE,
        "fragment/blend_mux_cycle2",
        None,
    ),
    fragment(
        "calc_light",
        FragmentCategory::Light,
        Capability::LIGHTING,
        "fragment/calc_light",
        Some(Helper::CalcLight),
    ),
    fragment(
        "mipmap",
        FragmentCategory::Mipmap,
        Capability::MIPMAP_FULL,
        "fragment/mipmap",
        Some(Helper::Mipmap),
    ),
    fragment(
        "mipmap_fake",
        FragmentCategory::Mipmap,
        Capability::MIPMAP_FAKE,
        "fragment/mipmap_fake",
        Some(Helper::Mipmap),
    ),
    fragment("noise", FragmentCategory::Noise, Capability::NOISE, "fragment/noise", Some(Helper::Noise)),
    fragment(
        "noise_dummy",
        FragmentCategory::Noise,
        Capability::NOISE_DUMMY,
        "fragment/noise_dummy",
        Some(Helper::Noise),
    ),
    fragment(
        "toonify",
        FragmentCategory::PostProcess,
        Capability::TOONIFY,
        "fragment/toonify",
        Some(Helper::Toonify),
    ),
    fragment(
        "read_tex",
        FragmentCategory::TextureRead,
        Capability::READ_TEX,
        "fragment/read_tex",
        Some(Helper::ReadTex),
    ),
    fragment(
        "read_tex_3point",
        FragmentCategory::TextureRead,
        Capability::READ_TEX_3POINT,
        "fragment/read_tex_3point",
        Some(Helper::ReadTex),
    ),
    fragment("main", FragmentCategory::Main, Capability::empty(), "fragment/main", None),
];

pub type FragmentList = SmallVec<[&'static SourceFragment; 10]>;

/// Selects the library fragments for `key`, ordered by category.
#[must_use]
pub fn select_fragments(key: &ShaderStateKey) -> FragmentList {
    let caps = Capability::for_key(key);
    let mut fragments: FragmentList = FRAGMENT_LIBRARY
        .iter()
        .filter(|f| caps.contains(f.requires))
        .collect();
    fragments.sort_by_key(|f| f.category);
    fragments
}

/// Helpers provided by a fragment selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct HelperSet {
    pub calc_light: bool,
    pub mipmap: bool,
    pub noise: bool,
    pub toonify: bool,
    pub read_tex: bool,
}

impl HelperSet {
    #[must_use]
    pub fn from_fragments(fragments: &[&SourceFragment]) -> Self {
        let mut set = Self::default();
        for helper in fragments.iter().filter_map(|f| f.helper) {
            match helper {
                Helper::CalcLight => set.calc_light = true,
                Helper::Mipmap => set.mipmap = true,
                Helper::Noise => set.noise = true,
                Helper::Toonify => set.toonify = true,
                Helper::ReadTex => set.read_tex = true,
            }
        }
        set
    }
}
