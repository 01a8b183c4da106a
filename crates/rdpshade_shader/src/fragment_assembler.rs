//! Fragment Assembler
//!
//! Key → fragment shader source. The selected library fragments are
//! rendered with one shared context and concatenated in category order;
//! the forward declarations of every included helper are emitted at the
//! [`FragmentCategory::ForwardDeclarations`] slot.

use std::fmt::Write as _;

use serde::Serialize;

use rdpshade_core::{AlphaCompare, CycleCount, ShaderStateKey, TextureFilter};

use crate::combiner_expr::CycleExpr;
use crate::env::render;
use crate::errors::Result;
use crate::fragment::{FragmentCategory, HelperSet, SourceFragment, select_fragments};

#[derive(Debug, Serialize)]
struct LodContext {
    enabled: bool,
    /// Sharp detail: clamp to tile 0 / last tile.
    clamp: bool,
    invert_on_magnify: bool,
    neighbor_tiles: bool,
}

#[derive(Debug, Serialize)]
struct UnitContext {
    index: usize,
    sampled: bool,
    monochrome: u8,
    fixed_alpha: u8,
}

#[derive(Debug, Serialize)]
struct BlendContext {
    p: u8,
    a: u8,
    m: u8,
    b: u8,
}

#[derive(Debug, Serialize)]
struct FragmentContext {
    helpers: HelperSet,
    two_cycle: bool,
    light_count: u8,
    lod: LodContext,
    filter: &'static str,
    units: [UnitContext; 2],
    cycles: Vec<CycleExpr>,
    blend: Vec<BlendContext>,
    alpha_compare: &'static str,
    fog: bool,
}

impl FragmentContext {
    fn new(key: &ShaderStateKey, helpers: HelperSet) -> Self {
        let lod = key.lod();
        let unit = |index: usize| {
            let state = key.texture(index);
            UnitContext {
                index,
                sampled: key.samples_texture(index),
                monochrome: state.monochrome as u8,
                fixed_alpha: u8::from(state.fixed_alpha),
            }
        };
        let active = match key.cycles() {
            CycleCount::One => 1,
            CycleCount::Two => 2,
        };

        Self {
            helpers,
            two_cycle: active == 2,
            light_count: key.light_count(),
            lod: LodContext {
                enabled: lod.enabled,
                clamp: !lod.detail.inverts_on_magnify() && !lod.detail.reads_neighbor_tiles(),
                invert_on_magnify: lod.detail.inverts_on_magnify(),
                neighbor_tiles: lod.detail.reads_neighbor_tiles(),
            },
            filter: match key.filter() {
                TextureFilter::Point => "point",
                TextureFilter::Bilinear => "bilinear",
                TextureFilter::ThreePoint => "three_point",
            },
            units: [unit(0), unit(1)],
            cycles: key.active_cycles().iter().map(CycleExpr::new).collect(),
            blend: key.blender()[..active]
                .iter()
                .map(|mux| {
                    let [p, a, m, b] = mux.indices();
                    BlendContext { p, a, m, b }
                })
                .collect(),
            alpha_compare: match key.alpha_compare() {
                AlphaCompare::None => "none",
                AlphaCompare::Threshold => "threshold",
                AlphaCompare::Coverage => "coverage",
                AlphaCompare::Dither => "dither",
            },
            fog: key.fog(),
        }
    }
}

fn forward_declarations(fragments: &[&SourceFragment]) -> String {
    let mut out = String::from("\n");
    for helper in fragments.iter().filter_map(|f| f.helper) {
        let _ = writeln!(out, "{};", helper.prototype());
    }
    out
}

/// Assembles the complete fragment shader for `key`.
///
/// Deterministic: the same key always yields the same bytes.
pub fn assemble_fragment(key: &ShaderStateKey) -> Result<String> {
    let fragments = select_fragments(key);
    log::trace!(
        "Fragments for {:016x}: {:?}",
        key.fingerprint(),
        fragments.iter().map(|f| f.name).collect::<Vec<_>>()
    );
    let ctx = FragmentContext::new(key, HelperSet::from_fragments(&fragments));

    let mut source = String::with_capacity(8 * 1024);
    let mut declared = false;
    for fragment in &fragments {
        if !declared && fragment.category > FragmentCategory::ForwardDeclarations {
            source.push_str(&forward_declarations(&fragments));
            declared = true;
        }
        source.push_str(&render(fragment.template, &ctx)?);
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdpshade_core::{ColorInput, CombineCycle, Equation, KeyDesc, Monochrome, RenderClass};

    fn key(desc: KeyDesc) -> ShaderStateKey {
        ShaderStateKey::new(desc).unwrap()
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let k = key(KeyDesc {
            light_count: 3,
            cycles: CycleCount::Two,
            ..KeyDesc::default()
        });
        assert_eq!(assemble_fragment(&k).unwrap(), assemble_fragment(&k).unwrap());
    }

    #[test]
    fn test_forward_declarations_precede_bodies() {
        let source = assemble_fragment(&key(KeyDesc {
            light_count: 1,
            ..KeyDesc::default()
        }))
        .unwrap();
        let decl = source.find("output_color);").unwrap();
        let body = source.find("output_color) {").unwrap();
        let call = source.find("calc_light(vNumLights").unwrap();
        assert!(decl < body && body < call);
    }

    #[test]
    fn test_zero_lights_omit_light_function() {
        let source = assemble_fragment(&key(KeyDesc::default())).unwrap();
        assert!(!source.contains("calc_light"));
        assert!(!source.contains("uLightDirection"));
        assert!(source.contains("input_color = vShadeColor.rgb;"));
    }

    #[test]
    fn test_light_arrays_sized_by_count() {
        let source = assemble_fragment(&key(KeyDesc {
            light_count: 5,
            ..KeyDesc::default()
        }))
        .unwrap();
        assert!(source.contains("uniform mediump vec3 uLightDirection[5];"));
        assert!(source.contains("uniform lowp vec3 uLightColor[6];"));
    }

    #[test]
    fn test_monochrome_is_baked_at_call_site() {
        let mut desc = KeyDesc::default();
        desc.textures[0].monochrome = Monochrome::Luminance;
        desc.textures[0].fixed_alpha = true;
        let source = assemble_fragment(&key(desc)).unwrap();
        assert!(source.contains("readTex(uTex0, vTexCoord0, uTextureSize[0], 2, 1);"));
        assert!(!source.contains("readtex1"));
    }

    #[test]
    fn test_fast_path_has_no_texture_access() {
        let source = assemble_fragment(&key(KeyDesc {
            render_class: RenderClass::FastPath,
            ..KeyDesc::default()
        }))
        .unwrap();
        assert!(!source.contains("sampler2D"));
        assert!(!source.contains("readtex0"));
        assert!(source.contains("color1 = clamp(input_color, 0.0, 1.0);"));
    }

    #[test]
    fn test_two_cycle_blend_block() {
        let mut desc = KeyDesc {
            cycles: CycleCount::Two,
            ..KeyDesc::default()
        };
        desc.combiner[1] = CombineCycle {
            color: Equation::new(
                ColorInput::Combined,
                ColorInput::Zero,
                ColorInput::Primitive,
                ColorInput::Zero,
            ),
            ..CombineCycle::combined()
        };
        let source = assemble_fragment(&key(desc)).unwrap();
        assert!(source.contains("uniform lowp int uForceBlendCycle2;"));
        assert!(source.contains("if (uForceBlendCycle2 != 0)"));
        assert!(source.contains("color2 = clamp(combined_color.rgb * uPrimColor.rgb, 0.0, 1.0);"));

        let one = assemble_fragment(&key(KeyDesc::default())).unwrap();
        assert!(!one.contains("uForceBlendCycle2"));
    }
}
