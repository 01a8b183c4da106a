//! Key Builder Tests
//!
//! Tests for:
//! - Equivalent register states collapsing to one key
//! - Settings and device capabilities folding into the key
//! - Rejected register combinations

use rdpshade::core::{
    AlphaCompare, ColorInput, CombineCycle, ConfigurationError, CycleCount, DeviceCaps, Equation,
    GeometryMode, KeyBuilder, MipmapVariant, RdpRegisters, RenderClass, ShaderCacheSettings,
    TextureFilter, encode_combine,
};
use rdpshade::core::registers::{ALPHA_CVG_SEL, MDSFT_CYCLETYPE, MDSFT_TEXTFILT, MDSFT_TEXTLOD};

const BILINEAR: u32 = 2 << MDSFT_TEXTFILT;
const TWO_CYCLE: u32 = 1 << MDSFT_CYCLETYPE;
const FILL: u32 = 3 << MDSFT_CYCLETYPE;

fn regs(cycles: [CombineCycle; 2], other_mode_h: u32) -> RdpRegisters {
    RdpRegisters {
        combine: encode_combine(&cycles),
        other_mode_h,
        ..RdpRegisters::default()
    }
}

fn lod_cycle() -> CombineCycle {
    CombineCycle {
        color: Equation::new(
            ColorInput::Texel0,
            ColorInput::Texel1,
            ColorInput::LodFraction,
            ColorInput::Texel1,
        ),
        ..CombineCycle::modulate()
    }
}

// ============================================================================
// Equivalence
// ============================================================================

#[test]
fn one_cycle_ignores_second_cycle_selectors() {
    let builder = KeyBuilder::default();
    let a = builder
        .build(&regs([CombineCycle::modulate(), CombineCycle::combined()], BILINEAR))
        .unwrap();
    let b = builder
        .build(&regs([CombineCycle::modulate(), CombineCycle::shade()], BILINEAR))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn two_cycle_keeps_second_cycle_selectors() {
    let builder = KeyBuilder::default();
    let a = builder
        .build(&regs([CombineCycle::modulate(), CombineCycle::combined()], BILINEAR | TWO_CYCLE))
        .unwrap();
    let b = builder
        .build(&regs([CombineCycle::modulate(), CombineCycle::shade()], BILINEAR | TWO_CYCLE))
        .unwrap();
    assert_ne!(a, b);
    assert_eq!(a.cycles(), CycleCount::Two);
}

#[test]
fn two_cycle_drops_first_cycle_unread_by_second() {
    let builder = KeyBuilder::default();
    let a = builder
        .build(&regs([CombineCycle::modulate(), CombineCycle::shade()], BILINEAR | TWO_CYCLE))
        .unwrap();
    let b = builder
        .build(&regs([CombineCycle::shade(), CombineCycle::shade()], BILINEAR | TWO_CYCLE))
        .unwrap();
    assert_eq!(a, b);
    assert!(!a.samples_any_texture());
    assert_eq!(a.filter(), TextureFilter::Point);
}

#[test]
fn two_cycle_drops_only_the_unread_channel() {
    let builder = KeyBuilder::default();
    let color_only = CombineCycle {
        color: Equation::passthrough(ColorInput::Combined),
        ..CombineCycle::shade()
    };
    let texel_alpha = builder
        .build(&regs([CombineCycle::modulate(), color_only], BILINEAR | TWO_CYCLE))
        .unwrap();
    let shade_alpha = CombineCycle {
        alpha: CombineCycle::shade().alpha,
        ..CombineCycle::modulate()
    };
    let plain_alpha = builder
        .build(&regs([shade_alpha, color_only], BILINEAR | TWO_CYCLE))
        .unwrap();
    assert_eq!(texel_alpha, plain_alpha);
    assert!(texel_alpha.samples_texture(0));
}

#[test]
fn unreadable_memory_alpha_blends_like_one() {
    let builder = KeyBuilder::default();
    let mut memory = regs([CombineCycle::modulate(), CombineCycle::combined()], BILINEAR);
    memory.other_mode_l = 1 << 18;
    let mut one = memory;
    one.other_mode_l = 2 << 18;
    let mut inverse = memory;
    inverse.other_mode_l = 0;

    let memory = builder.build(&memory).unwrap();
    assert_eq!(memory, builder.build(&one).unwrap());
    assert_ne!(memory, builder.build(&inverse).unwrap());
}

#[test]
fn fill_mode_ignores_combiner_and_filter() {
    let builder = KeyBuilder::default();
    let a = builder
        .build(&regs([CombineCycle::modulate(), CombineCycle::combined()], FILL))
        .unwrap();
    let b = builder
        .build(&regs([lod_cycle(), CombineCycle::shade()], FILL | BILINEAR))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.render_class(), RenderClass::FastPath);
}

#[test]
fn unread_texture_state_does_not_split_keys() {
    let builder = KeyBuilder::default();
    let shade_only = [CombineCycle::shade(), CombineCycle::combined()];
    let point = builder.build(&regs(shade_only, 0)).unwrap();
    let bilinear = builder.build(&regs(shade_only, BILINEAR | (1 << MDSFT_TEXTLOD))).unwrap();
    assert_eq!(point, bilinear);
    assert!(!point.samples_any_texture());
}

#[test]
fn lights_without_lighting_mode_are_ignored() {
    let builder = KeyBuilder::default();
    let mut unlit = regs([CombineCycle::modulate(), CombineCycle::combined()], BILINEAR);
    unlit.num_lights = 4;
    let mut baseline = unlit;
    baseline.num_lights = 0;
    assert_eq!(builder.build(&unlit).unwrap(), builder.build(&baseline).unwrap());

    unlit.geometry_mode = GeometryMode::LIGHTING;
    assert_eq!(builder.build(&unlit).unwrap().light_count(), 4);
}

// ============================================================================
// Settings & Capabilities
// ============================================================================

#[test]
fn three_point_setting_changes_bilinear_only() {
    let settings = ShaderCacheSettings {
        three_point_filter: true,
        ..ShaderCacheSettings::default()
    };
    let builder = KeyBuilder::new(settings, DeviceCaps::default());
    let cycles = [CombineCycle::modulate(), CombineCycle::combined()];
    assert_eq!(builder.build(&regs(cycles, BILINEAR)).unwrap().filter(), TextureFilter::ThreePoint);
    assert_eq!(builder.build(&regs(cycles, 0)).unwrap().filter(), TextureFilter::Point);
}

#[test]
fn hardware_lighting_off_drops_lights() {
    let settings = ShaderCacheSettings {
        hardware_lighting: false,
        ..ShaderCacheSettings::default()
    };
    let mut r = regs([CombineCycle::modulate(), CombineCycle::combined()], BILINEAR);
    r.geometry_mode = GeometryMode::LIGHTING;
    r.num_lights = 2;
    let key = KeyBuilder::new(settings, DeviceCaps::default()).build(&r).unwrap();
    assert_eq!(key.light_count(), 0);
}

#[test]
fn missing_lod_extensions_select_fake_mipmap() {
    let r = regs([lod_cycle(), CombineCycle::combined()], 1 << MDSFT_TEXTLOD);
    let full = KeyBuilder::default().build(&r).unwrap();
    assert_eq!(full.mipmap_variant(), Some(MipmapVariant::Full));

    let caps = DeviceCaps {
        standard_derivatives: false,
        shader_texture_lod: true,
    };
    let fake = KeyBuilder::new(ShaderCacheSettings::default(), caps).build(&r).unwrap();
    assert_eq!(fake.mipmap_variant(), Some(MipmapVariant::Fake));
    assert_ne!(full, fake);
}

#[test]
fn lod_setting_off_selects_fake_mipmap() {
    let settings = ShaderCacheSettings {
        enable_lod: false,
        ..ShaderCacheSettings::default()
    };
    let r = regs([lod_cycle(), CombineCycle::combined()], 1 << MDSFT_TEXTLOD);
    let key = KeyBuilder::new(settings, DeviceCaps::default()).build(&r).unwrap();
    assert_eq!(key.mipmap_variant(), Some(MipmapVariant::Fake));
}

// ============================================================================
// Alpha Compare
// ============================================================================

#[test]
fn alpha_compare_modes() {
    let builder = KeyBuilder::default();
    let mut r = regs([CombineCycle::modulate(), CombineCycle::combined()], BILINEAR);

    r.other_mode_l = 1;
    assert_eq!(builder.build(&r).unwrap().alpha_compare(), AlphaCompare::Threshold);
    r.other_mode_l = 3;
    assert_eq!(builder.build(&r).unwrap().alpha_compare(), AlphaCompare::Dither);
    r.other_mode_l = ALPHA_CVG_SEL;
    assert_eq!(builder.build(&r).unwrap().alpha_compare(), AlphaCompare::Coverage);
    r.other_mode_l = 2;
    assert_eq!(builder.build(&r), Err(ConfigurationError::ReservedAlphaCompare(2)));
}

#[test]
fn too_many_lights_is_rejected() {
    let mut r = regs([CombineCycle::modulate(), CombineCycle::combined()], BILINEAR);
    r.geometry_mode = GeometryMode::LIGHTING;
    r.num_lights = rdpshade::MAX_LIGHTS + 1;
    assert!(matches!(
        KeyBuilder::default().build(&r),
        Err(ConfigurationError::TooManyLights { .. })
    ));
}
