//! Settings Tests
//!
//! Tests for:
//! - Core options and JSON feeding the builder and cache
//! - Toggles that change generated source

use rdpshade::core::registers::MDSFT_TEXTFILT;
use rdpshade::core::{CombineCycle, ColorInput, Equation, GeometryMode, encode_combine};
use rdpshade::{
    DeviceCaps, HeadlessBackend, KeyBuilder, ProgramCache, RdpRegisters, ShaderCacheSettings,
    TextureFilter, assemble_program,
};

fn bilinear_regs() -> RdpRegisters {
    RdpRegisters {
        combine: encode_combine(&[CombineCycle::modulate(), CombineCycle::combined()]),
        other_mode_h: 2 << MDSFT_TEXTFILT,
        ..RdpRegisters::default()
    }
}

#[test]
fn core_options_drive_key_and_cache() {
    let settings = ShaderCacheSettings::from_core_options([
        ("rdpshade-cache-capacity", "2"),
        ("rdpshade-texture-filter", "3point"),
        ("rdpshade-hw-lighting", "disabled"),
    ]);
    let builder = KeyBuilder::new(settings.clone(), DeviceCaps::default());

    let mut regs = bilinear_regs();
    regs.geometry_mode = GeometryMode::LIGHTING;
    regs.num_lights = 3;
    let key = builder.build(&regs).unwrap();
    assert_eq!(key.filter(), TextureFilter::ThreePoint);
    assert_eq!(key.light_count(), 0);

    let cache = ProgramCache::with_settings(HeadlessBackend::new(), &settings);
    assert_eq!(cache.capacity(), 2);
}

#[test]
fn json_settings_round_into_builder() {
    let settings = ShaderCacheSettings::from_json(r#"{ "toonify": true, "enable_noise": false }"#)
        .unwrap();
    let key = KeyBuilder::new(settings, DeviceCaps::default())
        .build(&bilinear_regs())
        .unwrap();
    assert!(key.toonify());
    assert!(!key.noise());
    assert!(assemble_program(&key).unwrap().fragment.contains("toonify("));
}

#[test]
fn three_point_filter_changes_texture_read() {
    let standard = KeyBuilder::default().build(&bilinear_regs()).unwrap();
    let three = KeyBuilder::new(
        ShaderCacheSettings {
            three_point_filter: true,
            ..ShaderCacheSettings::default()
        },
        DeviceCaps::default(),
    )
    .build(&bilinear_regs())
    .unwrap();

    let standard = assemble_program(&standard).unwrap().fragment;
    let three = assemble_program(&three).unwrap().fragment;
    assert!(three.contains("filter3point"));
    assert!(!standard.contains("filter3point"));
}

#[test]
fn noise_setting_controls_noise_input() {
    let mut regs = bilinear_regs();
    let noisy = CombineCycle {
        color: Equation::new(
            ColorInput::Noise,
            ColorInput::Zero,
            ColorInput::Shade,
            ColorInput::Zero,
        ),
        ..CombineCycle::modulate()
    };
    regs.combine = encode_combine(&[noisy, CombineCycle::combined()]);

    let enabled = KeyBuilder::default().build(&regs).unwrap();
    assert!(enabled.noise());
    assert!(assemble_program(&enabled).unwrap().fragment.contains("snoise()"));

    let disabled = KeyBuilder::new(
        ShaderCacheSettings::from_core_options([("rdpshade-noise", "off")]),
        DeviceCaps::default(),
    )
    .build(&regs)
    .unwrap();
    assert!(!disabled.noise());
    assert_ne!(enabled, disabled);
}
