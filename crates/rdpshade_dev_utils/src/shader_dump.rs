//! Shader Dump
//!
//! Prints the generated source for a set of representative register states
//! and for every utility program.
//!
//! ```text
//! cargo run -p rdpshade_dev_utils --bin shader_dump -- [settings.json] [--no-lod]
//! ```
//!
//! `settings.json` is a serialized `ShaderCacheSettings`; missing fields keep
//! their defaults. `--no-lod` simulates a context without the LOD
//! extensions. Set `RUST_LOG=debug` to see cache activity.

use std::env;
use std::fs;

use anyhow::{Context, Result};

use rdpshade::core::registers::{MDSFT_CYCLETYPE, MDSFT_TEXTFILT, MDSFT_TEXTLOD};
use rdpshade::core::{ColorInput, CombineCycle, Equation, GeometryMode, encode_combine};
use rdpshade::{
    DeviceCaps, HeadlessBackend, KeyBuilder, ProgramCache, ProgramSource, RdpRegisters,
    ShaderCacheSettings, UtilityProgram, assemble_program, assemble_utility,
};

fn samples() -> Vec<(&'static str, RdpRegisters)> {
    let modulate = encode_combine(&[CombineCycle::modulate(), CombineCycle::combined()]);
    let lod = CombineCycle {
        color: Equation::new(
            ColorInput::Texel0,
            ColorInput::Texel1,
            ColorInput::LodFraction,
            ColorInput::Texel1,
        ),
        ..CombineCycle::modulate()
    };
    let bilinear = 2 << MDSFT_TEXTFILT;

    vec![
        (
            "one-cycle modulate",
            RdpRegisters {
                combine: modulate,
                other_mode_h: bilinear,
                ..RdpRegisters::default()
            },
        ),
        (
            "lit and fogged",
            RdpRegisters {
                combine: modulate,
                other_mode_h: bilinear,
                geometry_mode: GeometryMode::LIGHTING | GeometryMode::FOG,
                num_lights: 2,
                ..RdpRegisters::default()
            },
        ),
        (
            "two-cycle mipmapped",
            RdpRegisters {
                combine: encode_combine(&[lod, CombineCycle::combined()]),
                other_mode_h: (1 << MDSFT_CYCLETYPE) | (1 << MDSFT_TEXTLOD) | bilinear,
                ..RdpRegisters::default()
            },
        ),
        (
            "fill",
            RdpRegisters {
                other_mode_h: 3 << MDSFT_CYCLETYPE,
                ..RdpRegisters::default()
            },
        ),
    ]
}

fn print_source(title: &str, source: &ProgramSource) {
    println!("// ==== {title}: {} ({:032x}) ====", source.label, source.source_hash());
    println!("// ---- vertex ----\n{}", source.vertex);
    println!("// ---- fragment ----\n{}", source.fragment);
}

fn main() -> Result<()> {
    env_logger::init();

    let mut settings = ShaderCacheSettings::default();
    let mut caps = DeviceCaps::default();
    for arg in env::args().skip(1) {
        if arg == "--no-lod" {
            caps = DeviceCaps {
                standard_derivatives: false,
                shader_texture_lod: false,
            };
        } else {
            let json = fs::read_to_string(&arg).with_context(|| format!("reading {arg}"))?;
            settings = ShaderCacheSettings::from_json(&json)
                .with_context(|| format!("parsing settings from {arg}"))?;
        }
    }
    log::info!("Settings: {}", serde_json::to_string(&settings)?);

    let builder = KeyBuilder::new(settings.clone(), caps);
    let mut cache = ProgramCache::with_settings(HeadlessBackend::new(), &settings);

    for (title, regs) in samples() {
        let key = builder
            .build(&regs)
            .with_context(|| format!("building key for '{title}'"))?;
        let source = assemble_program(&key)?;
        print_source(title, &source);
        cache.acquire(&key)?;
    }

    for utility in UtilityProgram::ALL {
        print_source(utility.label(), &assemble_utility(utility)?);
        cache.acquire_utility(utility)?;
    }

    log::info!("{:?}", cache.stats());
    Ok(())
}
