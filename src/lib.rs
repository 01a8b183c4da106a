#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # rdpshade
//!
//! Dynamic shader generation and program caching for an emulated N64 RDP
//! pixel pipeline.
//!
//! Per draw call:
//!
//! ```text
//!  RdpRegisters ──KeyBuilder──▶ ShaderStateKey ──ProgramCache::acquire──▶ ProgramId
//!                                                                         │
//!                      ParameterSnapshot ──ProgramCache::bind────────────┘
//! ```
//!
//! ```rust,ignore
//! use rdpshade::{KeyBuilder, ParameterSnapshot, ProgramCache, GlBackend};
//!
//! let builder = KeyBuilder::new(settings.clone(), backend.caps());
//! let mut cache = ProgramCache::with_settings(backend, &settings);
//!
//! let key = builder.build(&registers)?;
//! let program = cache.acquire(&key)?;
//! cache.bind(program, &params)?;
//! ```

pub use rdpshade_core as core;
pub use rdpshade_render as render;
pub use rdpshade_shader as shader;

pub use rdpshade_core::{
    AlphaCompare, ConfigurationError, CycleCount, DeviceCaps, KeyBuilder, KeyDesc, MAX_LIGHTS,
    RdpRegisters, RenderClass, ShaderCacheSettings, ShaderStateKey, TextureFilter, build_key,
};
pub use rdpshade_render::{
    CacheStats, CompileError, GlBackend, HeadlessBackend, ParameterSnapshot, ProgramBackend,
    ProgramCache, ProgramId, ShadeError, UtilityParameters,
};
pub use rdpshade_shader::{
    AssemblyError, ProgramSource, TexrectFilter, UtilityProgram, assemble_program,
    assemble_utility,
};
