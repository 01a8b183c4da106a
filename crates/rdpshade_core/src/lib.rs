//! # rdpshade Core
//!
//! Register decoding and configuration keys for the RDP shader cache.
//!
//! This crate is free of any graphics API. It turns the per-draw register
//! snapshot into a [`ShaderStateKey`], the canonical description of the
//! shader program a draw call needs.
//!
//! - [`registers`]: raw `SetOtherMode` / `SetCombine` / geometry state
//! - [`combiner`], [`blender`]: selector decoding and equation normalization
//! - [`key`]: the normalized key and its derived queries
//! - [`builder`]: registers + settings + device caps → key
//! - [`settings`]: runtime toggles and device capabilities

pub mod blender;
pub mod builder;
pub mod combiner;
pub mod errors;
pub mod key;
pub mod registers;
pub mod settings;

pub use blender::{BlendAlpha, BlendColor, BlendInvAlpha, BlendMux};
pub use builder::{KeyBuilder, build_key};
pub use combiner::{
    AlphaInput, ColorInput, CombineCycle, CombinerInput, Equation, decode_combine, encode_combine,
};
pub use errors::{ConfigurationError, Result};
pub use key::{
    AlphaCompare, CycleCount, KeyDesc, LodState, MAX_LIGHTS, MipmapVariant, RenderClass,
    ShaderStateKey, TextureDetail, TextureFilter,
};
pub use registers::{CycleType, GeometryMode, Monochrome, RdpRegisters, TextureUnitState};
pub use settings::{DeviceCaps, ShaderCacheSettings};
