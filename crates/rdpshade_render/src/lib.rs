//! # rdpshade Render
//!
//! Turns configuration keys into linked programs and keeps them.
//!
//! - [`backend`]: the [`ProgramBackend`] seam with a `glow` implementation
//!   and a headless one for tests and tooling.
//! - [`cache`]: [`ProgramCache`], LRU over linked programs, context-loss
//!   handling.
//! - [`binder`]: per-draw uniform upload with cached locations.
//!
//! Everything here runs on the thread that owns the graphics context.

pub mod backend;
pub mod binder;
pub mod cache;
pub mod errors;
pub mod program;

pub use backend::{
    CompileError, GlBackend, HeadlessBackend, HeadlessLocation, HeadlessProgram, ProgramBackend,
    ShaderStage, UniformValue,
};
pub use binder::{ParameterSnapshot, UtilityParameters};
pub use cache::{CacheStats, ProgramCache};
pub use errors::{Result, ShadeError};
pub use program::{CompiledProgram, EntryOwner, ProgramId};
