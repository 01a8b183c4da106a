//! Compile Backend Adapter
//!
//! [`ProgramBackend`] is the seam between the program cache and the native
//! graphics API. Implementations turn a [`ProgramSource`] into a linked
//! program, resolve uniform locations and push uniform values.
//!
//! | Backend              | Use                                       |
//! |----------------------|-------------------------------------------|
//! | [`GlBackend`]        | OpenGL ES 2 / GL via `glow`               |
//! | [`HeadlessBackend`]  | tests and tooling; no context required    |
//!
//! Every call must happen on the thread that owns the graphics context.

mod gl;
mod headless;

use std::fmt;

use glam::{Vec2, Vec3, Vec4};
use thiserror::Error;

use rdpshade_shader::ProgramSource;

pub use gl::{ATTRIBUTE_LOCATIONS, GlBackend};
pub use headless::{HeadlessBackend, HeadlessLocation, HeadlessProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Diagnostic failure reported by a backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A stage was rejected by the shader compiler.
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    /// Both stages compiled but the program did not link.
    #[error("program failed to link: {log}")]
    Link { log: String },

    /// The driver refused to create a shader or program object.
    #[error("failed to create GL object: {0}")]
    Allocation(String),
}

/// A uniform value as understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    Int(i32),
    IVec2([i32; 2]),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Vec2Array(&'a [Vec2]),
    Vec3Array(&'a [Vec3]),
}

impl UniformValue<'_> {
    /// Components in declaration order, integers converted to `f32`.
    #[must_use]
    pub fn to_floats(&self) -> Vec<f32> {
        match *self {
            Self::Int(v) => vec![v as f32],
            Self::IVec2([x, y]) => vec![x as f32, y as f32],
            Self::Float(v) => vec![v],
            Self::Vec2(v) => v.to_array().to_vec(),
            Self::Vec3(v) => v.to_array().to_vec(),
            Self::Vec4(v) => v.to_array().to_vec(),
            Self::Vec2Array(vs) => vs.iter().flat_map(|v| v.to_array()).collect(),
            Self::Vec3Array(vs) => vs.iter().flat_map(|v| v.to_array()).collect(),
        }
    }
}

/// Native compile/link entry point.
pub trait ProgramBackend {
    /// Linked program handle.
    type Program: Copy + fmt::Debug;
    /// Resolved uniform location.
    type Location: Clone + fmt::Debug;

    /// Compiles both stages and links them.
    fn compile(&mut self, source: &ProgramSource) -> Result<Self::Program, CompileError>;

    /// Releases a program. Only called while the context is current.
    fn destroy(&mut self, program: Self::Program);

    /// `None` when the program has no active uniform called `name`.
    fn uniform_location(&mut self, program: Self::Program, name: &str) -> Option<Self::Location>;

    fn use_program(&mut self, program: Self::Program);

    /// Sets a uniform on the program last passed to [`use_program`].
    ///
    /// [`use_program`]: ProgramBackend::use_program
    fn set_uniform(&mut self, location: &Self::Location, value: UniformValue<'_>);
}
