//! # rdpshade Shader
//!
//! GLSL ES 1.00 generation for the RDP pixel pipeline.
//!
//! The fragment library lives in `src/shaders/` as minijinja templates. A
//! [`ShaderStateKey`](rdpshade_core::ShaderStateKey) selects fragments from
//! it ([`fragment`]), and the assemblers render them into complete stage
//! sources ([`assemble_program`]).

pub mod combiner_expr;
pub mod env;
pub mod errors;
pub mod fragment;
pub mod fragment_assembler;
pub mod source;
pub mod utility;
pub mod vertex_assembler;

pub use errors::{AssemblyError, Result};
pub use fragment::{
    Capability, FRAGMENT_LIBRARY, FragmentCategory, Helper, SourceFragment, select_fragments,
};
pub use fragment_assembler::assemble_fragment;
pub use source::{ProgramSource, assemble_program};
pub use utility::{TexrectFilter, UtilityProgram, assemble_utility};
pub use vertex_assembler::assemble_vertex;
