//! Assembled program sources.

use xxhash_rust::xxh3::xxh3_128;

use rdpshade_core::{RenderClass, ShaderStateKey};

use crate::errors::Result;
use crate::fragment_assembler::assemble_fragment;
use crate::vertex_assembler::assemble_vertex;

/// Vertex and fragment source of one program, ready for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    /// Human-readable name for logs and debug labels.
    pub label: String,
    pub vertex: String,
    pub fragment: String,
}

impl ProgramSource {
    /// xxh3-128 over both stages.
    #[must_use]
    pub fn source_hash(&self) -> u128 {
        let mut bytes = Vec::with_capacity(self.vertex.len() + self.fragment.len() + 1);
        bytes.extend_from_slice(self.vertex.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(self.fragment.as_bytes());
        xxh3_128(&bytes)
    }
}

/// Assembles both stages for `key`.
pub fn assemble_program(key: &ShaderStateKey) -> Result<ProgramSource> {
    let class = match key.render_class() {
        RenderClass::Normal => "normal",
        RenderClass::FastPath => "fast",
    };
    Ok(ProgramSource {
        label: format!("rdp {class} {:016x}", key.fingerprint()),
        vertex: assemble_vertex(key)?,
        fragment: assemble_fragment(key)?,
    })
}
