//! Vertex Assembler
//!
//! Two fixed shapes, selected by render-state class. The fog factor chunk is
//! shared between them, so both stages compute it with the same formula.

use serde::Serialize;

use rdpshade_core::ShaderStateKey;

use crate::env::render;
use crate::errors::Result;

#[derive(Debug, Serialize)]
struct VertexContext {
    fog: bool,
    perspective: bool,
}

/// Assembles the vertex shader for `key`.
pub fn assemble_vertex(key: &ShaderStateKey) -> Result<String> {
    let template = if key.is_fast_path() {
        "vertex/plain"
    } else {
        "vertex/textured"
    };
    render(
        template,
        &VertexContext {
            fog: key.fog(),
            perspective: key.perspective(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdpshade_core::{KeyDesc, RenderClass};

    #[test]
    fn test_textured_shape() {
        let key = ShaderStateKey::new(KeyDesc {
            fog: true,
            perspective: false,
            ..KeyDesc::default()
        })
        .unwrap();
        let source = assemble_vertex(&key).unwrap();
        assert!(source.contains("vLodTexCoord = texCoord;"));
        assert!(source.contains("if (aModify[2] == 0.0) texCoord *= 0.5;"));
        assert!(source.contains("fp = -uFogScale.s + uFogScale.t;"));
        assert!(source.contains("vShadeColor.a = clamp(fp, 0.0, 1.0);"));
    }

    #[test]
    fn test_plain_shape() {
        let key = ShaderStateKey::new(KeyDesc {
            render_class: RenderClass::FastPath,
            ..KeyDesc::default()
        })
        .unwrap();
        let source = assemble_vertex(&key).unwrap();
        assert!(!source.contains("vTexCoord0"));
        assert!(!source.contains("uFogScale"));
        assert!(source.contains("vNumLights = 0.0;"));
    }
}
