//! Utility Programs
//!
//! Fixed programs outside the key space: texrect drawing helpers, the
//! texture copy and the monochrome post-process.

use serde::Serialize;

use crate::env::render;
use crate::errors::Result;
use crate::source::ProgramSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexrectFilter {
    Bilinear,
    ThreePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtilityProgram {
    /// Filters a texrect with bounds-aware filtering, discarding the
    /// sentinel color written by [`UtilityProgram::TexrectClean`].
    TexrectDrawer(TexrectFilter),
    TexrectClean,
    TextureCopy,
    /// Full-screen luminance conversion.
    Monochrome,
}

impl UtilityProgram {
    pub const ALL: [Self; 5] = [
        Self::TexrectDrawer(TexrectFilter::Bilinear),
        Self::TexrectDrawer(TexrectFilter::ThreePoint),
        Self::TexrectClean,
        Self::TextureCopy,
        Self::Monochrome,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TexrectDrawer(TexrectFilter::Bilinear) => "texrect drawer (bilinear)",
            Self::TexrectDrawer(TexrectFilter::ThreePoint) => "texrect drawer (3-point)",
            Self::TexrectClean => "texrect clean",
            Self::TextureCopy => "texture copy",
            Self::Monochrome => "monochrome",
        }
    }

    fn templates(self) -> (&'static str, &'static str) {
        match self {
            Self::TexrectDrawer(_) => ("utility/texrect_vertex", "utility/texrect_drawer"),
            Self::TexrectClean => ("utility/position_vertex", "utility/texrect_clean"),
            Self::TextureCopy => ("utility/texrect_vertex", "utility/texture_copy"),
            Self::Monochrome => ("utility/position_vertex", "utility/monochrome"),
        }
    }
}

#[derive(Serialize)]
struct UtilityContext {
    filter: &'static str,
}

pub fn assemble_utility(program: UtilityProgram) -> Result<ProgramSource> {
    let ctx = UtilityContext {
        filter: match program {
            UtilityProgram::TexrectDrawer(TexrectFilter::ThreePoint) => "three_point",
            _ => "bilinear",
        },
    };
    let (vertex, fragment) = program.templates();
    Ok(ProgramSource {
        label: program.label().to_string(),
        vertex: render(vertex, &ctx)?,
        fragment: render(fragment, &ctx)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_utility_assembles() {
        for program in UtilityProgram::ALL {
            let source = assemble_utility(program).unwrap();
            assert!(source.vertex.starts_with("#version 100"));
            assert!(source.fragment.contains("gl_FragColor"));
        }
    }

    #[test]
    fn test_texrect_filters_differ() {
        let bilinear = assemble_utility(UtilityProgram::TexrectDrawer(TexrectFilter::Bilinear)).unwrap();
        let three = assemble_utility(UtilityProgram::TexrectDrawer(TexrectFilter::ThreePoint)).unwrap();
        assert!(bilinear.fragment.contains("interpolationFactor"));
        assert!(!three.fragment.contains("interpolationFactor"));
        assert_eq!(bilinear.vertex, three.vertex);
    }
}
