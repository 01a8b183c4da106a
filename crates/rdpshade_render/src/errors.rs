//! Error Types
//!
//! [`ShadeError`] is what the program cache and the uniform binder report to
//! the draw path. Every variant is scoped to a single draw call: the cache
//! stays usable after any of them.

use thiserror::Error;

use rdpshade_core::ConfigurationError;
use rdpshade_shader::AssemblyError;

use crate::backend::CompileError;

/// Failure to obtain or bind a program for one draw call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShadeError {
    // ========================================================================
    // Configuration
    // ========================================================================
    /// The register snapshot does not describe a valid configuration.
    #[error("invalid pipeline configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    // ========================================================================
    // Program Construction
    // ========================================================================
    /// Source generation failed for a program.
    #[error("failed to assemble '{program}': {source}")]
    Assembly {
        /// Program label
        program: String,
        #[source]
        source: AssemblyError,
    },

    /// The backend rejected the generated source.
    #[error("failed to build '{program}': {source}")]
    Program {
        /// Program label
        program: String,
        #[source]
        source: CompileError,
    },

    // ========================================================================
    // Context Lifecycle
    // ========================================================================
    /// The graphics context is gone; wait for a reset.
    #[error("graphics context lost")]
    ContextLost,

    /// The program id no longer refers to a cached program.
    #[error("program handle is stale")]
    StaleProgram,
}

/// Alias for `Result<T, ShadeError>`.
pub type Result<T> = std::result::Result<T, ShadeError>;
