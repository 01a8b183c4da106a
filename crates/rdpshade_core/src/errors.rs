//! Configuration Errors
//!
//! Errors raised while turning a register snapshot into a
//! [`ShaderStateKey`](crate::ShaderStateKey).
//!
//! Most odd register encodings are *normalized* rather than rejected (the
//! hardware ignores the bits, so do we). Only combinations the hardware
//! cannot express at all end up here. Each one is fatal to a single draw
//! call and never touches other configurations.

use thiserror::Error;

/// A register combination that cannot be represented as a configuration key.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// More active lights than the combiner light path supports.
    #[error("light count {count} exceeds the supported maximum of {max}")]
    TooManyLights {
        /// Requested light count
        count: u8,
        /// Supported maximum
        max: u8,
    },

    /// Alpha compare field holds the reserved encoding.
    #[error("reserved alpha compare encoding {0:#x}")]
    ReservedAlphaCompare(u32),
}

/// Alias for `Result<T, ConfigurationError>`.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
