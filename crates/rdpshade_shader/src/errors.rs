//! Assembly Errors
//!
//! Template failures are defects of the embedded fragment library, never of
//! the key. They are still reported per key so the program cache can treat
//! them like a compile failure instead of aborting.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("shader template '{name}' not found")]
    TemplateNotFound { name: String },

    #[error("failed to render shader template '{name}': {detail}")]
    Render { name: String, detail: String },
}

impl AssemblyError {
    pub(crate) fn from_template(name: &str, err: &minijinja::Error) -> Self {
        if err.kind() == minijinja::ErrorKind::TemplateNotFound {
            Self::TemplateNotFound {
                name: name.to_string(),
            }
        } else {
            Self::Render {
                name: name.to_string(),
                detail: format!("{err:#}"),
            }
        }
    }
}

/// Alias for `Result<T, AssemblyError>`.
pub type Result<T> = std::result::Result<T, AssemblyError>;
