//! Error types for the binding layer.
//!
//! The engine reports failures as negative status codes paired with a
//! last-error string; this module carries both through a typed error. Local
//! failures (library loading, missing entry points) get their own variants.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndigoError>;

#[derive(Debug, Error)]
pub enum IndigoError {
    /// A native entry point returned a negative status code.
    ///
    /// `message` is the engine's last-error text, fetched while the failing
    /// session was still active.
    #[error("engine call failed with status {code}: {message}")]
    Engine { code: i32, message: String },

    /// The shared library could not be loaded.
    #[error("failed to load engine library from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The shared library loaded but is missing a required entry point.
    #[error("engine library is missing entry point {name}: {source}")]
    MissingSymbol {
        name: &'static str,
        #[source]
        source: libloading::Error,
    },
}

impl IndigoError {
    /// Status code of an engine-reported failure, if that is what this is.
    pub fn status(&self) -> Option<i32> {
        match self {
            IndigoError::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }
}
