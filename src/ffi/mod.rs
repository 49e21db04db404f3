//! Native engine adapter.
//!
//! The engine is consumed as a fixed, versioned set of C entry points. This
//! module expresses that surface as the [`EngineApi`] trait so the rest of
//! the crate (and the test suite) never depends on the shared library
//! directly, and provides [`NativeEngine`], the production implementation
//! that resolves every symbol once from a dynamically loaded library.

mod api;
mod library;

pub use api::EngineApi;
pub use library::{LIBRARY_PATH_ENV, NativeEngine, default_library_path};
