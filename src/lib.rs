//! Rust bindings for the Indigo cheminformatics engine.
//!
//! The engine itself (molecule parsing, substructure matching, serialization)
//! is a pre-built shared library loaded at runtime. This crate is the binding
//! layer only: it allocates a session, activates that session before every
//! native call, wraps returned integer handles in [`IndigoObject`] proxies,
//! and routes polymorphic option values to the correct native setter.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │
//!   ▼
//! Indigo (session manager, option dispatch)
//!   │  activate session, then call
//!   ▼
//! EngineApi (fixed native entry-point surface)
//!   │  status / handle codes
//!   ▼
//! result check ──► IndigoObject (handle proxy) or IndigoError
//! ```
//!
//! # Example
//!
//! ```ignore
//! use indigo::Indigo;
//!
//! let indigo = Indigo::new()?;
//! indigo.set_option("ignore-stereochemistry-errors", true);
//!
//! let target = indigo.load_molecule("c1ccccc1")?;
//! let query = indigo.load_query_molecule("C")?;
//! let matcher = indigo.substructure_matcher(&target, None)?;
//!
//! matcher.dispose();
//! query.dispose();
//! target.dispose();
//! ```

pub mod error;
pub mod ffi;
pub mod object;
pub mod options;
pub mod session;

pub use error::{IndigoError, Result};
pub use ffi::{EngineApi, NativeEngine};
pub use object::{DISPOSED_HANDLE, IndigoObject};
pub use options::{OptionArg, OptionArgs};
pub use session::Indigo;

pub mod prelude {
    pub use crate::error::{IndigoError, Result};
    pub use crate::ffi::{EngineApi, NativeEngine};
    pub use crate::object::IndigoObject;
    pub use crate::options::{OptionArg, OptionArgs};
    pub use crate::session::Indigo;
}
