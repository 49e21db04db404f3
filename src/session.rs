//! Session management and call dispatch.
//!
//! The engine keeps a process-wide "current session" register: objects and
//! options live inside the session that was active when they were created.
//! [`Indigo`] owns one session id and re-activates it immediately before
//! every native call. The activate-then-call pair (including the last-error
//! fetch on failure) runs under a process-wide lock so concurrent instances
//! cannot corrupt the effective session.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::{IndigoError, Result};
use crate::ffi::{EngineApi, NativeEngine};
use crate::object::IndigoObject;
use crate::options::{OptionArg, OptionArgs};

/// Guards the engine's current-session register across all instances.
static SESSION_REGISTER: Mutex<()> = Mutex::new(());

/// Shared session state, kept alive by the [`Indigo`] instance and by every
/// proxy object created under it.
pub(crate) struct SessionState {
    engine: Arc<dyn EngineApi>,
    sid: u64,
    released: AtomicBool,
}

impl SessionState {
    /// Runs `f` with this session active, holding the register lock for the
    /// whole activate-then-call span.
    pub(crate) fn with_active<R>(&self, f: impl FnOnce(&dyn EngineApi) -> R) -> R {
        let _register = SESSION_REGISTER.lock();
        self.engine.set_session(self.sid);
        f(self.engine.as_ref())
    }

    /// Translates a status code: negative codes fetch the last-error text
    /// (the session must still be active), log it, and become an error.
    pub(crate) fn check_result(&self, code: i32) -> Result<i32> {
        if code < 0 {
            let message = check_result_string(self.engine.last_error());
            error!(code, message = %message, "engine call failed");
            return Err(IndigoError::Engine { code, message });
        }
        Ok(code)
    }

    pub(crate) fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            // The engine keeps the memory and reuses the id on further
            // allocations.
            let _register = SESSION_REGISTER.lock();
            self.engine.release_session(self.sid);
        }
    }
}

impl Drop for SessionState {
    fn drop(&mut self) {
        self.release();
    }
}

/// A string the engine was expected to produce. `None` (the engine returned
/// no text) is logged and replaced with an empty string.
pub(crate) fn check_result_string(result: Option<String>) -> String {
    match result {
        Some(text) => text,
        None => {
            error!("engine result is not a string");
            String::new()
        }
    }
}

/// One binding instance, owning one engine session.
///
/// Every handle-returning call activates this session first and wraps the
/// resulting non-negative handle in an [`IndigoObject`]; negative handles
/// become [`IndigoError::Engine`] and construct nothing.
pub struct Indigo {
    state: Arc<SessionState>,
}

impl Indigo {
    /// Loads the engine from the default library location and allocates a
    /// session.
    pub fn new() -> Result<Self> {
        Ok(Self::with_engine(Arc::new(NativeEngine::load_default()?)))
    }

    /// Loads the engine from an explicit library path.
    pub fn with_library(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_engine(Arc::new(NativeEngine::load(path)?)))
    }

    /// Binds to an already-loaded engine. Each call allocates a fresh
    /// session, so several instances can share one engine.
    pub fn with_engine(engine: Arc<dyn EngineApi>) -> Self {
        let sid = {
            let _register = SESSION_REGISTER.lock();
            engine.alloc_session()
        };
        debug!(sid, "allocated engine session");
        Self {
            state: Arc::new(SessionState {
                engine,
                sid,
                released: AtomicBool::new(false),
            }),
        }
    }

    /// The engine-assigned session id.
    pub fn session_id(&self) -> u64 {
        self.state.sid
    }

    /// Engine version string. The only call that does not activate the
    /// session first.
    pub fn version(&self) -> String {
        check_result_string(self.state.engine.version())
    }

    /// The engine's current last-error text.
    pub fn last_error(&self) -> String {
        check_result_string(self.state.engine.last_error())
    }

    /// Releases this session's id back to the engine. Idempotent; also runs
    /// when the last owner of the session state (instance or proxy object)
    /// is dropped.
    pub fn release(&self) {
        self.state.release();
    }

    /// Number of objects currently allocated in this session.
    pub fn count_references(&self) -> Result<i32> {
        self.call(|api| api.count_references())
    }

    /// Loads a molecule from SMILES, molfile text, or other supported
    /// notations.
    pub fn load_molecule(&self, source: &str) -> Result<IndigoObject> {
        self.wrap(|api| api.load_molecule_from_string(source))
    }

    pub fn load_molecule_from_file(&self, path: impl AsRef<Path>) -> Result<IndigoObject> {
        self.wrap(|api| api.load_molecule_from_file(&path.as_ref().to_string_lossy()))
    }

    /// Loads a query molecule for use as a substructure pattern.
    pub fn load_query_molecule(&self, source: &str) -> Result<IndigoObject> {
        self.wrap(|api| api.load_query_molecule_from_string(source))
    }

    pub fn load_query_molecule_from_file(&self, path: impl AsRef<Path>) -> Result<IndigoObject> {
        self.wrap(|api| api.load_query_molecule_from_file(&path.as_ref().to_string_lossy()))
    }

    /// Loads a molecular pattern from a SMARTS string.
    pub fn load_smarts(&self, source: &str) -> Result<IndigoObject> {
        self.wrap(|api| api.load_smarts_from_string(source))
    }

    pub fn load_smarts_from_file(&self, path: impl AsRef<Path>) -> Result<IndigoObject> {
        self.wrap(|api| api.load_smarts_from_file(&path.as_ref().to_string_lossy()))
    }

    /// Creates a substructure matcher for `target`. The matcher keeps a
    /// parent reference to the target it was built from. `mode` is reserved
    /// by the engine; absent maps to the empty string.
    pub fn substructure_matcher(
        &self,
        target: &IndigoObject,
        mode: Option<&str>,
    ) -> Result<IndigoObject> {
        let mode = mode.unwrap_or("");
        let target_handle = target.id();
        let handle = self.call(|api| api.substructure_matcher(target_handle, mode))?;
        Ok(IndigoObject::with_parent(self.state.clone(), handle, target))
    }

    /// Restores an object from a serialized buffer.
    pub fn unserialize(&self, data: &[u8]) -> Result<IndigoObject> {
        self.wrap(|api| api.unserialize(data))
    }

    /// Creates an in-memory buffer writer.
    pub fn write_buffer(&self) -> Result<IndigoObject> {
        self.wrap(|api| api.write_buffer())
    }

    /// Creates a saver writing `format` records into `output`.
    pub fn create_saver(&self, output: &IndigoObject, format: &str) -> Result<IndigoObject> {
        let output_handle = output.id();
        self.wrap(|api| api.create_saver(output_handle, format))
    }

    /// Sets an engine option, routing the value shape to the matching
    /// native setter.
    ///
    /// Returns `true` only when the setter reported status 1; any other
    /// non-negative status counts as failure too.
    ///
    /// Dispatch policy:
    ///
    /// - a lone string, integer, float, or boolean goes to the matching
    ///   setter, except that a number is routed by its decimal rendering: a
    ///   negative integer takes the float setter, an integral non-negative
    ///   float takes the int setter;
    /// - a falsy second value (0, 0.0, `false`, `""`) selects the
    ///   single-value branch as if it were absent;
    /// - with a truthy second value, the XY check and the color check both
    ///   run: XY fires when the first two values look like plain integers,
    ///   color fires when none of the three do (an absent third value counts
    ///   as integer zero). Anything else logs `bad option` and fails without
    ///   an engine call.
    ///
    /// The color branch's inverted-looking polarity is preserved as-is; see
    /// DESIGN.md before changing it.
    pub fn set_option<'a>(&self, name: &str, args: impl Into<OptionArgs<'a>>) -> bool {
        let args = args.into();
        self.state
            .with_active(|api| self.dispatch_option(api, name, args))
    }

    fn dispatch_option(&self, api: &dyn EngineApi, name: &str, args: OptionArgs<'_>) -> bool {
        let value1 = args.value1;
        // Falsy second and third values coerce to integer zero; a zero
        // second value then selects the single-value branch.
        let value2 = args.value2.filter(|v| !v.is_falsy());
        let value3 = match args.value3 {
            Some(v) if !v.is_falsy() => v,
            _ => OptionArg::Int(0),
        };

        let mut status = -1;
        match value2 {
            None => {
                status = match value1 {
                    OptionArg::Str(s) => self.checked_status(api.set_option(name, s)),
                    OptionArg::Int(_) | OptionArg::Float(_) => {
                        if value1.looks_like_plain_integer() {
                            self.checked_status(api.set_option_int(name, value1.as_i32()))
                        } else {
                            self.checked_status(api.set_option_float(name, value1.as_f32()))
                        }
                    }
                    OptionArg::Bool(b) => {
                        self.checked_status(api.set_option_bool(name, b as i32))
                    }
                };
            }
            Some(value2) => {
                // Both checks run; they are not mutually exclusive.
                let mut matched = false;
                if value1.is_number() && value2.is_number() {
                    matched = true;
                    if value1.looks_like_plain_integer() && value2.looks_like_plain_integer() {
                        status = self.checked_status(api.set_option_xy(
                            name,
                            value1.as_i32(),
                            value2.as_i32(),
                        ));
                    } else {
                        error!(name, "bad option");
                    }
                }
                if value1.is_number() && value2.is_number() && value3.is_number() {
                    matched = true;
                    if !value1.looks_like_plain_integer()
                        && !value2.looks_like_plain_integer()
                        && !value3.looks_like_plain_integer()
                    {
                        status = self.checked_status(api.set_option_color(
                            name,
                            value1.as_f32(),
                            value2.as_f32(),
                            value3.as_f32(),
                        ));
                    } else {
                        error!(name, "bad option");
                    }
                }
                if !matched {
                    error!(name, "bad option");
                }
            }
        }
        status == 1
    }

    /// Status check that keeps the raw code: `set_option` reports failure
    /// through its boolean, not through `Result`.
    fn checked_status(&self, code: i32) -> i32 {
        let _ = self.state.check_result(code);
        code
    }

    fn call(&self, f: impl FnOnce(&dyn EngineApi) -> i32) -> Result<i32> {
        self.state
            .with_active(|api| self.state.check_result(f(api)))
    }

    fn wrap(&self, f: impl FnOnce(&dyn EngineApi) -> i32) -> Result<IndigoObject> {
        let handle = self.call(f)?;
        Ok(IndigoObject::new(self.state.clone(), handle))
    }
}
