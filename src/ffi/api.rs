//! The fixed entry-point surface of the native engine.

/// Callable surface of the engine, one method per native entry point.
///
/// Handle-returning calls yield a non-negative handle on success or a
/// negative status code on failure; status-returning calls follow the same
/// sign convention, with `1` meaning success for the option setters. The
/// engine keeps a process-wide "current session" register: every
/// session-scoped call must be preceded by [`set_session`](Self::set_session)
/// for the session that owns the touched state. Callers are responsible for
/// serializing that activate-then-call pair; the implementations here do not.
///
/// String getters return `None` where the engine produced no string (a null
/// pointer from the native side).
pub trait EngineApi: Send + Sync {
    // Session lifecycle.
    fn alloc_session(&self) -> u64;
    fn set_session(&self, sid: u64);
    fn release_session(&self, sid: u64);

    // Diagnostics. Neither touches session-scoped state on its own, though
    // the last error is recorded per session.
    fn version(&self) -> Option<String>;
    fn last_error(&self) -> Option<String>;

    // Loaders, each returning a fresh handle in the current session.
    fn load_molecule_from_string(&self, source: &str) -> i32;
    fn load_molecule_from_file(&self, path: &str) -> i32;
    fn load_query_molecule_from_string(&self, source: &str) -> i32;
    fn load_query_molecule_from_file(&self, path: &str) -> i32;
    fn load_smarts_from_string(&self, source: &str) -> i32;
    fn load_smarts_from_file(&self, path: &str) -> i32;

    // Matching and serialization.
    fn substructure_matcher(&self, target: i32, mode: &str) -> i32;
    fn unserialize(&self, data: &[u8]) -> i32;
    fn write_buffer(&self) -> i32;
    fn create_saver(&self, object: i32, format: &str) -> i32;

    // Option setters. Success is exactly status 1.
    fn set_option(&self, name: &str, value: &str) -> i32;
    fn set_option_int(&self, name: &str, value: i32) -> i32;
    fn set_option_float(&self, name: &str, value: f32) -> i32;
    fn set_option_bool(&self, name: &str, value: i32) -> i32;
    fn set_option_xy(&self, name: &str, x: i32, y: i32) -> i32;
    fn set_option_color(&self, name: &str, r: f32, g: f32, b: f32) -> i32;

    // Object management.
    fn free(&self, handle: i32) -> i32;
    fn clone_object(&self, handle: i32) -> i32;
    fn count_references(&self) -> i32;
}
