//! Dynamically loaded engine library.
//!
//! Symbols are resolved once at load time into a plain function-pointer
//! table; a missing symbol fails the load instead of a later call.

use std::env;
use std::ffi::{CStr, CString, c_char, c_float, c_int};
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::{debug, error};

use super::api::EngineApi;
use crate::error::{IndigoError, Result};

/// Environment variable overriding the engine library location.
pub const LIBRARY_PATH_ENV: &str = "INDIGO_LIBRARY_PATH";

type AllocSessionIdFn = unsafe extern "C" fn() -> u64;
type SetSessionIdFn = unsafe extern "C" fn(u64);
type ReleaseSessionIdFn = unsafe extern "C" fn(u64);
type StringResultFn = unsafe extern "C" fn() -> *const c_char;
type LoadFromTextFn = unsafe extern "C" fn(*const c_char) -> c_int;
type SubstructureMatcherFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;
type UnserializeFn = unsafe extern "C" fn(*const u8, c_int) -> c_int;
type NoArgStatusFn = unsafe extern "C" fn() -> c_int;
type SetOptionFn = unsafe extern "C" fn(*const c_char, *const c_char) -> c_int;
type SetOptionIntFn = unsafe extern "C" fn(*const c_char, c_int) -> c_int;
type SetOptionFloatFn = unsafe extern "C" fn(*const c_char, c_float) -> c_int;
type SetOptionXyFn = unsafe extern "C" fn(*const c_char, c_int, c_int) -> c_int;
type SetOptionColorFn = unsafe extern "C" fn(*const c_char, c_float, c_float, c_float) -> c_int;
type HandleStatusFn = unsafe extern "C" fn(c_int) -> c_int;
type CreateSaverFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;

/// Resolved entry points. Function pointers stay valid for as long as the
/// owning [`Library`] mapping is alive.
struct ApiTable {
    alloc_session_id: AllocSessionIdFn,
    set_session_id: SetSessionIdFn,
    release_session_id: ReleaseSessionIdFn,
    version: StringResultFn,
    get_last_error: StringResultFn,
    load_molecule_from_string: LoadFromTextFn,
    load_molecule_from_file: LoadFromTextFn,
    load_query_molecule_from_string: LoadFromTextFn,
    load_query_molecule_from_file: LoadFromTextFn,
    load_smarts_from_string: LoadFromTextFn,
    load_smarts_from_file: LoadFromTextFn,
    substructure_matcher: SubstructureMatcherFn,
    unserialize: UnserializeFn,
    write_buffer: NoArgStatusFn,
    create_saver: CreateSaverFn,
    set_option: SetOptionFn,
    set_option_int: SetOptionIntFn,
    set_option_float: SetOptionFloatFn,
    set_option_bool: SetOptionIntFn,
    set_option_xy: SetOptionXyFn,
    set_option_color: SetOptionColorFn,
    free: HandleStatusFn,
    clone_object: HandleStatusFn,
    count_references: NoArgStatusFn,
}

impl ApiTable {
    fn resolve(library: &Library) -> Result<Self> {
        fn sym<T: Copy>(library: &Library, name: &'static str) -> Result<T> {
            let symbol: Symbol<'_, T> = unsafe { library.get(name.as_bytes()) }
                .map_err(|source| IndigoError::MissingSymbol { name, source })?;
            Ok(*symbol)
        }

        Ok(Self {
            alloc_session_id: sym(library, "indigoAllocSessionId")?,
            set_session_id: sym(library, "indigoSetSessionId")?,
            release_session_id: sym(library, "indigoReleaseSessionId")?,
            version: sym(library, "indigoVersion")?,
            get_last_error: sym(library, "indigoGetLastError")?,
            load_molecule_from_string: sym(library, "indigoLoadMoleculeFromString")?,
            load_molecule_from_file: sym(library, "indigoLoadMoleculeFromFile")?,
            load_query_molecule_from_string: sym(library, "indigoLoadQueryMoleculeFromString")?,
            load_query_molecule_from_file: sym(library, "indigoLoadQueryMoleculeFromFile")?,
            load_smarts_from_string: sym(library, "indigoLoadSmartsFromString")?,
            load_smarts_from_file: sym(library, "indigoLoadSmartsFromFile")?,
            substructure_matcher: sym(library, "indigoSubstructureMatcher")?,
            unserialize: sym(library, "indigoUnserialize")?,
            write_buffer: sym(library, "indigoWriteBuffer")?,
            create_saver: sym(library, "indigoCreateSaver")?,
            set_option: sym(library, "indigoSetOption")?,
            set_option_int: sym(library, "indigoSetOptionInt")?,
            set_option_float: sym(library, "indigoSetOptionFloat")?,
            set_option_bool: sym(library, "indigoSetOptionBool")?,
            set_option_xy: sym(library, "indigoSetOptionXY")?,
            set_option_color: sym(library, "indigoSetOptionColor")?,
            free: sym(library, "indigoFree")?,
            clone_object: sym(library, "indigoClone")?,
            count_references: sym(library, "indigoCountReferences")?,
        })
    }
}

/// [`EngineApi`] backed by the dynamically loaded shared library.
pub struct NativeEngine {
    api: ApiTable,
    // Keeps the mapping (and with it every pointer in `api`) alive.
    _library: Library,
}

impl NativeEngine {
    /// Loads the engine from an explicit library path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let library = unsafe { Library::new(path) }.map_err(|source| IndigoError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let api = ApiTable::resolve(&library)?;
        debug!(path = %path.display(), "loaded engine library");
        Ok(Self {
            api,
            _library: library,
        })
    }

    /// Loads the engine from [`default_library_path`].
    pub fn load_default() -> Result<Self> {
        Self::load(default_library_path())
    }
}

/// Resolves the engine library location.
///
/// Candidates, in order:
/// 1. the `INDIGO_LIBRARY_PATH` environment variable;
/// 2. a bundled `shared/<os>/<arch>/` directory next to the executable;
/// 3. the bare platform library name, leaving the search to the system
///    loader.
pub fn default_library_path() -> PathBuf {
    if let Some(path) = env::var_os(LIBRARY_PATH_ENV) {
        return PathBuf::from(path);
    }

    let name = platform_library_name();
    if let Some(dir) = env::current_exe().ok().and_then(|p| {
        p.parent()
            .map(|d| d.join("shared").join(env::consts::OS).join(env::consts::ARCH))
    }) {
        let bundled = dir.join(name);
        if bundled.exists() {
            return bundled;
        }
    }

    PathBuf::from(name)
}

fn platform_library_name() -> &'static str {
    match env::consts::OS {
        "windows" => "indigo.dll",
        "macos" => "libindigo.dylib",
        _ => "libindigo.so",
    }
}

/// C-string marshalling for text crossing into the engine. Interior NUL
/// bytes cannot be represented; the text is truncated at the first one.
fn to_cstring(text: &str) -> CString {
    match CString::new(text) {
        Ok(c) => c,
        Err(err) => {
            error!(text, "argument contains an interior NUL byte, truncating");
            let end = err.nul_position();
            CString::new(&text[..end]).unwrap_or_default()
        }
    }
}

fn string_from_engine(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

impl EngineApi for NativeEngine {
    fn alloc_session(&self) -> u64 {
        unsafe { (self.api.alloc_session_id)() }
    }

    fn set_session(&self, sid: u64) {
        unsafe { (self.api.set_session_id)(sid) }
    }

    fn release_session(&self, sid: u64) {
        unsafe { (self.api.release_session_id)(sid) }
    }

    fn version(&self) -> Option<String> {
        string_from_engine(unsafe { (self.api.version)() })
    }

    fn last_error(&self) -> Option<String> {
        string_from_engine(unsafe { (self.api.get_last_error)() })
    }

    fn load_molecule_from_string(&self, source: &str) -> i32 {
        let source = to_cstring(source);
        unsafe { (self.api.load_molecule_from_string)(source.as_ptr()) }
    }

    fn load_molecule_from_file(&self, path: &str) -> i32 {
        let path = to_cstring(path);
        unsafe { (self.api.load_molecule_from_file)(path.as_ptr()) }
    }

    fn load_query_molecule_from_string(&self, source: &str) -> i32 {
        let source = to_cstring(source);
        unsafe { (self.api.load_query_molecule_from_string)(source.as_ptr()) }
    }

    fn load_query_molecule_from_file(&self, path: &str) -> i32 {
        let path = to_cstring(path);
        unsafe { (self.api.load_query_molecule_from_file)(path.as_ptr()) }
    }

    fn load_smarts_from_string(&self, source: &str) -> i32 {
        let source = to_cstring(source);
        unsafe { (self.api.load_smarts_from_string)(source.as_ptr()) }
    }

    fn load_smarts_from_file(&self, path: &str) -> i32 {
        let path = to_cstring(path);
        unsafe { (self.api.load_smarts_from_file)(path.as_ptr()) }
    }

    fn substructure_matcher(&self, target: i32, mode: &str) -> i32 {
        let mode = to_cstring(mode);
        unsafe { (self.api.substructure_matcher)(target, mode.as_ptr()) }
    }

    fn unserialize(&self, data: &[u8]) -> i32 {
        unsafe { (self.api.unserialize)(data.as_ptr(), data.len() as c_int) }
    }

    fn write_buffer(&self) -> i32 {
        unsafe { (self.api.write_buffer)() }
    }

    fn create_saver(&self, object: i32, format: &str) -> i32 {
        let format = to_cstring(format);
        unsafe { (self.api.create_saver)(object, format.as_ptr()) }
    }

    fn set_option(&self, name: &str, value: &str) -> i32 {
        let name = to_cstring(name);
        let value = to_cstring(value);
        unsafe { (self.api.set_option)(name.as_ptr(), value.as_ptr()) }
    }

    fn set_option_int(&self, name: &str, value: i32) -> i32 {
        let name = to_cstring(name);
        unsafe { (self.api.set_option_int)(name.as_ptr(), value) }
    }

    fn set_option_float(&self, name: &str, value: f32) -> i32 {
        let name = to_cstring(name);
        unsafe { (self.api.set_option_float)(name.as_ptr(), value) }
    }

    fn set_option_bool(&self, name: &str, value: i32) -> i32 {
        let name = to_cstring(name);
        unsafe { (self.api.set_option_bool)(name.as_ptr(), value) }
    }

    fn set_option_xy(&self, name: &str, x: i32, y: i32) -> i32 {
        let name = to_cstring(name);
        unsafe { (self.api.set_option_xy)(name.as_ptr(), x, y) }
    }

    fn set_option_color(&self, name: &str, r: f32, g: f32, b: f32) -> i32 {
        let name = to_cstring(name);
        unsafe { (self.api.set_option_color)(name.as_ptr(), r, g, b) }
    }

    fn free(&self, handle: i32) -> i32 {
        unsafe { (self.api.free)(handle) }
    }

    fn clone_object(&self, handle: i32) -> i32 {
        unsafe { (self.api.clone_object)(handle) }
    }

    fn count_references(&self) -> i32 {
        unsafe { (self.api.count_references)() }
    }
}
