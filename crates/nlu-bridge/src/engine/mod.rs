//! Engine handles.
//!
//! One `EngineCore` exists per loaded library (or per statically linked
//! vtable) for the life of the process. Every `Engine` for that library
//! shares its lock, so a native call, its error fetch and the release of
//! everything it returned form one critical section no matter how many
//! handles callers hold.

mod loader;
pub mod locate;

use core::ffi::c_char;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use libloading::Library;
use nlu_abi::ffi::{CIntentClassifierResultArray, CIntentParserResult, EngineApi};
use nlu_abi::{IntentClassifierResult, IntentParserResult};
use once_cell::sync::Lazy;

use crate::channel::check;
use crate::decode::{take_intent_results, take_parse_result};
use crate::errors::{BridgeError, Result};
use locate::{EngineLocation, locate_engine};

struct EngineCore {
    api: &'static EngineApi,
    _lib: Option<Library>,
    lock: Mutex<()>,
    origin: String,
}

// SAFETY: the vtable is immutable static data; the raw pointers inside it
// only reference static strings. Native entry is serialized by `lock`.
unsafe impl Send for EngineCore {}
unsafe impl Sync for EngineCore {}

#[derive(Debug, Hash, PartialEq, Eq)]
enum RegistryKey {
    /// Canonical path plus entry symbol; one library may export several engines.
    Library(PathBuf, String),
    Static(usize),
}

impl RegistryKey {
    fn library(loc: &EngineLocation) -> Self {
        let path = std::fs::canonicalize(&loc.path).unwrap_or_else(|_| loc.path.clone());
        RegistryKey::Library(path, loc.entry_symbol.clone())
    }
}

static REGISTRY: Lazy<Mutex<HashMap<RegistryKey, &'static EngineCore>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Cheap, copyable handle to a loaded engine.
#[derive(Clone, Copy)]
pub struct Engine {
    core: &'static EngineCore,
}

/// Identity the engine reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDescription {
    pub id: String,
    pub semver: String,
    pub abi_version: u32,
    pub schema_version: u32,
    /// Library path, or `static` for a linked vtable.
    pub origin: String,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("origin", &self.core.origin)
            .finish()
    }
}

impl Engine {
    /// Loads the engine found through `NLU_ENGINE_PATH`, `NLU_ENGINE_DIR` or
    /// the default engine root.
    pub fn load_default() -> Result<Self> {
        let loc = locate_engine()?;
        Self::load_location(&loc)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_location(&EngineLocation::new(path.as_ref()))
    }

    /// Loads `loc` once per canonical path and entry symbol; later calls
    /// share the first load.
    pub fn load_location(loc: &EngineLocation) -> Result<Self> {
        let key = RegistryKey::library(loc);
        let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(core) = registry.get(&key) {
            return Ok(Engine { core });
        }
        let origin = match &key {
            RegistryKey::Library(path, _) => path.display().to_string(),
            RegistryKey::Static(_) => "static".to_string(),
        };

        let loaded = loader::load_library(loc)?;
        let core: &'static EngineCore = Box::leak(Box::new(EngineCore {
            api: loaded.api,
            _lib: Some(loaded.lib),
            lock: Mutex::new(()),
            origin,
        }));
        let engine = Engine { core };
        log_loaded(&engine);
        registry.insert(key, core);
        Ok(engine)
    }

    /// Wraps a vtable linked into this process.
    pub fn from_api(api: &'static EngineApi) -> Result<Self> {
        loader::check_versions(&api.info)?;
        let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
        let key = RegistryKey::Static(api as *const EngineApi as usize);
        if let Some(core) = registry.get(&key) {
            return Ok(Engine { core });
        }
        let core: &'static EngineCore = Box::leak(Box::new(EngineCore {
            api,
            _lib: None,
            lock: Mutex::new(()),
            origin: "static".to_string(),
        }));
        let engine = Engine { core };
        log_loaded(&engine);
        registry.insert(key, core);
        Ok(engine)
    }

    /// Runs `f` inside this engine's critical section.
    pub(crate) fn with_lock<T>(&self, f: impl FnOnce(&'static EngineApi) -> Result<T>) -> Result<T> {
        let _guard = self.core.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f(self.core.api)
    }

    pub fn parse(&self, input: &str) -> Result<IntentParserResult> {
        let input = c_arg(input, "parse input")?;
        self.with_lock(|api| {
            let mut out: *const CIntentParserResult = std::ptr::null();
            let rc = unsafe { (api.parse_text)(input.as_ptr(), &mut out) };
            check(api, "parse_text", rc)?;
            unsafe { take_parse_result(out, api) }
        })
    }

    /// Every intent the engine scored for `input`, in the engine's order.
    pub fn intents(&self, input: &str) -> Result<Vec<IntentClassifierResult>> {
        let input = c_arg(input, "intents input")?;
        self.with_lock(|api| {
            let mut out: *const CIntentClassifierResultArray = std::ptr::null();
            let rc = unsafe { (api.get_intents)(input.as_ptr(), &mut out) };
            check(api, "get_intents", rc)?;
            unsafe { take_intent_results(out, api) }
        })
    }

    pub fn info(&self) -> EngineDescription {
        let info = &self.core.api.info;
        EngineDescription {
            id: unsafe { static_str(info.id) },
            semver: unsafe { static_str(info.semver) },
            abi_version: info.abi_version,
            schema_version: info.schema_version,
            origin: self.core.origin.clone(),
        }
    }

    /// True when both handles drive the same native engine.
    pub fn same_engine(&self, other: &Engine) -> bool {
        std::ptr::eq(self.core, other.core)
    }
}

fn log_loaded(engine: &Engine) {
    let d = engine.info();
    log::info!(
        "[engine] loaded {} {} from {} (abi {}, schema {})",
        d.id,
        d.semver,
        d.origin,
        d.abi_version,
        d.schema_version
    );
}

/// Host text that must cross the boundary as a C string.
pub(crate) fn c_arg(value: &str, what: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| BridgeError::InvalidArgument(format!("{what} contains an interior NUL")))
}

/// Copies an engine-owned static string; never released.
unsafe fn static_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}
