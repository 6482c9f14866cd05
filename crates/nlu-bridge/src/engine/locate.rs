use std::env;
use std::path::{Path, PathBuf};

use nlu_abi::ffi::ENGINE_ENTRY_SYMBOL;

use crate::config::EngineConfig;
use crate::errors::{BridgeError, Result};

pub const ENV_ENGINE_PATH: &str = "NLU_ENGINE_PATH";
pub const ENV_ENGINE_DIR: &str = "NLU_ENGINE_DIR";

#[cfg(target_os = "windows")]
pub const DEFAULT_LIBRARY_NAME: &str = "nlu_engine.dll";
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY_NAME: &str = "libnlu_engine.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_LIBRARY_NAME: &str = "libnlu_engine.so";

/// A library file plus the symbol to enter it through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLocation {
    pub path: PathBuf,
    pub entry_symbol: String,
}

impl EngineLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry_symbol: ENGINE_ENTRY_SYMBOL.to_string(),
        }
    }
}

/// ~/.local/share/nlu-bridge
pub fn default_engine_root() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("nlu-bridge"))
}

/// Resolves the engine from the environment, then the engine root.
pub fn locate_engine() -> Result<EngineLocation> {
    let explicit = env::var_os(ENV_ENGINE_PATH).map(PathBuf::from);
    let root = env::var_os(ENV_ENGINE_DIR)
        .map(PathBuf::from)
        .or_else(default_engine_root);
    locate_from(explicit.as_deref(), root.as_deref())
}

/// Precedence:
///  1) explicit library path
///  2) `engine.json` in the root
///  3) the platform default file name in the root
pub(crate) fn locate_from(explicit: Option<&Path>, root: Option<&Path>) -> Result<EngineLocation> {
    if let Some(p) = explicit {
        if p.exists() {
            log::info!("[engine] {ENV_ENGINE_PATH} = {}", p.display());
            return Ok(EngineLocation::new(p));
        }
        log::warn!(
            "[engine] {ENV_ENGINE_PATH} points to missing file: {}",
            p.display()
        );
    }

    let Some(root) = root else {
        return Err(BridgeError::Load("no engine root directory available".into()));
    };

    if let Some(cfg) = EngineConfig::read(root)? {
        let p = cfg.library_path_in(root);
        if p.exists() {
            log::info!("[engine] from {}: {}", EngineConfig::FILE_NAME, p.display());
            return Ok(EngineLocation {
                entry_symbol: cfg.entry_symbol().to_string(),
                path: p,
            });
        }
        log::warn!(
            "[engine] {} names missing library: {}",
            EngineConfig::FILE_NAME,
            p.display()
        );
    }

    let p = root.join(DEFAULT_LIBRARY_NAME);
    if p.exists() {
        log::info!("[engine] default library: {}", p.display());
        return Ok(EngineLocation::new(p));
    }

    Err(BridgeError::Load(format!(
        "no engine library found under {}",
        root.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(p: &Path) {
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(p, b"").unwrap();
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("custom.so");
        touch(&lib);
        touch(&dir.path().join(DEFAULT_LIBRARY_NAME));
        let loc = locate_from(Some(&lib), Some(dir.path())).unwrap();
        assert_eq!(loc, EngineLocation::new(&lib));
    }

    #[test]
    fn missing_explicit_path_falls_back_to_config() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("v2/engine.so"));
        std::fs::write(
            dir.path().join(EngineConfig::FILE_NAME),
            r#"{ "library_path": "v2/engine.so", "entry_symbol": "my_entry" }"#,
        )
        .unwrap();
        let missing = dir.path().join("nope.so");
        let loc = locate_from(Some(&missing), Some(dir.path())).unwrap();
        assert_eq!(loc.path, dir.path().join("v2/engine.so"));
        assert_eq!(loc.entry_symbol, "my_entry");
    }

    #[test]
    fn default_file_name_is_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(DEFAULT_LIBRARY_NAME));
        let loc = locate_from(None, Some(dir.path())).unwrap();
        assert_eq!(loc.path, dir.path().join(DEFAULT_LIBRARY_NAME));
        assert_eq!(loc.entry_symbol, ENGINE_ENTRY_SYMBOL);
    }

    #[test]
    fn nothing_found_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_from(None, Some(dir.path())).unwrap_err();
        assert!(matches!(err, BridgeError::Load(_)));
        assert!(matches!(
            locate_from(None, None).unwrap_err(),
            BridgeError::Load(_)
        ));
    }
}
