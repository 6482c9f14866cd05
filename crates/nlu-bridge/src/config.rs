use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nlu_abi::ffi::ENGINE_ENTRY_SYMBOL;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// `engine.json` inside the engine root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Absolute, or relative to the engine root.
    pub library_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_symbol: Option<String>,
}

impl EngineConfig {
    pub const FILE_NAME: &'static str = "engine.json";

    /// `Ok(None)` when the root has no config file.
    pub fn read(root: &Path) -> Result<Option<Self>> {
        let p = root.join(Self::FILE_NAME);
        let bytes = match std::fs::read(&p) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn library_path_in(&self, root: &Path) -> PathBuf {
        if self.library_path.is_absolute() {
            self.library_path.clone()
        } else {
            root.join(&self.library_path)
        }
    }

    pub fn entry_symbol(&self) -> &str {
        self.entry_symbol.as_deref().unwrap_or(ENGINE_ENTRY_SYMBOL)
    }
}
