use anyhow::{Context, bail};
use libloading::{Library, Symbol};
use nlu_abi::ffi::{EngineApi, EngineEntryFn, EngineInfo, NLU_ABI_VERSION, NLU_SCHEMA_VERSION};

use super::locate::EngineLocation;

pub(crate) struct LoadedEngine {
    pub(crate) lib: Library,
    pub(crate) api: &'static EngineApi,
}

pub(crate) fn load_library(loc: &EngineLocation) -> anyhow::Result<LoadedEngine> {
    let lib = unsafe { Library::new(&loc.path) }
        .with_context(|| format!("failed to load engine {}", loc.path.display()))?;

    let api_ptr = {
        let entry: Symbol<EngineEntryFn> = unsafe { lib.get(loc.entry_symbol.as_bytes()) }
            .with_context(|| format!("missing symbol {}", loc.entry_symbol))?;
        unsafe { entry() }
    };
    if api_ptr.is_null() {
        bail!("engine entry {} returned null", loc.entry_symbol);
    }

    // The vtable is static inside `lib`, which the caller keeps alive for
    // as long as the reference is reachable.
    let api: &'static EngineApi = unsafe { &*api_ptr };
    check_versions(&api.info)?;
    Ok(LoadedEngine { lib, api })
}

/// Host and engine must agree on both the calling convention and the result
/// layout revision.
pub(crate) fn check_versions(info: &EngineInfo) -> anyhow::Result<()> {
    if info.abi_version != NLU_ABI_VERSION {
        bail!(
            "ABI mismatch: host={} engine={}",
            NLU_ABI_VERSION,
            info.abi_version
        );
    }
    if info.schema_version != NLU_SCHEMA_VERSION {
        bail!(
            "schema mismatch: host={} engine={}",
            NLU_SCHEMA_VERSION,
            info.schema_version
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn info(abi_version: u32, schema_version: u32) -> EngineInfo {
        EngineInfo {
            abi_version,
            schema_version,
            id: ptr::null(),
            semver: ptr::null(),
        }
    }

    #[test]
    fn matching_versions_pass() {
        assert!(check_versions(&info(NLU_ABI_VERSION, NLU_SCHEMA_VERSION)).is_ok());
    }

    #[test]
    fn older_schema_is_rejected() {
        let err = check_versions(&info(NLU_ABI_VERSION, 1)).unwrap_err();
        assert!(err.to_string().contains("schema mismatch"));
    }

    #[test]
    fn abi_mismatch_is_rejected() {
        let err = check_versions(&info(NLU_ABI_VERSION + 1, NLU_SCHEMA_VERSION)).unwrap_err();
        assert!(err.to_string().starts_with("ABI mismatch"));
    }

    #[test]
    fn missing_library_carries_path() {
        let loc = EngineLocation::new("/definitely/not/here/libnlu_engine.so");
        let err = load_library(&loc).err().unwrap();
        assert!(format!("{err:#}").contains("/definitely/not/here"));
    }
}
