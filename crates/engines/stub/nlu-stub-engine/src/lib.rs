//! Stub NLU engine: C-ABI vtable serving a static ontology and scripted
//! parse results, with every handed-out buffer tracked by a per-thread
//! ledger.
//!
//! The last-error slot is one process-wide value, as in the engines this
//! stands in for. Hosts must serialize calls to read their own message.

pub mod catalog;
mod encode;
pub mod ledger;
pub mod script;

use core::ffi::c_char;
use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::{Mutex, PoisonError};

use nlu_abi::ffi::*;
use once_cell::sync::Lazy;

pub use ledger::{reset as reset_ledger, stats as ledger_stats, LedgerStats, POISON};
pub use script::{
    clear_scripts, script, script_failure, ScriptedIntent, ScriptedParse, ScriptedSlot,
    ScriptedValue,
};

// -----------------------------
// Error plumbing (shared slot)
// -----------------------------

static LAST_ERR: Mutex<Option<CString>> = Mutex::new(None);

fn set_last_error(msg: impl AsRef<str>) -> i32 {
    let msg = msg.as_ref();
    log::debug!("[stub] error: {msg}");
    let s = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    *LAST_ERR.lock().unwrap_or_else(PoisonError::into_inner) = Some(s);
    ERR_FAIL
}

unsafe extern "C" fn get_last_error(error: *mut *const c_char) -> i32 {
    if error.is_null() {
        return ERR_FAIL;
    }
    let msg = LAST_ERR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    *error = match msg {
        Some(m) => ledger::alloc_string(&m.to_string_lossy()),
        None => ptr::null(),
    };
    ERR_OK
}

// -----------------------------
// Memory management
// -----------------------------

unsafe extern "C" fn destroy_string(string: *mut c_char) -> i32 {
    if string.is_null() {
        return ERR_OK;
    }
    ledger::release_string(string)
}

unsafe extern "C" fn destroy_string_array(array: *mut CStringArray) -> i32 {
    if array.is_null() {
        return ERR_OK;
    }
    ledger::release_string_array(array)
}

unsafe extern "C" fn destroy_intent_parser_result(result: *mut CIntentParserResult) -> i32 {
    if result.is_null() {
        return ERR_OK;
    }
    ledger::release_shell(result)
}

unsafe extern "C" fn destroy_intent_classifier_results(
    result: *mut CIntentClassifierResultArray,
) -> i32 {
    if result.is_null() {
        return ERR_OK;
    }
    ledger::release_shell(result)
}

// -----------------------------
// Argument helpers
// -----------------------------

unsafe fn arg<'a>(p: *const c_char, what: &str) -> Result<&'a str, String> {
    if p.is_null() {
        return Err(format!("null {what}"));
    }
    CStr::from_ptr(p)
        .to_str()
        .map_err(|e| format!("invalid UTF-8 in {what}: {e}"))
}

unsafe fn write_text(out: *mut *const c_char, text: Result<String, String>) -> i32 {
    if out.is_null() {
        return set_last_error("null result pointer");
    }
    match text {
        Ok(t) => {
            *out = ledger::alloc_string(&t);
            ERR_OK
        }
        Err(e) => set_last_error(e),
    }
}

unsafe fn write_list(out: *mut *const CStringArray, list: Result<Vec<&str>, String>) -> i32 {
    if out.is_null() {
        return set_last_error("null result pointer");
    }
    match list {
        Ok(items) => {
            *out = ledger::alloc_string_array(&items);
            ERR_OK
        }
        Err(e) => set_last_error(e),
    }
}

// -----------------------------
// Ontology
// -----------------------------

static COMPLETE_ONTOLOGY: Lazy<Result<String, String>> = Lazy::new(catalog::complete_ontology_json);

unsafe extern "C" fn complete_entity_ontology_json(result: *mut *const c_char) -> i32 {
    write_text(result, (*COMPLETE_ONTOLOGY).clone())
}

unsafe extern "C" fn language_entity_ontology_json(
    language: *const c_char,
    result: *mut *const c_char,
) -> i32 {
    let json = arg(language, "language").and_then(catalog::language_ontology_json);
    write_text(result, json)
}

unsafe extern "C" fn supported_languages(result: *mut *const CStringArray) -> i32 {
    write_list(result, Ok(catalog::LANGUAGES.to_vec()))
}

unsafe extern "C" fn supported_builtin_entities(
    language: *const c_char,
    result: *mut *const CStringArray,
) -> i32 {
    let list = arg(language, "language")
        .and_then(catalog::language)
        .map(catalog::entities_for);
    write_list(result, list)
}

unsafe extern "C" fn entity_shortname(entity: *const c_char, result: *mut *const c_char) -> i32 {
    let name = arg(entity, "entity")
        .and_then(catalog::entity)
        .map(|e| e.shortname.to_string());
    write_text(result, name)
}

unsafe extern "C" fn ontology_version(result: *mut *const c_char) -> i32 {
    write_text(result, Ok(catalog::ONTOLOGY_VERSION.to_string()))
}

unsafe extern "C" fn all_builtin_entities(result: *mut *const CStringArray) -> i32 {
    write_list(result, Ok(catalog::all_entities()))
}

unsafe extern "C" fn all_grammar_entities(result: *mut *const CStringArray) -> i32 {
    write_list(result, Ok(catalog::entities_of(catalog::Family::Grammar)))
}

unsafe extern "C" fn all_gazetteer_entities(result: *mut *const CStringArray) -> i32 {
    write_list(result, Ok(catalog::entities_of(catalog::Family::Gazetteer)))
}

// -----------------------------
// Parsing
// -----------------------------

unsafe fn parse_input<'a>(input: *const c_char) -> Result<&'a str, String> {
    let input = arg(input, "input")?;
    if input.is_empty() {
        return Err("cannot parse an empty input".to_string());
    }
    Ok(input)
}

unsafe extern "C" fn parse_text(
    input: *const c_char,
    result: *mut *const CIntentParserResult,
) -> i32 {
    if result.is_null() {
        return set_last_error("null result pointer");
    }
    let input = match parse_input(input) {
        Ok(s) => s,
        Err(e) => return set_last_error(e),
    };
    match script::lookup(input) {
        script::Outcome::Parse(parse) => {
            *result = encode::encode_parse(input, &parse);
            ERR_OK
        }
        script::Outcome::Fail(msg) => set_last_error(msg),
    }
}

/// Ranks the scripted intents for `input`; unscripted input ranks only the
/// empty intent.
unsafe extern "C" fn get_intents(
    input: *const c_char,
    result: *mut *const CIntentClassifierResultArray,
) -> i32 {
    if result.is_null() {
        return set_last_error("null result pointer");
    }
    let input = match parse_input(input) {
        Ok(s) => s,
        Err(e) => return set_last_error(e),
    };
    match script::lookup(input) {
        script::Outcome::Parse(parse) => {
            *result = encode::encode_intents(&parse.ranking());
            ERR_OK
        }
        script::Outcome::Fail(msg) => set_last_error(msg),
    }
}

// -----------------------------
// Static EngineApi surface
// -----------------------------

struct SyncApi(EngineApi);

// SAFETY: immutable after construction; the info pointers reference static
// C string literals.
unsafe impl Sync for SyncApi {}

static API: SyncApi = SyncApi(EngineApi {
    info: EngineInfo {
        abi_version: NLU_ABI_VERSION,
        schema_version: NLU_SCHEMA_VERSION,
        id: c"stub".as_ptr(),
        semver: c"0.1.0".as_ptr(),
    },

    get_last_error,
    destroy_string,
    destroy_string_array,

    complete_entity_ontology_json,
    language_entity_ontology_json,
    supported_languages,
    supported_builtin_entities,
    entity_shortname,
    ontology_version,
    all_builtin_entities,
    all_grammar_entities,
    all_gazetteer_entities,

    parse_text,
    destroy_intent_parser_result,
    get_intents,
    destroy_intent_classifier_results,
});

/// The vtable, for hosts linking the stub statically.
pub fn api() -> &'static EngineApi {
    &API.0
}

#[no_mangle]
pub extern "C" fn nlu_engine_entry_v1() -> *const EngineApi {
    &API.0 as *const EngineApi
}

#[cfg(test)]
mod tests {
    use super::*;

    // the last-error slot is shared by every test thread
    static SERIAL: Mutex<()> = Mutex::new(());

    #[test]
    fn unknown_language_sets_last_error() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        reset_ledger();
        let mut out: *const c_char = ptr::null();
        let rc = unsafe { language_entity_ontology_json(c"xx".as_ptr(), &mut out) };
        assert_eq!(rc, ERR_FAIL);
        assert!(out.is_null());

        let mut err: *const c_char = ptr::null();
        assert_eq!(unsafe { get_last_error(&mut err) }, ERR_OK);
        let msg = unsafe { CStr::from_ptr(err) }.to_str().unwrap().to_owned();
        assert!(msg.starts_with("Unknown language"), "{msg}");
        assert_eq!(unsafe { destroy_string(err as *mut c_char) }, ERR_OK);
        assert!(ledger_stats().is_balanced());
    }

    #[test]
    fn empty_input_is_rejected() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: *const CIntentParserResult = ptr::null();
        assert_eq!(unsafe { parse_text(c"".as_ptr(), &mut out) }, ERR_FAIL);
        assert!(out.is_null());
    }

    #[test]
    fn intents_are_ranked_and_shelled() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        reset_ledger();
        script(
            "dim it",
            ScriptedParse::intent("dim", 0.3).alternative(ScriptedIntent::named("off", 0.6), vec![]),
        );
        let mut out: *const CIntentClassifierResultArray = ptr::null();
        assert_eq!(unsafe { get_intents(c"dim it".as_ptr(), &mut out) }, ERR_OK);
        let array = unsafe { *out };
        assert_eq!(array.size, 2);
        let first = unsafe { *array.intent_classifier_results };
        assert_eq!(unsafe { CStr::from_ptr(first.intent_name) }.to_str().unwrap(), "off");

        for i in 0..array.size as usize {
            let name = unsafe { (*array.intent_classifier_results.add(i)).intent_name };
            assert_eq!(unsafe { destroy_string(name as *mut c_char) }, ERR_OK);
        }
        assert_eq!(unsafe { destroy_intent_classifier_results(out as *mut _) }, ERR_OK);
        assert!(ledger_stats().is_balanced());
        clear_scripts();
    }

    #[test]
    fn entry_reports_versions() {
        let api = unsafe { &*nlu_engine_entry_v1() };
        assert_eq!(api.info.abi_version, NLU_ABI_VERSION);
        assert_eq!(api.info.schema_version, NLU_SCHEMA_VERSION);
        assert!(std::ptr::eq(api, super::api()));
    }
}
