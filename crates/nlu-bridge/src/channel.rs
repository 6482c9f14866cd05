//! Status-code protocol shared by every engine entry point.
//!
//! Callers hold the engine lock across the native call and `check`, so the
//! message read here belongs to the call that just failed.

use core::ffi::c_char;

use nlu_abi::ffi::{ERR_OK, EngineApi};

use crate::errors::{BridgeError, Result};
use crate::native::NativeString;

/// Turns a status into `Ok(())` or an `Engine` error carrying the engine's
/// last-error message.
pub(crate) fn check(api: &EngineApi, entry: &str, status: i32) -> Result<()> {
    if status == ERR_OK {
        return Ok(());
    }
    let msg = last_error(api).unwrap_or_else(|| format!("{entry} failed"));
    log::debug!("[engine] {entry} returned {status}: {msg}");
    Err(BridgeError::Engine(msg))
}

/// Fetches, copies and releases the pending error message.
fn last_error(api: &EngineApi) -> Option<String> {
    let mut ptr: *const c_char = std::ptr::null();
    let rc = unsafe { (api.get_last_error)(&mut ptr) };
    // A buffer handed out alongside a failing status is still ours to release.
    let handle = unsafe { NativeString::adopt(ptr, api) };
    if rc != ERR_OK {
        log::warn!("[engine] get_last_error returned {rc}");
        return None;
    }
    handle
        .map(NativeString::into_string)
        .filter(|msg| !msg.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::ffi::c_char;
    use std::cell::Cell;
    use std::ffi::CString;

    use nlu_abi::ffi::*;

    thread_local! {
        static HANDED_OUT: Cell<usize> = const { Cell::new(0) };
        static RELEASED: Cell<usize> = const { Cell::new(0) };
    }

    fn hand_out(msg: &str) -> *const c_char {
        HANDED_OUT.with(|c| c.set(c.get() + 1));
        CString::new(msg).unwrap().into_raw()
    }

    unsafe extern "C" fn destroy_string(s: *mut c_char) -> i32 {
        RELEASED.with(|c| c.set(c.get() + 1));
        drop(unsafe { CString::from_raw(s) });
        ERR_OK
    }

    unsafe extern "C" fn with_message(out: *mut *const c_char) -> i32 {
        unsafe { *out = hand_out("Unknown language: xx") };
        ERR_OK
    }

    unsafe extern "C" fn without_message(out: *mut *const c_char) -> i32 {
        unsafe { *out = std::ptr::null() };
        ERR_OK
    }

    unsafe extern "C" fn empty_message(out: *mut *const c_char) -> i32 {
        unsafe { *out = hand_out("") };
        ERR_OK
    }

    /// Fails, yet still hands out a buffer.
    unsafe extern "C" fn failing_with_buffer(out: *mut *const c_char) -> i32 {
        unsafe { *out = hand_out("half-written") };
        ERR_FAIL
    }

    unsafe extern "C" fn no_array(_: *mut CStringArray) -> i32 {
        ERR_OK
    }
    unsafe extern "C" fn no_text(_: *mut *const c_char) -> i32 {
        ERR_FAIL
    }
    unsafe extern "C" fn no_text_for(_: *const c_char, _: *mut *const c_char) -> i32 {
        ERR_FAIL
    }
    unsafe extern "C" fn no_list(_: *mut *const CStringArray) -> i32 {
        ERR_FAIL
    }
    unsafe extern "C" fn no_list_for(_: *const c_char, _: *mut *const CStringArray) -> i32 {
        ERR_FAIL
    }
    unsafe extern "C" fn no_parse(_: *const c_char, _: *mut *const CIntentParserResult) -> i32 {
        ERR_FAIL
    }
    unsafe extern "C" fn no_parse_shell(_: *mut CIntentParserResult) -> i32 {
        ERR_OK
    }
    unsafe extern "C" fn no_intents(
        _: *const c_char,
        _: *mut *const CIntentClassifierResultArray,
    ) -> i32 {
        ERR_FAIL
    }
    unsafe extern "C" fn no_intents_shell(_: *mut CIntentClassifierResultArray) -> i32 {
        ERR_OK
    }

    fn api(get_last_error: GetLastErrorFn) -> EngineApi {
        EngineApi {
            info: EngineInfo {
                abi_version: NLU_ABI_VERSION,
                schema_version: NLU_SCHEMA_VERSION,
                id: std::ptr::null(),
                semver: std::ptr::null(),
            },
            get_last_error,
            destroy_string,
            destroy_string_array: no_array,
            complete_entity_ontology_json: no_text,
            language_entity_ontology_json: no_text_for,
            supported_languages: no_list,
            supported_builtin_entities: no_list_for,
            entity_shortname: no_text_for,
            ontology_version: no_text,
            all_builtin_entities: no_list,
            all_grammar_entities: no_list,
            all_gazetteer_entities: no_list,
            parse_text: no_parse,
            destroy_intent_parser_result: no_parse_shell,
            get_intents: no_intents,
            destroy_intent_classifier_results: no_intents_shell,
        }
    }

    fn balanced() -> bool {
        HANDED_OUT.with(Cell::get) == RELEASED.with(Cell::get)
    }

    #[test]
    fn ok_status_never_reads_the_error_slot() {
        let api = api(with_message);
        assert!(check(&api, "ontology_version", ERR_OK).is_ok());
        assert_eq!(HANDED_OUT.with(Cell::get), 0);
    }

    #[test]
    fn failure_carries_engine_message() {
        let api = api(with_message);
        let err = check(&api, "language_entity_ontology_json", ERR_FAIL).unwrap_err();
        assert!(matches!(&err, BridgeError::Engine(m) if m == "Unknown language: xx"));
        assert!(err.is_unknown_language());
        assert!(balanced());
    }

    #[test]
    fn missing_message_falls_back_to_entry_name() {
        for fetch in [without_message as GetLastErrorFn, empty_message] {
            let api = api(fetch);
            let err = check(&api, "complete_entity_ontology_json", ERR_FAIL).unwrap_err();
            assert!(
                matches!(&err, BridgeError::Engine(m) if m == "complete_entity_ontology_json failed"),
                "{err}"
            );
        }
        assert!(balanced());
    }

    #[test]
    fn failing_fetch_still_releases_its_buffer() {
        let api = api(failing_with_buffer);
        let err = check(&api, "parse_text", 7).unwrap_err();
        assert!(matches!(&err, BridgeError::Engine(m) if m == "parse_text failed"));
        assert_eq!(RELEASED.with(Cell::get), 1);
        assert!(balanced());
    }

    #[test]
    fn real_entries_fail_through_the_channel() {
        let api = api(without_message);
        let mut out: *const c_char = std::ptr::null();
        let rc = unsafe { (api.ontology_version)(&mut out) };
        let err = check(&api, "ontology_version", rc).unwrap_err();
        assert_eq!(err.to_string(), "ontology_version failed");
    }
}
