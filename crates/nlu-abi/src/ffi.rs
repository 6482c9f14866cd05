use core::ffi::{c_char, c_void};

/// Bump this when you break the calling convention or the vtable layout.
/// Host checks it at load time.
pub const NLU_ABI_VERSION: u32 = 1;

/// Revision of the result structures below. Revision 2 appended slot
/// alternatives, slot confidence and parser alternatives, which changes the
/// `CSlot` stride, so host and engine must agree exactly.
pub const NLU_SCHEMA_VERSION: u32 = 2;

pub const ENGINE_ENTRY_SYMBOL: &str = "nlu_engine_entry_v1";

pub const ERR_OK: i32 = 0;
pub const ERR_FAIL: i32 = 1;

// ---------- Discriminants ----------
//
// Enum-like fields travel as raw `i32`. Reading an out-of-table value into a
// `#[repr(C)] enum` would be UB, so the host resolves them explicitly.

pub const SLOT_VALUE_TYPE_CUSTOM: i32 = 1;
pub const SLOT_VALUE_TYPE_NUMBER: i32 = 2;
pub const SLOT_VALUE_TYPE_ORDINAL: i32 = 3;
pub const SLOT_VALUE_TYPE_INSTANTTIME: i32 = 4;
pub const SLOT_VALUE_TYPE_TIMEINTERVAL: i32 = 5;
pub const SLOT_VALUE_TYPE_AMOUNTOFMONEY: i32 = 6;
pub const SLOT_VALUE_TYPE_TEMPERATURE: i32 = 7;
pub const SLOT_VALUE_TYPE_DURATION: i32 = 8;
pub const SLOT_VALUE_TYPE_PERCENTAGE: i32 = 9;
pub const SLOT_VALUE_TYPE_MUSICALBUM: i32 = 10;
pub const SLOT_VALUE_TYPE_MUSICARTIST: i32 = 11;
pub const SLOT_VALUE_TYPE_MUSICTRACK: i32 = 12;
// schema revision 2
pub const SLOT_VALUE_TYPE_CITY: i32 = 13;
pub const SLOT_VALUE_TYPE_COUNTRY: i32 = 14;
pub const SLOT_VALUE_TYPE_REGION: i32 = 15;

pub const GRAIN_YEAR: i32 = 0;
pub const GRAIN_QUARTER: i32 = 1;
pub const GRAIN_MONTH: i32 = 2;
pub const GRAIN_WEEK: i32 = 3;
pub const GRAIN_DAY: i32 = 4;
pub const GRAIN_HOUR: i32 = 5;
pub const GRAIN_MINUTE: i32 = 6;
pub const GRAIN_SECOND: i32 = 7;

pub const PRECISION_APPROXIMATE: i32 = 0;
pub const PRECISION_EXACT: i32 = 1;

// ---------- Result structures (field order is the binary contract) ----------

pub type CNumberValue = f64;
pub type CPercentageValue = f64;
pub type COrdinalValue = i64;

/// Tagged cell. `value` points to a `c_char` string, a `CNumberValue`,
/// a `COrdinalValue` or one of the payload structs below, depending on
/// `value_type`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CSlotValue {
    pub value: *const c_void,
    pub value_type: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CInstantTimeValue {
    pub value: *const c_char,
    pub grain: i32,
    pub precision: i32,
}

/// Null `from`/`to` means the bound is open.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CTimeIntervalValue {
    pub from: *const c_char,
    pub to: *const c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CAmountOfMoneyValue {
    pub unit: *const c_char,
    pub value: f32,
    pub precision: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CTemperatureValue {
    pub unit: *const c_char,
    pub value: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CDurationValue {
    pub years: i64,
    pub quarters: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub precision: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CSlotValueArray {
    pub slot_values: *const CSlotValue,
    pub size: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CSlot {
    pub value: CSlotValue,
    pub raw_value: *const c_char,
    pub entity: *const c_char,
    pub slot_name: *const c_char,
    pub range_start: i32,
    pub range_end: i32,
    /// Null means no alternatives.
    pub alternatives: *const CSlotValueArray,
    /// Negative means the engine did not score this slot.
    pub confidence_score: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CSlotList {
    pub slots: *const CSlot,
    pub size: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CIntentClassifierResult {
    /// Null when no intent matched.
    pub intent_name: *const c_char,
    pub probability: f32,
}

/// Every intent the classifier scored for one input, best first.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CIntentClassifierResultArray {
    pub intent_classifier_results: *const CIntentClassifierResult,
    pub size: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CIntentParserAlternative {
    pub intent: *const CIntentClassifierResult,
    pub slots: *const CSlotList,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CIntentParserAlternativeArray {
    pub alternatives: *const CIntentParserAlternative,
    pub size: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CIntentParserResult {
    pub input: *const c_char,
    pub intent: *const CIntentClassifierResult,
    pub slots: *const CSlotList,
    /// Null means no alternatives.
    pub alternatives: *const CIntentParserAlternativeArray,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CStringArray {
    pub data: *const *const c_char,
    pub size: i32,
}

#[repr(C)]
pub struct EngineInfo {
    pub abi_version: u32,
    pub schema_version: u32,
    pub id: *const c_char,     // "stub"
    pub semver: *const c_char, // "0.1.0"
}

// ---------- Function pointer types (C ABI) ----------
//
// Every entry point returns ERR_OK or ERR_FAIL. On ERR_FAIL the message is
// fetched through `get_last_error` and released through `destroy_string`.

pub type GetLastErrorFn = unsafe extern "C" fn(error: *mut *const c_char) -> i32;
pub type DestroyStringFn = unsafe extern "C" fn(string: *mut c_char) -> i32;
pub type DestroyStringArrayFn = unsafe extern "C" fn(array: *mut CStringArray) -> i32;

pub type CompleteOntologyJsonFn = unsafe extern "C" fn(result: *mut *const c_char) -> i32;
pub type LanguageOntologyJsonFn =
    unsafe extern "C" fn(language: *const c_char, result: *mut *const c_char) -> i32;

pub type SupportedLanguagesFn = unsafe extern "C" fn(result: *mut *const CStringArray) -> i32;
/// Identifier lists that need no language: all, grammar or gazetteer entities.
pub type EntityListFn = unsafe extern "C" fn(result: *mut *const CStringArray) -> i32;
pub type SupportedEntitiesFn =
    unsafe extern "C" fn(language: *const c_char, result: *mut *const CStringArray) -> i32;
pub type EntityShortnameFn =
    unsafe extern "C" fn(entity: *const c_char, result: *mut *const c_char) -> i32;
pub type OntologyVersionFn = unsafe extern "C" fn(result: *mut *const c_char) -> i32;

pub type ParseTextFn =
    unsafe extern "C" fn(input: *const c_char, result: *mut *const CIntentParserResult) -> i32;
/// Releases the structure shell only. Text buffers inside it belong to the
/// caller once handed out and go through `destroy_string`.
pub type DestroyIntentParserResultFn =
    unsafe extern "C" fn(result: *mut CIntentParserResult) -> i32;
pub type GetIntentsFn = unsafe extern "C" fn(
    input: *const c_char,
    result: *mut *const CIntentClassifierResultArray,
) -> i32;
/// Shell only, like `DestroyIntentParserResultFn`.
pub type DestroyIntentResultsFn =
    unsafe extern "C" fn(result: *mut CIntentClassifierResultArray) -> i32;

// ---------- VTable ----------

#[repr(C)]
pub struct EngineApi {
    pub info: EngineInfo,

    // Diagnostics & memory management
    pub get_last_error: GetLastErrorFn,
    pub destroy_string: DestroyStringFn,
    pub destroy_string_array: DestroyStringArrayFn,

    // Ontology
    pub complete_entity_ontology_json: CompleteOntologyJsonFn,
    pub language_entity_ontology_json: LanguageOntologyJsonFn,
    pub supported_languages: SupportedLanguagesFn,
    pub supported_builtin_entities: SupportedEntitiesFn,
    pub entity_shortname: EntityShortnameFn,
    pub ontology_version: OntologyVersionFn,
    pub all_builtin_entities: EntityListFn,
    pub all_grammar_entities: EntityListFn,
    pub all_gazetteer_entities: EntityListFn,

    // Parsing
    pub parse_text: ParseTextFn,
    pub destroy_intent_parser_result: DestroyIntentParserResultFn,
    pub get_intents: GetIntentsFn,
    pub destroy_intent_classifier_results: DestroyIntentResultsFn,
}

/// Engine must export `nlu_engine_entry_v1` returning a pointer to a static `EngineApi`.
pub type EngineEntryFn = unsafe extern "C" fn() -> *const EngineApi;
