//! Read-only ontology queries.
//!
//! The documents are returned as the engine wrote them. The typed views
//! below are an opt-in parse of the same text.

use core::ffi::c_char;

use nlu_abi::ffi::{CStringArray, EngineApi, EntityListFn};
use serde::{Deserialize, Serialize};

use crate::channel::check;
use crate::engine::{Engine, c_arg};
use crate::errors::{BridgeError, Result};
use crate::native::{NativeString, NativeStringArray};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetails {
    pub name: String,
    pub label: String,
    pub description: String,
    pub examples: Vec<String>,
    pub result_description: String,
    pub supported_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOntology {
    pub language: String,
    pub entities: Vec<EntityDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompleteOntology(pub Vec<LanguageOntology>);

impl CompleteOntology {
    pub fn language(&self, code: &str) -> Option<&LanguageOntology> {
        self.0.iter().find(|l| l.language.eq_ignore_ascii_case(code))
    }
}

impl Engine {
    /// Ontology of every entity kind the engine supports.
    pub fn complete_ontology(&self) -> Result<String> {
        self.with_lock(|api| {
            let mut out: *const c_char = std::ptr::null();
            let rc = unsafe { (api.complete_entity_ontology_json)(&mut out) };
            check(api, "complete_entity_ontology_json", rc)?;
            document(unsafe { NativeString::adopt(out, api) }, "complete ontology")
        })
    }

    /// Ontology scoped to one language. Unknown codes fail with an
    /// "Unknown language" message; see [`BridgeError::is_unknown_language`].
    pub fn ontology_for_language(&self, code: &str) -> Result<String> {
        let language = c_arg(code, "language code")?;
        self.with_lock(|api| {
            let mut out: *const c_char = std::ptr::null();
            let rc = unsafe { (api.language_entity_ontology_json)(language.as_ptr(), &mut out) };
            check(api, "language_entity_ontology_json", rc)?;
            document(unsafe { NativeString::adopt(out, api) }, "language ontology")
        })
    }

    pub fn complete_ontology_typed(&self) -> Result<CompleteOntology> {
        parse_document(&self.complete_ontology()?)
    }

    pub fn ontology_for_language_typed(&self, code: &str) -> Result<LanguageOntology> {
        parse_document(&self.ontology_for_language(code)?)
    }

    pub fn supported_languages(&self) -> Result<Vec<String>> {
        self.with_lock(|api| {
            let mut out: *const CStringArray = std::ptr::null();
            let rc = unsafe { (api.supported_languages)(&mut out) };
            check(api, "supported_languages", rc)?;
            string_list(unsafe { NativeStringArray::adopt(out, api) }, "supported languages")
        })
    }

    /// Builtin entity identifiers (`snips/datetime`, ...) for one language.
    pub fn supported_builtin_entities(&self, code: &str) -> Result<Vec<String>> {
        let language = c_arg(code, "language code")?;
        self.with_lock(|api| {
            let mut out: *const CStringArray = std::ptr::null();
            let rc = unsafe { (api.supported_builtin_entities)(language.as_ptr(), &mut out) };
            check(api, "supported_builtin_entities", rc)?;
            string_list(unsafe { NativeStringArray::adopt(out, api) }, "builtin entities")
        })
    }

    /// Every builtin entity identifier, whatever its language.
    pub fn all_builtin_entities(&self) -> Result<Vec<String>> {
        self.entity_list("all_builtin_entities", |api| api.all_builtin_entities)
    }

    /// Builtin entities resolved by grammars (numbers, dates, amounts, ...).
    pub fn all_grammar_entities(&self) -> Result<Vec<String>> {
        self.entity_list("all_grammar_entities", |api| api.all_grammar_entities)
    }

    /// Builtin entities resolved from gazetteers (cities, music, ...).
    pub fn all_gazetteer_entities(&self) -> Result<Vec<String>> {
        self.entity_list("all_gazetteer_entities", |api| api.all_gazetteer_entities)
    }

    fn entity_list(&self, entry: &str, pick: fn(&EngineApi) -> EntityListFn) -> Result<Vec<String>> {
        self.with_lock(|api| {
            let mut out: *const CStringArray = std::ptr::null();
            let rc = unsafe { pick(api)(&mut out) };
            check(api, entry, rc)?;
            string_list(unsafe { NativeStringArray::adopt(out, api) }, entry)
        })
    }

    /// `snips/amountOfMoney` -> `AmountOfMoney`.
    pub fn entity_shortname(&self, entity: &str) -> Result<String> {
        let entity = c_arg(entity, "entity identifier")?;
        self.with_lock(|api| {
            let mut out: *const c_char = std::ptr::null();
            let rc = unsafe { (api.entity_shortname)(entity.as_ptr(), &mut out) };
            check(api, "entity_shortname", rc)?;
            unsafe { NativeString::adopt(out, api) }
                .map(NativeString::into_string)
                .ok_or_else(|| BridgeError::null_field("entity shortname"))
        })
    }

    pub fn ontology_version(&self) -> Result<String> {
        self.with_lock(|api| {
            let mut out: *const c_char = std::ptr::null();
            let rc = unsafe { (api.ontology_version)(&mut out) };
            check(api, "ontology_version", rc)?;
            unsafe { NativeString::adopt(out, api) }
                .map(NativeString::into_string)
                .ok_or_else(|| BridgeError::null_field("ontology version"))
        })
    }
}

fn document(handle: Option<NativeString<'_>>, what: &str) -> Result<String> {
    let text = handle
        .map(NativeString::into_string)
        .ok_or_else(|| BridgeError::null_field(what))?;
    if text.is_empty() {
        return Err(BridgeError::Engine(format!("engine returned an empty {what}")));
    }
    Ok(text)
}

fn parse_document<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| BridgeError::SchemaMismatch(format!("ontology document: {e}")))
}

fn string_list(handle: Option<NativeStringArray<'_>>, what: &str) -> Result<Vec<String>> {
    let handle = handle.ok_or_else(|| BridgeError::null_field(what))?;
    handle
        .to_vec()
        .ok_or_else(|| BridgeError::SchemaMismatch(format!("malformed {what} array")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_ontology_reads_camel_case() {
        let json = r#"{
            "language": "en",
            "entities": [{
                "name": "Amount of money",
                "label": "snips/amountOfMoney",
                "description": "Matches an amount of money",
                "examples": ["$10", "six euros"],
                "resultDescription": "[]",
                "supportedLanguages": ["en", "fr"]
            }]
        }"#;
        let onto: LanguageOntology = serde_json::from_str(json).unwrap();
        assert_eq!(onto.language, "en");
        assert_eq!(onto.entities[0].label, "snips/amountOfMoney");
        assert_eq!(onto.entities[0].supported_languages, vec!["en", "fr"]);
    }

    #[test]
    fn complete_ontology_finds_language_case_insensitively() {
        let all = CompleteOntology(vec![LanguageOntology {
            language: "de".into(),
            entities: vec![],
        }]);
        assert!(all.language("DE").is_some());
        assert!(all.language("en").is_none());
    }
}
