//! Static builtin-entity ontology served by the stub.

use serde::Serialize;

pub const ONTOLOGY_VERSION: &str = "0.6.0";

pub const LANGUAGES: &[&str] = &["de", "en", "es", "fr", "it", "ja", "ko"];

const ALL: &[&str] = LANGUAGES;
const GAZETTEER_LANGUAGES: &[&str] = &["de", "en", "fr"];

/// How the engine resolves an entity: by grammar rules or by gazetteer lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Grammar,
    Gazetteer,
}

pub struct EntityKind {
    pub identifier: &'static str,
    pub shortname: &'static str,
    pub family: Family,
    description: &'static str,
    result_kind: &'static str,
    en_examples: &'static [&'static str],
    fr_examples: &'static [&'static str],
    languages: &'static [&'static str],
}

pub const ENTITIES: &[EntityKind] = &[
    EntityKind {
        identifier: "snips/amountOfMoney",
        shortname: "AmountOfMoney",
        family: Family::Grammar,
        description: "Matches an amount of money",
        result_kind: "AmountOfMoney",
        en_examples: &["$10", "six euros", "around 5€"],
        fr_examples: &["10$", "environ 5€", "six euros"],
        languages: ALL,
    },
    EntityKind {
        identifier: "snips/duration",
        shortname: "Duration",
        family: Family::Grammar,
        description: "Matches a time duration",
        result_kind: "Duration",
        en_examples: &["1h", "during two minutes", "for 20 seconds"],
        fr_examples: &["1h", "pendant deux minutes", "pendant 20 secondes"],
        languages: ALL,
    },
    EntityKind {
        identifier: "snips/number",
        shortname: "Number",
        family: Family::Grammar,
        description: "Matches a cardinal number",
        result_kind: "Number",
        en_examples: &["2001", "twenty one", "three hundred and four"],
        fr_examples: &["2001", "vingt et un", "trois cent quatre"],
        languages: ALL,
    },
    EntityKind {
        identifier: "snips/ordinal",
        shortname: "Ordinal",
        family: Family::Grammar,
        description: "Matches an ordinal number",
        result_kind: "Ordinal",
        en_examples: &["1st", "the second", "the twenty third"],
        fr_examples: &["1er", "le deuxième", "vingt-troisième"],
        languages: ALL,
    },
    EntityKind {
        identifier: "snips/temperature",
        shortname: "Temperature",
        family: Family::Grammar,
        description: "Matches a temperature",
        result_kind: "Temperature",
        en_examples: &["70K", "3°C", "Twenty three degrees"],
        fr_examples: &["70K", "3°C", "vingt-trois degrés"],
        languages: ALL,
    },
    EntityKind {
        identifier: "snips/datetime",
        shortname: "Datetime",
        family: Family::Grammar,
        description: "Matches a date, time, interval or a date and time together",
        result_kind: "InstantTime",
        en_examples: &["Today", "at 8 a.m.", "next Monday"],
        fr_examples: &["aujourd'hui", "à 8h", "lundi prochain"],
        languages: ALL,
    },
    EntityKind {
        identifier: "snips/percentage",
        shortname: "Percentage",
        family: Family::Grammar,
        description: "Matches a percentage",
        result_kind: "Percentage",
        en_examples: &["25%", "twenty percent"],
        fr_examples: &["25%", "vingt pourcents"],
        languages: ALL,
    },
    EntityKind {
        identifier: "snips/musicAlbum",
        shortname: "MusicAlbum",
        family: Family::Gazetteer,
        description: "Matches a music album",
        result_kind: "MusicAlbum",
        en_examples: &["Discovery"],
        fr_examples: &["Discovery"],
        languages: GAZETTEER_LANGUAGES,
    },
    EntityKind {
        identifier: "snips/musicArtist",
        shortname: "MusicArtist",
        family: Family::Gazetteer,
        description: "Matches a music artist",
        result_kind: "MusicArtist",
        en_examples: &["Daft Punk"],
        fr_examples: &["Daft Punk"],
        languages: GAZETTEER_LANGUAGES,
    },
    EntityKind {
        identifier: "snips/musicTrack",
        shortname: "MusicTrack",
        family: Family::Gazetteer,
        description: "Matches a music track",
        result_kind: "MusicTrack",
        en_examples: &["Harder Better Faster Stronger"],
        fr_examples: &["Harder Better Faster Stronger"],
        languages: GAZETTEER_LANGUAGES,
    },
    EntityKind {
        identifier: "snips/city",
        shortname: "City",
        family: Family::Gazetteer,
        description: "Matches a city",
        result_kind: "City",
        en_examples: &["San Francisco", "Los Angeles"],
        fr_examples: &["Paris", "Marseille"],
        languages: GAZETTEER_LANGUAGES,
    },
    EntityKind {
        identifier: "snips/country",
        shortname: "Country",
        family: Family::Gazetteer,
        description: "Matches a country",
        result_kind: "Country",
        en_examples: &["France", "Japan"],
        fr_examples: &["France", "Japon"],
        languages: GAZETTEER_LANGUAGES,
    },
    EntityKind {
        identifier: "snips/region",
        shortname: "Region",
        family: Family::Gazetteer,
        description: "Matches a region",
        result_kind: "Region",
        en_examples: &["California", "Bavaria"],
        fr_examples: &["Bretagne", "Normandie"],
        languages: GAZETTEER_LANGUAGES,
    },
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityDetails {
    name: &'static str,
    label: &'static str,
    description: &'static str,
    examples: &'static [&'static str],
    result_description: String,
    supported_languages: &'static [&'static str],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageOntology {
    language: &'static str,
    entities: Vec<EntityDetails>,
}

/// Canonical lowercase code, or the engine's "Unknown language" message.
pub fn language(code: &str) -> Result<&'static str, String> {
    LANGUAGES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(code))
        .copied()
        .ok_or_else(|| format!("Unknown language: {code}"))
}

pub fn entity(identifier: &str) -> Result<&'static EntityKind, String> {
    ENTITIES
        .iter()
        .find(|e| e.identifier == identifier)
        .ok_or_else(|| format!("Unknown builtin entity: {identifier}"))
}

pub fn entities_for(language: &str) -> Vec<&'static str> {
    ENTITIES
        .iter()
        .filter(|e| e.languages.contains(&language))
        .map(|e| e.identifier)
        .collect()
}

pub fn all_entities() -> Vec<&'static str> {
    ENTITIES.iter().map(|e| e.identifier).collect()
}

pub fn entities_of(family: Family) -> Vec<&'static str> {
    ENTITIES
        .iter()
        .filter(|e| e.family == family)
        .map(|e| e.identifier)
        .collect()
}

fn language_ontology(language: &'static str) -> LanguageOntology {
    let entities = ENTITIES
        .iter()
        .filter(|e| e.languages.contains(&language))
        .map(|e| EntityDetails {
            name: e.shortname,
            label: e.identifier,
            description: e.description,
            examples: if language == "fr" {
                e.fr_examples
            } else {
                e.en_examples
            },
            result_description: format!("[{{\"kind\": \"{}\"}}]", e.result_kind),
            supported_languages: e.languages,
        })
        .collect();
    LanguageOntology { language, entities }
}

pub fn language_ontology_json(code: &str) -> Result<String, String> {
    let language = language(code)?;
    serde_json::to_string(&language_ontology(language)).map_err(|e| e.to_string())
}

pub fn complete_ontology_json() -> Result<String, String> {
    let all: Vec<LanguageOntology> = LANGUAGES.iter().copied().map(language_ontology).collect();
    serde_json::to_string(&all).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_lookup_ignores_case() {
        assert_eq!(language("EN"), Ok("en"));
        assert_eq!(language("xx"), Err("Unknown language: xx".to_string()));
    }

    #[test]
    fn gazetteer_entities_are_language_scoped() {
        assert!(entities_for("fr").contains(&"snips/city"));
        assert!(!entities_for("ja").contains(&"snips/city"));
        assert!(entities_for("ja").contains(&"snips/datetime"));
    }

    #[test]
    fn families_split_the_catalog() {
        let grammar = entities_of(Family::Grammar);
        let gazetteer = entities_of(Family::Gazetteer);
        assert_eq!(grammar.len() + gazetteer.len(), all_entities().len());
        assert!(grammar.contains(&"snips/datetime"));
        assert!(gazetteer.contains(&"snips/musicTrack"));
        assert!(!grammar.iter().any(|id| gazetteer.contains(id)));
    }

    #[test]
    fn complete_ontology_lists_every_language() {
        let json: serde_json::Value = serde_json::from_str(&complete_ontology_json().unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), LANGUAGES.len());
    }
}
