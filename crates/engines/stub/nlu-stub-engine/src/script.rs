//! Parse results the stub serves, keyed by input text.
//!
//! Scripts live per thread, like the ledger, so parallel tests never see
//! each other's inputs.

use std::cell::RefCell;
use std::collections::HashMap;

use nlu_abi::ffi::*;

/// Slot value as the stub writes it. Grain and precision stay raw codes so
/// a script can put anything on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedValue {
    Custom(String),
    Number(f64),
    Ordinal(i64),
    Percentage(f64),
    InstantTime {
        value: String,
        grain: i32,
        precision: i32,
    },
    TimeInterval {
        from: Option<String>,
        to: Option<String>,
    },
    AmountOfMoney {
        value: f32,
        precision: i32,
        unit: Option<String>,
    },
    Temperature {
        value: f32,
        unit: Option<String>,
    },
    Duration {
        /// years, quarters, months, weeks, days, hours, minutes, seconds
        parts: [i64; 8],
        precision: i32,
    },
    MusicAlbum(String),
    MusicArtist(String),
    MusicTrack(String),
    City(String),
    Country(String),
    Region(String),
}

impl ScriptedValue {
    pub fn kind_code(&self) -> i32 {
        match self {
            ScriptedValue::Custom(_) => SLOT_VALUE_TYPE_CUSTOM,
            ScriptedValue::Number(_) => SLOT_VALUE_TYPE_NUMBER,
            ScriptedValue::Ordinal(_) => SLOT_VALUE_TYPE_ORDINAL,
            ScriptedValue::Percentage(_) => SLOT_VALUE_TYPE_PERCENTAGE,
            ScriptedValue::InstantTime { .. } => SLOT_VALUE_TYPE_INSTANTTIME,
            ScriptedValue::TimeInterval { .. } => SLOT_VALUE_TYPE_TIMEINTERVAL,
            ScriptedValue::AmountOfMoney { .. } => SLOT_VALUE_TYPE_AMOUNTOFMONEY,
            ScriptedValue::Temperature { .. } => SLOT_VALUE_TYPE_TEMPERATURE,
            ScriptedValue::Duration { .. } => SLOT_VALUE_TYPE_DURATION,
            ScriptedValue::MusicAlbum(_) => SLOT_VALUE_TYPE_MUSICALBUM,
            ScriptedValue::MusicArtist(_) => SLOT_VALUE_TYPE_MUSICARTIST,
            ScriptedValue::MusicTrack(_) => SLOT_VALUE_TYPE_MUSICTRACK,
            ScriptedValue::City(_) => SLOT_VALUE_TYPE_CITY,
            ScriptedValue::Country(_) => SLOT_VALUE_TYPE_COUNTRY,
            ScriptedValue::Region(_) => SLOT_VALUE_TYPE_REGION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedSlot {
    pub raw_value: String,
    pub value: ScriptedValue,
    /// Written instead of the value's own kind code.
    pub kind_override: Option<i32>,
    pub alternatives: Vec<ScriptedValue>,
    pub range: (i32, i32),
    pub entity: String,
    pub slot_name: String,
    pub confidence: Option<f32>,
}

impl ScriptedSlot {
    pub fn new(
        raw_value: &str,
        value: ScriptedValue,
        range: (i32, i32),
        entity: &str,
        slot_name: &str,
    ) -> Self {
        Self {
            raw_value: raw_value.to_string(),
            value,
            kind_override: None,
            alternatives: Vec::new(),
            range,
            entity: entity.to_string(),
            slot_name: slot_name.to_string(),
            confidence: None,
        }
    }

    pub fn with_kind_code(mut self, code: i32) -> Self {
        self.kind_override = Some(code);
        self
    }

    pub fn with_alternatives(mut self, alternatives: Vec<ScriptedValue>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptedIntent {
    pub name: Option<String>,
    pub probability: f32,
}

impl ScriptedIntent {
    pub fn named(name: &str, probability: f32) -> Self {
        Self {
            name: Some(name.to_string()),
            probability,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptedParse {
    pub intent: ScriptedIntent,
    pub slots: Vec<ScriptedSlot>,
    pub alternatives: Vec<(ScriptedIntent, Vec<ScriptedSlot>)>,
}

impl ScriptedParse {
    pub fn intent(name: &str, probability: f32) -> Self {
        Self {
            intent: ScriptedIntent::named(name, probability),
            ..Self::default()
        }
    }

    pub fn slot(mut self, slot: ScriptedSlot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn alternative(mut self, intent: ScriptedIntent, slots: Vec<ScriptedSlot>) -> Self {
        self.alternatives.push((intent, slots));
        self
    }

    /// The top intent and every alternative's intent, most probable first.
    pub fn ranking(&self) -> Vec<ScriptedIntent> {
        let mut intents: Vec<ScriptedIntent> = std::iter::once(&self.intent)
            .chain(self.alternatives.iter().map(|(intent, _)| intent))
            .cloned()
            .collect();
        intents.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        intents
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Parse(ScriptedParse),
    Fail(String),
}

thread_local! {
    static SCRIPTS: RefCell<HashMap<String, Outcome>> = RefCell::new(HashMap::new());
}

/// Serves `parse` whenever the calling thread parses `input`.
pub fn script(input: &str, parse: ScriptedParse) {
    SCRIPTS.with(|s| s.borrow_mut().insert(input.to_string(), Outcome::Parse(parse)));
}

/// Makes parsing `input` fail with `message` on the calling thread.
pub fn script_failure(input: &str, message: &str) {
    SCRIPTS.with(|s| {
        s.borrow_mut()
            .insert(input.to_string(), Outcome::Fail(message.to_string()))
    });
}

pub fn clear_scripts() {
    SCRIPTS.with(|s| s.borrow_mut().clear());
}

/// Unscripted input parses to no intent and no slots.
pub(crate) fn lookup(input: &str) -> Outcome {
    SCRIPTS
        .with(|s| s.borrow().get(input).cloned())
        .unwrap_or_else(|| Outcome::Parse(ScriptedParse::default()))
}
