//! Lays scripted results out in the wire structures.

use core::ffi::{c_char, c_void};

use nlu_abi::ffi::*;

use crate::ledger::{self, ShellStorage};
use crate::script::{ScriptedIntent, ScriptedParse, ScriptedSlot, ScriptedValue};

fn text(s: &str) -> *const c_char {
    ledger::alloc_string(s)
}

fn opt_text(s: &Option<String>) -> *const c_char {
    s.as_deref().map_or(std::ptr::null(), text)
}

fn erase<T>(p: *const T) -> *const c_void {
    p as *const c_void
}

/// Writes the payload and returns the cell plus its text buffers.
fn encode_value(
    value: &ScriptedValue,
    storage: &mut ShellStorage,
) -> (CSlotValue, Vec<*const c_char>) {
    let mut texts = Vec::new();
    let mut t = |s: &str| {
        let p = text(s);
        texts.push(p);
        p
    };
    let payload = match value {
        ScriptedValue::Custom(s)
        | ScriptedValue::MusicAlbum(s)
        | ScriptedValue::MusicArtist(s)
        | ScriptedValue::MusicTrack(s)
        | ScriptedValue::City(s)
        | ScriptedValue::Country(s)
        | ScriptedValue::Region(s) => erase(t(s.as_str())),
        ScriptedValue::Number(n) | ScriptedValue::Percentage(n) => erase(storage.boxed(*n)),
        ScriptedValue::Ordinal(n) => erase(storage.boxed(*n)),
        ScriptedValue::InstantTime {
            value,
            grain,
            precision,
        } => erase(storage.boxed(CInstantTimeValue {
            value: t(value.as_str()),
            grain: *grain,
            precision: *precision,
        })),
        ScriptedValue::TimeInterval { from, to } => {
            let from = from.as_deref().map_or(std::ptr::null(), &mut t);
            let to = to.as_deref().map_or(std::ptr::null(), &mut t);
            erase(storage.boxed(CTimeIntervalValue { from, to }))
        }
        ScriptedValue::AmountOfMoney {
            value,
            precision,
            unit,
        } => {
            let unit = unit.as_deref().map_or(std::ptr::null(), &mut t);
            erase(storage.boxed(CAmountOfMoneyValue {
                unit,
                value: *value,
                precision: *precision,
            }))
        }
        ScriptedValue::Temperature { value, unit } => {
            let unit = unit.as_deref().map_or(std::ptr::null(), &mut t);
            erase(storage.boxed(CTemperatureValue {
                unit,
                value: *value,
            }))
        }
        ScriptedValue::Duration { parts, precision } => {
            let [years, quarters, months, weeks, days, hours, minutes, seconds] = *parts;
            erase(storage.boxed(CDurationValue {
                years,
                quarters,
                months,
                weeks,
                days,
                hours,
                minutes,
                seconds,
                precision: *precision,
            }))
        }
    };
    (
        CSlotValue {
            value: payload,
            value_type: value.kind_code(),
        },
        texts,
    )
}

fn encode_slot(slot: &ScriptedSlot, storage: &mut ShellStorage) -> CSlot {
    let (mut value, texts) = encode_value(&slot.value, storage);
    if let Some(code) = slot.kind_override {
        value.value_type = code;
        // behind an out-of-table code the host cannot see these
        if !(SLOT_VALUE_TYPE_CUSTOM..=SLOT_VALUE_TYPE_REGION).contains(&code) {
            storage.orphans.extend(texts);
        }
    }

    let alternatives = if slot.alternatives.is_empty() {
        std::ptr::null()
    } else {
        let cells: Vec<CSlotValue> = slot
            .alternatives
            .iter()
            .map(|v| encode_value(v, storage).0)
            .collect();
        let size = cells.len() as i32;
        let slot_values = storage.slice(cells);
        storage.boxed(CSlotValueArray { slot_values, size })
    };

    CSlot {
        value,
        raw_value: text(&slot.raw_value),
        entity: text(&slot.entity),
        slot_name: text(&slot.slot_name),
        range_start: slot.range.0,
        range_end: slot.range.1,
        alternatives,
        confidence_score: slot.confidence.unwrap_or(-1.0),
    }
}

fn encode_slots(slots: &[ScriptedSlot], storage: &mut ShellStorage) -> *const CSlotList {
    let cells: Vec<CSlot> = slots.iter().map(|s| encode_slot(s, storage)).collect();
    let size = cells.len() as i32;
    let slots = storage.slice(cells);
    storage.boxed(CSlotList { slots, size })
}

fn encode_intent(intent: &ScriptedIntent, storage: &mut ShellStorage) -> *const CIntentClassifierResult {
    storage.boxed(CIntentClassifierResult {
        intent_name: opt_text(&intent.name),
        probability: intent.probability,
    })
}

/// Builds the full structure and registers its shell with the ledger.
pub(crate) fn encode_parse(input: &str, parse: &ScriptedParse) -> *const CIntentParserResult {
    let mut storage = ShellStorage::default();

    let alternatives = if parse.alternatives.is_empty() {
        std::ptr::null()
    } else {
        let alts: Vec<CIntentParserAlternative> = parse
            .alternatives
            .iter()
            .map(|(intent, slots)| CIntentParserAlternative {
                intent: encode_intent(intent, &mut storage),
                slots: encode_slots(slots, &mut storage),
            })
            .collect();
        let size = alts.len() as i32;
        let alternatives = storage.slice(alts);
        storage.boxed(CIntentParserAlternativeArray { alternatives, size })
    };

    let root = CIntentParserResult {
        input: text(input),
        intent: encode_intent(&parse.intent, &mut storage),
        slots: encode_slots(&parse.slots, &mut storage),
        alternatives,
    };
    let root = storage.boxed(root);
    ledger::register_shell(root, storage);
    root
}

/// Lays out a classifier ranking as one shell.
pub(crate) fn encode_intents(intents: &[ScriptedIntent]) -> *const CIntentClassifierResultArray {
    let mut storage = ShellStorage::default();
    let cells: Vec<CIntentClassifierResult> = intents
        .iter()
        .map(|i| CIntentClassifierResult {
            intent_name: opt_text(&i.name),
            probability: i.probability,
        })
        .collect();
    let size = cells.len() as i32;
    let intent_classifier_results = storage.slice(cells);
    let root = storage.boxed(CIntentClassifierResultArray {
        intent_classifier_results,
        size,
    });
    ledger::register_shell(root, storage);
    root
}
