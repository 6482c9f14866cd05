//! One decode function per wire structure.
//!
//! Each function adopts every text buffer it can reach before it validates
//! anything, so an early error still releases the buffers through their
//! handles. Arrays are decoded with [`drain_all`]: every element is visited
//! and the first error is reported afterwards.

use core::ffi::c_char;

use nlu_abi::ffi::*;
use nlu_abi::{
    AmountOfMoneyValue, DurationValue, InstantTimeValue, IntentClassifierResult,
    IntentParserAlternative, IntentParserResult, Range, Slot, SlotValue, TemperatureValue,
    TimeIntervalValue,
};

use super::resolve::{self, ValueKind};
use crate::errors::{BridgeError, Result};
use crate::native::{NativeRelease, NativeString};

/// Decodes every item, then returns the first error if there was one.
pub(crate) fn drain_all<T>(items: impl IntoIterator<Item = Result<T>>) -> Result<Vec<T>> {
    let mut out = Vec::new();
    let mut first_err = None;
    for item in items {
        match item {
            Ok(v) => out.push(v),
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

/// Views `size` contiguous elements at `ptr`.
///
/// # Safety
/// When `size > 0` and `ptr` is non-null, `ptr` must point to `size` live
/// elements for the duration of the returned borrow.
pub(crate) unsafe fn elements<'a, T>(ptr: *const T, size: i32, what: &str) -> Result<&'a [T]> {
    if size < 0 {
        return Err(BridgeError::SchemaMismatch(format!(
            "negative {what} size {size}"
        )));
    }
    if size == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(BridgeError::null_field(what));
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, size as usize) })
}

fn required(handle: Option<NativeString<'_>>, field: &str) -> Result<String> {
    handle
        .map(NativeString::into_string)
        .ok_or_else(|| BridgeError::null_field(field))
}

/// # Safety
/// `cell` must describe a live payload of the kind its `value_type` names.
pub(crate) unsafe fn decode_slot_value(cell: &CSlotValue, r: &dyn NativeRelease) -> Result<SlotValue> {
    // Unknown kinds have no reachable buffers; the shell release owns them.
    let kind = resolve::value_kind(cell.value_type)?;
    if cell.value.is_null() {
        return Err(BridgeError::null_field("slot value payload"));
    }

    let text = || {
        required(
            unsafe { NativeString::adopt(cell.value as *const c_char, r) },
            "slot value payload",
        )
    };

    Ok(match kind {
        ValueKind::Custom => SlotValue::Custom(text()?),
        ValueKind::MusicAlbum => SlotValue::MusicAlbum(text()?),
        ValueKind::MusicArtist => SlotValue::MusicArtist(text()?),
        ValueKind::MusicTrack => SlotValue::MusicTrack(text()?),
        ValueKind::City => SlotValue::City(text()?),
        ValueKind::Country => SlotValue::Country(text()?),
        ValueKind::Region => SlotValue::Region(text()?),
        ValueKind::Number => SlotValue::Number(unsafe { *(cell.value as *const CNumberValue) }),
        ValueKind::Percentage => {
            SlotValue::Percentage(unsafe { *(cell.value as *const CPercentageValue) })
        }
        ValueKind::Ordinal => SlotValue::Ordinal(unsafe { *(cell.value as *const COrdinalValue) }),
        ValueKind::InstantTime => {
            let c = unsafe { *(cell.value as *const CInstantTimeValue) };
            let value = unsafe { NativeString::adopt(c.value, r) };
            let grain = resolve::grain(c.grain)?;
            let precision = resolve::precision(c.precision)?;
            SlotValue::InstantTime(InstantTimeValue {
                value: required(value, "instant time value")?,
                grain,
                precision,
            })
        }
        ValueKind::TimeInterval => {
            let c = unsafe { *(cell.value as *const CTimeIntervalValue) };
            let from = unsafe { NativeString::adopt(c.from, r) };
            let to = unsafe { NativeString::adopt(c.to, r) };
            SlotValue::TimeInterval(TimeIntervalValue {
                from: from.map(NativeString::into_string),
                to: to.map(NativeString::into_string),
            })
        }
        ValueKind::AmountOfMoney => {
            let c = unsafe { *(cell.value as *const CAmountOfMoneyValue) };
            let unit = unsafe { NativeString::adopt(c.unit, r) };
            let precision = resolve::precision(c.precision)?;
            SlotValue::AmountOfMoney(AmountOfMoneyValue {
                value: c.value,
                precision,
                unit: unit.map(NativeString::into_string),
            })
        }
        ValueKind::Temperature => {
            let c = unsafe { *(cell.value as *const CTemperatureValue) };
            let unit = unsafe { NativeString::adopt(c.unit, r) };
            SlotValue::Temperature(TemperatureValue {
                value: c.value,
                unit: unit.map(NativeString::into_string),
            })
        }
        ValueKind::Duration => {
            let c = unsafe { *(cell.value as *const CDurationValue) };
            SlotValue::Duration(DurationValue {
                years: c.years,
                quarters: c.quarters,
                months: c.months,
                weeks: c.weeks,
                days: c.days,
                hours: c.hours,
                minutes: c.minutes,
                seconds: c.seconds,
                precision: resolve::precision(c.precision)?,
            })
        }
    })
}

/// Null means no alternatives.
///
/// # Safety
/// A non-null `ptr` must point to a live `CSlotValueArray`.
pub(crate) unsafe fn decode_value_array(
    ptr: *const CSlotValueArray,
    r: &dyn NativeRelease,
) -> Result<Vec<SlotValue>> {
    if ptr.is_null() {
        return Ok(Vec::new());
    }
    let array = unsafe { *ptr };
    let cells = unsafe { elements(array.slot_values, array.size, "slot value array") }?;
    drain_all(cells.iter().map(|c| unsafe { decode_slot_value(c, r) }))
}

/// # Safety
/// Every pointer in `slot` must be null or live.
pub(crate) unsafe fn decode_slot(slot: &CSlot, r: &dyn NativeRelease) -> Result<Slot> {
    let raw_value = unsafe { NativeString::adopt(slot.raw_value, r) };
    let entity = unsafe { NativeString::adopt(slot.entity, r) };
    let slot_name = unsafe { NativeString::adopt(slot.slot_name, r) };
    let value = unsafe { decode_slot_value(&slot.value, r) };
    let alternatives = unsafe { decode_value_array(slot.alternatives, r) };

    let confidence_score = (slot.confidence_score >= 0.0).then_some(slot.confidence_score);
    Ok(Slot::new(
        required(raw_value, "raw_value")?,
        value?,
        alternatives?,
        Range::new(slot.range_start, slot.range_end),
        required(entity, "entity")?,
        required(slot_name, "slot_name")?,
        confidence_score,
    ))
}

/// Null means no slots.
///
/// # Safety
/// A non-null `ptr` must point to a live `CSlotList`.
pub(crate) unsafe fn decode_slot_list(ptr: *const CSlotList, r: &dyn NativeRelease) -> Result<Vec<Slot>> {
    if ptr.is_null() {
        return Ok(Vec::new());
    }
    let list = unsafe { *ptr };
    let slots = unsafe { elements(list.slots, list.size, "slot list") }?;
    let decoded = drain_all(slots.iter().map(|s| unsafe { decode_slot(s, r) }));
    log::trace!("[decode] {} slot(s)", slots.len());
    decoded
}

/// # Safety
/// A non-null `ptr` must point to a live `CIntentClassifierResult`.
pub(crate) unsafe fn decode_intent(
    ptr: *const CIntentClassifierResult,
    r: &dyn NativeRelease,
) -> Result<IntentClassifierResult> {
    if ptr.is_null() {
        return Err(BridgeError::null_field("intent"));
    }
    let c = unsafe { *ptr };
    let name = unsafe { NativeString::adopt(c.intent_name, r) };
    Ok(IntentClassifierResult::new(
        name.map(NativeString::into_string),
        c.probability,
    ))
}

/// Decodes a classifier ranking. The array itself must be present.
///
/// # Safety
/// `array` must describe `size` live `CIntentClassifierResult`s.
pub(crate) unsafe fn decode_intent_array(
    array: &CIntentClassifierResultArray,
    r: &dyn NativeRelease,
) -> Result<Vec<IntentClassifierResult>> {
    let items = unsafe {
        elements(
            array.intent_classifier_results,
            array.size,
            "intent classifier result array",
        )
    }?;
    let decoded = drain_all(items.iter().map(|c| unsafe { decode_intent(c, r) }));
    log::trace!("[decode] {} intent(s)", items.len());
    decoded
}

/// # Safety
/// Every pointer in `alt` must be null or live.
pub(crate) unsafe fn decode_alternative(
    alt: &CIntentParserAlternative,
    r: &dyn NativeRelease,
) -> Result<IntentParserAlternative> {
    let intent = unsafe { decode_intent(alt.intent, r) };
    let slots = unsafe { decode_slot_list(alt.slots, r) };
    Ok(IntentParserAlternative::new(intent?, slots?))
}

/// Null means no alternatives.
///
/// # Safety
/// A non-null `ptr` must point to a live `CIntentParserAlternativeArray`.
pub(crate) unsafe fn decode_alternatives(
    ptr: *const CIntentParserAlternativeArray,
    r: &dyn NativeRelease,
) -> Result<Vec<IntentParserAlternative>> {
    if ptr.is_null() {
        return Ok(Vec::new());
    }
    let array = unsafe { *ptr };
    let alts = unsafe { elements(array.alternatives, array.size, "alternative array") }?;
    drain_all(alts.iter().map(|a| unsafe { decode_alternative(a, r) }))
}

/// # Safety
/// Every pointer reachable from `res` must be null or live.
pub(crate) unsafe fn decode_result(
    res: &CIntentParserResult,
    r: &dyn NativeRelease,
) -> Result<IntentParserResult> {
    let input = unsafe { NativeString::adopt(res.input, r) };
    let intent = unsafe { decode_intent(res.intent, r) };
    let slots = unsafe { decode_slot_list(res.slots, r) };
    let alternatives = unsafe { decode_alternatives(res.alternatives, r) };
    Ok(IntentParserResult::new(
        required(input, "input")?,
        intent?,
        slots?,
        alternatives?,
    ))
}
