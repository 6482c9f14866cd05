//! Host-native result model.
//!
//! Values here are built once from a single decode pass and never alias
//! engine memory. Composite types keep their fields private so a decoded
//! result cannot be edited behind the decoder's back; payload structs are
//! plain data.

use std::cmp::Ordering;

use crate::ffi::*;

/// Byte offsets into the parsed input. `start <= end` is expected of the
/// engine but not enforced here: values pass through exactly as decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    start: i32,
    end: i32,
}

impl Range {
    #[inline]
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> i32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> i32 {
        self.end
    }

    /// `0 <= start <= end`.
    pub fn is_well_formed(&self) -> bool {
        0 <= self.start && self.start <= self.end
    }

    /// Slice of `input` covered by this range, if it lands on char boundaries.
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        if !self.is_well_formed() {
            return None;
        }
        input.get(self.start as usize..self.end as usize)
    }
}

/// Time granularity. Ordered coarse to fine: `Year > Quarter > ... > Second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grain {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Grain {
    pub const ALL: [Grain; 8] = [
        Grain::Year,
        Grain::Quarter,
        Grain::Month,
        Grain::Week,
        Grain::Day,
        Grain::Hour,
        Grain::Minute,
        Grain::Second,
    ];

    /// Wire code (`GRAIN_*`).
    pub fn code(self) -> i32 {
        match self {
            Grain::Year => GRAIN_YEAR,
            Grain::Quarter => GRAIN_QUARTER,
            Grain::Month => GRAIN_MONTH,
            Grain::Week => GRAIN_WEEK,
            Grain::Day => GRAIN_DAY,
            Grain::Hour => GRAIN_HOUR,
            Grain::Minute => GRAIN_MINUTE,
            Grain::Second => GRAIN_SECOND,
        }
    }
}

impl Ord for Grain {
    fn cmp(&self, other: &Self) -> Ordering {
        // lower code = coarser = greater
        other.code().cmp(&self.code())
    }
}

impl PartialOrd for Grain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Approximate,
    Exact,
}

impl Precision {
    /// Wire code (`PRECISION_*`).
    pub fn code(self) -> i32 {
        match self {
            Precision::Approximate => PRECISION_APPROXIMATE,
            Precision::Exact => PRECISION_EXACT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstantTimeValue {
    pub value: String,
    pub grain: Grain,
    pub precision: Precision,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeIntervalValue {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmountOfMoneyValue {
    pub value: f32,
    pub precision: Precision,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureValue {
    pub value: f32,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationValue {
    pub years: i64,
    pub quarters: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub precision: Precision,
}

/// Resolved value of a slot. The variant is the discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Custom(String),
    Number(f64),
    Ordinal(i64),
    Percentage(f64),
    InstantTime(InstantTimeValue),
    TimeInterval(TimeIntervalValue),
    AmountOfMoney(AmountOfMoneyValue),
    Temperature(TemperatureValue),
    Duration(DurationValue),
    MusicAlbum(String),
    MusicArtist(String),
    MusicTrack(String),
    City(String),
    Country(String),
    Region(String),
}

impl SlotValue {
    /// Wire code (`SLOT_VALUE_TYPE_*`).
    pub fn kind_code(&self) -> i32 {
        match self {
            SlotValue::Custom(_) => SLOT_VALUE_TYPE_CUSTOM,
            SlotValue::Number(_) => SLOT_VALUE_TYPE_NUMBER,
            SlotValue::Ordinal(_) => SLOT_VALUE_TYPE_ORDINAL,
            SlotValue::InstantTime(_) => SLOT_VALUE_TYPE_INSTANTTIME,
            SlotValue::TimeInterval(_) => SLOT_VALUE_TYPE_TIMEINTERVAL,
            SlotValue::AmountOfMoney(_) => SLOT_VALUE_TYPE_AMOUNTOFMONEY,
            SlotValue::Temperature(_) => SLOT_VALUE_TYPE_TEMPERATURE,
            SlotValue::Duration(_) => SLOT_VALUE_TYPE_DURATION,
            SlotValue::Percentage(_) => SLOT_VALUE_TYPE_PERCENTAGE,
            SlotValue::MusicAlbum(_) => SLOT_VALUE_TYPE_MUSICALBUM,
            SlotValue::MusicArtist(_) => SLOT_VALUE_TYPE_MUSICARTIST,
            SlotValue::MusicTrack(_) => SLOT_VALUE_TYPE_MUSICTRACK,
            SlotValue::City(_) => SLOT_VALUE_TYPE_CITY,
            SlotValue::Country(_) => SLOT_VALUE_TYPE_COUNTRY,
            SlotValue::Region(_) => SLOT_VALUE_TYPE_REGION,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SlotValue::Custom(_) => "Custom",
            SlotValue::Number(_) => "Number",
            SlotValue::Ordinal(_) => "Ordinal",
            SlotValue::Percentage(_) => "Percentage",
            SlotValue::InstantTime(_) => "InstantTime",
            SlotValue::TimeInterval(_) => "TimeInterval",
            SlotValue::AmountOfMoney(_) => "AmountOfMoney",
            SlotValue::Temperature(_) => "Temperature",
            SlotValue::Duration(_) => "Duration",
            SlotValue::MusicAlbum(_) => "MusicAlbum",
            SlotValue::MusicArtist(_) => "MusicArtist",
            SlotValue::MusicTrack(_) => "MusicTrack",
            SlotValue::City(_) => "City",
            SlotValue::Country(_) => "Country",
            SlotValue::Region(_) => "Region",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    raw_value: String,
    value: SlotValue,
    alternatives: Vec<SlotValue>,
    range: Range,
    entity: String,
    slot_name: String,
    confidence_score: Option<f32>,
}

impl Slot {
    pub fn new(
        raw_value: String,
        value: SlotValue,
        alternatives: Vec<SlotValue>,
        range: Range,
        entity: String,
        slot_name: String,
        confidence_score: Option<f32>,
    ) -> Self {
        Self {
            raw_value,
            value,
            alternatives,
            range,
            entity,
            slot_name,
            confidence_score,
        }
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }
    pub fn value(&self) -> &SlotValue {
        &self.value
    }
    pub fn alternatives(&self) -> &[SlotValue] {
        &self.alternatives
    }
    pub fn range(&self) -> Range {
        self.range
    }
    /// Entity identifier, e.g. `snips/datetime` or a custom entity name.
    pub fn entity(&self) -> &str {
        &self.entity
    }
    pub fn slot_name(&self) -> &str {
        &self.slot_name
    }
    pub fn confidence_score(&self) -> Option<f32> {
        self.confidence_score
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentClassifierResult {
    intent_name: Option<String>,
    confidence_score: f32,
}

impl IntentClassifierResult {
    pub fn new(intent_name: Option<String>, confidence_score: f32) -> Self {
        Self {
            intent_name,
            confidence_score,
        }
    }

    /// `None` when no intent matched.
    pub fn intent_name(&self) -> Option<&str> {
        self.intent_name.as_deref()
    }
    pub fn confidence_score(&self) -> f32 {
        self.confidence_score
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentParserAlternative {
    intent: IntentClassifierResult,
    slots: Vec<Slot>,
}

impl IntentParserAlternative {
    pub fn new(intent: IntentClassifierResult, slots: Vec<Slot>) -> Self {
        Self { intent, slots }
    }

    pub fn intent(&self) -> &IntentClassifierResult {
        &self.intent
    }
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentParserResult {
    input: String,
    intent: IntentClassifierResult,
    slots: Vec<Slot>,
    alternatives: Vec<IntentParserAlternative>,
}

impl IntentParserResult {
    pub fn new(
        input: String,
        intent: IntentClassifierResult,
        slots: Vec<Slot>,
        alternatives: Vec<IntentParserAlternative>,
    ) -> Self {
        Self {
            input,
            intent,
            slots,
            alternatives,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn intent(&self) -> &IntentClassifierResult {
        &self.intent
    }
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
    pub fn alternatives(&self) -> &[IntentParserAlternative] {
        &self.alternatives
    }
}
