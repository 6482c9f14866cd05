//! Discriminant tables. Pure lookups; an out-of-table code is a schema
//! mismatch and is never defaulted.

use nlu_abi::ffi::*;
use nlu_abi::{Grain, Precision};

use crate::errors::{BridgeError, Result};

pub fn grain(code: i32) -> Result<Grain> {
    Ok(match code {
        GRAIN_YEAR => Grain::Year,
        GRAIN_QUARTER => Grain::Quarter,
        GRAIN_MONTH => Grain::Month,
        GRAIN_WEEK => Grain::Week,
        GRAIN_DAY => Grain::Day,
        GRAIN_HOUR => Grain::Hour,
        GRAIN_MINUTE => Grain::Minute,
        GRAIN_SECOND => Grain::Second,
        other => return Err(BridgeError::unknown_code("grain", other)),
    })
}

pub fn precision(code: i32) -> Result<Precision> {
    match code {
        PRECISION_APPROXIMATE => Ok(Precision::Approximate),
        PRECISION_EXACT => Ok(Precision::Exact),
        other => Err(BridgeError::unknown_code("precision", other)),
    }
}

/// Payload shape behind a `CSlotValue::value` pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Custom,
    Number,
    Ordinal,
    InstantTime,
    TimeInterval,
    AmountOfMoney,
    Temperature,
    Duration,
    Percentage,
    MusicAlbum,
    MusicArtist,
    MusicTrack,
    City,
    Country,
    Region,
}

pub fn value_kind(code: i32) -> Result<ValueKind> {
    Ok(match code {
        SLOT_VALUE_TYPE_CUSTOM => ValueKind::Custom,
        SLOT_VALUE_TYPE_NUMBER => ValueKind::Number,
        SLOT_VALUE_TYPE_ORDINAL => ValueKind::Ordinal,
        SLOT_VALUE_TYPE_INSTANTTIME => ValueKind::InstantTime,
        SLOT_VALUE_TYPE_TIMEINTERVAL => ValueKind::TimeInterval,
        SLOT_VALUE_TYPE_AMOUNTOFMONEY => ValueKind::AmountOfMoney,
        SLOT_VALUE_TYPE_TEMPERATURE => ValueKind::Temperature,
        SLOT_VALUE_TYPE_DURATION => ValueKind::Duration,
        SLOT_VALUE_TYPE_PERCENTAGE => ValueKind::Percentage,
        SLOT_VALUE_TYPE_MUSICALBUM => ValueKind::MusicAlbum,
        SLOT_VALUE_TYPE_MUSICARTIST => ValueKind::MusicArtist,
        SLOT_VALUE_TYPE_MUSICTRACK => ValueKind::MusicTrack,
        SLOT_VALUE_TYPE_CITY => ValueKind::City,
        SLOT_VALUE_TYPE_COUNTRY => ValueKind::Country,
        SLOT_VALUE_TYPE_REGION => ValueKind::Region,
        other => return Err(BridgeError::unknown_code("slot value type", other)),
    })
}
