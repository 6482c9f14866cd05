pub mod resolve;
mod structs;

use nlu_abi::ffi::{CIntentClassifierResultArray, CIntentParserResult};
use nlu_abi::{IntentClassifierResult, IntentParserResult};

use crate::errors::{BridgeError, Result};
use crate::native::{NativeRelease, NativeResultShell, NativeShell};

pub use resolve::{ValueKind, grain, precision, value_kind};

/// Decodes a parse result and hands everything back to the engine: text
/// buffers as they are copied, the structure shell last.
///
/// # Safety
/// A non-null `ptr` must be a live result owned by the caller and
/// releasable through `r`.
pub unsafe fn take_parse_result(
    ptr: *const CIntentParserResult,
    r: &dyn NativeRelease,
) -> Result<IntentParserResult> {
    let shell = unsafe { NativeResultShell::adopt(ptr, r) }
        .ok_or_else(|| BridgeError::null_field("parse result"))?;
    let res = unsafe { *shell.as_ptr() };
    unsafe { structs::decode_result(&res, r) }
}

/// Decodes a classifier ranking, then releases its shell.
///
/// # Safety
/// Same contract as [`take_parse_result`].
pub unsafe fn take_intent_results(
    ptr: *const CIntentClassifierResultArray,
    r: &dyn NativeRelease,
) -> Result<Vec<IntentClassifierResult>> {
    let shell = unsafe { NativeShell::adopt(ptr, r) }
        .ok_or_else(|| BridgeError::null_field("intent classifier results"))?;
    let array = unsafe { *shell.as_ptr() };
    unsafe { structs::decode_intent_array(&array, r) }
}
