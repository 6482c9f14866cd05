//! Ownership of engine-allocated memory.
//!
//! Every buffer the engine hands out is wrapped in an owning handle as soon as
//! the host sees its pointer. The handle copies the contents on request and
//! releases the buffer in `Drop`, so each buffer goes back to the engine
//! exactly once on every exit path, error paths included. Handles are neither
//! `Clone` nor `Copy`.

use core::ffi::c_char;
use std::ffi::CStr;
use std::ptr::NonNull;

use nlu_abi::ffi::{
    CIntentClassifierResultArray, CIntentParserResult, CStringArray, ERR_OK, EngineApi,
};

/// Whatever can hand native allocations back to the engine that made them.
pub trait NativeRelease {
    /// # Safety
    /// `ptr` must come from this engine and must not have been released.
    unsafe fn release_string(&self, ptr: *mut c_char) -> i32;

    /// # Safety
    /// `ptr` must come from this engine and must not have been released.
    unsafe fn release_string_array(&self, ptr: *mut CStringArray) -> i32;

    /// Releases the structure shell only; text buffers inside it are
    /// released one by one through `release_string`.
    ///
    /// # Safety
    /// `ptr` must come from this engine and must not have been released.
    unsafe fn release_parse_result(&self, ptr: *mut CIntentParserResult) -> i32;

    /// Shell only, like `release_parse_result`.
    ///
    /// # Safety
    /// `ptr` must come from this engine and must not have been released.
    unsafe fn release_intent_results(&self, ptr: *mut CIntentClassifierResultArray) -> i32;
}

impl NativeRelease for EngineApi {
    unsafe fn release_string(&self, ptr: *mut c_char) -> i32 {
        unsafe { (self.destroy_string)(ptr) }
    }

    unsafe fn release_string_array(&self, ptr: *mut CStringArray) -> i32 {
        unsafe { (self.destroy_string_array)(ptr) }
    }

    unsafe fn release_parse_result(&self, ptr: *mut CIntentParserResult) -> i32 {
        unsafe { (self.destroy_intent_parser_result)(ptr) }
    }

    unsafe fn release_intent_results(&self, ptr: *mut CIntentClassifierResultArray) -> i32 {
        unsafe { (self.destroy_intent_classifier_results)(ptr) }
    }
}

/// Host copy of engine text. Invalid UTF-8 is replaced, and reported.
fn copy_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(e) => {
            log::warn!("[native] engine string is not valid UTF-8: {e}");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Owning handle to a null-terminated UTF-8 buffer allocated by the engine.
pub struct NativeString<'r> {
    ptr: NonNull<c_char>,
    releaser: &'r dyn NativeRelease,
}

impl<'r> NativeString<'r> {
    /// Takes ownership of `ptr`; `None` for null.
    ///
    /// # Safety
    /// A non-null `ptr` must be a live, null-terminated buffer owned by the
    /// caller and releasable through `releaser`. Nothing else may release it.
    pub unsafe fn adopt(ptr: *const c_char, releaser: &'r dyn NativeRelease) -> Option<Self> {
        NonNull::new(ptr as *mut c_char).map(|ptr| Self { ptr, releaser })
    }

    /// Copies the buffer into host memory without releasing it yet.
    pub fn to_string_lossy(&self) -> String {
        // SAFETY: `adopt` guarantees a live null-terminated buffer until drop.
        copy_lossy(unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_bytes())
    }

    /// Copies the buffer into host memory, then releases it.
    pub fn into_string(self) -> String {
        self.to_string_lossy()
    }
}

impl Drop for NativeString<'_> {
    fn drop(&mut self) {
        let rc = unsafe { self.releaser.release_string(self.ptr.as_ptr()) };
        if rc != ERR_OK {
            log::warn!("[native] destroy_string returned {rc}");
        }
    }
}

/// Copies and releases an optional engine string.
///
/// # Safety
/// Same contract as [`NativeString::adopt`].
pub unsafe fn take_string(ptr: *const c_char, releaser: &dyn NativeRelease) -> Option<String> {
    unsafe { NativeString::adopt(ptr, releaser) }.map(NativeString::into_string)
}

/// Owning handle to a `CStringArray`. Elements stay owned by the array and
/// are released with it.
pub struct NativeStringArray<'r> {
    ptr: NonNull<CStringArray>,
    releaser: &'r dyn NativeRelease,
}

impl<'r> NativeStringArray<'r> {
    /// # Safety
    /// A non-null `ptr` must be a live array owned by the caller and
    /// releasable through `releaser`.
    pub unsafe fn adopt(ptr: *const CStringArray, releaser: &'r dyn NativeRelease) -> Option<Self> {
        NonNull::new(ptr as *mut CStringArray).map(|ptr| Self { ptr, releaser })
    }

    /// Copies every element. `None` when the array header is malformed.
    pub fn to_vec(&self) -> Option<Vec<String>> {
        // SAFETY: `adopt` guarantees a live array until drop.
        let array = unsafe { *self.ptr.as_ptr() };
        if array.size < 0 || (array.size > 0 && array.data.is_null()) {
            return None;
        }
        let len = array.size as usize;
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let item = unsafe { *array.data.add(i) };
            if item.is_null() {
                return None;
            }
            out.push(copy_lossy(unsafe { CStr::from_ptr(item) }.to_bytes()));
        }
        Some(out)
    }
}

impl Drop for NativeStringArray<'_> {
    fn drop(&mut self) {
        let rc = unsafe { self.releaser.release_string_array(self.ptr.as_ptr()) };
        if rc != ERR_OK {
            log::warn!("[native] destroy_string_array returned {rc}");
        }
    }
}

/// Result structures whose shell the engine frees in one call.
pub trait Shell {
    /// Vtable entry named in release warnings.
    const DESTROY: &'static str;

    /// # Safety
    /// `ptr` must come from the engine behind `releaser` and must not have
    /// been released.
    unsafe fn release(ptr: *mut Self, releaser: &dyn NativeRelease) -> i32;
}

impl Shell for CIntentParserResult {
    const DESTROY: &'static str = "destroy_intent_parser_result";

    unsafe fn release(ptr: *mut Self, releaser: &dyn NativeRelease) -> i32 {
        unsafe { releaser.release_parse_result(ptr) }
    }
}

impl Shell for CIntentClassifierResultArray {
    const DESTROY: &'static str = "destroy_intent_classifier_results";

    unsafe fn release(ptr: *mut Self, releaser: &dyn NativeRelease) -> i32 {
        unsafe { releaser.release_intent_results(ptr) }
    }
}

/// Owning handle to a result shell. Dropped after every text buffer inside
/// it has been taken.
pub struct NativeShell<'r, T: Shell> {
    ptr: NonNull<T>,
    releaser: &'r dyn NativeRelease,
}

pub type NativeResultShell<'r> = NativeShell<'r, CIntentParserResult>;

impl<'r, T: Shell> NativeShell<'r, T> {
    /// # Safety
    /// A non-null `ptr` must be a live result owned by the caller and
    /// releasable through `releaser`.
    pub unsafe fn adopt(ptr: *const T, releaser: &'r dyn NativeRelease) -> Option<Self> {
        NonNull::new(ptr as *mut T).map(|ptr| Self { ptr, releaser })
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }
}

impl<T: Shell> Drop for NativeShell<'_, T> {
    fn drop(&mut self) {
        let rc = unsafe { T::release(self.ptr.as_ptr(), self.releaser) };
        if rc != ERR_OK {
            log::warn!("[native] {} returned {rc}", T::DESTROY);
        }
    }
}
