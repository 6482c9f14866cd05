//! Per-thread record of every buffer the stub hands out.
//!
//! Released strings are poisoned with [`POISON`] and kept allocated, so a
//! read after release shows up as garbage text instead of touching freed
//! memory, and a second release is counted instead of corrupting the heap.
//! String arrays and result shells are freed on release; their
//! addresses are remembered so a second release is counted too.

use core::ffi::c_char;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use nlu_abi::ffi::{CStringArray, ERR_FAIL, ERR_OK};

pub const POISON: u8 = 0xDD;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub strings_allocated: usize,
    pub strings_released: usize,
    pub shells_allocated: usize,
    pub shells_released: usize,
    pub arrays_allocated: usize,
    pub arrays_released: usize,
    pub double_releases: usize,
    pub unknown_releases: usize,
}

impl LedgerStats {
    /// Strings handed out and not yet released.
    pub fn outstanding_strings(&self) -> usize {
        self.strings_allocated - self.strings_released
    }

    /// Every buffer came back exactly once.
    pub fn is_balanced(&self) -> bool {
        self.strings_allocated == self.strings_released
            && self.shells_allocated == self.shells_released
            && self.arrays_allocated == self.arrays_released
            && self.double_releases == 0
            && self.unknown_releases == 0
    }
}

struct StringEntry {
    bytes: Box<[u8]>,
    released: bool,
}

/// Keeps a parse result's structures alive until the host destroys it.
#[derive(Default)]
pub(crate) struct ShellStorage {
    keep: Vec<Box<dyn Any>>,
    /// Text the host cannot reach (payloads behind unknown kind codes).
    pub(crate) orphans: Vec<*const c_char>,
}

impl ShellStorage {
    /// Stores `value` and returns a pointer that stays valid with `self`.
    pub(crate) fn boxed<T: 'static>(&mut self, value: T) -> *const T {
        let b = Box::new(value);
        let ptr: *const T = &*b;
        self.keep.push(b);
        ptr
    }

    /// Stores `items` and returns a pointer to the first one.
    pub(crate) fn slice<T: 'static>(&mut self, items: Vec<T>) -> *const T {
        if items.is_empty() {
            return std::ptr::null();
        }
        let ptr = items.as_ptr();
        self.keep.push(Box::new(items));
        ptr
    }
}

struct ArrayEntry {
    _header: Box<CStringArray>,
    _items: Vec<Box<[u8]>>,
    _pointers: Vec<*const c_char>,
}

#[derive(Default)]
struct Ledger {
    strings: HashMap<usize, StringEntry>,
    shells: HashMap<usize, ShellStorage>,
    arrays: HashMap<usize, ArrayEntry>,
    released_shells: HashSet<usize>,
    released_arrays: HashSet<usize>,
    stats: LedgerStats,
}

thread_local! {
    static LEDGER: RefCell<Ledger> = RefCell::new(Ledger::default());
}

fn nul_terminated(s: &str) -> Box<[u8]> {
    let mut v: Vec<u8> = s.bytes().filter(|b| *b != 0).collect();
    v.push(0);
    v.into_boxed_slice()
}

pub(crate) fn alloc_string(s: &str) -> *const c_char {
    let bytes = nul_terminated(s);
    let ptr = bytes.as_ptr() as *const c_char;
    LEDGER.with(|l| {
        let mut l = l.borrow_mut();
        l.stats.strings_allocated += 1;
        l.strings.insert(
            ptr as usize,
            StringEntry {
                bytes,
                released: false,
            },
        );
    });
    ptr
}

pub(crate) fn release_string(ptr: *const c_char) -> i32 {
    LEDGER.with(|l| {
        let mut l = l.borrow_mut();
        let l = &mut *l;
        match l.strings.get_mut(&(ptr as usize)) {
            Some(entry) if entry.released => {
                l.stats.double_releases += 1;
                log::warn!("[stub] double release of string {ptr:p}");
                ERR_FAIL
            }
            Some(entry) => {
                let n = entry.bytes.len() - 1;
                entry.bytes[..n].fill(POISON);
                entry.released = true;
                l.stats.strings_released += 1;
                ERR_OK
            }
            None => {
                l.stats.unknown_releases += 1;
                log::warn!("[stub] release of unknown string {ptr:p}");
                ERR_FAIL
            }
        }
    })
}

pub(crate) fn alloc_string_array(items: &[&str]) -> *const CStringArray {
    let items: Vec<Box<[u8]>> = items.iter().map(|s| nul_terminated(s)).collect();
    let pointers: Vec<*const c_char> = items.iter().map(|b| b.as_ptr() as *const c_char).collect();
    let header = Box::new(CStringArray {
        data: pointers.as_ptr(),
        size: pointers.len() as i32,
    });
    let ptr: *const CStringArray = &*header;
    LEDGER.with(|l| {
        let mut l = l.borrow_mut();
        l.stats.arrays_allocated += 1;
        l.released_arrays.remove(&(ptr as usize));
        l.arrays.insert(
            ptr as usize,
            ArrayEntry {
                _header: header,
                _items: items,
                _pointers: pointers,
            },
        );
    });
    ptr
}

pub(crate) fn release_string_array(ptr: *const CStringArray) -> i32 {
    LEDGER.with(|l| {
        let mut l = l.borrow_mut();
        if l.arrays.remove(&(ptr as usize)).is_some() {
            l.released_arrays.insert(ptr as usize);
            l.stats.arrays_released += 1;
            ERR_OK
        } else if l.released_arrays.contains(&(ptr as usize)) {
            l.stats.double_releases += 1;
            ERR_FAIL
        } else {
            l.stats.unknown_releases += 1;
            ERR_FAIL
        }
    })
}

/// Files `storage` under the address of the result root handed to the host.
pub(crate) fn register_shell<T>(root: *const T, storage: ShellStorage) {
    LEDGER.with(|l| {
        let mut l = l.borrow_mut();
        l.stats.shells_allocated += 1;
        l.released_shells.remove(&(root as usize));
        l.shells.insert(root as usize, storage);
    });
}

pub(crate) fn release_shell<T>(ptr: *const T) -> i32 {
    let storage = LEDGER.with(|l| {
        let mut l = l.borrow_mut();
        match l.shells.remove(&(ptr as usize)) {
            Some(storage) => {
                l.released_shells.insert(ptr as usize);
                l.stats.shells_released += 1;
                Ok(storage)
            }
            None if l.released_shells.contains(&(ptr as usize)) => {
                l.stats.double_releases += 1;
                Err(ERR_FAIL)
            }
            None => {
                l.stats.unknown_releases += 1;
                Err(ERR_FAIL)
            }
        }
    });
    match storage {
        Ok(storage) => {
            for orphan in &storage.orphans {
                release_string(*orphan);
            }
            ERR_OK
        }
        Err(rc) => rc,
    }
}

/// Counters for the calling thread.
pub fn stats() -> LedgerStats {
    LEDGER.with(|l| l.borrow().stats)
}

/// Frees everything the calling thread's ledger holds and zeroes the counters.
pub fn reset() {
    LEDGER.with(|l| *l.borrow_mut() = Ledger::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlu_abi::ffi::CIntentParserResult;
    use std::ffi::CStr;

    #[test]
    fn release_poisons_and_counts_once() {
        reset();
        let p = alloc_string("snips/number");
        assert_eq!(stats().outstanding_strings(), 1);
        assert_eq!(release_string(p), ERR_OK);
        assert_eq!(stats().outstanding_strings(), 0);
        let bytes = unsafe { CStr::from_ptr(p) }.to_bytes();
        assert!(bytes.iter().all(|b| *b == POISON));
        assert_eq!(release_string(p), ERR_FAIL);
        let s = stats();
        assert_eq!(s.strings_released, 1);
        assert_eq!(s.double_releases, 1);
        assert!(!s.is_balanced());
    }

    #[test]
    fn unknown_pointer_is_counted() {
        reset();
        let local = [b'x' as c_char, 0];
        assert_eq!(release_string(local.as_ptr()), ERR_FAIL);
        assert_eq!(stats().unknown_releases, 1);
    }

    #[test]
    fn shell_release_takes_orphans_along() {
        reset();
        let mut storage = ShellStorage::default();
        let orphan = alloc_string("lost");
        storage.orphans.push(orphan);
        let root = storage.boxed(CIntentParserResult {
            input: std::ptr::null(),
            intent: std::ptr::null(),
            slots: std::ptr::null(),
            alternatives: std::ptr::null(),
        });
        register_shell(root, storage);
        assert_eq!(release_shell(root), ERR_OK);
        assert_eq!(release_shell(root), ERR_FAIL);
        let s = stats();
        assert_eq!(s.strings_released, 1);
        assert_eq!(s.shells_released, 1);
        assert_eq!(s.double_releases, 1);
    }

    #[test]
    fn string_array_round_trip() {
        reset();
        let arr = alloc_string_array(&["en", "fr"]);
        let header = unsafe { *arr };
        assert_eq!(header.size, 2);
        let second = unsafe { CStr::from_ptr(*header.data.add(1)) };
        assert_eq!(second.to_str().unwrap(), "fr");
        assert_eq!(release_string_array(arr), ERR_OK);
        assert!(stats().is_balanced());
    }
}
