//! NLU ABI crate: the wire contract shared by the host bridge and native engines,
//! plus the host-native result model those engines' output decodes into.

pub mod ffi;
pub mod model;

pub use model::*;
