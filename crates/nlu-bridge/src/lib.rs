//! Host-side marshalling for a native NLU engine.
//!
//! The engine is reached through the C vtable declared in `nlu_abi::ffi`.
//! Everything it returns is copied into the owned model types of
//! `nlu_abi` and released before the call returns.

mod channel;
pub mod config;
pub mod decode;
pub mod engine;
pub mod errors;
pub mod native;
pub mod ontology;

pub use config::EngineConfig;
pub use engine::locate::{EngineLocation, locate_engine};
pub use engine::{Engine, EngineDescription};
pub use errors::{BridgeError, Result};
pub use ontology::{CompleteOntology, EntityDetails, LanguageOntology};

pub use nlu_abi::{
    AmountOfMoneyValue, DurationValue, Grain, InstantTimeValue, IntentClassifierResult,
    IntentParserAlternative, IntentParserResult, Precision, Range, Slot, SlotValue,
    TemperatureValue, TimeIntervalValue,
};
