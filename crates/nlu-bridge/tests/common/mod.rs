#![allow(dead_code)]

use nlu_bridge::Engine;

/// Stub engine with a clean ledger and no scripts on the calling thread.
pub fn engine() -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();
    nlu_engine::reset_ledger();
    nlu_engine::clear_scripts();
    Engine::from_api(nlu_engine::api()).unwrap()
}

/// Every buffer came back exactly once and nothing was read after release.
pub fn assert_released_once(texts: &[&str]) {
    let stats = nlu_engine::ledger_stats();
    assert!(stats.is_balanced(), "{stats:?}");
    for t in texts {
        assert!(!t.contains('\u{FFFD}'), "read after release: {t:?}");
    }
}
