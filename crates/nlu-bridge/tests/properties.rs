mod common;

use common::engine;
use nlu_bridge::{
    AmountOfMoneyValue, Grain, InstantTimeValue, Precision, Range, SlotValue, TemperatureValue,
    TimeIntervalValue,
};
use nlu_engine::{script, ScriptedParse, ScriptedSlot, ScriptedValue};
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    "\\PC{0,12}"
}

fn scripted_value() -> impl Strategy<Value = ScriptedValue> {
    prop_oneof![
        text().prop_map(ScriptedValue::Custom),
        (-1e9f64..1e9).prop_map(ScriptedValue::Number),
        any::<i64>().prop_map(ScriptedValue::Ordinal),
        (0f64..100.0).prop_map(ScriptedValue::Percentage),
        (text(), 0..8i32, 0..2i32).prop_map(|(value, grain, precision)| {
            ScriptedValue::InstantTime { value, grain, precision }
        }),
        (proptest::option::of(text()), proptest::option::of(text()))
            .prop_map(|(from, to)| ScriptedValue::TimeInterval { from, to }),
        (-1e6f32..1e6, 0..2i32, proptest::option::of(text())).prop_map(
            |(value, precision, unit)| ScriptedValue::AmountOfMoney { value, precision, unit }
        ),
        (-300f32..300.0, proptest::option::of(text()))
            .prop_map(|(value, unit)| ScriptedValue::Temperature { value, unit }),
        text().prop_map(ScriptedValue::City),
        text().prop_map(ScriptedValue::MusicTrack),
    ]
}

fn expected(v: &ScriptedValue) -> SlotValue {
    let precision = |p: i32| if p == 1 { Precision::Exact } else { Precision::Approximate };
    match v.clone() {
        ScriptedValue::Custom(s) => SlotValue::Custom(s),
        ScriptedValue::Number(n) => SlotValue::Number(n),
        ScriptedValue::Ordinal(n) => SlotValue::Ordinal(n),
        ScriptedValue::Percentage(n) => SlotValue::Percentage(n),
        ScriptedValue::InstantTime { value, grain, precision: p } => {
            SlotValue::InstantTime(InstantTimeValue {
                value,
                grain: Grain::ALL[grain as usize],
                precision: precision(p),
            })
        }
        ScriptedValue::TimeInterval { from, to } => {
            SlotValue::TimeInterval(TimeIntervalValue { from, to })
        }
        ScriptedValue::AmountOfMoney { value, precision: p, unit } => {
            SlotValue::AmountOfMoney(AmountOfMoneyValue {
                value,
                precision: precision(p),
                unit,
            })
        }
        ScriptedValue::Temperature { value, unit } => {
            SlotValue::Temperature(TemperatureValue { value, unit })
        }
        ScriptedValue::City(s) => SlotValue::City(s),
        ScriptedValue::MusicTrack(s) => SlotValue::MusicTrack(s),
        other => unreachable!("not generated: {other:?}"),
    }
}

fn scripted_slot() -> impl Strategy<Value = ScriptedSlot> {
    (
        text(),
        scripted_value(),
        proptest::collection::vec(scripted_value(), 0..3),
        (0..10_000i32, 0..10_000i32),
        text(),
        text(),
    )
        .prop_map(|(raw, value, alternatives, (a, b), entity, name)| {
            ScriptedSlot::new(&raw, value, (a.min(b), a.max(b)), &entity, &name)
                .with_alternatives(alternatives)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn decoded_tree_matches_and_releases_once(slots in proptest::collection::vec(scripted_slot(), 0..6)) {
        let e = engine();
        let mut parse = ScriptedParse::intent("anything", 0.5);
        for s in &slots {
            parse = parse.slot(s.clone());
        }
        script("input", parse);

        let res = e.parse("input").unwrap();
        prop_assert_eq!(res.slots().len(), slots.len());
        for (got, want) in res.slots().iter().zip(&slots) {
            prop_assert_eq!(got.value(), &expected(&want.value));
            let alts: Vec<SlotValue> = want.alternatives.iter().map(expected).collect();
            prop_assert_eq!(got.alternatives(), alts.as_slice());
            prop_assert_eq!(got.range(), Range::new(want.range.0, want.range.1));
            prop_assert!(got.range().is_well_formed());
            prop_assert_eq!(got.raw_value(), want.raw_value.as_str());
            prop_assert_eq!(got.entity(), want.entity.as_str());
            prop_assert_eq!(got.slot_name(), want.slot_name.as_str());
        }
        let stats = nlu_engine::ledger_stats();
        prop_assert!(stats.is_balanced(), "{:?}", stats);
    }

    #[test]
    fn mismatch_anywhere_still_drains(
        slots in proptest::collection::vec(scripted_slot(), 1..6),
        bad in any::<prop::sample::Index>(),
        code in 16..1000i32,
    ) {
        let e = engine();
        let bad = bad.index(slots.len());
        let mut parse = ScriptedParse::intent("anything", 0.5);
        for (i, s) in slots.iter().enumerate() {
            let s = if i == bad { s.clone().with_kind_code(code) } else { s.clone() };
            parse = parse.slot(s);
        }
        script("input", parse);

        let err = e.parse("input").unwrap_err();
        prop_assert!(err.is_schema_mismatch());
        prop_assert!(err.to_string().contains(&code.to_string()));
        let stats = nlu_engine::ledger_stats();
        prop_assert!(stats.is_balanced(), "{:?}", stats);
    }
}
