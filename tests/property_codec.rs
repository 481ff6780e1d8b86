//! Property-based tests for the codec and review notation
//!
//! Uses proptest to check that encoding is lossless for arbitrary containers,
//! that range coalescing addresses every slot exactly once, and that review
//! quoting round-trips.

use fmg_carry::{
    build_ranges, decode, encode, parse_overrides, quote, unquote, CarryEngine, Container,
    FmgHeader,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

fn value_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None::<String>),
        1 => Just(Some(String::new())),
        6 => r"[^\x00]{0,24}".prop_map(Some),
    ]
}

fn container_strategy() -> impl Strategy<Value = BTreeMap<u32, Option<String>>> {
    prop::collection::btree_map(0u32..5_000, value_strategy(), 0..64)
}

fn build(entries: &BTreeMap<u32, Option<String>>) -> Container {
    let mut fmg = Container::new("prop.fmg");
    for (&id, value) in entries {
        match value {
            Some(text) => fmg.set(id, text.as_str()),
            None => fmg.set_null(id),
        }
    }
    fmg
}

proptest! {
    #[test]
    fn prop_encode_decode_lossless(entries in container_strategy()) {
        let fmg = build(&entries);

        let mut cursor = Cursor::new(Vec::new());
        let header = encode(&fmg, &mut cursor).unwrap();
        let bytes = cursor.into_inner();

        prop_assert_eq!(bytes.len() % 4, 0);
        prop_assert_eq!(header.total_size as usize, bytes.len());
        prop_assert_eq!(header.string_table_size as usize, entries.len());

        let decoded = decode(&mut Cursor::new(bytes), "prop.fmg").unwrap();
        prop_assert_eq!(decoded, fmg);
    }

    #[test]
    fn prop_encode_is_deterministic(entries in container_strategy()) {
        let fmg = build(&entries);

        let mut first = Cursor::new(Vec::new());
        encode(&fmg, &mut first).unwrap();
        let decoded = decode(&mut Cursor::new(first.get_ref().clone()), "prop.fmg").unwrap();
        let mut second = Cursor::new(Vec::new());
        encode(&decoded, &mut second).unwrap();

        prop_assert_eq!(first.into_inner(), second.into_inner());
    }

    #[test]
    fn prop_ranges_cover_each_slot_once(ids in prop::collection::btree_set(0u32..10_000, 1..200)) {
        let (ranges, table_size) = build_ranges(ids.iter().copied()).unwrap();

        prop_assert_eq!(table_size as usize, ids.len());

        let mut slots = BTreeSet::new();
        let mut covered = BTreeSet::new();
        for pair in ranges.windows(2) {
            // Adjacent ranges always have a gap, otherwise they would merge
            prop_assert!(pair[1].first > pair[0].last + 1);
        }
        for range in &ranges {
            for id in range.first..=range.last {
                prop_assert!(slots.insert(range.slot_of(id)));
                covered.insert(id as u32);
            }
        }

        prop_assert_eq!(covered, ids);
        prop_assert_eq!(slots.len(), table_size as usize);
        prop_assert_eq!(slots.iter().next_back().copied(), Some(table_size as i64 - 1));
    }

    #[test]
    fn prop_quote_round_trips(text in any::<String>()) {
        let quoted = quote(&text);
        prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        prop_assert!(!quoted.contains('\n'));
        prop_assert_eq!(unquote(&quoted).unwrap(), text);
    }

    #[test]
    fn prop_fill_lines_parse_back(
        fills in prop::collection::btree_map(0u32..1_000, r"[^\x00]{1,16}", 0..20)
    ) {
        let mut review = String::new();
        for (id, text) in &fills {
            review.push_str(&format!("> {}:{}\n", id, quote("source")));
            review.push_str(&format!("= {}:{}\n", id, quote(text)));
        }

        let parsed = parse_overrides(review.as_bytes()).unwrap();
        prop_assert_eq!(parsed, fills);
    }

    #[test]
    fn prop_identical_sources_are_noop(entries in container_strategy()) {
        let source = build(&entries);
        let mut translation = build(&entries);
        translation.set_path("translation.fmg");

        let plan = CarryEngine::default().plan(&source, &source, &translation, None);
        prop_assert!(plan.is_noop());
    }
}

#[test]
fn test_header_size_is_forty() {
    assert_eq!(FmgHeader::SIZE, 40);
}
