//! Properties of the array/object split.

use std::collections::BTreeMap;

use proptest::prelude::*;
use relay_core::{TypeCatalog, Value};

fn indexed(items: &[i64]) -> Value {
    Value::Map(
        items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), Value::Int(*v)))
            .collect(),
    )
}

#[test]
fn empty_containers_are_ambiguous() {
    let empty_list = Value::List(Vec::new());
    let empty_map = Value::Map(BTreeMap::new());
    for value in [&empty_list, &empty_map] {
        assert!(TypeCatalog::validate("array", value).unwrap());
        assert!(TypeCatalog::validate("object", value).unwrap());
    }
}

#[test]
fn keyed_map_is_an_object_only() {
    let record = Value::from(serde_json::json!({"k": "v"}));
    assert!(TypeCatalog::validate("object", &record).unwrap());
    assert!(!TypeCatalog::validate("array", &record).unwrap());
}

proptest! {
    #[test]
    fn dense_index_maps_are_arrays(items in prop::collection::vec(any::<i64>(), 1..20)) {
        let value = indexed(&items);
        prop_assert!(value.looks_like_list());
        prop_assert!(TypeCatalog::validate("array", &value).unwrap());
        prop_assert!(!TypeCatalog::validate("object", &value).unwrap());
        let sequence: Vec<Value> = value.sequence().unwrap().into_iter().cloned().collect();
        prop_assert_eq!(sequence, items.into_iter().map(Value::Int).collect::<Vec<_>>());
    }

    #[test]
    fn a_gap_breaks_the_sequence(len in 2usize..20, gap in 0usize..20) {
        let gap = gap % len;
        let map: BTreeMap<String, Value> = (0..len)
            .filter(|i| *i != gap)
            .map(|i| (i.to_string(), Value::Null))
            .collect();
        // Removing index `len - 1` still leaves a dense prefix.
        let expected = gap == len - 1;
        prop_assert_eq!(Value::Map(map).looks_like_list(), expected);
    }

    #[test]
    fn alphabetic_keys_are_objects(keys in prop::collection::btree_set("[a-z]{1,6}", 1..8)) {
        let value = Value::Map(keys.into_iter().map(|k| (k, Value::Bool(true))).collect());
        prop_assert!(value.is_keyed());
        prop_assert!(TypeCatalog::validate("object", &value).unwrap());
        prop_assert!(!TypeCatalog::validate("array", &value).unwrap());
    }
}
