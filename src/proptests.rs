//! Model-based property tests: random operation sequences against the
//! standard library containers, across window widths and storage layouts.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::layout::{AobLayout, AosLayout, BinLayout, SoaLayout};
use crate::{CbgMap, CbgSet, SearchHint};

/// Small key space so sequences revisit keys: overwrites, re-inserts after
/// removal and negative probes all get exercised.
#[derive(Debug, Clone)]
enum Action {
    Insert(u64, u64),
    Remove(u64),
    Lookup(u64),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (0u64..400, any::<u64>()).prop_map(|(k, v)| Action::Insert(k, v)),
        1 => (0u64..400).prop_map(Action::Remove),
        2 => (0u64..400).prop_map(Action::Lookup),
    ]
}

fn run_map<const B: usize, L: BinLayout<u64, u64>>(
    actions: &[Action],
) -> Result<(), TestCaseError> {
    let mut map: CbgMap<B, u64, u64, L> = CbgMap::new();
    let mut model: HashMap<u64, u64> = HashMap::new();

    for action in actions {
        match *action {
            Action::Insert(key, value) => {
                prop_assert_eq!(map.insert(key, value), model.insert(key, value));
            }
            Action::Remove(key) => {
                prop_assert_eq!(map.remove(&key), model.remove(&key));
            }
            Action::Lookup(key) => {
                prop_assert_eq!(map.get(&key), model.get(&key));
                prop_assert_eq!(
                    map.get_with_hint(&key, SearchHint::ExpectPositive),
                    model.get(&key)
                );
                prop_assert_eq!(
                    map.get_with_hint(&key, SearchHint::ExpectNegative),
                    model.get(&key)
                );
            }
        }
        prop_assert_eq!(map.len(), model.len());
    }

    for (key, value) in &model {
        prop_assert_eq!(map.get(key), Some(value));
    }
    Ok(())
}

fn run_set<const B: usize, L: BinLayout<u64, ()>>(
    actions: &[Action],
) -> Result<(), TestCaseError> {
    let mut set: CbgSet<B, u64, L> = CbgSet::new();
    let mut model: HashSet<u64> = HashSet::new();

    for action in actions {
        match *action {
            Action::Insert(key, _) => {
                prop_assert_eq!(set.insert(key), model.insert(key));
            }
            Action::Remove(key) => {
                prop_assert_eq!(set.remove(&key), model.remove(&key));
            }
            Action::Lookup(key) => {
                prop_assert_eq!(set.contains(&key), model.contains(&key));
            }
        }
        prop_assert_eq!(set.len(), model.len());
    }
    Ok(())
}

proptest! {
    #[test]
    fn map_soa_b2_matches_model(actions in proptest::collection::vec(action(), 1..500)) {
        run_map::<2, SoaLayout<u64, u64>>(&actions)?;
    }

    #[test]
    fn map_aos_b3_matches_model(actions in proptest::collection::vec(action(), 1..500)) {
        run_map::<3, AosLayout<u64, u64>>(&actions)?;
    }

    #[test]
    fn map_aob_b4_matches_model(actions in proptest::collection::vec(action(), 1..500)) {
        run_map::<4, AobLayout<u64, u64>>(&actions)?;
    }

    #[test]
    fn set_soa_b3_matches_model(actions in proptest::collection::vec(action(), 1..500)) {
        run_set::<3, SoaLayout<u64, ()>>(&actions)?;
    }

    #[test]
    fn set_aos_b2_matches_model(actions in proptest::collection::vec(action(), 1..500)) {
        run_set::<2, AosLayout<u64, ()>>(&actions)?;
    }

    #[test]
    fn preseeded_capacity_does_not_change_semantics(
        actions in proptest::collection::vec(action(), 1..300),
        capacity in 0usize..64,
    ) {
        let mut map: CbgMap<3, u64, u64> = CbgMap::with_capacity(capacity);
        let mut model: HashMap<u64, u64> = HashMap::new();
        for action in &actions {
            match *action {
                Action::Insert(key, value) => {
                    prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                }
                Action::Remove(key) => {
                    prop_assert_eq!(map.remove(&key), model.remove(&key));
                }
                Action::Lookup(key) => {
                    prop_assert_eq!(map.get(&key), model.get(&key));
                }
            }
        }
        prop_assert_eq!(map.len(), model.len());
    }
}
