use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn small_key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..6)
}

proptest! {
    #[test]
    fn matches_btreemap(keys in prop::collection::vec(small_key(), 0..200), seed in any::<u64>()) {
        let list = SkipList::with_seed(seed);
        let mut model = BTreeMap::new();

        for (i, k) in keys.into_iter().enumerate() {
            let accepted = list.insert(k.clone(), i).is_ok();
            let fresh = !model.contains_key(&k);
            if fresh {
                model.insert(k, i);
            }
            prop_assert_eq!(accepted, fresh);
        }

        prop_assert_eq!(list.len(), model.len());
        prop_assert!(list.max_height() <= MAX_HEIGHT);

        let got: Vec<(Vec<u8>, usize)> = list.iter().map(|n| (n.key().clone(), *n.value())).collect();
        let expected: Vec<(Vec<u8>, usize)> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn find_operations_match_btreemap(
        keys in prop::collection::btree_set(small_key(), 0..100),
        probe in small_key(),
    ) {
        let list = SkipList::new();
        for k in &keys {
            list.insert(k.clone(), ()).unwrap();
        }

        let ge = list.find_greater_or_equal(probe.as_slice()).map(|n| n.key().clone());
        prop_assert_eq!(ge, keys.range(probe.clone()..).next().cloned());

        let lt = list.find_less_than(probe.as_slice()).map(|n| n.key().clone());
        prop_assert_eq!(lt, keys.range(..probe.clone()).next_back().cloned());

        let last = list.find_last().map(|n| n.key().clone());
        prop_assert_eq!(last, keys.iter().next_back().cloned());

        prop_assert_eq!(list.contains(probe.as_slice()), keys.contains(&probe));
    }

    #[test]
    fn cursor_walks_back_to_front(keys in prop::collection::btree_set(small_key(), 0..60)) {
        let list = SkipList::new();
        for k in &keys {
            list.insert(k.clone(), ()).unwrap();
        }

        let mut cursor = list.cursor();
        cursor.seek_to_last();
        let mut backwards = Vec::new();
        while let Some(k) = cursor.key() {
            backwards.push(k.clone());
            cursor.prev();
        }
        backwards.reverse();

        let expected: Vec<Vec<u8>> = keys.into_iter().collect();
        prop_assert_eq!(backwards, expected);
    }
}
