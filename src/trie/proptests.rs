use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Walks every reachable node and checks the structural invariants.
fn validate_tree<V>(t: &PatriciaTrie<V>) {
    let mut real = 0_usize;

    for (id, node) in t.arena.breadth_first(NodeId::ROOT) {
        if id == NodeId::ROOT {
            assert!(node.segment.is_empty(), "root segment must be empty");
            assert!(node.value.is_none(), "root must never be real");
            assert!(node.parent.is_none(), "root has no parent");
        } else {
            assert!(!node.segment.is_empty(), "non-root segment must not be empty");
            assert!(node.parent.is_some(), "non-root node must have a parent");
        }

        if node.value.is_some() {
            real += 1;
        } else if id != NodeId::ROOT {
            // a structural node only exists to branch
            assert!(node.children.len() >= 2, "branch node with {} children", node.children.len());
        }

        let first_bytes: Vec<_> = node
            .children
            .iter()
            .map(|&child| t.arena[child].first_byte())
            .collect();
        assert!(
            first_bytes.windows(2).all(|pair| pair[0] < pair[1]),
            "children must be strictly sorted by first byte: {first_bytes:?}"
        );

        for &child in &node.children {
            assert_eq!(t.arena[child].parent, Some(id), "child must link back to its parent");
        }
    }

    assert_eq!(real, t.len(), "reachable real node count must match len()");
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    Get(Vec<u8>),
    ContainsPrefix(Vec<u8>),
    SearchPrefix(Vec<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // a tiny alphabet makes shared prefixes, and thus splits, very likely
    prop::collection::vec(prop::sample::select(b"ab\x00\xff".to_vec()), 0..=8)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        20 => key.clone().prop_map(Op::Get),
        15 => key.clone().prop_map(Op::ContainsPrefix),
        15 => key.prop_map(Op::SearchPrefix),
    ];
    prop::collection::vec(op, 0..=300)
}

fn model_prefix_values(model: &BTreeMap<Vec<u8>, u64>, prefix: &[u8]) -> Vec<u64> {
    if prefix.is_empty() {
        return Vec::new();
    }

    let mut values: Vec<_> = model
        .iter()
        .filter(|(key, _)| key.starts_with(prefix))
        .map(|(_, &value)| value)
        .collect();
    values.sort_unstable();
    values
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn behaves_like_btreemap(ops in ops_strategy()) {
        let mut trie = PatriciaTrie::new();
        let mut model: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let expected = if key.is_empty() {
                        Insertion::Ignored
                    } else {
                        match model.insert(key.clone(), value) {
                            Some(previous) => Insertion::Updated(previous),
                            None => Insertion::Inserted,
                        }
                    };
                    prop_assert_eq!(trie.insert(&key, value), expected);
                }
                Op::Get(key) => {
                    prop_assert_eq!(trie.get(&key), model.get(&key));
                    prop_assert_eq!(trie.contains_key(&key), model.contains_key(&key));
                }
                Op::ContainsPrefix(prefix) => {
                    let expected = !prefix.is_empty() && model.keys().any(|key| key.starts_with(&prefix));
                    prop_assert_eq!(trie.contains_prefix(&prefix), expected);
                }
                Op::SearchPrefix(prefix) => {
                    let mut values: Vec<_> = trie.search_prefix(&prefix).copied().collect();
                    values.sort_unstable();
                    prop_assert_eq!(values, model_prefix_values(&model, &prefix));
                }
            }

            prop_assert_eq!(trie.len(), model.len());
        }

        validate_tree(&trie);

        let entries: BTreeMap<_, _> = trie.entries().map(|(key, &value)| (key, value)).collect();
        prop_assert_eq!(entries, model);
    }

    #[test]
    fn prefixes_of_a_matching_prefix_also_match(
        keys in prop::collection::vec(key_strategy(), 1..=40),
        prefix in key_strategy(),
    ) {
        let trie: PatriciaTrie<()> = keys.iter().map(|key| (key, ())).collect();

        if trie.contains_prefix(&prefix) {
            for end in 1..=prefix.len() {
                prop_assert!(trie.contains_prefix(&prefix[..end]));
            }
        }

        for key in keys.iter().filter(|key| !key.is_empty()) {
            for end in 1..=key.len() {
                prop_assert!(trie.contains_prefix(&key[..end]));
            }
        }
    }

    #[test]
    fn insertion_order_does_not_matter(
        (keys, shuffled) in prop::collection::vec(key_strategy(), 0..=40)
            .prop_flat_map(|keys| (Just(keys.clone()), Just(keys).prop_shuffle()))
    ) {
        // values derived from keys, so duplicates agree on their value
        let value_of = |key: &Vec<u8>| key.iter().map(|&b| u64::from(b)).sum::<u64>() + key.len() as u64;

        let forward: PatriciaTrie<u64> = keys.iter().map(|key| (key, value_of(key))).collect();
        let backward: PatriciaTrie<u64> = shuffled.iter().map(|key| (key, value_of(key))).collect();

        validate_tree(&forward);
        validate_tree(&backward);
        prop_assert_eq!(forward.len(), backward.len());
        prop_assert_eq!(&forward, &backward);
    }
}
