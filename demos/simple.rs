use patricia::PatriciaTrie;

fn main() {
    let mut trie: PatriciaTrie<u64> = PatriciaTrie::new();

    let _ = trie.insert("abc", 123);
    let _ = trie.insert("def", 456);
    let _ = trie.insert("defghi", 789);

    assert_eq!(trie.get("abc").copied(), Some(123));
    assert_eq!(trie.get("abcdef").copied(), None);
    assert_eq!(trie.get("ab").copied(), None);
    assert!(trie.contains_prefix("ab"));

    for value in trie.search_prefix("de") {
        println!("de* => {value}");
    }

    for (key, value) in &trie {
        println!("{} => {value}", key.escape_ascii());
    }
}
