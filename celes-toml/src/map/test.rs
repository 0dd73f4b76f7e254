use pretty_assertions::assert_eq;

use super::*;

#[test]
fn starts_unallocated() {
    let map: StrMap<i32> = StrMap::new();
    assert_eq!(map.bucket_count(), 0);
    assert_eq!(map.len(), 0);
    assert_eq!(map.get("x"), None);
    assert_eq!(map.get_idx(0), None);
}

#[test]
fn first_insert_allocates_sixteen_buckets() {
    let mut map = StrMap::new();
    map.set("a", 1);
    assert_eq!(map.bucket_count(), 16);
    assert_eq!(map.len(), 1);
}

#[test]
fn set_and_get() {
    let mut map = StrMap::new();
    map.set("alpha", 1);
    map.set("beta", 2);
    assert_eq!(map.get("alpha"), Some(&1));
    assert_eq!(map.get("beta"), Some(&2));
    assert_eq!(map.get("gamma"), None);
}

#[test]
fn set_overwrites() {
    let mut map = StrMap::new();
    map.set("key", String::from("old"));
    map.set("key", String::from("new"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("key").map(String::as_str), Some("new"));
}

#[test]
fn get_mut_edits_in_place() {
    let mut map = StrMap::new();
    map.set("n", 1);
    *map.get_mut("n").unwrap() += 9;
    assert_eq!(map.get("n"), Some(&10));
    assert_eq!(map.get_mut("missing"), None);
}

#[test]
fn grows_at_three_quarters_load() {
    let mut map = StrMap::new();
    // the limit for 16 buckets is 16>>1 | 16>>2 = 12
    for i in 0..11 {
        map.set(&format!("key{i}"), i);
    }
    assert_eq!(map.bucket_count(), 16);

    map.set("key11", 11);
    assert_eq!(map.bucket_count(), 32);
    assert_eq!(map.len(), 12);
    for i in 0..12 {
        assert_eq!(map.get(&format!("key{i}")), Some(&i));
    }
}

#[test]
fn survives_many_inserts() {
    let mut map = StrMap::new();
    for i in 0..200 {
        map.set(&format!("entry-{i}"), i * 3);
    }
    assert_eq!(map.len(), 200);
    for i in 0..200 {
        assert_eq!(map.get(&format!("entry-{i}")), Some(&(i * 3)));
    }
}

#[test]
fn get_idx_enumerates_buckets_with_gaps() {
    let mut map = StrMap::new();
    map.set("one", 1);
    map.set("two", 2);
    map.set("three", 3);

    let mut found: Vec<(String, i32)> = (0..map.bucket_count())
        .filter_map(|i| map.get_idx(i))
        .map(|(k, v)| (k.to_owned(), *v))
        .collect();
    found.sort();
    assert_eq!(
        found,
        [
            (String::from("one"), 1),
            (String::from("three"), 3),
            (String::from("two"), 2),
        ]
    );
    assert_eq!(map.get_idx(map.bucket_count()), None);
}

#[test]
fn iter_matches_get_idx() {
    let mut map = StrMap::new();
    for key in ["a", "b", "c", "d"] {
        map.set(key, ());
    }
    let from_iter: Vec<&str> = map.iter().map(|(k, _)| k).collect();
    let from_idx: Vec<&str> = (0..map.bucket_count())
        .filter_map(|i| map.get_idx(i))
        .map(|(k, _)| k)
        .collect();
    assert_eq!(from_iter, from_idx);
}

#[test]
fn distinct_keys_never_collide() {
    // prefix-heavy keys stress the probe chain
    let mut map = StrMap::new();
    let keys = ["a", "aa", "aaa", "ab", "ba", "b", "", "long-key-with-dashes"];
    for (i, key) in keys.iter().enumerate() {
        map.set(key, i);
    }
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(map.get(key), Some(&i), "key {key:?}");
    }
}

#[test]
fn non_ascii_keys() {
    let mut map = StrMap::new();
    map.set("höhe", 1);
    map.set("ключ", 2);
    assert_eq!(map.get("höhe"), Some(&1));
    assert_eq!(map.get("ключ"), Some(&2));
}

#[test]
fn hash_is_stable() {
    // pins the polynomial constants: changing base or modulus moves keys
    // between buckets and breaks bucket-order consumers
    assert_eq!(hash_key(""), 0);
    assert_eq!(hash_key("a") % HASH_PRIME, hash_key("a"));
    assert_ne!(hash_key("ab"), hash_key("ba"));
}
