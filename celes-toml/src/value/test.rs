use pretty_assertions::assert_eq;

use super::*;

fn sample() -> Table {
    let mut build = Table::new();
    build.insert("Name", Value::String(String::from("demo")));
    build.insert("Jobs", Value::Integer(4));
    build.insert("Optimize", Value::Boolean(true));
    build.insert("Scale", Value::Real(0.5));

    let mut root = Table::new();
    root.insert("Build", Value::Table(build));
    root.insert("Version", Value::Integer(2));
    root
}

#[test]
fn typed_accessors_return_contents() {
    let root = sample();
    let build = root.get_table("Build").unwrap();
    assert_eq!(build.get_str("Name"), Some("demo"));
    assert_eq!(build.get_int("Jobs"), 4);
    assert!(build.get_bool("Optimize"));
    assert_eq!(build.get_float("Scale"), 0.5);
    assert_eq!(build.kind_of("Name"), ValueKind::String);
}

#[test]
fn typed_accessors_zero_on_mismatch_or_missing() {
    let root = sample();
    let build = root.get_table("Build").unwrap();

    // wrong type
    assert_eq!(build.get_str("Jobs"), None);
    assert_eq!(build.get_int("Name"), 0);
    assert!(!build.get_bool("Name"));
    assert_eq!(build.get_float("Jobs"), 0.0);
    assert!(build.get_table("Name").is_none());
    assert!(build.get_array("Jobs").is_none());

    // missing
    assert_eq!(build.get_str("Missing"), None);
    assert_eq!(build.get_int("Missing"), 0);
    assert!(!build.has("Missing"));
    assert_eq!(build.kind_of("Missing"), ValueKind::Invalid);
}

#[test]
fn two_level_lookup() {
    let root = sample();
    assert_eq!(root.lookup_str("Build", "Name"), Some("demo"));
    assert_eq!(root.lookup_int("Build", "Jobs"), 4);
    assert!(root.lookup_bool("Build", "Optimize"));
    assert_eq!(root.lookup_float("Build", "Scale"), 0.5);
    assert!(root.contains("Build", "Name"));
}

#[test]
fn two_level_lookup_checks_both_levels() {
    let root = sample();
    // missing intermediate table
    assert_eq!(root.lookup_str("Deploy", "Name"), None);
    assert_eq!(root.lookup_int("Deploy", "Jobs"), 0);
    assert!(!root.contains("Deploy", "Name"));
    // intermediate exists but is not a table
    assert_eq!(root.lookup_str("Version", "Name"), None);
    // missing leaf
    assert_eq!(root.lookup_str("Build", "Missing"), None);
    assert!(!root.contains("Build", "Missing"));
}

#[test]
fn pair_enumeration_visits_every_key() {
    let root = sample();
    let mut keys: Vec<&str> = (0..root.pair_count())
        .filter_map(|i| root.pair(i))
        .map(|(k, _)| k)
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, ["Build", "Version"]);
    assert_eq!(root.len(), 2);
}

#[test]
fn empty_table_has_no_pairs() {
    let table = Table::new();
    assert_eq!(table.pair_count(), 0);
    assert_eq!(table.len(), 0);
    assert!(table.is_empty());
    assert_eq!(table.pair(0), None);
}

#[test]
fn array_accessors() {
    let mut array = Array::default();
    array.push(Value::Integer(7));
    array.push(Value::String(String::from("s")));
    array.push(Value::Boolean(true));

    assert_eq!(array.count(), 3);
    assert_eq!(array.get_int_at(0), 7);
    assert_eq!(array.get_str_at(1), Some("s"));
    assert!(array.get_bool_at(2));

    // type mismatches and out-of-range indices zero out
    assert_eq!(array.get_int_at(1), 0);
    assert_eq!(array.get_str_at(0), None);
    assert_eq!(array.get_int_at(99), 0);
    assert!(array.get(99).is_none());
}

#[test]
fn value_kinds() {
    assert_eq!(Value::Invalid.kind(), ValueKind::Invalid);
    assert_eq!(Value::Integer(1).kind(), ValueKind::Integer);
    assert_eq!(Value::Real(1.0).kind(), ValueKind::Real);
    assert_eq!(Value::Boolean(false).kind(), ValueKind::Boolean);
    assert_eq!(Value::Table(Table::new()).kind(), ValueKind::Table);
    assert_eq!(Value::Array(Array::default()).kind(), ValueKind::Array);
}

#[test]
fn drop_cascades_through_nesting() {
    // deep nesting drops without issue
    let mut value = Value::Table(Table::new());
    for _ in 0..100 {
        let mut table = Table::new();
        table.insert("inner", value);
        value = Value::Table(table);
    }
    drop(value);
}
