//! Fuzzy lookup over an NBT tree.
//!
//! Marker metadata moves between keys and nesting depths across format
//! revisions, so exact-path lookup breaks on every revision. Fields are
//! instead found by the first case-insensitive substring match on a key (or
//! stringified sequence index) in a fixed depth-first traversal. The order
//! is a contract: compound children in insertion order, each child yielded
//! before its own children are descended into, sequence children in index
//! order.

use crate::utils::nbt::NbtValue;

/// One visited node: slash/bracket path, the key (or index) it was reached
/// through, and the value.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry<'a> {
    pub path: String,
    pub key: String,
    pub value: &'a NbtValue,
}

/// Depth-first flattening of `root`. The root itself is not yielded.
pub fn walk(root: &NbtValue) -> Vec<TreeEntry<'_>> {
    let mut entries = Vec::new();
    collect(root, "", &mut entries);
    entries
}

fn collect<'a>(node: &'a NbtValue, prefix: &str, out: &mut Vec<TreeEntry<'a>>) {
    match node {
        NbtValue::Compound(map) => {
            for (key, value) in map.iter() {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}/{}", prefix, key)
                };
                out.push(TreeEntry {
                    path: path.clone(),
                    key: key.clone(),
                    value,
                });
                collect(value, &path, out);
            }
        }
        NbtValue::List(items) => {
            for (i, value) in items.iter().enumerate() {
                let path = format!("{}[{}]", prefix, i);
                out.push(TreeEntry {
                    path: path.clone(),
                    key: i.to_string(),
                    value,
                });
                collect(value, &path, out);
            }
        }
        _ => {}
    }
}

fn key_matches(key: &str, substrings: &[&str]) -> bool {
    let lowered = key.to_lowercase();
    substrings.iter().any(|s| lowered.contains(&s.to_lowercase()))
}

/// First non-empty string whose key matches any substring, trimmed.
pub fn find_first_string(root: &NbtValue, substrings: &[&str]) -> Option<String> {
    for entry in walk(root) {
        if !key_matches(&entry.key, substrings) {
            continue;
        }
        if let Some(s) = entry.value.as_string() {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// First integer-coercible value whose key matches any substring. Matching
/// keys with non-numeric values are skipped, not fatal.
pub fn find_first_int(root: &NbtValue, substrings: &[&str]) -> Option<i64> {
    for entry in walk(root) {
        if !key_matches(&entry.key, substrings) {
            continue;
        }
        if let Some(v) = entry.value.as_i64() {
            return Some(v);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::nbt::NbtMap;

    fn compound(entries: Vec<(&str, NbtValue)>) -> NbtValue {
        NbtValue::Compound(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_traversal_is_depth_first_in_insertion_order() {
        let tree = compound(vec![
            ("a", compound(vec![("inner", NbtValue::Int(1))])),
            ("b", NbtValue::Int(2)),
        ]);

        let keys: Vec<String> = walk(&tree).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["a", "inner", "b"]);

        let paths: Vec<String> = walk(&tree).into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["a", "a/inner", "b"]);
    }

    #[test]
    fn test_parent_yields_before_descent() {
        // The compound under a matching key is yielded before its children,
        // so a matching parent key wins over a deeper match.
        let tree = compound(vec![(
            "dataname",
            compound(vec![("name", NbtValue::String("deep".to_string()))]),
        )]);

        // The parent value is a compound (not a string), so it is skipped
        // and the deep string is found.
        assert_eq!(
            find_first_string(&tree, &["name"]),
            Some("deep".to_string())
        );

        // With a string at the parent key, the parent wins.
        let tree = compound(vec![
            ("name", NbtValue::String("shallow".to_string())),
            (
                "extra",
                compound(vec![("name", NbtValue::String("deep".to_string()))]),
            ),
        ]);
        assert_eq!(
            find_first_string(&tree, &["name"]),
            Some("shallow".to_string())
        );
    }

    #[test]
    fn test_sequence_indices_are_visited_in_order() {
        let tree = compound(vec![(
            "items",
            NbtValue::List(vec![
                NbtValue::String("zero".to_string()),
                NbtValue::String("one".to_string()),
            ]),
        )]);

        let entries = walk(&tree);
        assert_eq!(entries[1].key, "0");
        assert_eq!(entries[1].path, "items[0]");
        assert_eq!(entries[2].key, "1");
        assert_eq!(entries[2].path, "items[1]");

        // Stringified indices participate in matching.
        assert_eq!(find_first_string(&tree, &["1"]), Some("one".to_string()));
    }

    #[test]
    fn test_string_matching_rules() {
        let tree = compound(vec![
            ("StructureName", NbtValue::String("   ".to_string())),
            ("structure_name", NbtValue::String("  tower  ".to_string())),
        ]);

        // Case-insensitive; whitespace-only values are skipped; the result
        // is trimmed.
        assert_eq!(
            find_first_string(&tree, &["structurename", "structure_name"]),
            Some("tower".to_string())
        );
        assert_eq!(find_first_string(&tree, &["identifier"]), None);
    }

    #[test]
    fn test_int_skips_non_numeric_matches() {
        let tree = compound(vec![
            ("offsetx", NbtValue::String("not a number".to_string())),
            ("data", compound(vec![("xoffset_legacy", NbtValue::Double(4.7))])),
        ]);

        // The first match is non-numeric and skipped; traversal continues to
        // the truncating match.
        assert_eq!(find_first_int(&tree, &["offset"]), Some(4));
        assert_eq!(find_first_int(&tree, &["sizey"]), None);
    }

    #[test]
    fn test_unexpected_shapes_do_not_abort() {
        let tree = compound(vec![
            ("weird", NbtValue::ByteArray(vec![1, 2, 3])),
            (
                "nested",
                NbtValue::List(vec![compound(vec![("sizex", NbtValue::Byte(3))])]),
            ),
        ]);

        assert_eq!(find_first_int(&tree, &["sizex"]), Some(3));
    }
}
