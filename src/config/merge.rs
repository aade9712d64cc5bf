//! Override merge logic
//!
//! Merges a sparse override tree onto a full configuration tree:
//! - Mappings: deep-merge by field identity (recursive)
//! - Sequences: REPLACE (override wins entirely)
//! - Strings: override (override wins)
//! - Any other pairing: shape error
//!
//! Keys the base does not know are appended after the existing siblings,
//! sorted by element name. Empty override mappings contribute nothing.
//!
//! A merged tree is finished with [`collapse_singletons`] before it is
//! serialized: a sequence of one item is written exactly like the item
//! itself, so the tree holds the item.

use std::collections::HashMap;

use super::keys::{element_name, field_identity};
use super::value::{Mapping, Value};

/// Errors raised while merging an override tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("Invalid override shape at '{path}': expected {expected}, found {found}")]
    InvalidOverrideShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Conflicting override keys at '{path}': '{first}' and '{second}' name the same field")]
    ConflictingOverrideKeys {
        path: String,
        first: String,
        second: String,
    },

    #[error("Empty sequence at '{path}' has no document representation")]
    EmptySequence { path: String },
}

/// Deep merge an override mapping into `base`.
///
/// `base` is left in an unspecified state on error; callers merge into a
/// copy and discard it.
pub fn merge_override(base: &mut Mapping, overlay: &Mapping) -> Result<(), MergeError> {
    merge_mapping(base, overlay, &mut Vec::new())
}

/// Merge override layers in order onto a copy of `base` (last layer has highest precedence).
///
/// The result is finished with [`collapse_singletons`].
pub fn merge_layers<'a>(
    base: &Mapping,
    layers: impl IntoIterator<Item = &'a Mapping>,
) -> Result<Mapping, MergeError> {
    let mut merged = base.clone();
    for layer in layers {
        merge_override(&mut merged, layer)?;
    }
    collapse_singletons(&mut merged);
    Ok(merged)
}

/// Replace every one-item sequence in the tree by its item
pub fn collapse_singletons(tree: &mut Mapping) {
    for (_, value) in tree.iter_mut() {
        collapse_value(value);
    }
}

fn collapse_value(value: &mut Value) {
    let single = match value {
        Value::String(_) => None,
        Value::Mapping(children) => {
            collapse_singletons(children);
            None
        }
        Value::Sequence(items) => {
            items.iter_mut().for_each(collapse_value);
            if items.len() == 1 {
                items.pop()
            } else {
                None
            }
        }
    };
    if let Some(item) = single {
        *value = item;
    }
}

fn merge_mapping(
    base: &mut Mapping,
    overlay: &Mapping,
    path: &mut Vec<String>,
) -> Result<(), MergeError> {
    check_conflicts(overlay, path)?;

    let mut appended = Vec::new();
    for (key, overlay_value) in overlay.iter() {
        path.push(key.to_string());
        match base.get_field_mut(key) {
            Some(base_value) => merge_value(base_value, overlay_value, path)?,
            None => {
                if let Some(value) = normalize_value(overlay_value, path)? {
                    appended.push((element_name(key), value));
                }
            }
        }
        path.pop();
    }

    appended.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in appended {
        base.insert(name, value);
    }
    Ok(())
}

fn merge_value(base: &mut Value, overlay: &Value, path: &mut Vec<String>) -> Result<(), MergeError> {
    match (base, overlay) {
        // Both mappings: deep merge
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            merge_mapping(base_map, overlay_map, path)
        }

        // Strings over strings, sequences over sequences: overlay wins
        (base, overlay) if base.kind() == overlay.kind() => {
            if let Some(value) = normalize_value(overlay, path)? {
                *base = value;
            }
            Ok(())
        }

        (base, other) => Err(MergeError::InvalidOverrideShape {
            path: path_string(path),
            expected: base.kind(),
            found: other.kind(),
        }),
    }
}

/// Translate an override value into document spelling.
///
/// Mapping keys become element names, sorted by name. Mappings left empty
/// yield `None`.
fn normalize_value(value: &Value, path: &mut Vec<String>) -> Result<Option<Value>, MergeError> {
    match value {
        Value::String(s) => Ok(Some(Value::String(s.clone()))),
        Value::Sequence(items) => {
            let mut normalized = Vec::with_capacity(items.len());
            for item in items {
                normalized.extend(normalize_value(item, path)?);
            }
            if normalized.is_empty() {
                return Err(MergeError::EmptySequence {
                    path: path_string(path),
                });
            }
            Ok(Some(Value::Sequence(normalized)))
        }
        Value::Mapping(mapping) => {
            check_conflicts(mapping, path)?;

            let mut entries = Vec::with_capacity(mapping.len());
            for (key, child) in mapping.iter() {
                path.push(key.to_string());
                if let Some(child) = normalize_value(child, path)? {
                    entries.push((element_name(key), child));
                }
                path.pop();
            }
            if entries.is_empty() {
                return Ok(None);
            }
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(Some(Value::Mapping(entries.into_iter().collect())))
        }
    }
}

/// Reject two keys of one mapping that name the same field
fn check_conflicts(mapping: &Mapping, path: &[String]) -> Result<(), MergeError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for key in mapping.keys() {
        if let Some(first) = seen.insert(field_identity(key), key) {
            return Err(MergeError::ConflictingOverrideKeys {
                path: path_string(path),
                first: first.to_string(),
                second: key.to_string(),
            });
        }
    }
    Ok(())
}

fn path_string(path: &[String]) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: &[(&str, Value)]) -> Mapping {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn base() -> Mapping {
        mapping(&[
            ("Comment", "default".into()),
            (
                "DefaultCacheBehavior",
                mapping(&[
                    ("ViewerProtocolPolicy", "allow-all".into()),
                    ("MinTTL", "0".into()),
                ])
                .into(),
            ),
            ("Enabled", "true".into()),
        ])
    }

    #[test]
    fn test_scalar_override() {
        let mut merged = base();
        merge_override(&mut merged, &mapping(&[("comment", "mine".into())])).unwrap();

        assert_eq!(merged.get_str("Comment"), Some("mine"));
        assert_eq!(merged.get("comment"), None);
    }

    #[test]
    fn test_mapping_deep_merge() {
        let overlay = mapping(&[(
            "default_cache_behavior",
            mapping(&[("min_TTL", "987".into())]).into(),
        )]);
        let mut merged = base();
        merge_override(&mut merged, &overlay).unwrap();

        // MinTTL should be overridden
        assert_eq!(merged.get_str("DefaultCacheBehavior.MinTTL"), Some("987"));
        // ViewerProtocolPolicy should be preserved
        assert_eq!(
            merged.get_str("DefaultCacheBehavior.ViewerProtocolPolicy"),
            Some("allow-all")
        );
    }

    #[test]
    fn test_empty_override_is_identity() {
        let mut merged = base();
        merge_override(&mut merged, &Mapping::new()).unwrap();
        assert_eq!(merged, base());
    }

    #[test]
    fn test_order_preserved_and_new_keys_sorted() {
        let overlay = mapping(&[
            ("web_acl_id", "acl".into()),
            ("enabled", "false".into()),
            ("aliases", mapping(&[("quantity", "0".into())]).into()),
        ]);
        let mut merged = base();
        merge_override(&mut merged, &overlay).unwrap();

        assert_eq!(
            merged.keys().collect::<Vec<_>>(),
            vec!["Comment", "DefaultCacheBehavior", "Enabled", "Aliases", "WebACLId"]
        );
    }

    #[test]
    fn test_new_subtree_is_translated() {
        let overlay = mapping(&[(
            "viewer_certificate",
            mapping(&[
                ("ssl_support_method", "sni-only".into()),
                ("acm_certificate_arn", "arn:aws:acm:cert".into()),
            ])
            .into(),
        )]);
        let mut merged = base();
        merge_override(&mut merged, &overlay).unwrap();

        let cert = merged.get_path("ViewerCertificate").unwrap().as_mapping().unwrap();
        assert_eq!(
            cert.keys().collect::<Vec<_>>(),
            vec!["ACMCertificateArn", "SSLSupportMethod"]
        );
    }

    #[test]
    fn test_sequence_replaces() {
        let mut base = mapping(&[(
            "Items",
            Value::Sequence(vec!["a".into(), "b".into(), "c".into()]),
        )]);
        let overlay = mapping(&[("items", Value::Sequence(vec!["x".into()]))]);
        merge_override(&mut base, &overlay).unwrap();

        assert_eq!(
            base.get("Items"),
            Some(&Value::Sequence(vec!["x".into()]))
        );
    }

    #[test]
    fn test_sequence_items_are_translated() {
        let mut merged = base();
        let overlay = mapping(&[(
            "custom_error_responses",
            Value::Sequence(vec![mapping(&[("error_code", "404".into())]).into()]),
        )]);
        merge_override(&mut merged, &overlay).unwrap();

        let items = merged
            .get_path("CustomErrorResponses")
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(items[0].as_mapping().unwrap().get_str("ErrorCode"), Some("404"));
    }

    #[test]
    fn test_leaf_over_mapping_is_rejected() {
        let overlay = mapping(&[("default_cache_behavior", "oops".into())]);
        let mut merged = base();
        let err = merge_override(&mut merged, &overlay).unwrap_err();

        assert_eq!(
            err,
            MergeError::InvalidOverrideShape {
                path: "default_cache_behavior".to_string(),
                expected: "mapping",
                found: "string",
            }
        );
    }

    #[test]
    fn test_mapping_over_leaf_is_rejected() {
        let overlay = mapping(&[(
            "default_cache_behavior",
            mapping(&[("min_TTL", mapping(&[("value", "1".into())]).into())]).into(),
        )]);
        let mut merged = base();
        let err = merge_override(&mut merged, &overlay).unwrap_err();

        assert_eq!(
            err,
            MergeError::InvalidOverrideShape {
                path: "default_cache_behavior.min_TTL".to_string(),
                expected: "string",
                found: "mapping",
            }
        );
        assert!(err.to_string().contains("default_cache_behavior.min_TTL"));
    }

    #[test]
    fn test_conflicting_keys_rejected() {
        let overlay = mapping(&[(
            "default_cache_behavior",
            mapping(&[("MinTTL", "1".into()), ("min_ttl", "2".into())]).into(),
        )]);
        let mut merged = base();
        let err = merge_override(&mut merged, &overlay).unwrap_err();

        assert!(matches!(
            err,
            MergeError::ConflictingOverrideKeys { ref path, .. } if path == "default_cache_behavior"
        ));
    }

    #[test]
    fn test_merge_layers() {
        let file = mapping(&[
            ("comment", "from file".into()),
            (
                "default_cache_behavior",
                mapping(&[("min_ttl", "60".into())]).into(),
            ),
        ]);
        let cli = mapping(&[("Comment", "from cli".into())]);

        let merged = merge_layers(&base(), [&file, &cli]).unwrap();

        // CLI wins for Comment
        assert_eq!(merged.get_str("Comment"), Some("from cli"));
        // File wins for MinTTL
        assert_eq!(merged.get_str("DefaultCacheBehavior.MinTTL"), Some("60"));
        // base untouched
        assert_eq!(merged.get_str("Enabled"), Some("true"));
    }

    #[test]
    fn test_merge_layers_does_not_touch_base() {
        let original = base();
        let overlay = mapping(&[("comment", "changed".into())]);
        let _ = merge_layers(&original, [&overlay]).unwrap();
        assert_eq!(original, base());
    }

    #[test]
    fn test_sequence_over_string_is_rejected() {
        let overlay = mapping(&[("comment", Value::Sequence(vec!["a".into(), "b".into()]))]);
        let mut merged = base();
        let err = merge_override(&mut merged, &overlay).unwrap_err();

        assert_eq!(
            err,
            MergeError::InvalidOverrideShape {
                path: "comment".to_string(),
                expected: "string",
                found: "sequence",
            }
        );
    }

    #[test]
    fn test_string_over_sequence_is_rejected() {
        let mut base = mapping(&[("Items", Value::Sequence(vec!["a".into(), "b".into()]))]);
        let overlay = mapping(&[("items", "c".into())]);
        let err = merge_override(&mut base, &overlay).unwrap_err();

        assert!(matches!(
            err,
            MergeError::InvalidOverrideShape { expected: "sequence", found: "string", .. }
        ));
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let overlay = mapping(&[("default_root_object", Value::Sequence(Vec::new()))]);
        let mut merged = base();
        merged.insert("DefaultRootObject", "index.html");
        let err = merge_override(&mut merged, &overlay).unwrap_err();
        assert!(matches!(err, MergeError::InvalidOverrideShape { .. }));

        let overlay = mapping(&[("trusted_signers", Value::Sequence(Vec::new()))]);
        let err = merge_override(&mut base(), &overlay).unwrap_err();
        assert_eq!(
            err,
            MergeError::EmptySequence {
                path: "trusted_signers".to_string()
            }
        );
    }

    #[test]
    fn test_empty_mappings_add_nothing() {
        let overlay = mapping(&[
            ("logging", Mapping::new().into()),
            (
                "viewer_certificate",
                mapping(&[("options", Mapping::new().into())]).into(),
            ),
            ("default_cache_behavior", Mapping::new().into()),
        ]);
        let mut merged = base();
        merge_override(&mut merged, &overlay).unwrap();
        assert_eq!(merged, base());
    }

    #[test]
    fn test_new_keys_are_translated_and_sorted() {
        let overlay = mapping(&[(
            "restrictions",
            mapping(&[("b_key", "1".into()), ("a_key", "2".into())]).into(),
        )]);
        let mut merged = base();
        merge_override(&mut merged, &overlay).unwrap();

        let restrictions = merged.get_path("Restrictions").and_then(Value::as_mapping).unwrap();
        assert_eq!(restrictions.keys().collect::<Vec<_>>(), vec!["AKey", "BKey"]);
    }

    #[test]
    fn test_layers_collapse_singletons_after_merging() {
        let first = mapping(&[(
            "aliases",
            mapping(&[("items", Value::Sequence(vec!["a.example.com".into()]))]).into(),
        )]);
        let second = mapping(&[(
            "aliases",
            mapping(&[(
                "items",
                Value::Sequence(vec!["a.example.com".into(), "b.example.com".into()]),
            )])
            .into(),
        )]);

        let single = merge_layers(&base(), [&first]).unwrap();
        assert_eq!(single.get_str("Aliases.Items"), Some("a.example.com"));

        let both = merge_layers(&base(), [&first, &second]).unwrap();
        assert_eq!(
            both.get_path("Aliases.Items").and_then(Value::as_sequence).map(<[Value]>::len),
            Some(2)
        );
    }
}
