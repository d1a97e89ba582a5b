// Attribute tree builder - Classifies branch fields and assembles the attribute tree
use crate::application::extract_options::ExtractOptions;
use crate::domain::attribute::{Attribute, AttributeGroup, AttributeNode, SubQueryRef};
use crate::domain::literal::decode_literal;
use serde_json::{Map, Value};

const COLLAPSE_KEY: &str = "collapse";
const VALUE_KEY: &str = "value";
const UNIT_KEY: &str = "unit";
const DISPLAY_ORDER_KEY: &str = "display_order";
const IRI_KEY: &str = "iri";
const STACK_KEY: &str = "stack";

/// Fields that steer the builder and never become children.
const CONTROL_KEYS: &[&str] = &[COLLAPSE_KEY, VALUE_KEY, UNIT_KEY, DISPLAY_ORDER_KEY];

/// Cross-source reference fields; only subgroups carry them.
const REFERENCE_KEYS: &[&str] = &[IRI_KEY, STACK_KEY];

/// Build the attribute tree rooted at `options.attribute_key`.
///
/// A missing or non-object branch yields an empty group; this never fails.
pub fn build_attribute_tree(document: &Value, options: &ExtractOptions) -> AttributeGroup {
    build_attribute_group(document, &options.attribute_key, options)
}

/// Build the group for the top-level branch `name` of `document`.
pub fn build_attribute_group(
    document: &Value,
    name: &str,
    options: &ExtractOptions,
) -> AttributeGroup {
    match document.get(name) {
        Some(Value::Object(branch)) => build_branch(name, branch, 0, options),
        Some(other) => {
            tracing::warn!(
                "Branch {} is not an object ({}), leaving it empty",
                name,
                kind_of(other)
            );
            AttributeGroup::empty(name)
        }
        None => AttributeGroup::empty(name),
    }
}

fn build_branch(
    name: &str,
    branch: &Map<String, Value>,
    depth: usize,
    options: &ExtractOptions,
) -> AttributeGroup {
    let mut group = AttributeGroup::empty(name);
    group.is_collapsed = branch.get(COLLAPSE_KEY).and_then(Value::as_bool).unwrap_or(false);
    if depth > 0 {
        group.sub_query_ref = sub_query_ref(branch);
    }

    for field in candidate_order(branch, depth) {
        if group.contains(&field) {
            tracing::warn!(
                "Field {} listed twice in display order of {}, keeping the first",
                field,
                name
            );
            continue;
        }
        if is_control(&field, depth) {
            tracing::warn!("Display order of {} names control field {}, skipping", name, field);
            continue;
        }
        let Some(raw) = branch.get(&field) else {
            tracing::warn!("Display order of {} names missing field {}, skipping", name, field);
            continue;
        };
        if let Some(node) = classify(&field, raw, depth, options) {
            group.push(node);
        }
    }

    group
}

fn is_control(key: &str, depth: usize) -> bool {
    CONTROL_KEYS.contains(&key) || (depth > 0 && REFERENCE_KEYS.contains(&key))
}

/// Explicit ordering hint if present, otherwise the branch's own field order.
fn candidate_order(branch: &Map<String, Value>, depth: usize) -> Vec<String> {
    match branch.get(DISPLAY_ORDER_KEY) {
        Some(Value::Array(hint)) => hint
            .iter()
            .map(|entry| match entry {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => branch
            .keys()
            .filter(|key| !is_control(key, depth))
            .cloned()
            .collect(),
    }
}

fn sub_query_ref(branch: &Map<String, Value>) -> Option<SubQueryRef> {
    let iri = branch.get(IRI_KEY)?.as_str().filter(|iri| !iri.is_empty())?;
    let source = branch
        .get(STACK_KEY)
        .and_then(Value::as_str)
        .filter(|stack| !stack.is_empty())
        .map(str::to_string);

    Some(SubQueryRef {
        iri: iri.to_string(),
        source,
    })
}

/// Classify one field as a leaf with unit, a simplified leaf or a subgroup.
///
/// Returns `None` only when a subgroup would exceed the depth guard.
pub fn classify(
    name: &str,
    raw: &Value,
    depth: usize,
    options: &ExtractOptions,
) -> Option<AttributeNode> {
    match raw {
        // Presence test: `{"value": 0}` is a leaf.
        Value::Object(fields) if fields.get(VALUE_KEY).is_some_and(|v| !v.is_null()) => {
            let unit = fields.get(UNIT_KEY).and_then(Value::as_str).unwrap_or("");
            let decoded = decode_literal(&fields[VALUE_KEY], unit);
            Some(AttributeNode::Leaf(Attribute::new(
                name.to_string(),
                decoded.value,
                decoded.unit,
            )))
        }
        Value::Object(fields) => {
            if depth + 1 > options.max_depth {
                tracing::warn!(
                    "Group {} exceeds maximum depth {}, treating it as malformed",
                    name,
                    options.max_depth
                );
                return None;
            }
            Some(AttributeNode::Group(build_branch(name, fields, depth + 1, options)))
        }
        primitive => {
            let decoded = decode_literal(primitive, "");
            Some(AttributeNode::Leaf(Attribute::new(
                name.to_string(),
                decoded.value,
                decoded.unit,
            )))
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::DisplayEntry;
    use serde_json::json;

    fn build(document: &Value) -> AttributeGroup {
        build_attribute_tree(document, &ExtractOptions::default())
    }

    fn assert_display_order_partitions(group: &AttributeGroup) {
        let mut names: Vec<&str> = group
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .chain(group.sub_groups.iter().map(|g| g.name.as_str()))
            .collect();
        let mut order: Vec<&str> = group.display_order.iter().map(String::as_str).collect();
        names.sort_unstable();
        order.sort_unstable();
        assert_eq!(names, order, "display order of {} does not partition its children", group.name);
        let before = order.len();
        order.dedup();
        assert_eq!(before, order.len());
        group.sub_groups.iter().for_each(assert_display_order_partitions);
    }

    #[test]
    fn test_zero_value_leaf_with_unit() {
        let group = build(&json!({ "meta": { "depth": { "value": 0, "unit": "m" } } }));
        assert_eq!(
            group.attributes,
            vec![Attribute::new("depth".to_string(), "0".to_string(), "m".to_string())]
        );
    }

    #[test]
    fn test_simplified_literal_leaf() {
        let group = build(&json!({ "meta": { "mass": "\"42.5\"^^type [kg]" } }));
        let mass = group.attribute("mass").unwrap();
        assert_eq!(mass.value, "42.5");
        assert_eq!(mass.unit, "kg");
    }

    #[test]
    fn test_ordering_hint_is_reproduced() {
        let group = build(&json!({
            "meta": {
                "display_order": ["b", "a"],
                "a": { "value": 1 },
                "b": { "value": 2 }
            }
        }));
        assert_eq!(group.display_order, vec!["b", "a"]);
        let names: Vec<&str> = group.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_branch_is_empty_group() {
        let group = build(&json!({ "time": [] }));
        assert_eq!(group.name, "meta");
        assert!(group.attributes.is_empty());
        assert!(group.sub_groups.is_empty());
        assert!(group.display_order.is_empty());

        let not_an_object = build(&json!({ "meta": "nothing here" }));
        assert!(not_an_object.display_order.is_empty());
    }

    #[test]
    fn test_natural_order_interleaves_and_skips_controls() {
        let group = build(&json!({
            "meta": {
                "collapse": true,
                "Name": "Tower A",
                "Address": { "collapse": true, "Street": "Main", "Number": 3 },
                "Height": { "value": "\"120\"^^xsd:integer", "unit": "m" },
                "Listed": false
            }
        }));

        assert!(group.is_collapsed);
        assert_eq!(group.display_order, vec!["Name", "Address", "Height", "Listed"]);
        let address = group.sub_group("Address").unwrap();
        assert!(address.is_collapsed);
        assert_eq!(address.display_order, vec!["Street", "Number"]);
        assert_eq!(group.attribute("Height").unwrap().value, "120");
        assert_eq!(group.attribute("Listed").unwrap().value, "false");

        let entries: Vec<&str> = group
            .entries()
            .map(|entry| match entry {
                DisplayEntry::Attribute(a) => a.name.as_str(),
                DisplayEntry::Group(g) => g.name.as_str(),
            })
            .collect();
        assert_eq!(entries, vec!["Name", "Address", "Height", "Listed"]);
        assert_display_order_partitions(&group);
    }

    #[test]
    fn test_hint_with_missing_and_duplicate_names() {
        let group = build(&json!({
            "meta": {
                "display_order": ["a", "ghost", "a", "collapse", "g"],
                "collapse": false,
                "a": 1,
                "g": { "x": 1 },
                "unlisted": 2
            }
        }));
        assert_eq!(group.display_order, vec!["a", "g"]);
        assert!(group.attribute("unlisted").is_none());
        assert_display_order_partitions(&group);
    }

    #[test]
    fn test_sub_query_reference() {
        let group = build(&json!({
            "meta": {
                "Owner": { "iri": "http://example.org/owner/1", "stack": "http://other:3838" },
                "Site": { "iri": "http://example.org/site/9", "Label": "north" }
            }
        }));
        let owner = group.sub_group("Owner").unwrap();
        assert_eq!(
            owner.sub_query_ref,
            Some(SubQueryRef {
                iri: "http://example.org/owner/1".to_string(),
                source: Some("http://other:3838".to_string()),
            })
        );
        assert!(owner.display_order.is_empty());

        let site = group.sub_group("Site").unwrap();
        assert_eq!(site.sub_query_ref.as_ref().map(|r| r.source.clone()), Some(None));
    }

    #[test]
    fn test_root_reference_fields_are_plain_attributes() {
        let group = build(&json!({
            "meta": {
                "iri": "http://example.org/tower/7",
                "stack": "east",
                "Owner": { "iri": "http://example.org/owner/1" }
            }
        }));
        assert!(group.sub_query_ref.is_none());
        assert_eq!(group.display_order, vec!["iri", "stack", "Owner"]);
        assert_eq!(group.attribute("iri").unwrap().value, "http://example.org/tower/7");
        assert!(group.sub_group("Owner").unwrap().sub_query_ref.is_some());
        assert!(group.sub_group("Owner").unwrap().display_order.is_empty());
    }

    #[test]
    fn test_depth_guard_drops_deep_branch() {
        let options = ExtractOptions {
            max_depth: 2,
            ..ExtractOptions::default()
        };
        let document = json!({
            "meta": {
                "l1": { "l2": { "l3": { "leaf": 1 } }, "kept": 1 },
                "top": 0
            }
        });
        let group = build_attribute_tree(&document, &options);
        let l1 = group.sub_group("l1").unwrap();
        let l2 = l1.sub_group("l2").unwrap();
        assert!(l2.sub_group("l3").is_none());
        assert!(l2.display_order.is_empty());
        assert_eq!(l1.display_order, vec!["l2", "kept"]);
        assert_display_order_partitions(&group);
    }

    #[test]
    fn test_null_value_field_is_a_group() {
        let group = build(&json!({ "meta": { "odd": { "value": null, "inner": 4 } } }));
        let odd = group.sub_group("odd").unwrap();
        assert_eq!(odd.display_order, vec!["inner"]);
    }
}
