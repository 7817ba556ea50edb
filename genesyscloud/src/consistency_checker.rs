//! Post-write consistency check
//!
//! The platform is eventually consistent: a read right after a write may
//! still return the old object. A [`ConsistencyCheck`] remembers the state a
//! read started from and reports a retryable mismatch until the re-read
//! state agrees with it.

use std::collections::HashMap;
use thiserror::Error;
use tfcore::schema::{Block, NestedBlock};
use tfcore::{Dynamic, ResourceData, Schema};

use crate::util::{ProviderError, RetryOutcome};

#[derive(Debug, Clone, Error)]
#[error("mismatch on attribute {key}:\nexpected value: {expected}\nactual value:   {actual}")]
pub struct ConsistencyError {
    pub resource_type: String,
    pub key: String,
    pub expected: Dynamic,
    pub actual: Dynamic,
}

pub trait ConsistencyChecker: Send + Sync {
    /// Retryable when `current` disagrees with the captured state
    fn check_state(&self, current: &ResourceData) -> RetryOutcome<()>;
}

enum Field {
    Attribute { computed: bool },
    Block { has_computed: bool },
}

pub struct ConsistencyCheck {
    resource_type: String,
    enabled: bool,
    empty_state: bool,
    desired: Vec<(String, Field, Dynamic)>,
}

impl ConsistencyCheck {
    pub fn new(data: &ResourceData, schema: &Schema, enabled: bool, resource_type: &str) -> Self {
        let desired = snapshot(data, &schema.block);
        let empty_state = desired
            .iter()
            .all(|(key, _, value)| !has_meaningful_value(key, value));

        Self {
            resource_type: resource_type.to_string(),
            enabled,
            empty_state,
            desired,
        }
    }

    fn should_skip(field: &Field, expected: &Dynamic, actual: &Dynamic) -> bool {
        if matches!(expected, Dynamic::Null | Dynamic::Unknown) {
            return true;
        }
        match field {
            Field::Attribute { computed } => *computed,
            Field::Block { has_computed } => {
                *has_computed || (expected.is_empty() && actual.is_empty())
            }
        }
    }
}

impl ConsistencyChecker for ConsistencyCheck {
    fn check_state(&self, current: &ResourceData) -> RetryOutcome<()> {
        if !self.enabled || self.empty_state {
            return RetryOutcome::Success(());
        }

        for (key, field, expected) in &self.desired {
            let actual = current.get(key).cloned().unwrap_or(Dynamic::Null);
            if Self::should_skip(field, expected, &actual) {
                continue;
            }
            if !compare_values(expected, &actual) {
                tracing::debug!(
                    "{} {} not yet consistent on {}",
                    self.resource_type,
                    current.id(),
                    key
                );
                return RetryOutcome::Retryable(ProviderError::Consistency(ConsistencyError {
                    resource_type: self.resource_type.clone(),
                    key: key.clone(),
                    expected: expected.clone(),
                    actual,
                }));
            }
        }

        RetryOutcome::Success(())
    }
}

fn snapshot(data: &ResourceData, block: &Block) -> Vec<(String, Field, Dynamic)> {
    let value_of = |name: &str| data.get(name).cloned().unwrap_or(Dynamic::Null);

    let attributes = block.attributes.iter().map(|attr| {
        (
            attr.name.clone(),
            Field::Attribute {
                computed: attr.computed,
            },
            value_of(&attr.name),
        )
    });
    let blocks = block.block_types.iter().map(|nested| {
        (
            nested.type_name.clone(),
            Field::Block {
                has_computed: has_computed_attribute(nested),
            },
            value_of(&nested.type_name),
        )
    });

    attributes.chain(blocks).collect()
}

fn has_computed_attribute(nested: &NestedBlock) -> bool {
    nested.block.attributes.iter().any(|a| a.computed)
        || nested.block.block_types.iter().any(has_computed_attribute)
}

/// Anything other than ids and empty collections makes the state non-empty
fn has_meaningful_value(key: &str, value: &Dynamic) -> bool {
    match value {
        Dynamic::Null | Dynamic::Unknown => false,
        Dynamic::List(items) => items.iter().any(|item| has_meaningful_value(key, item)),
        Dynamic::Map(fields) => fields.iter().any(|(k, v)| has_meaningful_value(k, v)),
        _ => !key.ends_with("id"),
    }
}

fn is_empty_block(value: &Dynamic) -> bool {
    match value {
        Dynamic::Map(fields) => fields.values().all(Dynamic::is_empty),
        other => other.is_empty(),
    }
}

fn compare_values(expected: &Dynamic, actual: &Dynamic) -> bool {
    match (expected, actual) {
        (Dynamic::List(old), Dynamic::List(new)) => compare_lists(old, new),
        (Dynamic::List(old), Dynamic::Null) => compare_lists(old, &[]),
        (Dynamic::Map(old), Dynamic::Map(new)) => compare_maps(old, new),
        (Dynamic::Null, other) | (other, Dynamic::Null) => other.is_empty(),
        (old, new) => old == new,
    }
}

fn compare_lists(old: &[Dynamic], new: &[Dynamic]) -> bool {
    if new.is_empty() && old.len() == 1 && is_empty_block(&old[0]) {
        return true;
    }
    if old.len() != new.len() {
        return false;
    }
    contains_all(old, new) && contains_all(new, old)
}

// Order-insensitive; elements may be maps so sorting is not an option
fn contains_all(needles: &[Dynamic], haystack: &[Dynamic]) -> bool {
    needles
        .iter()
        .all(|needle| haystack.iter().any(|candidate| compare_values(needle, candidate)))
}

/// Keys the platform returned must agree; keys it dropped are ignored
fn compare_maps(old: &HashMap<String, Dynamic>, new: &HashMap<String, Dynamic>) -> bool {
    new.iter().all(|(key, value)| {
        let expected = old.get(key).unwrap_or(&Dynamic::Null);
        compare_values(expected, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfcore::{
        AttributeBuilder, AttributeType, DynamicValue, NestedBlockBuilder, NestingMode,
        SchemaBuilder,
    };

    const RESOURCE: &str = "genesyscloud_test";

    fn schema() -> Schema {
        SchemaBuilder::new()
            .attribute(AttributeBuilder::new("id", AttributeType::String).computed().build())
            .attribute(AttributeBuilder::new("name", AttributeType::String).required().build())
            .attribute(
                AttributeBuilder::new("division_id", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(AttributeBuilder::new("enabled", AttributeType::Bool).optional().build())
            .attribute(
                AttributeBuilder::new("tags", AttributeType::List(Box::new(AttributeType::String)))
                    .optional()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("target", NestingMode::Set)
                    .attribute(
                        AttributeBuilder::new("type", AttributeType::String)
                            .required()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("id", AttributeType::String)
                            .required()
                            .build(),
                    )
                    .max_items(1)
                    .build(),
            )
            .build()
    }

    fn strings(values: &[&str]) -> Dynamic {
        Dynamic::List(values.iter().map(|v| Dynamic::String(v.to_string())).collect())
    }

    fn target(kind: &str, id: &str) -> Dynamic {
        let mut fields = HashMap::new();
        fields.insert("type".to_string(), Dynamic::String(kind.to_string()));
        fields.insert("id".to_string(), Dynamic::String(id.to_string()));
        Dynamic::List(vec![Dynamic::Map(fields)])
    }

    fn desired() -> ResourceData {
        let mut data = ResourceData::new(DynamicValue::object());
        data.set_id("abc");
        data.set("name", Dynamic::String("queue".to_string()));
        data.set("enabled", Dynamic::Bool(true));
        data.set("tags", strings(&["a", "b"]));
        data.set("target", target("Workflow", "flow-1"));
        data
    }

    #[test]
    fn identical_state_is_consistent() {
        let data = desired();
        let check = ConsistencyCheck::new(&data, &schema(), true, RESOURCE);
        assert!(matches!(check.check_state(&data), RetryOutcome::Success(())));
    }

    #[test]
    fn stale_read_is_retryable_with_message() {
        let check = ConsistencyCheck::new(&desired(), &schema(), true, RESOURCE);
        let mut stale = desired();
        stale.set("name", Dynamic::String("old".to_string()));

        match check.check_state(&stale) {
            RetryOutcome::Retryable(err) => assert_eq!(
                err.to_string(),
                "mismatch on attribute name:\nexpected value: \"queue\"\nactual value:   \"old\""
            ),
            other => panic!("expected retryable, got {:?}", other),
        }
    }

    #[test]
    fn lists_compare_without_order() {
        let check = ConsistencyCheck::new(&desired(), &schema(), true, RESOURCE);
        let mut current = desired();
        current.set("tags", strings(&["b", "a"]));
        assert!(matches!(check.check_state(&current), RetryOutcome::Success(())));

        current.set("tags", strings(&["a", "a"]));
        assert!(matches!(check.check_state(&current), RetryOutcome::Retryable(_)));
    }

    #[test]
    fn computed_attribute_filled_by_platform_is_skipped() {
        let check = ConsistencyCheck::new(&desired(), &schema(), true, RESOURCE);
        let mut current = desired();
        current.set("division_id", Dynamic::String("home".to_string()));
        assert!(matches!(check.check_state(&current), RetryOutcome::Success(())));
    }

    #[test]
    fn nested_block_mismatch_is_detected() {
        let check = ConsistencyCheck::new(&desired(), &schema(), true, RESOURCE);
        let mut current = desired();
        current.set("target", target("Workflow", "flow-2"));
        assert!(matches!(check.check_state(&current), RetryOutcome::Retryable(_)));
    }

    #[test]
    fn state_with_only_ids_is_never_checked() {
        let mut imported = ResourceData::new(DynamicValue::object());
        imported.set_id("abc");
        imported.set("division_id", Dynamic::String("d1".to_string()));
        let check = ConsistencyCheck::new(&imported, &schema(), true, RESOURCE);

        assert!(matches!(check.check_state(&desired()), RetryOutcome::Success(())));
    }

    #[test]
    fn disabled_check_always_passes() {
        let check = ConsistencyCheck::new(&desired(), &schema(), false, RESOURCE);
        let mut current = desired();
        current.set("name", Dynamic::String("other".to_string()));
        assert!(matches!(check.check_state(&current), RetryOutcome::Success(())));
    }

    #[test]
    fn null_and_zero_values_are_equal() {
        assert!(compare_values(&Dynamic::Null, &Dynamic::String(String::new())));
        assert!(compare_values(&Dynamic::Bool(false), &Dynamic::Null));
        assert!(!compare_values(&Dynamic::Null, &Dynamic::Number(3.0)));
    }

    #[test]
    fn single_empty_block_equals_empty_list() {
        let mut empty = HashMap::new();
        empty.insert("data_format".to_string(), Dynamic::Null);
        let old = Dynamic::List(vec![Dynamic::Map(empty)]);
        assert!(compare_values(&old, &Dynamic::List(vec![])));
        assert!(compare_values(&old, &Dynamic::Null));
    }

    #[test]
    fn maps_compare_on_returned_keys() {
        let mut old = HashMap::new();
        old.insert("a".to_string(), Dynamic::String("1".to_string()));
        old.insert("b".to_string(), Dynamic::String("2".to_string()));
        let mut new = HashMap::new();
        new.insert("a".to_string(), Dynamic::String("1".to_string()));

        assert!(compare_values(&Dynamic::Map(old.clone()), &Dynamic::Map(new.clone())));

        new.insert("c".to_string(), Dynamic::String("3".to_string()));
        assert!(!compare_values(&Dynamic::Map(old), &Dynamic::Map(new)));
    }
}
