//! Schema types and builders
//!
//! Resources, data sources and the provider describe their configuration
//! with a `Schema`. Besides documenting the shape of a block, the schema is
//! used to validate configuration and to tell the consistency checker which
//! attributes are computed.

use crate::diagnostics::Diagnostics;
use crate::types::{Dynamic, DynamicValue};
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType mirrors Terraform's type system
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == name)
    }

    fn validate(&self, config: &Dynamic, prefix: &str, diagnostics: &mut Diagnostics) {
        let empty = HashMap::new();
        let values = config.as_map().unwrap_or(&empty);

        for attr in &self.attributes {
            let path = join_path(prefix, &attr.name);
            match values.get(&attr.name).unwrap_or(&Dynamic::Null) {
                Dynamic::Null => {
                    if attr.required {
                        diagnostics.add_error(
                            format!("{} is required", path),
                            Some(format!("The argument \"{}\" must be set", attr.name)),
                        );
                    }
                }
                Dynamic::Unknown => {}
                value => {
                    for validator in &attr.validators {
                        validator.validate(value, &path, diagnostics);
                    }
                }
            }
        }

        for nested in &self.block_types {
            let path = join_path(prefix, &nested.type_name);
            let items = match values.get(&nested.type_name) {
                Some(Dynamic::List(items)) => items.as_slice(),
                _ => &[],
            };

            if nested.min_items > 0 && items.len() < nested.min_items {
                diagnostics.add_error(
                    format!("{} requires at least {} block(s)", path, nested.min_items),
                    Some(format!("Got {}", items.len())),
                );
            }
            if nested.max_items > 0 && items.len() > nested.max_items {
                diagnostics.add_error(
                    format!("{} allows at most {} block(s)", path, nested.max_items),
                    Some(format!("Got {}", items.len())),
                );
            }

            for (idx, item) in items.iter().enumerate() {
                nested
                    .block
                    .validate(item, &format!("{}[{}]", path, idx), diagnostics);
            }
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

impl Schema {
    /// Checks required attributes, validators and block counts
    pub fn validate(&self, config: &DynamicValue) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.block.validate(&config.value, "", &mut diagnostics);
        diagnostics
    }
}

#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing the value forces a replacement
    pub force_new: bool,
    pub validators: Vec<Arc<dyn Validator>>,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("force_new", &self.force_new)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .finish()
    }
}

/// Nested configuration block such as `target { ... }`
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: usize,
    /// Zero means unbounded
    pub max_items: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingMode {
    List,
    Set,
}

/// Fluent builder for attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                force_new: false,
                validators: Vec::new(),
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Fluent builder for nested blocks
pub struct NestedBlockBuilder {
    nested: NestedBlock,
}

impl NestedBlockBuilder {
    pub fn new(type_name: &str, nesting: NestingMode) -> Self {
        Self {
            nested: NestedBlock {
                type_name: type_name.to_string(),
                block: Block::default(),
                nesting,
                min_items: 0,
                max_items: 0,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.nested.block.description = desc.to_string();
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.nested.min_items = min;
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.nested.max_items = max;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.nested.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.nested.block.block_types.push(block);
        self
    }

    pub fn build(self) -> NestedBlock {
        self.nested
    }
}

/// Fluent builder for schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::default(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::types::AttributePath;
    use crate::validator::StringLengthValidator;

    fn trigger_like_schema() -> Schema {
        SchemaBuilder::new()
            .version(1)
            .description("Test resource schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .validator(StringLengthValidator::between(1, 8))
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("target", NestingMode::Set)
                    .min_items(1)
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("id", AttributeType::String)
                            .required()
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .force_new()
            .build();

        assert_eq!(attr.name, "name");
        assert!(attr.required);
        assert!(!attr.optional);
        assert!(attr.force_new);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn validate_reports_missing_required_attribute_and_block() {
        let diags = trigger_like_schema().validate(&DynamicValue::object());

        let summaries: Vec<_> = diags.errors.iter().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"name is required"));
        assert!(summaries.contains(&"target requires at least 1 block(s)"));
    }

    #[test]
    fn validate_recurses_into_nested_blocks() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "valid")
            .unwrap();
        config
            .set_list(
                &AttributePath::new("target"),
                vec![Dynamic::Map(HashMap::new())],
            )
            .unwrap();

        let diags = trigger_like_schema().validate(&config);
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].summary, "target[0].id is required");
    }

    #[test]
    fn validate_runs_attribute_validators() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "much too long")
            .unwrap();
        config
            .set_string(&AttributePath::new("target").index(0).attribute("id"), "x")
            .unwrap();

        let diags = trigger_like_schema().validate(&config);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("maximum length of 8"));
    }

    #[test]
    fn lookup_finds_attributes_and_blocks() {
        let schema = trigger_like_schema();
        assert!(schema.block.attribute("id").unwrap().computed);
        assert!(schema.block.nested_block("target").is_some());
        assert!(schema.block.attribute("missing").is_none());
    }
}
