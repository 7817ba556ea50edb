use std::sync::OnceLock;
use tfcore::validator::StringLengthValidator;
use tfcore::{
    AttributeBuilder, AttributeType, NestedBlockBuilder, NestingMode, Schema, SchemaBuilder,
};

pub fn external_source_schema() -> Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(build_schema).clone()
}

fn build_schema() -> Schema {
    let link_configuration = NestedBlockBuilder::new("link_configuration", NestingMode::List)
        .description("The link configuration of the external source.")
        .max_items(1)
        .attribute(
            AttributeBuilder::new("uri_template", AttributeType::String)
                .description("The URI template used to build a link to the contact in the external system.")
                .required()
                .build(),
        )
        .build();

    SchemaBuilder::new()
        .version(1)
        .description("Genesys Cloud External Contacts External Source")
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .description("The name of the external source.")
                .required()
                .validator(StringLengthValidator::between(1, 255))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("active", AttributeType::Bool)
                .description("Whether the external source is active.")
                .required()
                .build(),
        )
        .block(link_configuration)
        .build()
}

pub fn external_source_data_source_schema() -> Schema {
    SchemaBuilder::new()
        .description("Data source for Genesys Cloud External Contacts External Sources. Select an external source by name.")
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .description("External source name.")
                .required()
                .build(),
        )
        .build()
}
