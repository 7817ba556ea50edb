use std::sync::OnceLock;
use tfcore::validator::{NumberRangeValidator, StringInSliceValidator, StringLengthValidator};
use tfcore::{
    AttributeBuilder, AttributeType, NestedBlockBuilder, NestingMode, Schema, SchemaBuilder,
};

pub fn trigger_schema() -> Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(build_schema).clone()
}

fn build_schema() -> Schema {
    let workflow_target_settings =
        NestedBlockBuilder::new("workflow_target_settings", NestingMode::Set)
            .description("Optional config for the target. Until the feature gets enabled will always operate in TopLevelPrimitives mode.")
            .max_items(1)
            .attribute(
                AttributeBuilder::new("data_format", AttributeType::String)
                    .description("The data format to use when invoking target.")
                    .optional()
                    .validator(StringInSliceValidator::new(&["Json", "TopLevelPrimitives"]))
                    .build(),
            )
            .build();

    let target = NestedBlockBuilder::new("target", NestingMode::Set)
        .description("Target the trigger will invoke when fired")
        .min_items(1)
        .max_items(1)
        .attribute(
            AttributeBuilder::new("type", AttributeType::String)
                .description("Type of the target the trigger is configured to hit")
                .required()
                .validator(StringInSliceValidator::new(&["Workflow"]))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .description("Id of the target the trigger is configured to hit")
                .required()
                .build(),
        )
        .block(workflow_target_settings)
        .build();

    SchemaBuilder::new()
        .version(1)
        .description("Genesys Cloud Process Automation Trigger")
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .description("Name of the Trigger")
                .required()
                .validator(StringLengthValidator::between(1, 256))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("topic_name", AttributeType::String)
                .description("Topic name that will fire trigger. Changing the topic_name attribute will cause the processautomation_trigger object to be dropped and recreated with a new ID.")
                .required()
                .force_new()
                .validator(StringLengthValidator::between(1, 256))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("enabled", AttributeType::Bool)
                .description("Whether or not the trigger should be fired on events")
                .required()
                .build(),
        )
        .block(target)
        .attribute(
            AttributeBuilder::new("match_criteria", AttributeType::String)
                .description("Match criteria that controls when the trigger will fire, as a JSON string.")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("event_ttl_seconds", AttributeType::Number)
                .description("How old an event can be to fire the trigger. Must be an number greater than or equal to 10. Only one of event_ttl_seconds or delay_by_seconds can be set.")
                .optional()
                .validator(NumberRangeValidator::at_least(10.0))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("delay_by_seconds", AttributeType::Number)
                .description("How long to delay processing of a trigger after an event passes the match criteria. Must be an number between 60 and 900 inclusive. Only one of event_ttl_seconds or delay_by_seconds can be set.")
                .optional()
                .validator(NumberRangeValidator::between(60.0, 900.0))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("description", AttributeType::String)
                .description("A description of the trigger")
                .optional()
                .validator(StringLengthValidator::between(0, 512))
                .build(),
        )
        .build()
}
