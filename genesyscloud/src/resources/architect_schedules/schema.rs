use std::sync::OnceLock;
use tfcore::validator::StringPatternValidator;
use tfcore::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};

const LOCAL_DATE_TIME: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}$";

fn local_date_time() -> StringPatternValidator {
    StringPatternValidator::new(
        LOCAL_DATE_TIME,
        "a local date time like 2006-01-02T15:04:05.000000",
    )
}

pub fn schedule_schema() -> Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            SchemaBuilder::new()
                .version(1)
                .description("Genesys Cloud Architect Schedules")
                .attribute(
                    AttributeBuilder::new("id", AttributeType::String)
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("name", AttributeType::String)
                        .description("Name of the schedule.")
                        .required()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("division_id", AttributeType::String)
                        .description("The division to which this schedule will belong. If not set, the home division will be used.")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("description", AttributeType::String)
                        .description("Description of the schedule.")
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("start", AttributeType::String)
                        .description("Date time is represented as an ISO-8601 string without a timezone. For example: 2006-01-02T15:04:05.000000.")
                        .required()
                        .validator(local_date_time())
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("end", AttributeType::String)
                        .description("Date time is represented as an ISO-8601 string without a timezone. For example: 2006-01-02T15:04:05.000000.")
                        .required()
                        .validator(local_date_time())
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("rrule", AttributeType::String)
                        .description("An iCal Recurrence Rule (RRULE) string. It is required to be set for schedules determining when upgrades to the Edge software can be applied.")
                        .optional()
                        .build(),
                )
                .build()
        })
        .clone()
}

pub fn schedule_data_source_schema() -> Schema {
    SchemaBuilder::new()
        .description("Data source for Genesys Cloud Schedule. Select a schedule by name.")
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .description("Schedule name.")
                .required()
                .build(),
        )
        .build()
}
