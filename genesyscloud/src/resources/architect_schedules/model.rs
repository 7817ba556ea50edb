use chrono::NaiveDateTime;
use serde::Deserialize;
use tfcore::ResourceData;

use super::RESOURCE_TYPE;
use crate::api::architect::Schedule;
use crate::api::DomainEntityRef;
use crate::util::ProviderError;

/// Local date time without zone, microsecond precision
pub const SCHEDULE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleModel {
    pub name: String,
    pub division_id: Option<String>,
    pub description: Option<String>,
    pub start: String,
    pub end: String,
    pub rrule: Option<String>,
}

pub fn parse_schedule_time(value: &str) -> Result<NaiveDateTime, ProviderError> {
    NaiveDateTime::parse_from_str(value, SCHEDULE_TIME_FORMAT).map_err(|e| {
        ProviderError::invalid(
            RESOURCE_TYPE,
            format!("Failed to parse date {}", value),
            e.to_string(),
        )
    })
}

pub fn format_schedule_time(value: &NaiveDateTime) -> String {
    value.format(SCHEDULE_TIME_FORMAT).to_string()
}

impl ScheduleModel {
    /// Configured division, if any; unset means the home division
    pub fn division_id(&self) -> Option<&str> {
        self.division_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn to_schedule(&self, division_id: &str) -> Result<Schedule, ProviderError> {
        Ok(Schedule {
            name: Some(self.name.clone()),
            division: Some(DomainEntityRef {
                id: Some(division_id.to_string()),
                name: None,
            }),
            description: self.description.clone().filter(|d| !d.is_empty()),
            start: Some(parse_schedule_time(&self.start)?),
            end: Some(parse_schedule_time(&self.end)?),
            rrule: self.rrule.clone(),
            ..Schedule::default()
        })
    }
}

pub fn flatten_schedule(schedule: &Schedule, data: &mut ResourceData) {
    data.set_optional_string("name", schedule.name.clone());
    data.set_optional_string(
        "division_id",
        schedule.division.as_ref().and_then(|d| d.id.clone()),
    );
    data.set_optional_string("description", schedule.description.clone());
    data.set_optional_string("start", schedule.start.as_ref().map(format_schedule_time));
    data.set_optional_string("end", schedule.end.as_ref().map(format_schedule_time));
    data.set_optional_string("rrule", schedule.rrule.clone());
}
