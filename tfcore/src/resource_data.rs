//! Key/value view of a single resource instance
//!
//! `ResourceData` wraps the state object together with its id and whether
//! the instance was created in the current operation. Clearing the id means
//! the resource no longer exists and should be dropped from state.

use crate::types::{AttributePath, Dynamic, DynamicValue};

const ID_ATTRIBUTE: &str = "id";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceData {
    state: DynamicValue,
    new_resource: bool,
}

impl ResourceData {
    pub fn new(state: DynamicValue) -> Self {
        let state = if state.is_null() {
            DynamicValue::object()
        } else {
            state
        };
        Self {
            state,
            new_resource: false,
        }
    }

    /// Instance created during this apply
    pub fn new_resource(state: DynamicValue) -> Self {
        Self {
            new_resource: true,
            ..Self::new(state)
        }
    }

    pub fn is_new_resource(&self) -> bool {
        self.new_resource
    }

    pub fn set_new_resource(&mut self, new_resource: bool) {
        self.new_resource = new_resource;
    }

    pub fn id(&self) -> String {
        self.get_string(ID_ATTRIBUTE).unwrap_or_default()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if id.is_empty() {
            self.clear_id();
        } else {
            self.set(ID_ATTRIBUTE, Dynamic::String(id));
        }
    }

    pub fn clear_id(&mut self) {
        self.set(ID_ATTRIBUTE, Dynamic::Null);
    }

    /// A cleared id means the instance is gone
    pub fn exists(&self) -> bool {
        !self.id().is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Dynamic> {
        self.state.get(&AttributePath::new(name)).ok()
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(Dynamic::as_string)
            .map(str::to_string)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Dynamic::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Dynamic::as_number).map(|n| n as i64)
    }

    /// Top level attributes are always settable on an object
    pub fn set(&mut self, name: &str, value: Dynamic) {
        if let Dynamic::Map(m) = &mut self.state.value {
            m.insert(name.to_string(), value);
        }
    }

    pub fn set_optional_string(&mut self, name: &str, value: Option<String>) {
        self.set(name, value.map(Dynamic::String).unwrap_or(Dynamic::Null));
    }

    pub fn set_optional_int(&mut self, name: &str, value: Option<i64>) {
        self.set(
            name,
            value
                .map(|n| Dynamic::Number(n as f64))
                .unwrap_or(Dynamic::Null),
        );
    }

    pub fn set_optional_bool(&mut self, name: &str, value: Option<bool>) {
        self.set(name, value.map(Dynamic::Bool).unwrap_or(Dynamic::Null));
    }

    pub fn state(&self) -> &DynamicValue {
        &self.state
    }

    /// State to hand back to Terraform; None once the id was cleared
    pub fn into_state(self) -> Option<DynamicValue> {
        if self.exists() {
            Some(self.state)
        } else {
            None
        }
    }
}
