//! Operation log entries.
//!
//! The compiler only ever appends creation ops; nothing is updated or
//! deleted. Serialized with a `type` tag, e.g.
//! `{"type":"CREATE_PROPERTY","id":"…","name":"Title","data_type":"TEXT"}`.

use serde::{Deserialize, Serialize};

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Text,
    Time,
}

/// A value bound to a property on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub property: String,
    pub value: String,
}

impl PropertyValue {
    pub fn new(property: &str, value: impl Into<String>) -> Self {
        Self {
            property: property.to_string(),
            value: value.into(),
        }
    }
}

/// One entry of the append-only operation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Op {
    CreateProperty {
        id: String,
        name: String,
        data_type: DataType,
    },
    CreateType {
        id: String,
        name: String,
        property_ids: Vec<String>,
    },
    CreateEntity {
        id: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        type_ids: Vec<String>,
        values: Vec<PropertyValue>,
    },
    CreateRelation {
        id: String,
        from_entity: String,
        to_entity: String,
        type_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_space: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<String>,
    },
}
