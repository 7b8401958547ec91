use crate::entity::{Entity, EntityKind, Model, ParentLink, Value, entity_model};

use super::parent_of_kind;

/// Caller-defined key/value pair stored on a customer
///
/// Field names are kept exactly as sent by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaDatum {
    entity: Entity,
}

impl Model for MetaDatum {
    const KIND: EntityKind = EntityKind::MetaDatum;
    const PROJECTION: &'static [&'static str] = &["name", "value"];

    fn create(parent: Option<ParentLink>) -> Self {
        Self {
            entity: Entity::new(Self::KIND, parent),
        }
    }

    entity_model!(MetaDatum);
}

impl MetaDatum {
    pub fn new() -> Self {
        Self::create(None)
    }

    /// Name as sent on the wire, so `2024` matches a name decoded as a number
    pub fn name(&self) -> Option<String> {
        match self.entity.value("name") {
            Ok(Value::Null) | Err(_) => None,
            Ok(name) => Some(name.to_wire_string()),
        }
    }

    /// The stored value
    pub fn current_value(&self) -> Option<&Value> {
        Model::value(self, "value").ok()
    }

    pub fn customer(&self) -> Option<&ParentLink> {
        parent_of_kind(&self.entity, EntityKind::Customer)
    }
}

impl Default for MetaDatum {
    fn default() -> Self {
        Self::new()
    }
}
