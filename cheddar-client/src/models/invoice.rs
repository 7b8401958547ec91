use crate::entity::{Entity, EntityKind, Model, ParentLink, entity_model};

use super::parent_of_kind;

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    entity: Entity,
}

impl Model for Invoice {
    const KIND: EntityKind = EntityKind::Invoice;
    const PROJECTION: &'static [&'static str] =
        &["number", "type", "billing_datetime", "created_datetime"];

    fn create(parent: Option<ParentLink>) -> Self {
        Self {
            entity: Entity::new(Self::KIND, parent),
        }
    }

    entity_model!(Invoice);
}

impl Invoice {
    pub fn new() -> Self {
        Self::create(None)
    }

    pub fn subscription(&self) -> Option<&ParentLink> {
        parent_of_kind(&self.entity, EntityKind::Subscription)
    }
}

impl Default for Invoice {
    fn default() -> Self {
        Self::new()
    }
}
