use crate::entity::{Entity, EntityKind, Model, ParentLink, entity_model};

use super::parent_of_kind;

/// A metered feature included in a plan
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    entity: Entity,
}

impl Model for Item {
    const KIND: EntityKind = EntityKind::Item;
    const PROJECTION: &'static [&'static str] = &["name", "quantity_included"];

    fn create(parent: Option<ParentLink>) -> Self {
        Self {
            entity: Entity::new(Self::KIND, parent),
        }
    }

    entity_model!(Item);
}

impl Item {
    pub fn new() -> Self {
        Self::create(None)
    }

    /// Plan this item was loaded from
    pub fn plan(&self) -> Option<&ParentLink> {
        parent_of_kind(&self.entity, EntityKind::Plan)
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new()
    }
}
