use crate::entity::{Entity, EntityKind, Model, ParentLink, entity_model};

use super::parent_of_kind;

/// Payment gateway a subscription is billed through
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayAccount {
    entity: Entity,
}

impl Model for GatewayAccount {
    const KIND: EntityKind = EntityKind::GatewayAccount;
    const PROJECTION: &'static [&'static str] = &["gateway"];

    fn create(parent: Option<ParentLink>) -> Self {
        Self {
            entity: Entity::new(Self::KIND, parent),
        }
    }

    entity_model!(GatewayAccount);
}

impl GatewayAccount {
    pub fn new() -> Self {
        Self::create(None)
    }

    pub fn subscription(&self) -> Option<&ParentLink> {
        parent_of_kind(&self.entity, EntityKind::Subscription)
    }
}

impl Default for GatewayAccount {
    fn default() -> Self {
        Self::new()
    }
}
