//! Closed registry of entity types
//!
//! XML tags are resolved to entity types through a fixed table of factory
//! functions, built once. A tag whose derived type name is not in the table
//! has no entity type and is skipped by the loader.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::api::naming::{FieldNaming, type_name_for_tag};
use crate::api::pluralization::pluralize;
use crate::error::Result;
use crate::models::{Customer, GatewayAccount, Invoice, Item, MetaDatum, Plan, Subscription};

use super::model::Model;
use super::projection::Projection;
use super::record::{Entity, FieldRef, ParentLink};

/// The entity types known to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customer,
    Subscription,
    Plan,
    Item,
    Invoice,
    GatewayAccount,
    MetaDatum,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Customer,
        EntityKind::Subscription,
        EntityKind::Plan,
        EntityKind::Item,
        EntityKind::Invoice,
        EntityKind::GatewayAccount,
        EntityKind::MetaDatum,
    ];

    /// Type name a tag must singularize and camelize to
    pub fn type_name(self) -> &'static str {
        match self {
            EntityKind::Customer => "Customer",
            EntityKind::Subscription => "Subscription",
            EntityKind::Plan => "Plan",
            EntityKind::Item => "Item",
            EntityKind::Invoice => "Invoice",
            EntityKind::GatewayAccount => "GatewayAccount",
            EntityKind::MetaDatum => "MetaDatum",
        }
    }

    /// Name under which a child reads this kind as its parent
    pub fn field_name(self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Subscription => "subscription",
            EntityKind::Plan => "plan",
            EntityKind::Item => "item",
            EntityKind::Invoice => "invoice",
            EntityKind::GatewayAccount => "gateway_account",
            EntityKind::MetaDatum => "meta_datum",
        }
    }

    /// Relation name a parent stores a list of this kind under
    pub fn collection_name(self) -> String {
        pluralize(self.field_name())
    }

    /// Metadata keys are caller-defined and never case-converted
    pub fn naming(self) -> FieldNaming {
        match self {
            EntityKind::MetaDatum => FieldNaming::Verbatim,
            _ => FieldNaming::Translated,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Any entity, as held in a relation
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Customer(Customer),
    Subscription(Subscription),
    Plan(Plan),
    Item(Item),
    Invoice(Invoice),
    GatewayAccount(GatewayAccount),
    MetaDatum(MetaDatum),
}

macro_rules! dispatch {
    ($resource:expr, $model:ident => $body:expr) => {
        match $resource {
            Resource::Customer($model) => $body,
            Resource::Subscription($model) => $body,
            Resource::Plan($model) => $body,
            Resource::Item($model) => $body,
            Resource::Invoice($model) => $body,
            Resource::GatewayAccount($model) => $body,
            Resource::MetaDatum($model) => $body,
        }
    };
}

impl Resource {
    pub fn kind(&self) -> EntityKind {
        self.entity().kind()
    }

    pub fn entity(&self) -> &Entity {
        dispatch!(self, model => model.entity())
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        dispatch!(self, model => model.entity_mut())
    }

    /// Read a field with the entity type's own read rules
    pub fn get_field(&self, name: &str) -> Result<FieldRef<'_>> {
        dispatch!(self, model => model.get_field(name))
    }

    pub fn project(&self) -> Projection {
        dispatch!(self, model => model.project())
    }

    pub fn as_model<M: Model>(&self) -> Option<&M> {
        M::from_resource(self)
    }

}

/// Builds an empty entity of one type, attached to an optional parent
pub type Factory = fn(Option<ParentLink>) -> Resource;

fn build<M: Model>(parent: Option<ParentLink>) -> Resource {
    M::create(parent).into_resource()
}

static REGISTRY: Lazy<HashMap<&'static str, Factory>> = Lazy::new(|| {
    let factories: [(EntityKind, Factory); 7] = [
        (EntityKind::Customer, build::<Customer>),
        (EntityKind::Subscription, build::<Subscription>),
        (EntityKind::Plan, build::<Plan>),
        (EntityKind::Item, build::<Item>),
        (EntityKind::Invoice, build::<Invoice>),
        (EntityKind::GatewayAccount, build::<GatewayAccount>),
        (EntityKind::MetaDatum, build::<MetaDatum>),
    ];
    factories
        .into_iter()
        .map(|(kind, factory)| (kind.type_name(), factory))
        .collect()
});

/// Factory registered under an exact type name
pub fn factory_for_type(type_name: &str) -> Option<Factory> {
    REGISTRY.get(type_name).copied()
}

/// Factory for the entity type a tag refers to
pub fn resolve_tag(tag: &str) -> Option<Factory> {
    factory_for_type(&type_name_for_tag(tag))
}

/// Empty entity for a tag, or `None` when the tag has no registered type
pub fn instantiate(tag: &str, parent: Option<ParentLink>) -> Option<Resource> {
    resolve_tag(tag).map(|factory| factory(parent))
}
