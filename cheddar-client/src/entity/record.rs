//! Generic entity storage, dirty tracking and XML loading
//!
//! Every domain entity wraps an [`Entity`]. The entity keeps the last synced
//! field values, the changes made since the last sync, and its nested
//! entities. Loading a response fragment infers the shape of each child
//! element from its structure, because the client is given no schema:
//!
//! - a leaf element is a scalar field
//! - an element whose children all share one tag is a list of entities
//! - any other element with children is a single nested entity

use std::collections::BTreeMap;

use crate::api::xml::XmlElement;
use crate::error::{CheddarError, Result};

use super::registry::{self, EntityKind, Resource};
use super::value::Value;

/// Identity of the entity that constructed a child
///
/// This is a snapshot, not a pointer: children never own or borrow their
/// parent, so an entity tree is a plain tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub kind: EntityKind,
    pub remote_id: Option<String>,
    pub code: Option<String>,
}

impl ParentLink {
    pub fn of(entity: &Entity) -> Self {
        ParentLink {
            kind: entity.kind,
            remote_id: entity.remote_id.clone(),
            code: entity.code.clone(),
        }
    }
}

/// Nested entities stored under a field name
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    One(Box<Resource>),
    Many(Vec<Resource>),
}

impl Relation {
    /// The related entities in order, a single entity counting as one
    pub fn resources(&self) -> &[Resource] {
        match self {
            Relation::One(resource) => std::slice::from_ref(resource.as_ref()),
            Relation::Many(resources) => resources,
        }
    }

    pub fn resources_mut(&mut self) -> &mut [Resource] {
        match self {
            Relation::One(resource) => std::slice::from_mut(resource.as_mut()),
            Relation::Many(resources) => resources,
        }
    }
}

/// Result of reading a field by name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    /// `id` or `code`
    Identifier(Option<&'a str>),
    Value(&'a Value),
    One(&'a Resource),
    Many(&'a [Resource]),
    Parent(&'a ParentLink),
}

impl<'a> FieldRef<'a> {
    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            FieldRef::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Text of a string field or identifier
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldRef::Identifier(id) => *id,
            FieldRef::Value(value) => value.as_str(),
            _ => None,
        }
    }

    /// Scalar view: identifiers become strings, relations have none
    pub fn to_value(&self) -> Option<Value> {
        match self {
            FieldRef::Identifier(id) => Some(Value::from(*id)),
            FieldRef::Value(value) => Some((*value).clone()),
            _ => None,
        }
    }
}

/// Attribute storage shared by all entity types
#[derive(Debug, Clone)]
pub struct Entity {
    kind: EntityKind,
    remote_id: Option<String>,
    code: Option<String>,
    fields: BTreeMap<String, Value>,
    pending: BTreeMap<String, Value>,
    relations: BTreeMap<String, Relation>,
    parent: Option<ParentLink>,
}

impl Entity {
    pub fn new(kind: EntityKind, parent: Option<ParentLink>) -> Self {
        Entity {
            kind,
            remote_id: None,
            code: None,
            fields: BTreeMap::new(),
            pending: BTreeMap::new(),
            relations: BTreeMap::new(),
            parent,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Server-assigned identifier, unset until fetched or created
    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    /// Caller-assigned identifier
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<ParentLink>) {
        self.parent = parent;
    }

    /// An entity is new until it has a remote id
    pub fn is_new(&self) -> bool {
        self.remote_id.is_none()
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Last synced (or last written) values by canonical name
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Changes not yet confirmed by the server
    pub fn pending_changes(&self) -> &BTreeMap<String, Value> {
        &self.pending
    }

    pub fn relations(&self) -> &BTreeMap<String, Relation> {
        &self.relations
    }

    pub fn canonical_name(&self, name: &str) -> String {
        self.kind.naming().canonical(name)
    }

    fn is_parent_name(&self, canonical: &str) -> bool {
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.kind.field_name() == canonical)
    }

    /// Write a scalar field
    ///
    /// `code` can only be written while the entity is new and `id` never.
    /// Relation names cannot be overwritten with a scalar. Any other write is
    /// recorded as pending unless it equals the value already held.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        let canonical = self.canonical_name(name);

        match canonical.as_str() {
            "id" | "remote_id" => return Err(CheddarError::ImmutableField("id".to_string())),
            "code" => {
                if !self.is_new() {
                    return Err(CheddarError::ImmutableField(
                        "code of a saved entity".to_string(),
                    ));
                }
                self.code = match value {
                    Value::Null => None,
                    other => Some(other.to_wire_string()),
                };
                return Ok(());
            }
            _ => {}
        }

        if self.relations.contains_key(&canonical) || self.is_parent_name(&canonical) {
            return Err(CheddarError::ImmutableField(format!(
                "{} (relation of {})",
                canonical, self.kind
            )));
        }

        if self.fields.get(&canonical) != Some(&value) {
            self.pending.insert(canonical.clone(), value.clone());
        }
        self.fields.insert(canonical, value);
        Ok(())
    }

    /// Record a change as pending whether or not it differs from the synced
    /// value, without touching the synced value
    pub fn queue_change(&mut self, name: &str, value: Value) {
        let canonical = self.canonical_name(name);
        self.pending.insert(canonical, value);
    }

    /// Store nested entities; relations are structural and never pending
    pub fn set_relation(&mut self, name: &str, relation: Relation) {
        let canonical = self.canonical_name(name);
        self.fields.remove(&canonical);
        self.relations.insert(canonical, relation);
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(&self.canonical_name(name))
    }

    /// List stored under `name`, created empty when absent
    pub fn list_mut(&mut self, name: &str) -> &mut Vec<Resource> {
        let canonical = self.canonical_name(name);
        self.fields.remove(&canonical);
        let relation = self
            .relations
            .entry(canonical)
            .or_insert_with(|| Relation::Many(Vec::new()));

        if let Relation::One(_) = relation {
            if let Relation::One(single) = std::mem::replace(relation, Relation::Many(Vec::new())) {
                *relation = Relation::Many(vec![*single]);
            }
        }

        match relation {
            Relation::Many(list) => list,
            Relation::One(_) => unreachable!("single relations are converted above"),
        }
    }

    /// Point every nested entity back at this entity's current identity
    pub fn relink_children(&mut self) {
        let link = ParentLink::of(self);
        for relation in self.relations.values_mut() {
            for resource in relation.resources_mut() {
                resource.entity_mut().set_parent(Some(link.clone()));
            }
        }
    }

    /// Related entities of one type, in order
    pub fn related<'a, M: super::Model + 'a>(&'a self, name: &str) -> impl Iterator<Item = &'a M> + use<'a, M> {
        self.relation(name)
            .map(Relation::resources)
            .unwrap_or_default()
            .iter()
            .filter_map(M::from_resource)
    }

    /// Read a field
    ///
    /// Identifiers first, then the parent link and nested entities, then
    /// pending changes, then synced values.
    pub fn get_field(&self, name: &str) -> Result<FieldRef<'_>> {
        let canonical = self.canonical_name(name);

        match canonical.as_str() {
            "id" | "remote_id" => return Ok(FieldRef::Identifier(self.remote_id())),
            "code" => return Ok(FieldRef::Identifier(self.code())),
            _ => {}
        }

        if let Some(parent) = self.parent.as_ref().filter(|_| self.is_parent_name(&canonical)) {
            return Ok(FieldRef::Parent(parent));
        }

        if let Some(relation) = self.relations.get(&canonical) {
            return Ok(match relation {
                Relation::One(resource) => FieldRef::One(resource),
                Relation::Many(resources) => FieldRef::Many(resources),
            });
        }

        self.pending
            .get(&canonical)
            .or_else(|| self.fields.get(&canonical))
            .map(FieldRef::Value)
            .ok_or_else(|| CheddarError::UnknownField(name.to_string()))
    }

    /// Read a scalar field
    pub fn value(&self, name: &str) -> Result<&Value> {
        match self.get_field(name)? {
            FieldRef::Value(value) => Ok(value),
            _ => Err(CheddarError::UnknownField(name.to_string())),
        }
    }

    /// Whether the field has a value, pending or synced
    pub fn contains(&self, name: &str) -> bool {
        let canonical = self.canonical_name(name);
        match canonical.as_str() {
            "id" | "remote_id" => self.remote_id.is_some(),
            "code" => self.code.is_some(),
            _ => self.fields.contains_key(&canonical) || self.pending.contains_key(&canonical),
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Populate this entity from a response fragment
    ///
    /// Identifiers come from the fragment's attributes. Scalars overwrite
    /// the synced values, nested entities replace the relation of the same
    /// name, and pending changes are dropped because the loaded state is
    /// authoritative.
    pub fn load_from_fragment(&mut self, xml: &XmlElement) {
        self.remote_id = non_empty(xml.attribute("id"));
        self.code = non_empty(xml.attribute("code"));

        let link = ParentLink::of(self);
        let naming = self.kind.naming();

        for child in xml.children() {
            let key = naming.canonical(child.tag());

            if child.is_leaf() {
                let value = Value::decode(&key, child.text());
                self.fields.insert(key, value);
            } else if child.has_uniform_children() {
                let mut items = Vec::with_capacity(child.children().len());
                for item_xml in child.children() {
                    match registry::instantiate(item_xml.tag(), Some(link.clone())) {
                        Some(mut item) => {
                            item.entity_mut().load_from_fragment(item_xml);
                            items.push(item);
                        }
                        None => {
                            // Lists are homogeneous, the rest would fail too
                            log::debug!(
                                "No entity type for <{}>, leaving <{}> with {} item(s)",
                                item_xml.tag(),
                                child.tag(),
                                items.len()
                            );
                            break;
                        }
                    }
                }
                self.set_relation(&key, Relation::Many(items));
            } else {
                match registry::instantiate(child.tag(), Some(link.clone())) {
                    Some(mut nested) => {
                        nested.entity_mut().load_from_fragment(child);
                        self.set_relation(&key, Relation::One(Box::new(nested)));
                    }
                    None => log::debug!("No entity type for <{}>, skipping", child.tag()),
                }
            }
        }

        self.pending.clear();
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Entities are equal only when both are known to the server and share
/// the same remote id
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        match (&self.remote_id, &other.remote_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
