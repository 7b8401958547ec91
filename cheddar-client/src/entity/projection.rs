//! Read-only projection of an entity for display and export

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::record::FieldRef;
use super::registry::Resource;
use super::value::Value;

/// A projected field
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    Value(Value),
    Entity(Projection),
    List(Vec<Projection>),
}

impl Serialize for Projected {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Projected::Value(value) => value.serialize(serializer),
            Projected::Entity(projection) => projection.serialize(serializer),
            Projected::List(items) => items.serialize(serializer),
        }
    }
}

/// Ordered field name to value mapping
///
/// Field order follows the entity type's projection list and is kept when
/// serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    entries: Vec<(String, Projected)>,
}

impl Projection {
    /// Project `names` from an entity, omitting fields it does not have
    ///
    /// Parent links are never followed, so projecting a tree terminates.
    pub fn build<'a>(
        names: &[&str],
        read: impl Fn(&str) -> crate::error::Result<FieldRef<'a>>,
    ) -> Self {
        let entries = names
            .iter()
            .filter_map(|name| {
                let projected = match read(name).ok()? {
                    FieldRef::Identifier(id) => Projected::Value(Value::from(id)),
                    FieldRef::Value(value) => Projected::Value(value.clone()),
                    FieldRef::One(resource) => Projected::Entity(resource.project()),
                    FieldRef::Many(resources) => {
                        Projected::List(resources.iter().map(Resource::project).collect())
                    }
                    FieldRef::Parent(_) => return None,
                };
                Some((name.to_string(), projected))
            })
            .collect();
        Projection { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Projected> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, projected)| projected)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serializing plain values to a JSON tree cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, projected) in &self.entries {
            map.serialize_entry(key, projected)?;
        }
        map.end()
    }
}
