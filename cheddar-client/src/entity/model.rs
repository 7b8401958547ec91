use crate::api::xml::XmlElement;
use crate::error::{CheddarError, Result};

use super::projection::Projection;
use super::record::{Entity, FieldRef, ParentLink};
use super::registry::{EntityKind, Resource};
use super::value::Value;

/// Behaviour shared by every domain entity
///
/// Implementors only provide access to their [`Entity`] and the conversions
/// to and from [`Resource`]. Types with special read or write rules override
/// [`Model::get_field`] or [`Model::write_field`].
pub trait Model: Sized {
    const KIND: EntityKind;

    /// Fields exposed by [`Model::project`], in output order
    const PROJECTION: &'static [&'static str];

    /// Empty instance, optionally attached to the entity that built it
    fn create(parent: Option<ParentLink>) -> Self;

    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    fn from_resource(resource: &Resource) -> Option<&Self>;

    fn from_resource_mut(resource: &mut Resource) -> Option<&mut Self>;

    fn into_resource(self) -> Resource;

    /// New instance with initial values written through [`Model::set_field`]
    fn seeded<I, K, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut model = Self::create(None);
        for (name, value) in values {
            model.set_field(name.as_ref(), value)?;
        }
        Ok(model)
    }

    /// Instance populated from a response fragment
    fn from_fragment(xml: &XmlElement, parent: Option<ParentLink>) -> Self {
        let mut model = Self::create(parent);
        model.entity_mut().load_from_fragment(xml);
        model
    }

    fn remote_id(&self) -> Option<&str> {
        self.entity().remote_id()
    }

    fn code(&self) -> Option<&str> {
        self.entity().code()
    }

    fn is_new(&self) -> bool {
        self.entity().is_new()
    }

    fn is_dirty(&self) -> bool {
        self.entity().is_dirty()
    }

    fn contains(&self, name: &str) -> bool {
        self.entity().contains(name)
    }

    fn get_field(&self, name: &str) -> Result<FieldRef<'_>> {
        self.entity().get_field(name)
    }

    /// Scalar field value
    fn value(&self, name: &str) -> Result<&Value> {
        match self.get_field(name)? {
            FieldRef::Value(value) => Ok(value),
            _ => Err(CheddarError::UnknownField(name.to_string())),
        }
    }

    fn write_field(&mut self, name: &str, value: Value) -> Result<()> {
        self.entity_mut().set_field(name, value)
    }

    fn set_field<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<()> {
        self.write_field(name, value.into())
    }

    fn project(&self) -> Projection {
        Projection::build(Self::PROJECTION, |name| self.get_field(name))
    }

    /// Identity snapshot handed to children built by this entity
    fn link(&self) -> ParentLink {
        ParentLink::of(self.entity())
    }
}

/// Implements the storage half of [`Model`] for a newtype over [`Entity`]
macro_rules! entity_model {
    ($model:ident) => {
        fn entity(&self) -> &$crate::entity::Entity {
            &self.entity
        }

        fn entity_mut(&mut self) -> &mut $crate::entity::Entity {
            &mut self.entity
        }

        fn from_resource(resource: &$crate::entity::Resource) -> Option<&Self> {
            match resource {
                $crate::entity::Resource::$model(model) => Some(model),
                _ => None,
            }
        }

        fn from_resource_mut(resource: &mut $crate::entity::Resource) -> Option<&mut Self> {
            match resource {
                $crate::entity::Resource::$model(model) => Some(model),
                _ => None,
            }
        }

        fn into_resource(self) -> $crate::entity::Resource {
            $crate::entity::Resource::$model(self)
        }
    };
}

pub(crate) use entity_model;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, MetaDatum, Plan};

    #[test]
    fn test_seeded_values_are_pending() {
        let customer = Customer::seeded([
            ("code", Value::from("1")),
            ("first_name", Value::from("Test")),
            ("lastName", Value::from("User")),
        ])
        .unwrap();

        assert!(customer.is_new());
        assert_eq!(customer.code(), Some("1"));
        let pending = customer.entity().pending_changes();
        assert!(pending.contains_key("first_name"));
        assert!(pending.contains_key("last_name"));
        assert!(!pending.contains_key("code"));
    }

    #[test]
    fn test_resource_round_trip_by_type() {
        let resource = Plan::new().into_resource();
        assert!(Plan::from_resource(&resource).is_some());
        assert!(Customer::from_resource(&resource).is_none());
        assert_eq!(resource.kind(), EntityKind::Plan);
    }

    #[test]
    fn test_value_rejects_identifiers_and_relations() {
        let customer = Customer::new();
        assert!(matches!(customer.value("code"), Err(CheddarError::UnknownField(_))));
        assert!(matches!(customer.value("subscriptions"), Err(CheddarError::UnknownField(_))));
    }

    #[test]
    fn test_verbatim_names_for_metadata() {
        let mut datum = MetaDatum::new();
        datum.set_field("favoriteColor", "blue").unwrap();
        assert!(datum.contains("favoriteColor"));
        assert!(!datum.contains("favorite_color"));
    }
}
