//! CheddarGetter domain entities

pub mod customer;
pub mod gateway_account;
pub mod invoice;
pub mod item;
pub mod meta_datum;
pub mod plan;
pub mod subscription;

pub use customer::Customer;
pub use gateway_account::GatewayAccount;
pub use invoice::Invoice;
pub use item::Item;
pub use meta_datum::MetaDatum;
pub use plan::Plan;
pub use subscription::{Subscription, SubscriptionSave};

use crate::api::xml::XmlElement;
use crate::entity::{Entity, EntityKind, Model, ParentLink};
use crate::error::{CheddarError, Result};

/// Every `M` fragment in a response, in document order
pub(crate) fn load_all<M: Model>(xml: &XmlElement) -> Vec<M> {
    xml.descendants(M::KIND.field_name())
        .into_iter()
        .map(|fragment| M::from_fragment(fragment, None))
        .collect()
}

/// First `tag` fragment of a response
pub(crate) fn first_fragment<'a>(xml: &'a XmlElement, tag: &str) -> Result<&'a XmlElement> {
    xml.descendants(tag)
        .into_iter()
        .next()
        .ok_or_else(|| CheddarError::UnexpectedResponse {
            message: format!("response has no <{}> element", tag),
            body: String::new(),
            remote: None,
        })
}

/// List fetches treat "not found" as "nothing there"
pub(crate) fn empty_when_not_found<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(err) if err.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

/// The entity's parent, if it was built by an entity of `kind`
pub(crate) fn parent_of_kind(entity: &Entity, kind: EntityKind) -> Option<&ParentLink> {
    entity.parent().filter(|parent| parent.kind == kind)
}
