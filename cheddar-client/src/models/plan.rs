use log::debug;

use crate::api::Client;
use crate::entity::{Entity, EntityKind, Model, ParentLink, entity_model};
use crate::error::{CheddarError, Result};

use super::{Item, empty_when_not_found, first_fragment, load_all, parent_of_kind};

/// A pricing plan
///
/// Plans are configured in the CheddarGetter admin and are read-only here,
/// except for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    entity: Entity,
}

impl Model for Plan {
    const KIND: EntityKind = EntityKind::Plan;
    const PROJECTION: &'static [&'static str] = &[
        "billing_frequency",
        "trial_days",
        "next_invoice_billing_datetime",
        "billing_frequency_quantity",
        "billing_frequency_unit",
        "recurring_charge_amount",
        "is_free",
        "is_active",
        "name",
        "items",
        "code",
    ];

    fn create(parent: Option<ParentLink>) -> Self {
        Self {
            entity: Entity::new(Self::KIND, parent),
        }
    }

    entity_model!(Plan);
}

impl Plan {
    pub fn new() -> Self {
        Self::create(None)
    }

    /// All plans of the product, empty when the product has none
    pub async fn all(client: &Client) -> Result<Vec<Plan>> {
        empty_when_not_found(
            client
                .perform("/plans/get", None, false, Vec::new())
                .await
                .map(|xml| load_all(&xml)),
        )
    }

    /// The plan with `code`
    pub async fn get(client: &Client, code: &str) -> Result<Plan> {
        let xml = client.perform("/plans/get", Some(code), false, Vec::new()).await?;
        Ok(Plan::from_fragment(first_fragment(&xml, "plan")?, None))
    }

    /// Plans cannot be created or edited through the API
    pub fn save(&self) -> Result<()> {
        Err(CheddarError::Unsupported(
            "plans are managed in the CheddarGetter admin and cannot be saved".to_string(),
        ))
    }

    pub async fn delete(&self, client: &Client) -> Result<()> {
        let code = self
            .code()
            .ok_or_else(|| CheddarError::Validation("No code has been set.".to_string()))?;
        client.perform("/plans/delete", Some(code), false, Vec::new()).await?;
        debug!("Deleted plan {}", code);
        Ok(())
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entity.related(&EntityKind::Item.collection_name())
    }

    pub fn item(&self, code: &str) -> Option<&Item> {
        self.items().find(|item| item.code() == Some(code))
    }

    /// Subscription this plan was loaded from
    pub fn subscription(&self) -> Option<&ParentLink> {
        parent_of_kind(&self.entity, EntityKind::Subscription)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}
