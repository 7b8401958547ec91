use log::debug;

use crate::api::naming::{FieldKey, to_canonical};
use crate::api::Client;
use crate::entity::{Entity, EntityKind, FieldRef, Model, ParentLink, Relation, Value, entity_model};
use crate::error::{CheddarError, Result};

use super::{GatewayAccount, Invoice, Plan, first_fragment, parent_of_kind};

/// Payment fields that are never cached and are sent on every save after
/// being written
pub const PAYMENT_FIELDS: &[&str] = &[
    "cc_first_name",
    "cc_last_name",
    "cc_number",
    "cc_expiration",
    "cc_card_code",
    "method",
];

/// Outcome of [`Subscription::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionSave {
    /// Changes were submitted and the subscription reloaded
    Saved,
    /// Nothing was pending
    Unchanged,
    /// The API only creates subscriptions through their customer, so the
    /// customer has to be saved instead
    DeferredToCustomer,
}

/// A customer's subscription to a plan
///
/// Holds its plans most recent first; the first one is the current plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    entity: Entity,
}

impl Model for Subscription {
    const KIND: EntityKind = EntityKind::Subscription;
    const PROJECTION: &'static [&'static str] = &[
        "cc_last_four",
        "cc_company",
        "cc_state",
        "cc_type",
        "cc_city",
        "cc_zip",
        "cc_country",
        "cc_first_name",
        "cc_last_name",
        "cc_email",
        "cc_expiration_date",
        "cc_address",
        "created_datetime",
        "canceled_datetime",
        "gateway_account",
        "cancel_type",
        "plan",
        "redirect_url",
    ];

    fn create(parent: Option<ParentLink>) -> Self {
        let mut entity = Entity::new(Self::KIND, parent);
        let placeholder = Plan::create(Some(ParentLink::of(&entity)));
        entity.set_relation(&EntityKind::Plan.collection_name(), Relation::Many(vec![placeholder.into_resource()]));
        Self { entity }
    }

    entity_model!(Subscription);

    /// `plan` reads the current plan and `plan_code` its code
    fn get_field(&self, name: &str) -> Result<FieldRef<'_>> {
        match to_canonical(name).as_str() {
            "plan" => self
                .entity
                .relation(&EntityKind::Plan.collection_name())
                .and_then(|plans| plans.resources().first())
                .map(FieldRef::One)
                .ok_or_else(|| CheddarError::UnknownField(name.to_string())),
            "plan_code" => Ok(FieldRef::Identifier(self.plan().and_then(|plan| plan.code()))),
            _ => self.entity.get_field(name),
        }
    }

    fn write_field(&mut self, name: &str, value: Value) -> Result<()> {
        let canonical = to_canonical(name);
        if canonical == "plan" {
            return Err(CheddarError::ImmutableField(format!(
                "plan (relation of {})",
                Self::KIND
            )));
        }
        if canonical == "plan_code" {
            return Err(CheddarError::Validation(
                "changing the plan needs a plan lookup, use Subscription::change_plan".to_string(),
            ));
        }
        if PAYMENT_FIELDS.contains(&canonical.as_str()) {
            self.entity.queue_change(&canonical, value);
            return Ok(());
        }
        self.entity.set_field(&canonical, value)
    }
}

impl Subscription {
    pub fn new() -> Self {
        Self::create(None)
    }

    /// Plans, most recent first
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.entity.related(&EntityKind::Plan.collection_name())
    }

    /// The current plan
    pub fn plan(&self) -> Option<&Plan> {
        self.plans().next()
    }

    pub fn invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.entity.related(&EntityKind::Invoice.collection_name())
    }

    pub fn gateway_account(&self) -> Option<&GatewayAccount> {
        match self.entity.relation("gateway_account")? {
            Relation::One(resource) => resource.as_model(),
            Relation::Many(resources) => resources.first().and_then(|r| r.as_model()),
        }
    }

    /// Customer this subscription belongs to
    pub fn customer(&self) -> Option<&ParentLink> {
        parent_of_kind(&self.entity, EntityKind::Customer)
    }

    /// Move the subscription to the plan with `code`
    ///
    /// The plan is fetched first and becomes the current plan. Asking for the
    /// plan that is already current does nothing and sends no request: the
    /// plan is not fetched again and the plan list is left as it is.
    pub async fn change_plan(&mut self, client: &Client, code: &str) -> Result<()> {
        if self.plan().and_then(|plan| plan.code()) == Some(code) {
            debug!("Subscription already on plan {}", code);
            return Ok(());
        }

        let mut plan = Plan::get(client, code).await?;
        plan.entity_mut().set_parent(Some(self.link()));
        self.entity.list_mut(&EntityKind::Plan.collection_name()).insert(0, plan.into_resource());
        self.entity.queue_change("plan_code", Value::from(code));
        Ok(())
    }

    fn is_canceled_by_customer(&self) -> bool {
        self.entity
            .get_field("cancel_type")
            .ok()
            .and_then(|field| field.as_str())
            == Some("customer")
    }

    fn customer_code(&self) -> Result<String> {
        self.customer()
            .and_then(|customer| customer.code.clone())
            .ok_or_else(|| {
                CheddarError::Validation("subscription is not attached to a saved customer".to_string())
            })
    }

    /// Submit pending changes
    ///
    /// New subscriptions and subscriptions canceled by the customer can only
    /// be (re)created through their customer, see [`Customer::save_subscription`].
    ///
    /// [`Customer::save_subscription`]: super::Customer::save_subscription
    pub async fn save(&mut self, client: &Client) -> Result<SubscriptionSave> {
        if self.is_new() || self.is_canceled_by_customer() {
            return Ok(SubscriptionSave::DeferredToCustomer);
        }
        if !self.is_dirty() {
            return Ok(SubscriptionSave::Unchanged);
        }

        let code = self.customer_code()?;
        let fields = self
            .entity
            .pending_changes()
            .iter()
            .map(|(name, value)| (FieldKey::field(name.as_str()), value.clone()))
            .collect();

        let xml = client
            .perform("/customers/edit-subscription", Some(&code), false, fields)
            .await?;
        self.entity.load_from_fragment(first_fragment(&xml, "subscription")?);
        Ok(SubscriptionSave::Saved)
    }

    /// Cancel the subscription and reload it from the response
    pub async fn cancel(&mut self, client: &Client) -> Result<()> {
        let code = self.customer_code()?;
        let xml = client.perform("/customers/cancel", Some(&code), false, Vec::new()).await?;
        self.entity.load_from_fragment(first_fragment(&xml, "subscription")?);
        Ok(())
    }

    /// Always passes; present so customer validation covers its subscription
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}
