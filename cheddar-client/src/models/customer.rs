use log::debug;

use crate::api::naming::{FieldKey, to_canonical};
use crate::api::Client;
use crate::entity::{Entity, EntityKind, FieldRef, Model, ParentLink, Relation, Value, entity_model};
use crate::error::{CheddarError, Result};

use super::{
    MetaDatum, Subscription, SubscriptionSave, empty_when_not_found, first_fragment, load_all,
};

/// Subscription fields the API accepts as part of a customer mutation
pub const SUBSCRIPTION_FIELDS: &[&str] = &[
    "cc_first_name",
    "cc_last_name",
    "cc_number",
    "cc_expiration",
    "cc_card_code",
    "cc_zip",
    "return_url",
    "cancel_url",
    "method",
    "plan_code",
];

const REQUIRED_FIELDS: &[&str] = &["first_name", "last_name", "email"];

/// A billed customer
///
/// The API creates and edits a customer together with its current
/// subscription, so a customer always holds one, and saving a customer also
/// submits the subscription's pending payment and plan fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    entity: Entity,
}

impl Model for Customer {
    const KIND: EntityKind = EntityKind::Customer;
    const PROJECTION: &'static [&'static str] = &[
        "code",
        "first_name",
        "last_name",
        "email",
        "company",
        "created_datetime",
        "modified_datetime",
        "subscription",
    ];

    fn create(parent: Option<ParentLink>) -> Self {
        let mut entity = Entity::new(Self::KIND, parent);
        let subscription = Subscription::create(Some(ParentLink::of(&entity)));
        entity.set_relation(
            "subscriptions",
            Relation::Many(vec![subscription.into_resource()]),
        );
        Self { entity }
    }

    entity_model!(Customer);

    /// `subscription` reads the current subscription
    fn get_field(&self, name: &str) -> Result<FieldRef<'_>> {
        if to_canonical(name) == "subscription" {
            return self
                .entity
                .relation(&EntityKind::Subscription.collection_name())
                .and_then(|subscriptions| subscriptions.resources().first())
                .map(FieldRef::One)
                .ok_or_else(|| CheddarError::UnknownField(name.to_string()));
        }
        self.entity.get_field(name)
    }

    fn write_field(&mut self, name: &str, value: Value) -> Result<()> {
        let canonical = to_canonical(name);
        if canonical == "subscription" {
            return Err(CheddarError::ImmutableField(format!(
                "subscription (relation of {})",
                Self::KIND
            )));
        }
        let relinks = canonical == "code";
        self.entity.set_field(name, value)?;
        if relinks {
            self.entity.relink_children();
        }
        Ok(())
    }
}

impl Customer {
    pub fn new() -> Self {
        Self::create(None)
    }

    /// All customers of the product
    pub async fn all(client: &Client) -> Result<Vec<Customer>> {
        Self::all_with(client, Vec::<(&str, Value)>::new()).await
    }

    /// Customers matching the given search filters (`subscriptionStatus`,
    /// `planCode`, `createdAfterDate`, ...), sent as request fields
    pub async fn all_with<I, K>(client: &Client, filters: I) -> Result<Vec<Customer>>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let fields = filters
            .into_iter()
            .map(|(name, value)| (FieldKey::field(to_canonical(name.as_ref())), value))
            .collect();
        empty_when_not_found(
            client
                .perform("/customers/get", None, false, fields)
                .await
                .map(|xml| load_all(&xml)),
        )
    }

    /// Lightweight listing of all customers with their current subscription
    pub async fn list(client: &Client) -> Result<Vec<Customer>> {
        empty_when_not_found(
            client
                .perform("/customers/list", None, false, Vec::new())
                .await
                .map(|xml| load_all(&xml)),
        )
    }

    /// The customer with `code`
    pub async fn get(client: &Client, code: &str) -> Result<Customer> {
        let xml = client.perform("/customers/get", Some(code), false, Vec::new()).await?;
        Ok(Customer::from_fragment(first_fragment(&xml, "customer")?, None))
    }

    /// The current subscription
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscriptions().next()
    }

    /// The current subscription, created empty if the customer has none
    pub fn subscription_mut(&mut self) -> &mut Subscription {
        let link = self.link();
        let subscriptions = self.entity.list_mut(&EntityKind::Subscription.collection_name());
        if !subscriptions.iter().any(|r| r.kind() == EntityKind::Subscription) {
            subscriptions.insert(0, Subscription::create(Some(link)).into_resource());
        }
        match subscriptions.iter_mut().find_map(Subscription::from_resource_mut) {
            Some(subscription) => subscription,
            None => unreachable!("a subscription is inserted above"),
        }
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.entity.related(&EntityKind::Subscription.collection_name())
    }

    pub fn metadata_entries(&self) -> impl Iterator<Item = &MetaDatum> {
        self.entity.related(&EntityKind::MetaDatum.collection_name())
    }

    /// Value of the metadata entry called `name`
    pub fn metadata(&self, name: &str) -> Option<&Value> {
        self.metadata_entries()
            .find(|datum| datum.name().as_deref() == Some(name))
            .and_then(MetaDatum::current_value)
    }

    /// Set the metadata entry called `name`, adding it when missing
    pub fn update_metadata(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let link = self.link();
        let entries = self.entity.list_mut(&EntityKind::MetaDatum.collection_name());

        let existing = entries
            .iter_mut()
            .filter_map(MetaDatum::from_resource_mut)
            .find(|datum| datum.name().as_deref() == Some(name));
        if let Some(datum) = existing {
            return datum.set_field("value", value);
        }

        let mut datum = MetaDatum::create(Some(link));
        datum.set_field("name", name)?;
        datum.set_field("value", value)?;
        entries.push(datum.into_resource());
        Ok(())
    }

    /// Check the fields the API requires before anything is sent
    pub fn validate(&self) -> Result<()> {
        if self.code().is_none_or(str::is_empty) {
            return Err(CheddarError::Validation("No code has been set.".to_string()));
        }
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|name| !self.contains(name)) {
            return Err(CheddarError::Validation(format!(
                "Missing required key: \"{}\"",
                missing
            )));
        }
        match self.subscription() {
            Some(subscription) => subscription.validate(),
            None => Ok(()),
        }
    }

    /// Fields submitted by [`Customer::save`]: the customer's own pending
    /// changes, then whitelisted subscription fields, then metadata values
    pub fn pending_submission(&self) -> Vec<(FieldKey, Value)> {
        let mut fields: Vec<(FieldKey, Value)> = self
            .entity
            .pending_changes()
            .iter()
            .map(|(name, value)| (FieldKey::field(name.as_str()), value.clone()))
            .collect();

        if let Some(subscription) = self.subscription() {
            let pending = subscription.entity().pending_changes();
            fields.extend(SUBSCRIPTION_FIELDS.iter().filter_map(|name| {
                pending
                    .get(*name)
                    .map(|value| (FieldKey::nested("subscription", *name), value.clone()))
            }));
        }

        fields.extend(self.metadata_entries().filter_map(|datum| {
            let value = datum.entity().pending_changes().get("value")?;
            Some((FieldKey::metadata(&datum.name()?), value.clone()))
        }));

        fields
    }

    /// Create or edit the customer together with its subscription and
    /// metadata
    ///
    /// A persisted customer with nothing to submit sends no request. On
    /// failure all pending changes are kept for a retry.
    pub async fn save(&mut self, client: &Client) -> Result<()> {
        self.validate()?;

        let fields = self.pending_submission();
        let is_new = self.is_new();
        if !is_new && fields.is_empty() {
            debug!("Customer {:?} has no changes to save", self.code());
            return Ok(());
        }

        let path = if is_new { "/customers/new" } else { "/customers/edit" };
        let code = self.code().map(str::to_string);
        let xml = client.perform(path, code.as_deref(), is_new, fields).await?;

        self.entity.load_from_fragment(first_fragment(&xml, "customer")?);
        self.clear_all_pending();
        Ok(())
    }

    fn clear_all_pending(&mut self) {
        self.entity.clear_pending();
        self.subscription_mut().entity_mut().clear_pending();
        for datum in self.entity.list_mut(&EntityKind::MetaDatum.collection_name()) {
            datum.entity_mut().clear_pending();
        }
    }

    /// Whether [`Customer::save`] would submit anything
    pub fn has_changes(&self) -> bool {
        !self.pending_submission().is_empty()
    }

    /// Save the current subscription, going through the customer when the
    /// API requires it
    pub async fn save_subscription(&mut self, client: &Client) -> Result<()> {
        self.entity.relink_children();
        let outcome = self.subscription_mut().save(client).await?;
        match outcome {
            SubscriptionSave::DeferredToCustomer if self.is_new() || self.has_changes() => {
                self.save(client).await
            }
            _ => Ok(()),
        }
    }

    /// Cancel the current subscription
    pub async fn cancel_subscription(&mut self, client: &Client) -> Result<()> {
        self.entity.relink_children();
        self.subscription_mut().cancel(client).await
    }

    pub async fn delete(&self, client: &Client) -> Result<()> {
        let code = self
            .code()
            .ok_or_else(|| CheddarError::Validation("No code has been set.".to_string()))?;
        client.perform("/customers/delete", Some(code), false, Vec::new()).await?;
        debug!("Deleted customer {}", code);
        Ok(())
    }
}

impl Default for Customer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, test_client};
    use chrono::{TimeZone, Utc};

    fn new_customer() -> Customer {
        let mut customer = Customer::new();
        customer.set_field("code", "test-customer").unwrap();
        customer.set_field("first_name", "Test").unwrap();
        customer.set_field("last_name", "User").unwrap();
        customer.set_field("email", "garbage@saaspire.com").unwrap();
        customer
    }

    #[test]
    fn test_new_customer_writes_are_pending() {
        let customer = new_customer();
        let pending = customer.entity().pending_changes();
        assert!(pending.contains_key("first_name"));
        assert!(pending.contains_key("last_name"));
        assert!(pending.contains_key("email"));
        assert_eq!(customer.subscriptions().count(), 1);
        assert_eq!(
            customer.subscription().unwrap().customer().and_then(|p| p.code.as_deref()),
            Some("test-customer")
        );
    }

    #[test]
    fn test_validate_requires_code_and_contact_fields() {
        let mut customer = Customer::new();
        customer.set_field("first_name", "Test").unwrap();
        match customer.validate() {
            Err(CheddarError::Validation(message)) => assert_eq!(message, "No code has been set."),
            other => panic!("expected validation error, got {:?}", other),
        }

        customer.set_field("code", "1").unwrap();
        customer.set_field("last_name", "User").unwrap();
        match customer.validate() {
            Err(CheddarError::Validation(message)) => {
                assert_eq!(message, "Missing required key: \"email\"")
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        customer.set_field("email", "Email").unwrap();
        assert!(customer.validate().is_ok());
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let (client, transport) = test_client(vec![]);
        let mut customer = Customer::new();
        customer.set_field("code", "1").unwrap();
        assert!(matches!(customer.save(&client).await, Err(CheddarError::Validation(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_customer_without_items_parsing() {
        let (client, transport) = test_client(vec![(200, fixture("customers_without_items.xml"))]);
        let customers = Customer::all(&client).await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().url,
            "https://127.0.0.1/customers/get/productCode/Test"
        );

        assert_eq!(customers.len(), 1);
        let customer = &customers[0];
        assert!(!customer.is_dirty());
        assert_eq!(customer.remote_id(), Some("10681b62-6dcd-102e-b098-40402145ee8b"));
        assert_eq!(customer.value("first_name").unwrap(), &Value::from("Test"));
        assert_eq!(customer.value("last_name").unwrap(), &Value::from("User"));
        assert_eq!(customer.value("email").unwrap(), &Value::from("garbage@saaspire.com"));
        assert_eq!(customer.value("vat_number").unwrap(), &Value::Null);
        assert_eq!(customer.value("is_vat_exempt").unwrap(), &Value::Int(0));
        assert_eq!(customer.value("company").unwrap(), &Value::Null);
        assert_eq!(
            customer.value("modified_datetime").unwrap(),
            &Value::DateTime(Utc.with_ymd_and_hms(2011, 1, 10, 5, 45, 51).unwrap())
        );
        assert_eq!(customer.value("campaign_source").unwrap(), &Value::Null);
        assert_eq!(customer.value("first_contact_datetime").unwrap(), &Value::Null);
        assert_eq!(customer.metadata_entries().count(), 0);

        assert_eq!(customer.subscriptions().count(), 1);
        let subscription = customer.subscription().unwrap();
        assert!(!subscription.is_dirty());
        assert_eq!(subscription.remote_id(), Some("106953e3-6dcd-102e-b098-40402145ee8b"));
        assert_eq!(subscription.customer().and_then(|p| p.remote_id.as_deref()), customer.remote_id());
        assert_eq!(
            subscription.value("created_datetime").unwrap(),
            &Value::DateTime(Utc.with_ymd_and_hms(2011, 1, 10, 5, 45, 51).unwrap())
        );
        assert_eq!(subscription.value("canceled_datetime").unwrap(), &Value::Null);

        assert_eq!(subscription.plans().count(), 1);
        let plan = subscription.plan().unwrap();
        assert_eq!(plan.code(), Some("FREE_MONTHLY"));
        assert_eq!(plan.value("recurring_charge_amount").unwrap(), &Value::Float(0.0));
        assert_eq!(plan.subscription().and_then(|p| p.remote_id.as_deref()), subscription.remote_id());
    }

    #[tokio::test]
    async fn test_not_found_customer() {
        let (client, transport) = test_client(vec![(404, fixture("error_no_customer.xml"))]);
        let err = Customer::get(&client, "-1").await.unwrap_err();

        assert!(transport.last_request().unwrap().url.ends_with("/customers/get/productCode/Test/code/-1"));
        let remote = match &err {
            CheddarError::NotFound(remote) => remote,
            other => panic!("expected not found, got {:?}", other),
        };
        assert_eq!(remote.id.as_deref(), Some("73542"));
        assert_eq!(remote.code.as_deref(), Some("404"));
        assert_eq!(remote.message.as_deref(), Some("Customer not found"));
        assert_eq!(remote.aux_code.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_missing_product_is_a_bad_request() {
        let (client, _) = test_client(vec![(400, fixture("error_no_product.xml"))]);
        let err = Customer::all(&client).await.unwrap_err();

        let remote = match &err {
            CheddarError::BadRequest(remote) => remote,
            other => panic!("expected bad request, got {:?}", other),
        };
        assert_eq!(remote.id.as_deref(), Some("149947"));
        assert_eq!(remote.code.as_deref(), Some("400"));
        assert_eq!(
            remote.message.as_deref(),
            Some("No product selected. Need a productId or productCode.")
        );
        assert_eq!(remote.aux_code.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_list_and_filters() {
        let (client, transport) = test_client(vec![
            (200, fixture("customers_list.xml")),
            (404, fixture("error_no_customer.xml")),
        ]);
        let listed = Customer::list(&client).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(transport.last_request().unwrap().url.contains("/customers/list/"));

        let filtered = Customer::all_with(&client, [("plan_code", Value::from("NONE"))])
            .await
            .unwrap();
        assert!(filtered.is_empty());
        assert_eq!(transport.last_request().unwrap().field("planCode"), Some("NONE"));
    }

    #[tokio::test]
    async fn test_create_customer_with_plan_change() {
        let (client, transport) = test_client(vec![
            (200, fixture("plan_paid_monthly.xml")),
            (200, fixture("customer_created.xml")),
        ]);

        let mut customer = new_customer();
        customer
            .subscription_mut()
            .change_plan(&client, "PAID_MONTHLY")
            .await
            .unwrap();
        customer
            .subscription_mut()
            .set_field("cc_number", "4111111111111111")
            .unwrap();
        customer.save(&client).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.ends_with("/plans/get/productCode/Test/code/PAID_MONTHLY"));

        let create = &requests[1];
        assert_eq!(create.url, "https://127.0.0.1/customers/new/productCode/Test");
        assert_eq!(create.form[0], ("code".to_string(), "test-customer".to_string()));
        assert_eq!(create.field("subscription[planCode]"), Some("PAID_MONTHLY"));
        assert_eq!(create.field("subscription[ccNumber]"), Some("4111111111111111"));
        assert_eq!(create.field("firstName"), Some("Test"));
        assert_eq!(create.field("lastName"), Some("User"));
        assert_eq!(create.field("email"), Some("garbage@saaspire.com"));

        assert!(!customer.is_new());
        assert!(!customer.has_changes());
        assert_eq!(customer.subscription().unwrap().plan().unwrap().code(), Some("PAID_MONTHLY"));

        customer.save(&client).await.unwrap();
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_pending_changes() {
        let declined = r#"<customers><customer id="c1" code="test-customer"><subscriptions><subscription id="s1"><error id="8" code="422" auxCode="6000">Credit card declined</error></subscription></subscriptions></customer></customers>"#;
        let (client, _) = test_client(vec![(422, declined)]);

        let mut customer = new_customer();
        customer.subscription_mut().set_field("cc_number", "4000000000000002").unwrap();
        let err = customer.save(&client).await.unwrap_err();

        assert!(matches!(err, CheddarError::GatewayFailure(_)));
        assert!(customer.is_new());
        assert!(customer.entity().pending_changes().contains_key("first_name"));
        assert!(customer
            .subscription()
            .unwrap()
            .entity()
            .pending_changes()
            .contains_key("cc_number"));
    }

    #[tokio::test]
    async fn test_metadata_updates() {
        let (client, transport) = test_client(vec![
            (200, fixture("customer_metadata.xml")),
            (200, fixture("customer_metadata.xml")),
        ]);
        let mut customer = Customer::get(&client, "test-customer").await.unwrap();
        assert_eq!(customer.metadata("favorite_color"), Some(&Value::from("blue")));

        customer.update_metadata("favorite_color", "green").unwrap();
        customer.update_metadata("shoeSize", 11).unwrap();
        assert_eq!(customer.metadata("favorite_color"), Some(&Value::from("green")));
        customer.save(&client).await.unwrap();

        let edit = transport.last_request().unwrap();
        assert_eq!(
            edit.url,
            "https://127.0.0.1/customers/edit/productCode/Test/code/test-customer"
        );
        assert_eq!(edit.field("metaData[favorite_color]"), Some("green"));
        assert_eq!(edit.field("metaData[shoeSize]"), Some("11"));
        assert_eq!(edit.field("code"), None);

        customer.save(&client).await.unwrap();
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_save_subscription_defers_for_new_customer() {
        let (client, transport) = test_client(vec![(200, fixture("customer_created.xml"))]);
        let mut customer = new_customer();
        customer.subscription_mut().set_field("cc_zip", "12345").unwrap();

        customer.save_subscription(&client).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.contains("/customers/new/"));
        assert_eq!(requests[0].field("subscription[ccZip]"), Some("12345"));
    }

    #[tokio::test]
    async fn test_cancel_subscription() {
        let (client, transport) = test_client(vec![
            (200, fixture("customers_without_items.xml")),
            (200, fixture("subscription_canceled.xml")),
        ]);
        let mut customer = Customer::get(&client, "test-customer").await.unwrap();

        customer.cancel_subscription(&client).await.unwrap();

        assert_eq!(
            transport.last_request().unwrap().url,
            "https://127.0.0.1/customers/cancel/productCode/Test/code/test-customer"
        );
        let subscription = customer.subscription().unwrap();
        assert_eq!(subscription.value("cancel_type").unwrap(), &Value::from("customer"));
        assert!(subscription.value("canceled_datetime").unwrap().as_datetime().is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let (client, transport) = test_client(vec![(200, "<success/>")]);
        let mut customer = Customer::new();
        customer.set_field("code", "gone").unwrap();
        customer.delete(&client).await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().url,
            "https://127.0.0.1/customers/delete/productCode/Test/code/gone"
        );
    }

    #[test]
    fn test_code_is_immutable_once_saved() {
        let xml = crate::api::xml::XmlElement::parse(fixture("customers_without_items.xml")).unwrap();
        let mut customer = Customer::from_fragment(first_fragment(&xml, "customer").unwrap(), None);
        assert!(matches!(
            customer.set_field("code", "other"),
            Err(CheddarError::ImmutableField(_))
        ));
    }

    #[test]
    fn test_subscription_alias_is_not_writable() {
        let mut customer = new_customer();
        assert!(matches!(
            customer.set_field("subscription", "x"),
            Err(CheddarError::ImmutableField(_))
        ));
        assert!(!customer.entity().pending_changes().contains_key("subscription"));
        assert!(customer.subscription().is_some());
    }

    #[tokio::test]
    async fn test_numeric_metadata_name_is_updated_in_place() {
        let body = r#"<customers><customer id="c1" code="test-customer"><firstName>Test</firstName><lastName>User</lastName><email>garbage@saaspire.com</email><metaData><metaDatum id="m1"><name>2024</name><value>x</value></metaDatum></metaData></customer></customers>"#;
        let (client, transport) = test_client(vec![(200, body), (200, body)]);
        let mut customer = Customer::get(&client, "test-customer").await.unwrap();
        assert_eq!(customer.metadata("2024"), Some(&Value::from("x")));

        customer.update_metadata("2024", "y").unwrap();
        assert_eq!(customer.metadata_entries().count(), 1);
        assert_eq!(customer.metadata("2024"), Some(&Value::from("y")));

        customer.save(&client).await.unwrap();
        assert_eq!(transport.last_request().unwrap().field("metaData[2024]"), Some("y"));
    }

    #[tokio::test]
    async fn test_bracketed_filter_keeps_camel_case() {
        let (client, transport) = test_client(vec![(200, fixture("customers_list.xml"))]);
        Customer::all_with(&client, [("planCode[]", Value::from("TRACKED"))])
            .await
            .unwrap();
        assert_eq!(transport.last_request().unwrap().field("planCode[]"), Some("TRACKED"));
    }

    #[test]
    fn test_projection() {
        let customer = new_customer();
        let json = customer.project().to_json();
        assert_eq!(json["code"], "test-customer");
        assert_eq!(json["first_name"], "Test");
        assert!(json["subscription"].is_object());
        assert!(json.get("company").is_none());
    }
}
