//! Bulk reports built from a fixed number of API calls

use std::collections::{BTreeMap, HashMap};

use log::warn;

use crate::api::Client;
use crate::entity::{Model, Value};
use crate::error::Result;
use crate::models::{Customer, Plan};

/// Item allowances per customer: customer code -> item name -> quantity included
pub type ItemsByCustomer = BTreeMap<String, BTreeMap<String, Value>>;

/// Items available to every customer through its current plan
///
/// Uses one plan fetch and one customer listing regardless of the number of
/// customers. Customers whose plan is not in the plan list are left out.
pub async fn items_by_customer_code(client: &Client) -> Result<ItemsByCustomer> {
    let plans = Plan::all(client).await?;
    let customers = Customer::list(client).await?;
    Ok(collect_items(&plans, &customers))
}

fn collect_items(plans: &[Plan], customers: &[Customer]) -> ItemsByCustomer {
    let plans_by_code: HashMap<&str, &Plan> = plans
        .iter()
        .filter_map(|plan| plan.code().map(|code| (code, plan)))
        .collect();

    let mut report = ItemsByCustomer::new();
    for customer in customers {
        let Some(code) = customer.code() else {
            warn!("Skipping customer {:?} without a code", customer.remote_id());
            continue;
        };
        let plan_code = customer
            .subscription()
            .and_then(|subscription| subscription.plan())
            .and_then(|plan| plan.code());
        let Some(plan) = plan_code.and_then(|plan_code| plans_by_code.get(plan_code)) else {
            warn!("Skipping customer {}: plan {:?} is not in the plan list", code, plan_code);
            continue;
        };

        let items = plan
            .items()
            .filter_map(|item| {
                let name = item.value("name").ok()?.to_wire_string();
                let quantity = item.value("quantity_included").cloned().unwrap_or_default();
                Some((name, quantity))
            })
            .collect();
        report.insert(code.to_string(), items);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, test_client};

    #[tokio::test]
    async fn test_items_by_customer_code() {
        let (client, transport) = test_client(vec![
            (200, fixture("plans_with_items.xml")),
            (200, fixture("customers_list.xml")),
        ]);

        let report = items_by_customer_code(&client).await.unwrap();

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://127.0.0.1/plans/get/productCode/Test",
                "https://127.0.0.1/customers/list/productCode/Test",
            ]
        );

        assert_eq!(report.len(), 2);
        let tracked = &report["1001"];
        assert_eq!(tracked["Monthly Item"], Value::Int(2));
        assert_eq!(tracked["Once Item"], Value::Int(0));
        assert_eq!(report["1002"]["Monthly Item"], Value::Int(0));
        assert!(!report.contains_key("1003"));
    }

    #[test]
    fn test_customers_without_known_plan_are_skipped() {
        let report = collect_items(&[], &[Customer::new()]);
        assert!(report.is_empty());
    }
}
