//! Test doubles and fixtures

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::transport::{HttpRequest, HttpResponse, Transport};
use crate::api::Client;
use crate::config::Config;
use crate::error::{CheddarError, Result};

/// Replays canned responses in order and records every request
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new(responses: Vec<(u16, &str)>) -> Self {
        let responses = responses
            .into_iter()
            .map(|(status, body)| HttpResponse {
                status,
                body: body.to_string(),
            })
            .collect();
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_form(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CheddarError::Transport(format!("no canned response for {}", request)))
    }
}

pub fn test_config() -> Config {
    Config::new("Test", "Test", "Test").with_api_url("https://127.0.0.1")
}

pub fn test_client(responses: Vec<(u16, &str)>) -> (Client, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new(responses));
    let client = Client::with_transport(test_config(), transport.clone());
    (client, transport)
}

/// Contents of `tests/fixtures/<name>`
pub fn fixture(name: &str) -> &'static str {
    match name {
        "plans.xml" => include_str!("../tests/fixtures/plans.xml"),
        "plans_with_items.xml" => include_str!("../tests/fixtures/plans_with_items.xml"),
        "plan_paid_monthly.xml" => include_str!("../tests/fixtures/plan_paid_monthly.xml"),
        "customers_without_items.xml" => {
            include_str!("../tests/fixtures/customers_without_items.xml")
        }
        "customers_list.xml" => include_str!("../tests/fixtures/customers_list.xml"),
        "customer_created.xml" => include_str!("../tests/fixtures/customer_created.xml"),
        "customer_metadata.xml" => include_str!("../tests/fixtures/customer_metadata.xml"),
        "subscription_edited.xml" => include_str!("../tests/fixtures/subscription_edited.xml"),
        "subscription_canceled.xml" => include_str!("../tests/fixtures/subscription_canceled.xml"),
        "error_no_customer.xml" => include_str!("../tests/fixtures/error_no_customer.xml"),
        "error_no_product.xml" => include_str!("../tests/fixtures/error_no_product.xml"),
        other => panic!("unknown fixture {}", other),
    }
}
