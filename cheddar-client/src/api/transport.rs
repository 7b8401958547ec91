//! HTTP transport
//!
//! The client only needs one primitive: an authenticated form POST that
//! returns the status and the raw body. Keeping it behind a trait lets tests
//! replay canned responses.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{CheddarError, Result};

/// An authenticated, form-encoded POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Form fields in submission order, names already in wire form
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// Value of a form field, if it was sent
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.form.iter().map(|(key, _)| key.as_str()).collect();
        write!(f, "POST {} [{}]", self.url, names.join(", "))
    }
}

/// Status and body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_form(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("cheddar-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    fn request_builder(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        self.client
            .post(&request.url)
            .basic_auth(&request.username, Some(&request.password))
            .form(&request.form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_form(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self
            .request_builder(request)
            .send()
            .await
            .map_err(|e| CheddarError::Transport(format!("{}: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}
