//! CheddarGetter API client
//!
//! Builds request URLs, submits form fields through a [`Transport`] and turns
//! error-shaped responses into typed errors.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::naming::FieldKey;
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use super::xml::XmlElement;
use crate::config::Config;
use crate::entity::Value;
use crate::error::{CheddarError, RemoteError, Result};

/// Authenticated client for one product
#[derive(Clone)]
pub struct Client {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Client {
    /// Client using `reqwest` with the configured timeout
    pub fn new(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout_secs.map(Duration::from_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `{api_url}{path}/productCode/{product}`, plus `/code/{code}` for
    /// entities that already exist remotely
    pub fn build_url(&self, path: &str, code: Option<&str>, is_new: bool) -> String {
        let product = self.config.product_code.as_deref().unwrap_or_default();
        let mut url = format!(
            "{}{}/productCode/{}",
            self.config.api_url.trim_end_matches('/'),
            path,
            urlencoding::encode(product)
        );
        if let Some(code) = code.filter(|_| !is_new) {
            url.push_str("/code/");
            url.push_str(&urlencoding::encode(code));
        }
        url
    }

    /// Submit `fields` to `path` and return the parsed response document
    ///
    /// When creating (`is_new`), the code travels as the first form field
    /// instead of a URL segment.
    pub async fn perform(
        &self,
        path: &str,
        code: Option<&str>,
        is_new: bool,
        fields: Vec<(FieldKey, Value)>,
    ) -> Result<XmlElement> {
        let response = self.send(path, code, is_new, fields).await?;
        Self::interpret_response(response.status, &response.body)
    }

    /// Issue a request without fields and return the body as received
    pub async fn perform_raw(&self, path: &str, code: Option<&str>) -> Result<String> {
        let response = self.send(path, code, false, Vec::new()).await?;
        debug!("{} answered with HTTP {}", path, response.status);
        Ok(response.body)
    }

    async fn send(
        &self,
        path: &str,
        code: Option<&str>,
        is_new: bool,
        fields: Vec<(FieldKey, Value)>,
    ) -> Result<HttpResponse> {
        let credentials = self.config.credentials()?;

        let mut form = Vec::with_capacity(fields.len() + 1);
        if is_new {
            if let Some(code) = code {
                form.push(("code".to_string(), code.to_string()));
            }
        }
        form.extend(
            fields
                .into_iter()
                .map(|(key, value)| (key.to_wire(), value.to_wire_string())),
        );

        let request = HttpRequest {
            url: self.build_url(path, code, is_new),
            username: credentials.email.to_string(),
            password: credentials.password.to_string(),
            form,
        };
        debug!("{}", request);

        self.transport.post_form(&request).await
    }

    /// Classify a response
    ///
    /// A status of 400 or above, or an `<error>` root, is a failure. The
    /// error element is either the root (the entity did not exist) or
    /// embedded in a partially returned entity.
    pub fn interpret_response(status: u16, body: &str) -> Result<XmlElement> {
        let root = XmlElement::parse(body).map_err(|e| CheddarError::UnexpectedResponse {
            message: format!("invalid XML: {}", e),
            body: body.to_string(),
            remote: None,
        })?;

        if status < 400 && root.tag() != "error" {
            return Ok(root);
        }

        let element = if root.tag() == "error" {
            Some(&root)
        } else {
            root.find("error")
        };

        let Some(element) = element else {
            return Err(CheddarError::UnexpectedResponse {
                message: format!("HTTP {} without an error element", status),
                body: body.to_string(),
                remote: None,
            });
        };

        let remote = RemoteError {
            id: element.attribute("id").map(str::to_string),
            code: element.attribute("code").map(str::to_string),
            message: element.text().map(str::to_string),
            aux_code: element.attribute("auxCode").map(str::to_string),
        };
        warn!("CheddarGetter returned HTTP {}: {}", status, remote);

        Err(CheddarError::from_status(status, remote, body))
    }
}
