//! Error taxonomy for the CheddarGetter client
//!
//! Remote failures are classified by the HTTP status of the error-shaped
//! response. Local failures cover misuse of the entity API and missing
//! configuration.

/// Details carried by an `<error>` element in a CheddarGetter response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteError {
    /// Value of the `id` attribute
    pub id: Option<String>,
    /// Value of the `code` attribute (usually the HTTP status as text)
    pub code: Option<String>,
    /// Text content of the element
    pub message: Option<String>,
    /// Value of the `auxCode` attribute (gateway specific detail)
    pub aux_code: Option<String>,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (id: {}, code: {}",
            self.message.as_deref().unwrap_or("no message"),
            self.id.as_deref().unwrap_or("-"),
            self.code.as_deref().unwrap_or("-"),
        )?;
        match self.aux_code.as_deref() {
            Some(aux) if !aux.is_empty() => write!(f, ", aux code: {})", aux),
            _ => write!(f, ")"),
        }
    }
}

/// Errors raised by the mapping engine, the transport adapter and the models
#[derive(Debug, Clone)]
pub enum CheddarError {
    /// Credentials or product code missing
    Configuration(String),
    /// Response was not valid XML or had an unrecognised failure shape
    UnexpectedResponse {
        message: String,
        body: String,
        remote: Option<RemoteError>,
    },
    /// HTTP 404
    NotFound(RemoteError),
    /// HTTP 400 or 412
    BadRequest(RemoteError),
    /// HTTP 422, the payment gateway declined
    GatewayFailure(RemoteError),
    /// HTTP 500, the payment gateway could not be reached
    GatewayConnection(RemoteError),
    /// A local precondition failed before anything was submitted
    Validation(String),
    /// Read of a field that the entity does not have
    UnknownField(String),
    /// Write of a locked field
    ImmutableField(String),
    /// Operation the remote API does not offer for this entity
    Unsupported(String),
    /// The HTTP request itself failed (connection, timeout, body read)
    Transport(String),
}

pub type Result<T> = std::result::Result<T, CheddarError>;

impl CheddarError {
    /// Build the error kind that corresponds to an HTTP status
    pub fn from_status(status: u16, remote: RemoteError, body: &str) -> Self {
        match status {
            400 | 412 => CheddarError::BadRequest(remote),
            404 => CheddarError::NotFound(remote),
            422 => CheddarError::GatewayFailure(remote),
            500 => CheddarError::GatewayConnection(remote),
            _ => CheddarError::UnexpectedResponse {
                message: format!("unexpected error response with HTTP status {}", status),
                body: body.to_string(),
                remote: Some(remote),
            },
        }
    }

    /// The remote error details, if this error came from the server
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            CheddarError::NotFound(remote)
            | CheddarError::BadRequest(remote)
            | CheddarError::GatewayFailure(remote)
            | CheddarError::GatewayConnection(remote) => Some(remote),
            CheddarError::UnexpectedResponse { remote, .. } => remote.as_ref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CheddarError::NotFound(_))
    }
}

impl std::fmt::Display for CheddarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheddarError::Configuration(message) => write!(f, "configuration error: {}", message),
            CheddarError::UnexpectedResponse { message, .. } => {
                write!(f, "unexpected response from CheddarGetter: {}", message)
            }
            CheddarError::NotFound(remote) => write!(f, "not found: {}", remote),
            CheddarError::BadRequest(remote) => write!(f, "bad request: {}", remote),
            CheddarError::GatewayFailure(remote) => write!(f, "gateway failure: {}", remote),
            CheddarError::GatewayConnection(remote) => {
                write!(f, "gateway connection error: {}", remote)
            }
            CheddarError::Validation(message) => write!(f, "validation failed: {}", message),
            CheddarError::UnknownField(field) => write!(f, "key '{}' does not exist", field),
            CheddarError::ImmutableField(field) => write!(f, "field '{}' is immutable", field),
            CheddarError::Unsupported(message) => write!(f, "unsupported operation: {}", message),
            CheddarError::Transport(message) => write!(f, "HTTP transport error: {}", message),
        }
    }
}

impl std::error::Error for CheddarError {}

impl From<reqwest::Error> for CheddarError {
    fn from(err: reqwest::Error) -> Self {
        CheddarError::Transport(err.to_string())
    }
}
