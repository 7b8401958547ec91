//! CheddarGetter XML API access
//!
//! Field naming conventions, the owned XML tree, the HTTP transport seam and
//! the client that ties them together.

pub mod client;
pub mod naming;
pub mod pluralization;
pub mod transport;
pub mod xml;

pub use client::Client;
pub use naming::{FieldKey, FieldNaming};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use xml::XmlElement;
