//! Client-side object mapper for the CheddarGetter subscription billing API
//!
//! Responses are XML documents with no published schema. The [`entity`]
//! module infers nested entities and lists from the structure of each
//! response, tracks local edits, and [`models`] layers the CheddarGetter
//! specific save, validate and delete rules on top.
//!
//! ```no_run
//! use cheddar_client::{Client, Config, Customer, Model};
//!
//! # async fn run() -> cheddar_client::Result<()> {
//! let client = Client::new(Config::from_env())?;
//! let mut customer = Customer::get(&client, "customer-1").await?;
//! customer.set_field("email", "new@example.com")?;
//! customer.save(&client).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod entity;
pub mod error;
pub mod models;
pub mod reports;

#[cfg(test)]
mod testing;

pub use api::Client;
pub use config::Config;
pub use entity::{Entity, FieldRef, Model, Projection, Value};
pub use error::{CheddarError, RemoteError, Result};
pub use models::{
    Customer, GatewayAccount, Invoice, Item, MetaDatum, Plan, Subscription, SubscriptionSave,
};
