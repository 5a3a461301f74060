//! Order and trade lifecycle client for v20-style broker REST APIs.
//!
//! Callers create, inspect, modify and cancel pending orders and open
//! trades. High-level intents ("move this trade's stop-loss") are turned into
//! the full-entity payloads the server expects.
//!
//! # Modules
//!
//! - [`orders`]: order types, the entry order builder and the replacement merge
//! - [`trades`]: the trade entity and dependent-order updates
//! - [`identity`]: provider IDs, aliases and write outcomes
//! - [`bulk`]: sequential cancel/close over a filtered set
//! - [`services`]: `OrderService`, `TradeService`, `AccountService`
//! - [`client`]: [`V20Client`], the implementation of all three
//! - [`transport`]: the request seam and its reqwest implementation
//! - [`instruments`]: the instrument catalog
//! - [`config`], [`endpoints`], [`logging`], [`error`]
//!
//! # Example
//!
//! ```rust,ignore
//! use rust_decimal_macros::dec;
//! use v20_client::prelude::*;
//!
//! let client = V20Client::from_config(&ClientConfig::practice("101-004-1234567-001"))?;
//!
//! let spec = OrderSpec::limit("EUR_USD", OrderSide::Buy, dec!(1000), dec!(1.0850))
//!     .with_stop_loss(dec!(1.0800))
//!     .with_alias("dip-buy");
//! client.create_order(&spec).await?;
//!
//! let order = Identifier::alias("dip-buy")?;
//! client.update_order(&order, &OrderUpdate::new().take_profit(dec!(1.0950))).await?;
//! client.cancel_orders(&EntityFilter::Instrument("EUR_USD".into())).await?;
//! ```

pub mod bulk;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod identity;
pub mod instruments;
pub mod logging;
pub mod orders;
pub mod services;
pub mod trades;
pub mod transport;

pub use bulk::EntityFilter;
pub use client::V20Client;
pub use config::{AuthConfig, ClientConfig, Environment, RestConfig};
pub use error::{BrokerError, BrokerResult};
pub use identity::{Identifier, ProviderId, WriteOutcome};
pub use instruments::{InstrumentCatalog, InstrumentLookup};
pub use services::{AccountService, OrderService, TradeService};
pub use transport::{HttpMethod, HttpTransport, Transport, TransportResponse};

/// Common imports.
pub mod prelude {
    pub use crate::bulk::EntityFilter;
    pub use crate::client::V20Client;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::error::{BrokerError, BrokerResult};
    pub use crate::identity::{Identifier, ProviderId, WriteOutcome};
    pub use crate::instruments::{InstrumentCatalog, InstrumentLookup};
    pub use crate::orders::{
        ClientExtensions, OrderSide, OrderSpec, OrderType, OrderUpdate, TimeInForce,
    };
    pub use crate::services::{AccountService, OrderService, TradeService};
    pub use crate::trades::TradeUpdate;
}
