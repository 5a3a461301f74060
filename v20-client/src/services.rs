//! Capability traits of the client.
//!
//! - [`OrderService`]: create, read, update and cancel orders
//! - [`TradeService`]: read, update and close trades
//! - [`AccountService`]: account, instrument, position and pricing queries
//!
//! [`V20Client`](crate::client::V20Client) implements all three. Code that
//! only needs one capability should take it as a generic or trait object so
//! it can be driven by a test double.
//!
//! # Example
//!
//! ```ignore
//! async fn flatten<S: OrderService + TradeService>(broker: &S) -> BrokerResult<()> {
//!     broker.cancel_all_orders().await?;
//!     broker.close_all_trades().await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::bulk::EntityFilter;
use crate::error::BrokerResult;
use crate::identity::{Identifier, ProviderId, WriteOutcome};
use crate::orders::{ClientExtensions, Order, OrderQuery, OrderSpec, OrderUpdate};
use crate::trades::{Trade, TradeQuery, TradeUpdate};

/// Order lifecycle operations.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Validate and submit a new entry order.
    ///
    /// # Returns
    ///
    /// `Created` with the order ID when no alias was attached, otherwise
    /// `Acknowledged(status == 201)`.
    async fn create_order(&self, spec: &OrderSpec) -> BrokerResult<WriteOutcome>;

    /// Read one order.
    async fn get_order(&self, id: &Identifier) -> BrokerResult<Order>;

    /// Filtered order list.
    async fn list_orders(&self, query: &OrderQuery) -> BrokerResult<Vec<Order>>;

    /// All pending orders.
    async fn pending_orders(&self) -> BrokerResult<Vec<Order>>;

    /// Read, amend and replace a pending order.
    ///
    /// # Returns
    ///
    /// `Created` with the replacement order's ID when addressed by provider
    /// ID, otherwise `Acknowledged`.
    async fn update_order(&self, id: &Identifier, update: &OrderUpdate) -> BrokerResult<WriteOutcome>;

    /// Cancel a pending order. True when the server answered 200.
    async fn cancel_order(&self, id: &Identifier) -> BrokerResult<bool>;

    /// Replace the alias, tag or comment of an order.
    async fn update_order_extensions(
        &self,
        id: &Identifier,
        extensions: &ClientExtensions,
    ) -> BrokerResult<bool>;

    /// Cancel the pending orders matching `filter`, one at a time.
    async fn cancel_orders(&self, filter: &EntityFilter) -> BrokerResult<Vec<ProviderId>>;

    /// Cancel every pending order, one at a time.
    async fn cancel_all_orders(&self) -> BrokerResult<Vec<ProviderId>>;
}

/// Trade lifecycle operations.
#[async_trait]
pub trait TradeService: Send + Sync {
    async fn get_trade(&self, id: &Identifier) -> BrokerResult<Trade>;

    async fn list_trades(&self, query: &TradeQuery) -> BrokerResult<Vec<Trade>>;

    async fn open_trades(&self) -> BrokerResult<Vec<Trade>>;

    /// Create, move or cancel the trade's take-profit, stop-loss and
    /// trailing stop.
    async fn update_trade(&self, id: &Identifier, update: &TradeUpdate) -> BrokerResult<WriteOutcome>;

    /// Close `units` of the trade, or all of it for `None`.
    async fn close_trade(&self, id: &Identifier, units: Option<Decimal>) -> BrokerResult<bool>;

    async fn update_trade_extensions(
        &self,
        id: &Identifier,
        extensions: &ClientExtensions,
    ) -> BrokerResult<bool>;

    /// Close the open trades matching `filter`, one at a time.
    async fn close_trades(&self, filter: &EntityFilter) -> BrokerResult<Vec<ProviderId>>;

    async fn close_all_trades(&self) -> BrokerResult<Vec<ProviderId>>;
}

/// Account-level queries. Bodies are returned as the server sent them.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Accounts the token can access.
    async fn accounts(&self) -> BrokerResult<Value>;

    async fn account(&self) -> BrokerResult<Value>;

    async fn account_summary(&self) -> BrokerResult<Value>;

    /// Instrument details; every instrument when `codes` is empty.
    async fn instruments(&self, codes: &[&str]) -> BrokerResult<Value>;

    /// Set the account margin rate, in (0, 1].
    async fn configure_account(&self, margin_rate: Decimal) -> BrokerResult<Value>;

    async fn positions(&self) -> BrokerResult<Value>;

    /// Current prices for at least one instrument.
    async fn pricing(&self, codes: &[&str]) -> BrokerResult<Value>;
}
