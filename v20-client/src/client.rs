//! v20 REST client.
//!
//! [`V20Client`] implements the order, trade and account services on top of
//! an injected [`Transport`] and [`InstrumentLookup`]. Every operation is a
//! sequence of awaited requests; nothing runs in the background.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::bulk::{self, EntityFilter};
use crate::config::ClientConfig;
use crate::endpoints::paths;
use crate::error::{BrokerError, BrokerResult};
use crate::identity::{validate_alias, Identifier, ProviderId, WriteOutcome};
use crate::instruments::{InstrumentCatalog, InstrumentLookup};
use crate::orders::{
    build_order, merge_order, ClientExtensions, Order, OrderEnvelope, OrderList, OrderQuery,
    OrderSpec, OrderState, OrderUpdate,
};
use crate::services::{AccountService, OrderService, TradeService};
use crate::trades::{merge_trade, Trade, TradeEnvelope, TradeList, TradeQuery, TradeUpdate};
use crate::transport::{HttpMethod, HttpTransport, Transport, TransportResponse};

/// Client for one v20 account.
///
/// # Example
///
/// ```ignore
/// let client = V20Client::from_config(&ClientConfig::from_file("v20.toml")?)?;
///
/// let outcome = client
///     .create_order(&OrderSpec::market("EUR_USD", OrderSide::Buy, dec!(100)))
///     .await?;
///
/// // Same transport, different account
/// let other = client.for_account("101-004-0000000-002");
/// let trades = other.open_trades().await?;
/// ```
#[derive(Clone)]
pub struct V20Client {
    transport: Arc<dyn Transport>,
    catalog: Arc<dyn InstrumentLookup>,
    account_id: String,
}

impl V20Client {
    pub fn new(
        transport: Arc<dyn Transport>,
        catalog: Arc<dyn InstrumentLookup>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            catalog,
            account_id: account_id.into(),
        }
    }

    /// Build an HTTP-backed client with the standard instrument catalog.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the access token variable is unset.
    pub fn from_config(config: &ClientConfig) -> BrokerResult<Self> {
        let token = config.auth.load_access_token().ok_or_else(|| {
            BrokerError::Configuration(format!(
                "Access token not found in ${}",
                config.auth.access_token_env
            ))
        })?;
        let transport = HttpTransport::new(config.base_url(), &token, &config.rest)?;

        info!(
            environment = %config.environment,
            account = %config.default_account_id,
            "v20 client configured"
        );

        Ok(Self::new(
            Arc::new(transport),
            Arc::new(InstrumentCatalog::standard()),
            config.default_account_id.clone(),
        ))
    }

    /// A client for another account sharing this one's transport and catalog.
    pub fn for_account(&self, account_id: impl Into<String>) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            catalog: Arc::clone(&self.catalog),
            account_id: account_id.into(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn catalog(&self) -> &dyn InstrumentLookup {
        self.catalog.as_ref()
    }

    fn require_account(&self) -> BrokerResult<&str> {
        if self.account_id.is_empty() {
            return Err(BrokerError::Configuration("No account ID configured".into()));
        }
        Ok(&self.account_id)
    }

    /// Send a request and fail on any status of 400 or above.
    async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> BrokerResult<TransportResponse> {
        self.transport
            .send(method, endpoint, body, query)
            .await?
            .error_for_status()
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> BrokerResult<TransportResponse> {
        self.request(HttpMethod::Get, endpoint, None, query).await
    }

    async fn put(&self, endpoint: &str, body: Option<&Value>) -> BrokerResult<TransportResponse> {
        self.request(HttpMethod::Put, endpoint, body, &[]).await
    }
}

#[derive(Deserialize)]
struct TransactionRef {
    id: ProviderId,
}

/// ID of the transaction under `key`, e.g. `orderCreateTransaction`.
fn transaction_id(response: &TransportResponse, key: &str) -> BrokerResult<ProviderId> {
    Ok(response.field::<TransactionRef>(key)?.id)
}

fn extensions_body(extensions: &ClientExtensions) -> BrokerResult<Value> {
    let extensions = extensions
        .clone()
        .non_empty()
        .ok_or_else(|| BrokerError::validation("No client extension values to update"))?;
    if let Some(alias) = &extensions.id {
        validate_alias(alias)?;
    }
    Ok(json!({ "clientExtensions": extensions }))
}

// =============================================================================
// Orders
// =============================================================================

#[async_trait]
impl OrderService for V20Client {
    async fn create_order(&self, spec: &OrderSpec) -> BrokerResult<WriteOutcome> {
        let order = build_order(spec, self.catalog.as_ref())?;
        let account = self.require_account()?;
        let body = serde_json::to_value(OrderEnvelope { order })?;

        let response = self
            .request(HttpMethod::Post, &paths::orders(account), Some(&body), &[])
            .await?;

        if spec.has_alias() {
            info!(
                instrument = %spec.instrument,
                alias = spec.client_alias.as_deref().unwrap_or_default(),
                "{} {} order submitted",
                spec.side,
                spec.order_type
            );
            return Ok(WriteOutcome::Acknowledged(response.status == 201));
        }

        let id = transaction_id(&response, "orderCreateTransaction")?;
        info!(
            instrument = %spec.instrument,
            order_id = %id,
            "{} {} order submitted",
            spec.side,
            spec.order_type
        );
        Ok(WriteOutcome::Created(id))
    }

    async fn get_order(&self, id: &Identifier) -> BrokerResult<Order> {
        let account = self.require_account()?;
        let response = self.get(&paths::order(account, &id.path_segment()), &[]).await?;
        let envelope: OrderEnvelope = serde_json::from_value(response.body)?;
        Ok(envelope.order)
    }

    async fn list_orders(&self, query: &OrderQuery) -> BrokerResult<Vec<Order>> {
        if let Some(instrument) = &query.instrument {
            self.catalog.validate_codes(&[instrument.as_str()])?;
        }
        let account = self.require_account()?;
        let response = self.get(&paths::orders(account), &query.to_params()).await?;
        let list: OrderList = serde_json::from_value(response.body)?;
        Ok(list.orders)
    }

    async fn pending_orders(&self) -> BrokerResult<Vec<Order>> {
        let account = self.require_account()?;
        let response = self.get(&paths::pending_orders(account), &[]).await?;
        let list: OrderList = serde_json::from_value(response.body)?;
        debug!(count = list.orders.len(), "pending orders listed");
        Ok(list.orders)
    }

    async fn update_order(&self, id: &Identifier, update: &OrderUpdate) -> BrokerResult<WriteOutcome> {
        update.validate()?;
        let account = self.require_account()?;

        let current = self.get_order(id).await?;
        if let Some(state) = current.state.filter(OrderState::is_terminal) {
            return Err(BrokerError::validation(format!(
                "Order {} is {} and can no longer be replaced",
                id, state
            )));
        }
        let replacement = merge_order(current, update)?;
        let body = serde_json::to_value(OrderEnvelope { order: replacement })?;

        let response = self
            .put(&paths::order(account, &id.path_segment()), Some(&body))
            .await?;

        let outcome = match id {
            Identifier::ByProviderId(_) => {
                WriteOutcome::Created(transaction_id(&response, "orderCreateTransaction")?)
            }
            Identifier::ByAlias(_) => WriteOutcome::Acknowledged(response.status == 201),
        };
        info!(order = %id, ?outcome, "order replaced");
        Ok(outcome)
    }

    async fn cancel_order(&self, id: &Identifier) -> BrokerResult<bool> {
        let account = self.require_account()?;
        let response = self
            .put(&paths::cancel_order(account, &id.path_segment()), None)
            .await?;
        info!(order = %id, "order cancelled");
        Ok(response.status == 200)
    }

    async fn update_order_extensions(
        &self,
        id: &Identifier,
        extensions: &ClientExtensions,
    ) -> BrokerResult<bool> {
        let body = extensions_body(extensions)?;
        let account = self.require_account()?;
        let response = self
            .put(&paths::order_extensions(account, &id.path_segment()), Some(&body))
            .await?;
        Ok(response.status == 200)
    }

    async fn cancel_orders(&self, filter: &EntityFilter) -> BrokerResult<Vec<ProviderId>> {
        bulk::cancel_orders(self, self.catalog.as_ref(), Some(filter)).await
    }

    async fn cancel_all_orders(&self) -> BrokerResult<Vec<ProviderId>> {
        bulk::cancel_orders(self, self.catalog.as_ref(), None).await
    }
}

// =============================================================================
// Trades
// =============================================================================

#[async_trait]
impl TradeService for V20Client {
    async fn get_trade(&self, id: &Identifier) -> BrokerResult<Trade> {
        let account = self.require_account()?;
        let response = self.get(&paths::trade(account, &id.path_segment()), &[]).await?;
        let envelope: TradeEnvelope = serde_json::from_value(response.body)?;
        Ok(envelope.trade)
    }

    async fn list_trades(&self, query: &TradeQuery) -> BrokerResult<Vec<Trade>> {
        if let Some(instrument) = &query.instrument {
            self.catalog.validate_codes(&[instrument.as_str()])?;
        }
        let account = self.require_account()?;
        let response = self.get(&paths::trades(account), &query.to_params()).await?;
        let list: TradeList = serde_json::from_value(response.body)?;
        Ok(list.trades)
    }

    async fn open_trades(&self) -> BrokerResult<Vec<Trade>> {
        let account = self.require_account()?;
        let response = self.get(&paths::open_trades(account), &[]).await?;
        let list: TradeList = serde_json::from_value(response.body)?;
        debug!(count = list.trades.len(), "open trades listed");
        Ok(list.trades)
    }

    async fn update_trade(&self, id: &Identifier, update: &TradeUpdate) -> BrokerResult<WriteOutcome> {
        update.validate()?;
        let account = self.require_account()?;

        let trade = self.get_trade(id).await?;
        let body = serde_json::to_value(merge_trade(&trade, update)?)?;

        let response = self
            .put(&paths::trade_orders(account, &id.path_segment()), Some(&body))
            .await?;

        let outcome = match id {
            Identifier::ByProviderId(_) => WriteOutcome::Created(trade.id),
            Identifier::ByAlias(_) => WriteOutcome::Acknowledged(response.is_success()),
        };
        info!(trade = %id, "dependent orders replaced");
        Ok(outcome)
    }

    async fn close_trade(&self, id: &Identifier, units: Option<Decimal>) -> BrokerResult<bool> {
        let body = match units {
            Some(units) if units <= Decimal::ZERO => {
                return Err(BrokerError::validation(format!(
                    "Units to close must be positive, got {}",
                    units
                )))
            }
            Some(units) => Some(json!({ "units": units.to_string() })),
            None => None,
        };
        let account = self.require_account()?;
        let response = self
            .put(&paths::close_trade(account, &id.path_segment()), body.as_ref())
            .await?;
        info!(trade = %id, units = ?units, "trade closed");
        Ok(response.status == 200)
    }

    async fn update_trade_extensions(
        &self,
        id: &Identifier,
        extensions: &ClientExtensions,
    ) -> BrokerResult<bool> {
        let body = extensions_body(extensions)?;
        let account = self.require_account()?;
        let response = self
            .put(&paths::trade_extensions(account, &id.path_segment()), Some(&body))
            .await?;
        Ok(response.status == 200)
    }

    async fn close_trades(&self, filter: &EntityFilter) -> BrokerResult<Vec<ProviderId>> {
        bulk::close_trades(self, self.catalog.as_ref(), Some(filter)).await
    }

    async fn close_all_trades(&self) -> BrokerResult<Vec<ProviderId>> {
        bulk::close_trades(self, self.catalog.as_ref(), None).await
    }
}

// =============================================================================
// Account
// =============================================================================

#[async_trait]
impl AccountService for V20Client {
    async fn accounts(&self) -> BrokerResult<Value> {
        Ok(self.get(paths::ACCOUNTS, &[]).await?.body)
    }

    async fn account(&self) -> BrokerResult<Value> {
        let account = self.require_account()?;
        Ok(self.get(&paths::account(account), &[]).await?.body)
    }

    async fn account_summary(&self) -> BrokerResult<Value> {
        let account = self.require_account()?;
        Ok(self.get(&paths::summary(account), &[]).await?.body)
    }

    async fn instruments(&self, codes: &[&str]) -> BrokerResult<Value> {
        self.catalog.validate_codes(codes)?;
        let account = self.require_account()?;
        let query = if codes.is_empty() {
            Vec::new()
        } else {
            vec![("instruments", codes.join(","))]
        };
        Ok(self.get(&paths::instruments(account), &query).await?.body)
    }

    async fn configure_account(&self, margin_rate: Decimal) -> BrokerResult<Value> {
        if margin_rate <= Decimal::ZERO || margin_rate > Decimal::ONE {
            return Err(BrokerError::validation(format!(
                "Margin rate must be in (0, 1], got {}",
                margin_rate
            )));
        }
        let account = self.require_account()?;
        let body = json!({ "marginRate": margin_rate.to_string() });
        let response = self
            .request(HttpMethod::Patch, &paths::configuration(account), Some(&body), &[])
            .await?;
        info!(%margin_rate, "account configured");
        Ok(response.body)
    }

    async fn positions(&self) -> BrokerResult<Value> {
        let account = self.require_account()?;
        Ok(self.get(&paths::positions(account), &[]).await?.body)
    }

    async fn pricing(&self, codes: &[&str]) -> BrokerResult<Value> {
        if codes.is_empty() {
            return Err(BrokerError::missing_field("instruments", "pricing request"));
        }
        // The server answers 200 for unknown codes, so check them here.
        self.catalog.validate_codes(codes)?;
        let account = self.require_account()?;
        let query = [("instruments", codes.join(","))];
        Ok(self.get(&paths::pricing(account), &query).await?.body)
    }
}
