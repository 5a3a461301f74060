//! Entry order construction.
//!
//! [`OrderSpec`] is the caller's description of an order; [`build_order`]
//! validates it against the type/time-in-force rules and the instrument
//! catalog and produces the exact create body.
//!
//! # Example
//!
//! ```ignore
//! let spec = OrderSpec::limit("EUR_USD", OrderSide::Sell, dec!(1000), dec!(1.1050))
//!     .with_stop_loss(dec!(1.1100))
//!     .with_alias("fade-1");
//! let order = build_order(&spec, &catalog)?;
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use super::order::Order;
use super::types::{ClientExtensions, OrderSide, OrderType, PositionFill, ProtectiveOrder, TimeInForce};
use crate::error::{BrokerError, BrokerResult};
use crate::identity::validate_alias;
use crate::instruments::InstrumentLookup;

/// Client-side description of an entry order. Discarded once submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub order_type: OrderType,
    /// Instrument code, e.g. `EUR_USD`
    pub instrument: String,
    pub side: OrderSide,
    /// Positive magnitude; the side supplies the sign
    pub units: Decimal,
    pub price: Option<Decimal>,
    /// Worst acceptable fill price, STOP and MARKET_IF_TOUCHED only
    pub price_bound: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
    pub gtd_time: Option<DateTime<Utc>>,
    pub stop_loss: Option<Decimal>,
    pub trailing_stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub client_alias: Option<String>,
    pub tag: Option<String>,
    pub comment: Option<String>,
}

impl OrderSpec {
    pub fn new(
        order_type: OrderType,
        instrument: impl Into<String>,
        side: OrderSide,
        units: Decimal,
    ) -> Self {
        Self {
            order_type,
            instrument: instrument.into(),
            side,
            units,
            price: None,
            price_bound: None,
            time_in_force: None,
            gtd_time: None,
            stop_loss: None,
            trailing_stop_loss: None,
            take_profit: None,
            client_alias: None,
            tag: None,
            comment: None,
        }
    }

    pub fn market(instrument: impl Into<String>, side: OrderSide, units: Decimal) -> Self {
        Self::new(OrderType::Market, instrument, side, units)
    }

    pub fn limit(instrument: impl Into<String>, side: OrderSide, units: Decimal, price: Decimal) -> Self {
        Self::new(OrderType::Limit, instrument, side, units).with_price(price)
    }

    pub fn stop(instrument: impl Into<String>, side: OrderSide, units: Decimal, price: Decimal) -> Self {
        Self::new(OrderType::Stop, instrument, side, units).with_price(price)
    }

    pub fn market_if_touched(
        instrument: impl Into<String>,
        side: OrderSide,
        units: Decimal,
        price: Decimal,
    ) -> Self {
        Self::new(OrderType::MarketIfTouched, instrument, side, units).with_price(price)
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_price_bound(mut self, price_bound: Decimal) -> Self {
        self.price_bound = Some(price_bound);
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    /// Expiry for GTD orders.
    pub fn with_gtd_time(mut self, gtd_time: DateTime<Utc>) -> Self {
        self.gtd_time = Some(gtd_time);
        self
    }

    pub fn with_stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(price);
        self
    }

    pub fn with_trailing_stop_loss(mut self, distance: Decimal) -> Self {
        self.trailing_stop_loss = Some(distance);
        self
    }

    pub fn with_take_profit(mut self, price: Decimal) -> Self {
        self.take_profit = Some(price);
        self
    }

    /// Caller-chosen ID, usable later as `@alias`.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.client_alias = Some(alias.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// True when an alias will be attached, which makes the create result
    /// an acknowledgement instead of an ID.
    pub fn has_alias(&self) -> bool {
        self.client_alias.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// RFC 3339 in UTC, the form the server accepts for `gtdTime`.
pub(crate) fn format_gtd_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Resolve and check the time-in-force for an entry type.
pub(crate) fn effective_time_in_force(
    order_type: OrderType,
    requested: Option<TimeInForce>,
) -> BrokerResult<TimeInForce> {
    let allowed = order_type.allowed_time_in_force();
    match requested {
        None => Ok(order_type.default_time_in_force()),
        Some(tif) if allowed.contains(&tif) => Ok(tif),
        Some(tif) => Err(BrokerError::validation(format!(
            "Time-in-force {} is not allowed for {} orders",
            tif, order_type
        ))),
    }
}

/// Validate `spec` and build the create body.
///
/// Checks run in order: type, instrument, units, time-in-force; then the
/// required-field checks for price and `gtdTime`.
pub fn build_order(spec: &OrderSpec, catalog: &dyn InstrumentLookup) -> BrokerResult<Order> {
    if !spec.order_type.is_entry() {
        return Err(BrokerError::validation(format!(
            "Order type {} cannot be created directly",
            spec.order_type
        )));
    }
    if !catalog.is_valid_code(&spec.instrument) {
        return Err(BrokerError::validation(format!(
            "Invalid instrument code '{}'",
            spec.instrument
        )));
    }
    if spec.units <= Decimal::ZERO {
        return Err(BrokerError::validation(format!(
            "Units must be positive, got {}",
            spec.units
        )));
    }
    let time_in_force = effective_time_in_force(spec.order_type, spec.time_in_force)?;

    let context = || format!("{} order", spec.order_type);
    let price = spec.price.filter(|p| !p.is_zero());
    if spec.order_type.requires_price() && price.is_none() {
        return Err(BrokerError::missing_field("price", context()));
    }
    let gtd_time = match (time_in_force, &spec.gtd_time) {
        (TimeInForce::Gtd, Some(time)) => Some(format_gtd_time(time)),
        (TimeInForce::Gtd, None) => return Err(BrokerError::missing_field("gtdTime", context())),
        _ => None,
    };

    let client_extensions = ClientExtensions {
        id: spec.client_alias.clone(),
        tag: spec.tag.clone(),
        comment: spec.comment.clone(),
    }
    .non_empty();
    if let Some(alias) = client_extensions.as_ref().and_then(|e| e.id.as_deref()) {
        validate_alias(alias)?;
    }

    let mut order = Order::empty(spec.order_type);
    order.instrument = Some(spec.instrument.clone());
    order.units = Some(spec.side.signed(spec.units));
    order.time_in_force = Some(time_in_force);
    order.position_fill = Some(PositionFill::Default);
    order.gtd_time = gtd_time;
    if spec.order_type.requires_price() {
        order.price = price;
    }
    if spec.order_type.accepts_price_bound() {
        order.price_bound = spec.price_bound.filter(|p| !p.is_zero());
    }
    order.client_extensions = client_extensions;
    order.stop_loss_on_fill = ProtectiveOrder::price_if_set(spec.stop_loss);
    order.trailing_stop_loss_on_fill = ProtectiveOrder::distance_if_set(spec.trailing_stop_loss);
    order.take_profit_on_fill = ProtectiveOrder::price_if_set(spec.take_profit);

    Ok(order)
}
