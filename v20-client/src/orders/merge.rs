//! Full-replacement updates of pending orders.
//!
//! The server has no partial update for orders: the current order is read,
//! amended and sent back whole. [`merge_order`] does the amending.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::builder::format_gtd_time;
use super::order::Order;
use super::types::{ensure_protective, OrderSide, TimeInForce};
use crate::error::{BrokerError, BrokerResult};

/// Changes to apply to a pending order. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderUpdate {
    pub price: Option<Decimal>,
    /// Ignored for order types without a price bound
    pub price_bound: Option<Decimal>,
    /// New magnitude; the existing side is kept
    pub units: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
    /// Only for orders that are, or are being switched to, GTD
    pub gtd_time: Option<DateTime<Utc>>,
    pub stop_loss: Option<Decimal>,
    pub trailing_stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

impl OrderUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn price_bound(mut self, price_bound: Decimal) -> Self {
        self.price_bound = Some(price_bound);
        self
    }

    pub fn units(mut self, units: Decimal) -> Self {
        self.units = Some(units);
        self
    }

    pub fn time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn gtd_time(mut self, gtd_time: DateTime<Utc>) -> Self {
        self.gtd_time = Some(gtd_time);
        self
    }

    pub fn stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(price);
        self
    }

    pub fn trailing_stop_loss(mut self, distance: Decimal) -> Self {
        self.trailing_stop_loss = Some(distance);
        self
    }

    pub fn take_profit(mut self, price: Decimal) -> Self {
        self.take_profit = Some(price);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks that need no server state.
    pub fn validate(&self) -> BrokerResult<()> {
        let positive = |name: &str, value: Option<Decimal>| match value {
            Some(v) if v <= Decimal::ZERO => Err(BrokerError::validation(format!(
                "{} must be positive, got {}",
                name, v
            ))),
            _ => Ok(()),
        };
        positive("price", self.price)?;
        positive("priceBound", self.price_bound)?;
        positive("units", self.units)?;
        positive("stop-loss price", self.stop_loss)?;
        positive("trailing stop-loss distance", self.trailing_stop_loss)?;
        positive("take-profit price", self.take_profit)?;
        if self.time_in_force == Some(TimeInForce::Gtd) && self.gtd_time.is_none() {
            return Err(BrokerError::missing_field("gtdTime", "GTD order update"));
        }
        Ok(())
    }
}

/// Turn a fetched order into its replacement body with `update` applied.
///
/// Server-only fields are stripped and `positionFill` forced to `DEFAULT`.
/// Protective sub-objects are created with GTC when missing; existing ones
/// only have their price or distance replaced.
pub fn merge_order(current: Order, update: &OrderUpdate) -> BrokerResult<Order> {
    update.validate()?;
    let mut order = current.into_replacement();

    if let Some(tif) = update.time_in_force {
        if order.order_type.is_entry() && !order.order_type.allowed_time_in_force().contains(&tif) {
            return Err(BrokerError::validation(format!(
                "Time-in-force {} is not allowed for {} orders",
                tif, order.order_type
            )));
        }
        order.time_in_force = Some(tif);
        if tif != TimeInForce::Gtd {
            order.gtd_time = None;
        }
    }
    if let Some(gtd_time) = &update.gtd_time {
        if order.time_in_force != Some(TimeInForce::Gtd) {
            return Err(BrokerError::validation(format!(
                "gtdTime given for an order with time-in-force {}",
                order
                    .time_in_force
                    .map_or_else(|| "unset".to_string(), |tif| tif.to_string())
            )));
        }
        order.gtd_time = Some(format_gtd_time(gtd_time));
    }
    if let Some(price) = update.price {
        order.price = Some(price);
    }
    if let Some(price_bound) = update.price_bound {
        if order.order_type.accepts_price_bound() {
            order.price_bound = Some(price_bound);
        }
    }
    if let Some(units) = update.units {
        let side = order.units.map(OrderSide::from_units).unwrap_or(OrderSide::Buy);
        order.units = Some(side.signed(units));
    }
    if let Some(price) = update.stop_loss {
        let stop_loss = ensure_protective(&mut order.stop_loss_on_fill);
        stop_loss.price = Some(price);
        stop_loss.distance = None;
    }
    if let Some(distance) = update.trailing_stop_loss {
        ensure_protective(&mut order.trailing_stop_loss_on_fill).distance = Some(distance);
    }
    if let Some(price) = update.take_profit {
        ensure_protective(&mut order.take_profit_on_fill).price = Some(price);
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::types::{OrderType, PositionFill};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    fn fetched(extra: Value) -> Order {
        let mut raw = json!({
            "id": "42",
            "createTime": "2024-03-01T10:00:00.000000000Z",
            "state": "PENDING",
            "type": "STOP",
            "instrument": "EUR_USD",
            "units": "-100",
            "price": "1.09000",
            "timeInForce": "GTC",
            "triggerCondition": "DEFAULT",
            "partialFill": "DEFAULT_FILL",
            "positionFill": "POSITION_DEFAULT"
        });
        if let (Some(target), Value::Object(more)) = (raw.as_object_mut(), extra) {
            target.extend(more);
        }
        serde_json::from_value(raw).unwrap()
    }

    fn stripped(order: &Order) -> Value {
        let mut value = serde_json::to_value(order).unwrap();
        let object = value.as_object_mut().unwrap();
        for key in ["createTime", "id", "partialFill", "state", "triggerCondition", "positionFill"] {
            object.remove(key);
        }
        value
    }

    #[test]
    fn test_empty_update_only_strips() {
        let order = fetched(json!({"clientExtensions": {"id": "x"}, "replacesOrderID": "41"}));
        let expected = stripped(&order);

        let merged = merge_order(order, &OrderUpdate::new()).unwrap();
        assert_eq!(merged.position_fill, Some(PositionFill::Default));

        let mut body = serde_json::to_value(&merged).unwrap();
        body.as_object_mut().unwrap().remove("positionFill");
        assert_eq!(body, expected);
    }

    #[test]
    fn test_take_profit_created_with_gtc() {
        let order = fetched(json!({}));
        let before = stripped(&order);

        let merged = merge_order(order, &OrderUpdate::new().take_profit(dec!(1.25))).unwrap();
        let body = serde_json::to_value(&merged).unwrap();
        assert_eq!(body["takeProfitOnFill"], json!({"price": "1.25", "timeInForce": "GTC"}));

        let mut rest = body.clone();
        rest.as_object_mut().unwrap().remove("takeProfitOnFill");
        rest.as_object_mut().unwrap().remove("positionFill");
        assert_eq!(rest, before);
    }

    #[test]
    fn test_take_profit_does_not_touch_stop_loss() {
        let order = fetched(json!({
            "stopLossOnFill": {"price": "1.12000", "timeInForce": "GTC"},
            "takeProfitOnFill": {"price": "1.05000", "timeInForce": "GFD"}
        }));
        let update = OrderUpdate::new().stop_loss(dec!(1.115)).take_profit(dec!(1.04));
        let merged = merge_order(order, &update).unwrap();

        let tp = merged.take_profit_on_fill.unwrap();
        assert_eq!(tp.price, Some(dec!(1.04)));
        assert_eq!(tp.time_in_force, TimeInForce::Gfd);
        assert_eq!(merged.stop_loss_on_fill.unwrap().price, Some(dec!(1.115)));
    }

    #[test]
    fn test_existing_trailing_stop_keeps_siblings() {
        let order = fetched(json!({
            "trailingStopLossOnFill": {"distance": "0.0040", "timeInForce": "GTD", "gtdTime": "2030-01-01T00:00:00Z"}
        }));
        let merged = merge_order(order, &OrderUpdate::new().trailing_stop_loss(dec!(0.0060))).unwrap();
        let body = serde_json::to_value(&merged).unwrap();
        assert_eq!(
            body["trailingStopLossOnFill"],
            json!({"distance": "0.0060", "timeInForce": "GTD", "gtdTime": "2030-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn test_units_keep_side() {
        let merged = merge_order(fetched(json!({})), &OrderUpdate::new().units(dec!(250))).unwrap();
        assert_eq!(merged.units, Some(dec!(-250)));
    }

    #[test]
    fn test_price_bound_only_for_triggered_types() {
        let merged = merge_order(fetched(json!({})), &OrderUpdate::new().price_bound(dec!(1.085))).unwrap();
        assert_eq!(merged.price_bound, Some(dec!(1.085)));

        let mut limit = fetched(json!({}));
        limit.order_type = OrderType::Limit;
        let merged = merge_order(limit, &OrderUpdate::new().price_bound(dec!(1.085))).unwrap();
        assert_eq!(merged.price_bound, None);
    }

    #[test]
    fn test_switch_to_gtd() {
        let expiry = Utc.with_ymd_and_hms(2031, 1, 2, 3, 4, 5).unwrap();
        let update = OrderUpdate::new().time_in_force(TimeInForce::Gtd).gtd_time(expiry);
        let merged = merge_order(fetched(json!({})), &update).unwrap();
        assert_eq!(merged.time_in_force, Some(TimeInForce::Gtd));
        assert_eq!(merged.gtd_time.as_deref(), Some("2031-01-02T03:04:05Z"));

        let update = OrderUpdate::new().time_in_force(TimeInForce::Gtd);
        assert!(matches!(
            merge_order(fetched(json!({})), &update),
            Err(BrokerError::MissingRequiredField { field: "gtdTime", .. })
        ));
    }

    #[test]
    fn test_gtd_time_needs_gtd_order() {
        let expiry = Utc.with_ymd_and_hms(2031, 1, 2, 3, 4, 5).unwrap();
        assert!(matches!(
            merge_order(fetched(json!({})), &OrderUpdate::new().gtd_time(expiry)),
            Err(BrokerError::Validation(_))
        ));

        let update = OrderUpdate::new().time_in_force(TimeInForce::Gfd).gtd_time(expiry);
        assert!(matches!(
            merge_order(fetched(json!({})), &update),
            Err(BrokerError::Validation(_))
        ));

        let gtd = fetched(json!({"timeInForce": "GTD", "gtdTime": "2030-01-01T00:00:00.000000000Z"}));
        let merged = merge_order(gtd, &OrderUpdate::new().gtd_time(expiry)).unwrap();
        assert_eq!(merged.gtd_time.as_deref(), Some("2031-01-02T03:04:05Z"));
    }

    #[test]
    fn test_stop_loss_price_replaces_distance() {
        let order = fetched(json!({"stopLossOnFill": {"distance": "0.0030", "timeInForce": "GTC"}}));
        let merged = merge_order(order, &OrderUpdate::new().stop_loss(dec!(1.11))).unwrap();
        assert_eq!(
            serde_json::to_value(merged.stop_loss_on_fill).unwrap(),
            json!({"price": "1.11", "timeInForce": "GTC"})
        );
    }

    #[test]
    fn test_invalid_deltas() {
        let update = OrderUpdate::new().time_in_force(TimeInForce::Fok);
        assert!(matches!(
            merge_order(fetched(json!({})), &update),
            Err(BrokerError::Validation(_))
        ));
        assert!(matches!(
            merge_order(fetched(json!({})), &OrderUpdate::new().units(dec!(0))),
            Err(BrokerError::Validation(_))
        ));
        assert!(matches!(
            merge_order(fetched(json!({})), &OrderUpdate::new().stop_loss(dec!(-1))),
            Err(BrokerError::Validation(_))
        ));
    }
}
