//! Dependent-order updates of open trades.
//!
//! `PUT /trades/{id}/orders` replaces the take-profit, stop-loss and
//! trailing stop of a trade. A dependent order sent as `null` is cancelled,
//! so [`merge_trade`] carries the existing ones over and applies only the
//! requested changes on top.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::types::Trade;
use crate::error::{BrokerError, BrokerResult};
use crate::orders::{Order, ProtectiveOrder, TimeInForce};

/// Change to one dependent order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectiveChange {
    /// Create, or move an existing one to this price or distance
    Set(Decimal),
    /// Cancel it
    Clear,
}

/// Changes to a trade's dependent orders. `None` keeps what the trade has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeUpdate {
    pub take_profit: Option<ProtectiveChange>,
    pub stop_loss: Option<ProtectiveChange>,
    /// Distance, not price
    pub trailing_stop_loss: Option<ProtectiveChange>,
}

impl TradeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_profit(mut self, price: Decimal) -> Self {
        self.take_profit = Some(ProtectiveChange::Set(price));
        self
    }

    pub fn stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(ProtectiveChange::Set(price));
        self
    }

    pub fn trailing_stop_loss(mut self, distance: Decimal) -> Self {
        self.trailing_stop_loss = Some(ProtectiveChange::Set(distance));
        self
    }

    pub fn clear_take_profit(mut self) -> Self {
        self.take_profit = Some(ProtectiveChange::Clear);
        self
    }

    pub fn clear_stop_loss(mut self) -> Self {
        self.stop_loss = Some(ProtectiveChange::Clear);
        self
    }

    pub fn clear_trailing_stop_loss(mut self) -> Self {
        self.trailing_stop_loss = Some(ProtectiveChange::Clear);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> BrokerResult<()> {
        let checks = [
            ("take-profit price", self.take_profit),
            ("stop-loss price", self.stop_loss),
            ("trailing stop-loss distance", self.trailing_stop_loss),
        ];
        for (name, change) in checks {
            if let Some(ProtectiveChange::Set(value)) = change {
                if value <= Decimal::ZERO {
                    return Err(BrokerError::validation(format!(
                        "{} must be positive, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One dependent order in a replacement body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DependentOrder {
    /// Not sent
    #[default]
    Untouched,
    Replace(ProtectiveOrder),
    /// Sent as `null`
    Cancel,
}

impl DependentOrder {
    pub fn is_untouched(&self) -> bool {
        matches!(self, DependentOrder::Untouched)
    }
}

impl Serialize for DependentOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DependentOrder::Replace(order) => order.serialize(serializer),
            DependentOrder::Untouched | DependentOrder::Cancel => serializer.serialize_none(),
        }
    }
}

/// Body of `PUT /trades/{id}/orders`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrdersRequest {
    #[serde(skip_serializing_if = "DependentOrder::is_untouched")]
    pub take_profit: DependentOrder,
    #[serde(skip_serializing_if = "DependentOrder::is_untouched")]
    pub stop_loss: DependentOrder,
    #[serde(skip_serializing_if = "DependentOrder::is_untouched")]
    pub trailing_stop_loss: DependentOrder,
}

enum Level {
    Price,
    Distance,
}

/// An existing dependent order as it would be resent.
///
/// Stop-losses may be set by `price` or by `distance`; whichever the server
/// reports is kept, together with the order's client extensions.
fn carried_over(existing: &Order) -> ProtectiveOrder {
    let mut order = ProtectiveOrder {
        price: existing.price,
        distance: existing.distance,
        time_in_force: existing.time_in_force.unwrap_or(TimeInForce::Gtc),
        client_extensions: existing.client_extensions.clone(),
        ..Default::default()
    };
    if order.time_in_force == TimeInForce::Gtd {
        order.gtd_time = existing.gtd_time.clone();
    }
    order
}

fn merge_dependent(
    existing: Option<&Order>,
    change: Option<ProtectiveChange>,
    level: Level,
) -> DependentOrder {
    let current = existing.map(carried_over);
    match (change, current) {
        (None, Some(order)) => DependentOrder::Replace(order),
        (None, None) => DependentOrder::Untouched,
        (Some(ProtectiveChange::Clear), Some(_)) => DependentOrder::Cancel,
        (Some(ProtectiveChange::Clear), None) => DependentOrder::Untouched,
        (Some(ProtectiveChange::Set(value)), current) => {
            let mut order = current.unwrap_or_default();
            // price and distance are exclusive
            match level {
                Level::Price => {
                    order.price = Some(value);
                    order.distance = None;
                }
                Level::Distance => {
                    order.distance = Some(value);
                    order.price = None;
                }
            }
            DependentOrder::Replace(order)
        }
    }
}

/// Build the dependent-orders body for `trade` with `update` applied.
///
/// Dependent orders the update does not mention are resent as they are.
/// Each change writes only its own order.
pub fn merge_trade(trade: &Trade, update: &TradeUpdate) -> BrokerResult<TradeOrdersRequest> {
    update.validate()?;
    Ok(TradeOrdersRequest {
        take_profit: merge_dependent(trade.take_profit_order.as_ref(), update.take_profit, Level::Price),
        stop_loss: merge_dependent(trade.stop_loss_order.as_ref(), update.stop_loss, Level::Price),
        trailing_stop_loss: merge_dependent(
            trade.trailing_stop_loss_order.as_ref(),
            update.trailing_stop_loss,
            Level::Distance,
        ),
    })
}
