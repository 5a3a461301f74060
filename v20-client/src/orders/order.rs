//! Order entity as exchanged with the server.
//!
//! The same shape is used for create bodies, read responses and
//! full-replacement bodies. Fields the crate does not model travel in
//! `extra` untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{ClientExtensions, OrderState, OrderType, PositionFill, ProtectiveOrder, TimeInForce};
use crate::identity::ProviderId;

/// Keys set by the server that it rejects when echoed back.
pub const SERVER_ONLY_FIELDS: [&str; 5] = ["createTime", "id", "partialFill", "state", "triggerCondition"];

/// An order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // Server-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProviderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<OrderState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_fill: Option<String>,

    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Absent on orders dependent on a trade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    /// Signed; negative for SELL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_bound: Option<Decimal>,
    /// Trailing stop distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtd_time: Option<String>,
    /// Values outside the input schema read as `None`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_position_fill"
    )]
    pub position_fill: Option<PositionFill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_extensions: Option<ClientExtensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_on_fill: Option<ProtectiveOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_loss_on_fill: Option<ProtectiveOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_on_fill: Option<ProtectiveOrder>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_position_fill<'de, D>(deserializer: D) -> Result<Option<PositionFill>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| PositionFill::deserialize(value).ok()))
}

impl Order {
    /// An order of `order_type` with every other field unset.
    pub fn empty(order_type: OrderType) -> Self {
        Self {
            id: None,
            create_time: None,
            state: None,
            trigger_condition: None,
            partial_fill: None,
            order_type,
            instrument: None,
            units: None,
            price: None,
            price_bound: None,
            distance: None,
            time_in_force: None,
            gtd_time: None,
            position_fill: None,
            client_extensions: None,
            stop_loss_on_fill: None,
            trailing_stop_loss_on_fill: None,
            take_profit_on_fill: None,
            extra: Map::new(),
        }
    }

    /// The caller alias, if one was attached.
    pub fn alias(&self) -> Option<&str> {
        self.client_extensions.as_ref()?.id.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.state == Some(OrderState::Pending)
    }

    /// Strip server-only fields and force `positionFill` to `DEFAULT`.
    ///
    /// The server reports `positionFill` in a form its own input schema
    /// rejects, so the replacement always carries the default.
    pub fn into_replacement(mut self) -> Self {
        self.id = None;
        self.create_time = None;
        self.state = None;
        self.trigger_condition = None;
        self.partial_fill = None;
        for key in SERVER_ONLY_FIELDS {
            self.extra.remove(key);
        }
        self.position_fill = Some(PositionFill::Default);
        self
    }
}

/// `{"order": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEnvelope {
    pub order: Order,
}

/// `{"orders": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderList {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Query for the filtered order list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub ids: Vec<ProviderId>,
    pub state: Option<String>,
    pub instrument: Option<String>,
    /// Server default is 50, maximum 500
    pub count: Option<u32>,
}

impl OrderQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.ids.is_empty() {
            let ids: Vec<String> = self.ids.iter().map(ToString::to_string).collect();
            params.push(("ids", ids.join(",")));
        }
        if let Some(state) = &self.state {
            params.push(("state", state.clone()));
        }
        if let Some(instrument) = &self.instrument {
            params.push(("instrument", instrument.clone()));
        }
        if let Some(count) = self.count {
            params.push(("count", count.to_string()));
        }
        params
    }
}
