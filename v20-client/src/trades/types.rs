//! Trade entity and related wire types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::ProviderId;
use crate::orders::{ClientExtensions, Order, OrderSide};

/// Server-side trade state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeState {
    Open,
    Closed,
    CloseWhenTradeable,
}

impl fmt::Display for TradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeState::Open => write!(f, "OPEN"),
            TradeState::Closed => write!(f, "CLOSED"),
            TradeState::CloseWhenTradeable => write!(f, "CLOSE_WHEN_TRADEABLE"),
        }
    }
}

/// A trade opened by a filled order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: ProviderId,
    pub instrument: String,
    pub state: TradeState,
    /// Signed; negative for a short trade
    pub initial_units: Decimal,
    /// Signed remaining units; reduced by partial closes
    pub current_units: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_extensions: Option<ClientExtensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_loss_order: Option<Order>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trade {
    pub fn alias(&self) -> Option<&str> {
        self.client_extensions.as_ref()?.id.as_deref()
    }

    pub fn side(&self) -> OrderSide {
        OrderSide::from_units(self.initial_units)
    }

    pub fn is_open(&self) -> bool {
        self.state == TradeState::Open
    }
}

/// `{"trade": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEnvelope {
    pub trade: Trade,
}

/// `{"trades": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeList {
    #[serde(default)]
    pub trades: Vec<Trade>,
}

/// Query for the filtered trade list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeQuery {
    pub ids: Vec<ProviderId>,
    /// OPEN, CLOSED, CLOSE_WHEN_TRADEABLE or ALL
    pub state: Option<String>,
    pub instrument: Option<String>,
    pub count: Option<u32>,
}

impl TradeQuery {
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
