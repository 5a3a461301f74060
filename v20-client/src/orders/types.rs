//! Core order enums and shared sub-objects.
//!
//! - `OrderType` - entry types plus the dependent types the server reports
//! - `OrderSide` - Buy or Sell, encoded on the wire by the sign of `units`
//! - `TimeInForce` - GTC, GTD, GFD, FOK, IOC
//! - `OrderState`, `PositionFill`
//! - `ClientExtensions` - caller alias, tag and comment
//! - `ProtectiveOrder` - stop-loss / take-profit / trailing-stop details

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BrokerError;

/// Order side. The API has no side field; SELL orders carry negative units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Apply this side's sign to a positive magnitude.
    pub fn signed(&self, units: Decimal) -> Decimal {
        match self {
            OrderSide::Buy => units.abs(),
            OrderSide::Sell => -units.abs(),
        }
    }

    /// Side encoded by signed units.
    pub fn from_units(units: Decimal) -> Self {
        if units.is_sign_negative() {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(BrokerError::validation(format!(
                "Invalid side '{}', expected BUY or SELL",
                other
            ))),
        }
    }
}

/// Order type.
///
/// Only the first four can be created directly; the rest exist on the
/// server as orders dependent on a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    MarketIfTouched,
    TakeProfit,
    StopLoss,
    GuaranteedStopLoss,
    TrailingStopLoss,
    FixedPrice,
}

impl OrderType {
    /// Types a caller may submit through the create endpoint.
    pub const ENTRY_TYPES: [OrderType; 4] = [
        OrderType::Market,
        OrderType::Limit,
        OrderType::Stop,
        OrderType::MarketIfTouched,
    ];

    pub fn is_entry(&self) -> bool {
        Self::ENTRY_TYPES.contains(self)
    }

    /// Entry types that wait for a price.
    pub fn requires_price(&self) -> bool {
        matches!(
            self,
            OrderType::Limit | OrderType::Stop | OrderType::MarketIfTouched
        )
    }

    /// Only triggered entry orders honour a price bound.
    pub fn accepts_price_bound(&self) -> bool {
        matches!(self, OrderType::Stop | OrderType::MarketIfTouched)
    }

    /// Time-in-force values accepted for this entry type; the first is the default.
    pub fn allowed_time_in_force(&self) -> &'static [TimeInForce] {
        match self {
            OrderType::Market => &[TimeInForce::Fok, TimeInForce::Ioc],
            _ => &[TimeInForce::Gtc, TimeInForce::Gtd, TimeInForce::Gfd],
        }
    }

    pub fn default_time_in_force(&self) -> TimeInForce {
        self.allowed_time_in_force()[0]
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::Stop => "STOP",
            OrderType::MarketIfTouched => "MARKET_IF_TOUCHED",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::GuaranteedStopLoss => "GUARANTEED_STOP_LOSS",
            OrderType::TrailingStopLoss => "TRAILING_STOP_LOSS",
            OrderType::FixedPrice => "FIXED_PRICE",
        };
        f.write_str(name)
    }
}

impl FromStr for OrderType {
    type Err = BrokerError;

    /// Parses the four entry types only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ENTRY_TYPES
            .iter()
            .copied()
            .find(|t| t.to_string() == s)
            .ok_or_else(|| {
                BrokerError::validation(format!(
                    "Invalid order type '{}', expected MARKET, LIMIT, STOP or MARKET_IF_TOUCHED",
                    s
                ))
            })
    }
}

/// Time-in-force policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good till cancelled
    Gtc,
    /// Good till date, needs `gtdTime`
    Gtd,
    /// Good for day
    Gfd,
    /// Fill or kill
    Fok,
    /// Immediate or cancel
    Ioc,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::Gtc => write!(f, "GTC"),
            TimeInForce::Gtd => write!(f, "GTD"),
            TimeInForce::Gfd => write!(f, "GFD"),
            TimeInForce::Fok => write!(f, "FOK"),
            TimeInForce::Ioc => write!(f, "IOC"),
        }
    }
}

impl FromStr for TimeInForce {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GTC" => Ok(TimeInForce::Gtc),
            "GTD" => Ok(TimeInForce::Gtd),
            "GFD" => Ok(TimeInForce::Gfd),
            "FOK" => Ok(TimeInForce::Fok),
            "IOC" => Ok(TimeInForce::Ioc),
            other => Err(BrokerError::validation(format!(
                "Invalid time-in-force '{}'",
                other
            ))),
        }
    }
}

/// Server-side order state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Pending,
    Filled,
    Triggered,
    Cancelled,
}

impl OrderState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderState::Pending)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderState::Pending => write!(f, "PENDING"),
            OrderState::Filled => write!(f, "FILLED"),
            OrderState::Triggered => write!(f, "TRIGGERED"),
            OrderState::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// How a fill interacts with existing positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionFill {
    #[default]
    Default,
    OpenOnly,
    ReduceFirst,
    ReduceOnly,
}

/// Caller-owned metadata attached to an order or trade.
///
/// `id` is the alias the entity can be addressed by (`@id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ClientExtensions {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.tag.is_none() && self.comment.is_none()
    }

    /// Keep only non-empty values; `None` when nothing is left.
    pub fn non_empty(self) -> Option<Self> {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        let ext = Self {
            id: keep(self.id),
            tag: keep(self.tag),
            comment: keep(self.comment),
        };
        (!ext.is_empty()).then_some(ext)
    }
}

/// Stop-loss, take-profit or trailing-stop details.
///
/// Used both for the `...OnFill` sub-objects of entry orders and for the
/// dependent-order specs of a trade. Keys the crate does not model are kept
/// in `extra` so a read-modify-write cycle does not drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectiveOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Price distance, used by trailing stops
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Decimal>,
    #[serde(default = "default_protective_tif")]
    pub time_in_force: TimeInForce,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtd_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_extensions: Option<ClientExtensions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_protective_tif() -> TimeInForce {
    TimeInForce::Gtc
}

impl Default for ProtectiveOrder {
    fn default() -> Self {
        Self {
            price: None,
            distance: None,
            time_in_force: TimeInForce::Gtc,
            gtd_time: None,
            client_extensions: None,
            extra: Map::new(),
        }
    }
}

impl ProtectiveOrder {
    /// GTC order at a price.
    pub fn at_price(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }

    /// GTC order trailing at a distance.
    pub fn at_distance(distance: Decimal) -> Self {
        Self {
            distance: Some(distance),
            ..Default::default()
        }
    }

    /// `Some(order at price)` for a non-zero price.
    pub fn price_if_set(price: Option<Decimal>) -> Option<Self> {
        price.filter(|p| !p.is_zero()).map(Self::at_price)
    }

    /// `Some(order at distance)` for a non-zero distance.
    pub fn distance_if_set(distance: Option<Decimal>) -> Option<Self> {
        distance.filter(|d| !d.is_zero()).map(Self::at_distance)
    }
}

/// Return the protective order in `slot`, creating a GTC one if absent.
pub fn ensure_protective(slot: &mut Option<ProtectiveOrder>) -> &mut ProtectiveOrder {
    slot.get_or_insert_with(ProtectiveOrder::default)
}
