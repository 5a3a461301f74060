//! Trades: the trade entity and dependent-order updates.

pub mod merge;
pub mod types;

pub use merge::{merge_trade, DependentOrder, ProtectiveChange, TradeOrdersRequest, TradeUpdate};
pub use types::{Trade, TradeEnvelope, TradeList, TradeQuery, TradeState};
