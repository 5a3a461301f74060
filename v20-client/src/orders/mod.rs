//! Orders: wire types, construction and full-replacement updates.
//!
//! - [`types`] - enums, client extensions and protective sub-objects
//! - [`order`] - the order entity as the server reports and accepts it
//! - [`builder`] - entry order validation and create bodies
//! - [`merge`] - read-modify-write updates of pending orders

pub mod builder;
pub mod merge;
pub mod order;
pub mod types;

pub use builder::{build_order, OrderSpec};
pub use merge::{merge_order, OrderUpdate};
pub use order::{Order, OrderEnvelope, OrderList, OrderQuery};
pub use types::{
    ensure_protective, ClientExtensions, OrderSide, OrderState, OrderType, PositionFill,
    ProtectiveOrder, TimeInForce,
};
