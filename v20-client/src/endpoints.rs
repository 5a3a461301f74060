//! v20 API endpoints.
//!
//! Base URLs per trading environment and the account-relative REST paths.
//! Every path here is appended to the accounts base URL (`.../v3/accounts`).

use crate::config::Environment;

/// Endpoint configuration for a trading environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V20Endpoints {
    /// Accounts base URL
    pub rest_url: String,
}

impl V20Endpoints {
    /// Get endpoints for the given environment.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Practice => Self::practice(),
            Environment::Live => Self::live(),
        }
    }

    /// Practice (demo) endpoints. Orders here never reach the real market.
    pub fn practice() -> Self {
        Self {
            rest_url: "https://api-fxpractice.oanda.com/v3/accounts".to_string(),
        }
    }

    /// Live trading endpoints.
    pub fn live() -> Self {
        Self {
            rest_url: "https://api-fxtrade.oanda.com/v3/accounts".to_string(),
        }
    }
}

/// REST paths, relative to the accounts base URL.
pub mod paths {
    // ==================== ACCOUNT ====================

    /// All accounts authorized for the token
    pub const ACCOUNTS: &str = "";

    /// Full account details
    pub fn account(account: &str) -> String {
        format!("/{}", account)
    }

    /// Account summary
    pub fn summary(account: &str) -> String {
        format!("/{}/summary", account)
    }

    /// Tradeable instruments
    pub fn instruments(account: &str) -> String {
        format!("/{}/instruments", account)
    }

    /// Client-configurable account settings
    pub fn configuration(account: &str) -> String {
        format!("/{}/configuration", account)
    }

    /// Positions
    pub fn positions(account: &str) -> String {
        format!("/{}/positions", account)
    }

    /// Current prices
    pub fn pricing(account: &str) -> String {
        format!("/{}/pricing", account)
    }

    // ==================== ORDERS ====================

    /// Order collection (create, filtered list)
    pub fn orders(account: &str) -> String {
        format!("/{}/orders", account)
    }

    /// Pending orders
    pub fn pending_orders(account: &str) -> String {
        format!("/{}/pendingOrders", account)
    }

    /// Single order (read, replace)
    pub fn order(account: &str, segment: &str) -> String {
        format!("/{}/orders/{}", account, segment)
    }

    /// Cancel a pending order
    pub fn cancel_order(account: &str, segment: &str) -> String {
        format!("/{}/orders/{}/cancel", account, segment)
    }

    /// Order client extensions
    pub fn order_extensions(account: &str, segment: &str) -> String {
        format!("/{}/orders/{}/clientExtensions", account, segment)
    }

    // ==================== TRADES ====================

    /// Trade collection (filtered list)
    pub fn trades(account: &str) -> String {
        format!("/{}/trades", account)
    }

    /// Open trades
    pub fn open_trades(account: &str) -> String {
        format!("/{}/openTrades", account)
    }

    /// Single trade
    pub fn trade(account: &str, segment: &str) -> String {
        format!("/{}/trades/{}", account, segment)
    }

    /// Dependent orders of a trade
    pub fn trade_orders(account: &str, segment: &str) -> String {
        format!("/{}/trades/{}/orders", account, segment)
    }

    /// Close a trade
    pub fn close_trade(account: &str, segment: &str) -> String {
        format!("/{}/trades/{}/close", account, segment)
    }

    /// Trade client extensions
    pub fn trade_extensions(account: &str, segment: &str) -> String {
        format!("/{}/trades/{}/clientExtensions", account, segment)
    }
}
