//! Tradeable instruments.
//!
//! The server only accepts instrument codes (`EUR_USD`, `XAU_USD`); the
//! display names exist for callers that present them to users.
//! [`InstrumentLookup`] is the seam the order builder and the bulk
//! coordinator validate codes through.

mod catalog;

pub use catalog::{AssetClass, Instrument, InstrumentCatalog};

use crate::error::{BrokerError, BrokerResult};

/// Instrument code validation.
pub trait InstrumentLookup: Send + Sync {
    /// Returns true if the server accepts this code.
    fn is_valid_code(&self, code: &str) -> bool;

    /// Check every code, failing on the first one the server would reject.
    fn validate_codes(&self, codes: &[&str]) -> BrokerResult<()> {
        match codes.iter().find(|code| !self.is_valid_code(code)) {
            Some(code) => Err(BrokerError::validation(format!(
                "Invalid instrument code '{}'",
                code
            ))),
            None => Ok(()),
        }
    }
}
