//! Static instrument catalog.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::InstrumentLookup;

/// Asset class of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Bond,
    Commodity,
    Forex,
    Index,
    Metal,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetClass::Bond => write!(f, "bond"),
            AssetClass::Commodity => write!(f, "commodity"),
            AssetClass::Forex => write!(f, "forex"),
            AssetClass::Index => write!(f, "index"),
            AssetClass::Metal => write!(f, "metal"),
        }
    }
}

/// A tradeable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Human-readable name ("EUR/USD", "Gold")
    pub display_name: String,
    /// Code the server accepts ("EUR_USD", "XAU_USD")
    pub code: String,
    pub asset_class: AssetClass,
}

const BONDS: &[(&str, &str)] = &[
    ("Bund", "DE10YB_EUR"),
    ("UK 10Y Gilt", "UK10YB_GBP"),
    ("US 10Y T-Note", "USB10Y_USD"),
    ("US 2Y T-Note", "USB02Y_USD"),
    ("US 5Y T-Note", "USB05Y_USD"),
    ("US T-Bond", "USB30Y_USD"),
];

const COMMODITIES: &[(&str, &str)] = &[
    ("Brent Crude Oil", "BCO_USD"),
    ("Corn", "CORN_USD"),
    ("Natural Gas", "NATGAS_USD"),
    ("Soybeans", "SOYBN_USD"),
    ("Sugar", "SUGAR_USD"),
    ("West Texas Oil", "WTICO_USD"),
    ("Wheat", "WHEAT_USD"),
];

const FOREX: &[(&str, &str)] = &[
    ("AUD/CAD", "AUD_CAD"),
    ("AUD/CHF", "AUD_CHF"),
    ("AUD/HKD", "AUD_HKD"),
    ("AUD/JPY", "AUD_JPY"),
    ("AUD/NZD", "AUD_NZD"),
    ("AUD/SGD", "AUD_SGD"),
    ("AUD/USD", "AUD_USD"),
    ("CAD/CHF", "CAD_CHF"),
    ("CAD/HKD", "CAD_HKD"),
    ("CAD/JPY", "CAD_JPY"),
    ("CAD/SGD", "CAD_SGD"),
    ("CHF/HKD", "CHF_HKD"),
    ("CHF/JPY", "CHF_JPY"),
    ("CHF/ZAR", "CHF_ZAR"),
    ("EUR/AUD", "EUR_AUD"),
    ("EUR/CAD", "EUR_CAD"),
    ("EUR/CHF", "EUR_CHF"),
    ("EUR/CZK", "EUR_CZK"),
    ("EUR/DKK", "EUR_DKK"),
    ("EUR/GBP", "EUR_GBP"),
    ("EUR/HKD", "EUR_HKD"),
    ("EUR/HUF", "EUR_HUF"),
    ("EUR/JPY", "EUR_JPY"),
    ("EUR/NOK", "EUR_NOK"),
    ("EUR/NZD", "EUR_NZD"),
    ("EUR/PLN", "EUR_PLN"),
    ("EUR/SEK", "EUR_SEK"),
    ("EUR/SGD", "EUR_SGD"),
    ("EUR/TRY", "EUR_TRY"),
    ("EUR/USD", "EUR_USD"),
    ("EUR/ZAR", "EUR_ZAR"),
    ("GBP/AUD", "GBP_AUD"),
    ("GBP/CAD", "GBP_CAD"),
    ("GBP/CHF", "GBP_CHF"),
    ("GBP/HKD", "GBP_HKD"),
    ("GBP/JPY", "GBP_JPY"),
    ("GBP/NZD", "GBP_NZD"),
    ("GBP/PLN", "GBP_PLN"),
    ("GBP/SGD", "GBP_SGD"),
    ("GBP/USD", "GBP_USD"),
    ("GBP/ZAR", "GBP_ZAR"),
    ("HKD/JPY", "HKD_JPY"),
    ("NZD/CAD", "NZD_CAD"),
    ("NZD/CHF", "NZD_CHF"),
    ("NZD/HKD", "NZD_HKD"),
    ("NZD/JPY", "NZD_JPY"),
    ("NZD/SGD", "NZD_SGD"),
    ("NZD/USD", "NZD_USD"),
    ("SGD/CHF", "SGD_CHF"),
    ("SGD/HKD", "SGD_HKD"),
    ("SGD/JPY", "SGD_JPY"),
    ("TRY/JPY", "TRY_JPY"),
    ("USD/CAD", "USD_CAD"),
    ("USD/CHF", "USD_CHF"),
    ("USD/CNH", "USD_CNH"),
    ("USD/CZK", "USD_CZK"),
    ("USD/DKK", "USD_DKK"),
    ("USD/HKD", "USD_HKD"),
    ("USD/HUF", "USD_HUF"),
    ("USD/INR", "USD_INR"),
    ("USD/JPY", "USD_JPY"),
    ("USD/MXN", "USD_MXN"),
    ("USD/NOK", "USD_NOK"),
    ("USD/PLN", "USD_PLN"),
    ("USD/SAR", "USD_SAR"),
    ("USD/SEK", "USD_SEK"),
    ("USD/SGD", "USD_SGD"),
    ("USD/THB", "USD_THB"),
    ("USD/TRY", "USD_TRY"),
    ("USD/ZAR", "USD_ZAR"),
    ("ZAR/JPY", "ZAR_JPY"),
];

const INDICES: &[(&str, &str)] = &[
    ("Australia 200", "AU200_AUD"),
    ("Europe 50", "EU50_EUR"),
    ("France 40", "FR40_EUR"),
    ("Germany 30", "DE30_EUR"),
    ("Hong Kong 33", "HK33_HKD"),
    ("Japan 255", "JP225_USD"),
    ("Netherlands 25", "NL25_EUR"),
    ("Singapore 30", "SG30_SGD"),
    ("Swiss 20", "CH20_CHF"),
    ("UK 100", "UK100_GBP"),
    ("US Nas 100", "NAS100_USD"),
    ("US Russ 2000", "US2000_USD"),
    ("US SPX 500", "SPX500_USD"),
    ("US Wall St 30", "US30_USD"),
];

const METALS: &[(&str, &str)] = &[
    ("Copper", "XCU_USD"),
    ("Gold", "XAU_USD"),
    ("Gold/AUD", "XAU_AUD"),
    ("Gold/CAD", "XAU_CAD"),
    ("Gold/CHF", "XAU_CHF"),
    ("Gold/EUR", "XAU_EUR"),
    ("Gold/GBP", "XAU_GBP"),
    ("Gold/HKD", "XAU_HKD"),
    ("Gold/JPY", "XAU_JPY"),
    ("Gold/NZD", "XAU_NZD"),
    ("Gold/SGD", "XAU_SGD"),
    ("Gold/Silver", "XAU_XAG"),
    ("Palladium", "XPD_USD"),
    ("Platinum", "XPT_USD"),
    ("Silver", "XAG_USD"),
    ("Silver/AUD", "XAG_AUD"),
    ("Silver/CAD", "XAG_CAD"),
    ("Silver/CHF", "XAG_CHF"),
    ("Silver/EUR", "XAG_EUR"),
    ("Silver/GBP", "XAG_GBP"),
    ("Silver/HKD", "XAG_HKD"),
    ("Silver/JPY", "XAG_JPY"),
    ("Silver/NZD", "XAG_NZD"),
    ("Silver/SGD", "XAG_SGD"),
];

/// Immutable name/code table, loaded once.
#[derive(Debug, Clone, Default)]
pub struct InstrumentCatalog {
    by_code: HashMap<String, Instrument>,
    code_by_name: HashMap<String, String>,
}

impl InstrumentCatalog {
    /// Build a catalog from instruments. Later duplicates of a code replace
    /// earlier ones.
    pub fn new(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        let mut catalog = Self::default();
        for instrument in instruments {
            catalog
                .code_by_name
                .insert(instrument.display_name.clone(), instrument.code.clone());
            catalog.by_code.insert(instrument.code.clone(), instrument);
        }
        catalog
    }

    /// The broker's standard instrument list.
    pub fn standard() -> Self {
        let groups = [
            (AssetClass::Bond, BONDS),
            (AssetClass::Commodity, COMMODITIES),
            (AssetClass::Forex, FOREX),
            (AssetClass::Index, INDICES),
            (AssetClass::Metal, METALS),
        ];
        Self::new(groups.into_iter().flat_map(|(asset_class, table)| {
            table.iter().map(move |(name, code)| Instrument {
                display_name: (*name).to_string(),
                code: (*code).to_string(),
                asset_class,
            })
        }))
    }

    /// Look up an instrument by code.
    pub fn get(&self, code: &str) -> Option<&Instrument> {
        self.by_code.get(code)
    }

    /// Resolve a display name to its code.
    pub fn code_for(&self, display_name: &str) -> Option<&str> {
        self.code_by_name.get(display_name).map(String::as_str)
    }

    /// All instruments of one asset class, sorted by code.
    pub fn by_asset_class(&self, asset_class: AssetClass) -> Vec<&Instrument> {
        let mut instruments: Vec<&Instrument> = self
            .by_code
            .values()
            .filter(|i| i.asset_class == asset_class)
            .collect();
        instruments.sort_by(|a, b| a.code.cmp(&b.code));
        instruments
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl InstrumentLookup for InstrumentCatalog {
    fn is_valid_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }
}
