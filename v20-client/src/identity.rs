//! Order and trade identifiers.
//!
//! An entity is addressed either by the numeric ID the server assigned or by
//! the alias the caller attached at creation (the client extension `id`).
//! Aliases go on the wire with the reserved `@` prefix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{BrokerError, BrokerResult};

/// Server-assigned numeric identifier.
///
/// The API transmits IDs as decimal strings; this type serializes the same
/// way and also accepts bare numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub u64);

impl ProviderId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProviderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ProviderId {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ProviderId)
            .map_err(|_| BrokerError::Parse(format!("Invalid provider ID '{}'", s)))
    }
}

impl Serialize for ProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(ProviderId(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Reference to exactly one order or trade.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    ByProviderId(ProviderId),
    ByAlias(String),
}

impl Identifier {
    /// Pick an identifier from optional caller inputs.
    ///
    /// The provider ID wins when both are given. An empty alias counts as
    /// absent.
    pub fn resolve(provider_id: Option<ProviderId>, alias: Option<&str>) -> BrokerResult<Self> {
        if let Some(id) = provider_id {
            return Ok(Identifier::ByProviderId(id));
        }
        match alias {
            Some(alias) if !alias.is_empty() => Self::alias(alias),
            _ => Err(BrokerError::MissingIdentifier),
        }
    }

    /// Identifier for an alias, rejecting characters that would break the path.
    pub fn alias(alias: impl Into<String>) -> BrokerResult<Self> {
        let alias = alias.into();
        validate_alias(&alias)?;
        Ok(Identifier::ByAlias(alias))
    }

    /// Path segment: the ID as-is or `@alias`.
    pub fn path_segment(&self) -> String {
        match self {
            Identifier::ByProviderId(id) => id.to_string(),
            Identifier::ByAlias(alias) => format!("@{}", alias),
        }
    }

    pub fn provider_id(&self) -> Option<ProviderId> {
        match self {
            Identifier::ByProviderId(id) => Some(*id),
            Identifier::ByAlias(_) => None,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Identifier::ByAlias(_))
    }
}

impl From<ProviderId> for Identifier {
    fn from(id: ProviderId) -> Self {
        Identifier::ByProviderId(id)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_segment())
    }
}

pub(crate) fn validate_alias(alias: &str) -> BrokerResult<()> {
    if alias.is_empty() {
        return Err(BrokerError::validation("Alias must not be empty"));
    }
    if alias.starts_with('@') || alias.chars().any(|c| c == '/' || c == '?' || c.is_whitespace()) {
        return Err(BrokerError::validation(format!(
            "Alias '{}' contains a reserved character",
            alias
        )));
    }
    Ok(())
}

/// Result of a write operation.
///
/// Writes addressed by provider ID report the ID assigned by the resulting
/// transaction; writes addressed by alias only report whether the server
/// accepted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(ProviderId),
    Acknowledged(bool),
}

impl WriteOutcome {
    pub fn provider_id(&self) -> Option<ProviderId> {
        match self {
            WriteOutcome::Created(id) => Some(*id),
            WriteOutcome::Acknowledged(_) => None,
        }
    }

    /// True for a created ID or a positive acknowledgement.
    pub fn is_accepted(&self) -> bool {
        match self {
            WriteOutcome::Created(_) => true,
            WriteOutcome::Acknowledged(accepted) => *accepted,
        }
    }
}
