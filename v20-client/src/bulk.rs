//! Bulk cancel and close.
//!
//! A bulk run lists the candidates once, selects the ones the filter
//! matches and then cancels or closes them one at a time, each call awaited
//! before the next starts. The first failure stops the run and is returned
//! as-is; entities handled before it stay cancelled or closed.

use std::future::Future;

use tracing::{info, warn};

use crate::error::{BrokerError, BrokerResult};
use crate::identity::{validate_alias, Identifier, ProviderId};
use crate::instruments::InstrumentLookup;
use crate::services::{OrderService, TradeService};

/// Selects the orders or trades a bulk operation acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityFilter {
    ProviderIds(Vec<ProviderId>),
    Aliases(Vec<String>),
    /// Exact instrument code
    Instrument(String),
}

impl EntityFilter {
    /// Pick the first non-empty selector, in the order IDs, aliases,
    /// instrument.
    pub fn from_parts(
        ids: Vec<ProviderId>,
        aliases: Vec<String>,
        instrument: Option<String>,
    ) -> BrokerResult<Self> {
        if !ids.is_empty() {
            return Ok(EntityFilter::ProviderIds(ids));
        }
        if !aliases.is_empty() {
            return Ok(EntityFilter::Aliases(aliases));
        }
        match instrument {
            Some(code) if !code.is_empty() => Ok(EntityFilter::Instrument(code)),
            _ => Err(BrokerError::MissingFilter),
        }
    }

    /// Reject empty selectors and unknown instrument codes.
    pub fn validate(&self, catalog: &dyn InstrumentLookup) -> BrokerResult<()> {
        match self {
            EntityFilter::ProviderIds(ids) if ids.is_empty() => Err(BrokerError::MissingFilter),
            EntityFilter::Aliases(aliases) if aliases.is_empty() => Err(BrokerError::MissingFilter),
            EntityFilter::Aliases(aliases) => aliases.iter().try_for_each(|a| validate_alias(a)),
            EntityFilter::Instrument(code) if code.is_empty() => Err(BrokerError::MissingFilter),
            EntityFilter::Instrument(code) if !catalog.is_valid_code(code) => Err(
                BrokerError::validation(format!("Invalid instrument code '{}'", code)),
            ),
            _ => Ok(()),
        }
    }

    pub fn matches(&self, id: ProviderId, alias: Option<&str>, instrument: Option<&str>) -> bool {
        match self {
            EntityFilter::ProviderIds(ids) => ids.contains(&id),
            EntityFilter::Aliases(aliases) => {
                alias.is_some_and(|alias| aliases.iter().any(|a| a == alias))
            }
            EntityFilter::Instrument(code) => instrument == Some(code.as_str()),
        }
    }
}

async fn run_sequentially<F, Fut>(
    action: &'static str,
    targets: Vec<ProviderId>,
    mut op: F,
) -> BrokerResult<Vec<ProviderId>>
where
    F: FnMut(ProviderId) -> Fut,
    Fut: Future<Output = BrokerResult<bool>>,
{
    let total = targets.len();
    let mut done = Vec::with_capacity(total);
    for id in targets {
        if let Err(e) = op(id).await {
            warn!(
                action,
                failed = %id,
                processed = ?done,
                remaining = total - done.len() - 1,
                "bulk {} aborted: {}",
                action,
                e
            );
            return Err(e);
        }
        done.push(id);
    }
    if total > 0 {
        info!(action, count = total, "bulk {} completed", action);
    }
    Ok(done)
}

/// Cancel every pending entry order matching `filter`, or all of them when
/// `filter` is `None`. Returns the cancelled IDs in processing order.
///
/// Take-profit and stop-loss orders attached to open trades are also listed
/// as pending; they are never candidates.
pub async fn cancel_orders<S>(
    service: &S,
    catalog: &dyn InstrumentLookup,
    filter: Option<&EntityFilter>,
) -> BrokerResult<Vec<ProviderId>>
where
    S: OrderService + ?Sized,
{
    if let Some(filter) = filter {
        filter.validate(catalog)?;
    }
    let targets: Vec<ProviderId> = service
        .pending_orders()
        .await?
        .iter()
        .filter(|order| order.order_type.is_entry())
        .filter_map(|order| {
            let id = order.id?;
            let selected = filter.map_or(true, |f| {
                f.matches(id, order.alias(), order.instrument.as_deref())
            });
            selected.then_some(id)
        })
        .collect();

    run_sequentially("cancel", targets, |id| async move {
        service.cancel_order(&Identifier::ByProviderId(id)).await
    })
    .await
}

/// Close every open trade matching `filter`, or all of them when `filter`
/// is `None`. Each trade is closed in full.
pub async fn close_trades<S>(
    service: &S,
    catalog: &dyn InstrumentLookup,
    filter: Option<&EntityFilter>,
) -> BrokerResult<Vec<ProviderId>>
where
    S: TradeService + ?Sized,
{
    if let Some(filter) = filter {
        filter.validate(catalog)?;
    }
    let targets: Vec<ProviderId> = service
        .open_trades()
        .await?
        .iter()
        .filter(|trade| {
            filter.map_or(true, |f| f.matches(trade.id, trade.alias(), Some(&trade.instrument)))
        })
        .map(|trade| trade.id)
        .collect();

    run_sequentially("close", targets, |id| async move {
        service.close_trade(&Identifier::ByProviderId(id), None).await
    })
    .await
}
