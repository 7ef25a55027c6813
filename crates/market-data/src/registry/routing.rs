//! Per-market provider ordering.
//!
//! A [`RoutingPlan`] lists every registered provider exactly once: the
//! market's preferred providers first (table order), then everything else by
//! global priority. Providers that cannot serve the market are not filtered
//! out here; they fail fast with a permanent error when tried.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::models::{Market, OperationKind, ProviderId};

use super::ProviderRegistry;

/// Well-known upstream provider ids used in the default preference tables.
pub mod provider_ids {
    pub const EFINANCE: &str = "EFINANCE";
    pub const AKSHARE: &str = "AKSHARE";
    pub const TUSHARE: &str = "TUSHARE";
    pub const BAOSTOCK: &str = "BAOSTOCK";
    pub const YFINANCE: &str = "YFINANCE";
    pub const US_STOCK: &str = "US_STOCK";
    pub const EU_STOCK: &str = "EU_STOCK";
}

use provider_ids::*;

/// Preferred providers per (operation, market).
#[derive(Clone, Debug, Default)]
pub struct PreferenceTable {
    daily: HashMap<Market, Vec<ProviderId>>,
    realtime: HashMap<Market, Vec<ProviderId>>,
}

impl PreferenceTable {
    /// A table with no preferences: plans are pure priority order.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Default tables.
    ///
    /// | Market | daily | realtime |
    /// |--------|-------|----------|
    /// | China A | EFINANCE, AKSHARE, TUSHARE, BAOSTOCK | EFINANCE, AKSHARE |
    /// | Hong Kong | AKSHARE, YFINANCE | same |
    /// | US | US_STOCK, YFINANCE | same |
    /// | Europe | EU_STOCK, YFINANCE | same |
    /// | Unknown | none | none |
    pub fn standard() -> Self {
        let mut table = Self::empty()
            .with_preference(
                OperationKind::Daily,
                Market::ChinaA,
                &[EFINANCE, AKSHARE, TUSHARE, BAOSTOCK],
            )
            .with_preference(OperationKind::Realtime, Market::ChinaA, &[EFINANCE, AKSHARE]);

        for kind in [OperationKind::Daily, OperationKind::Realtime] {
            table = table.with_preference(kind, Market::HongKong, &[AKSHARE, YFINANCE]);
            for market in Market::ALL {
                if market.is_us() {
                    table = table.with_preference(kind, market, &[US_STOCK, YFINANCE]);
                } else if market.is_european() {
                    table = table.with_preference(kind, market, &[EU_STOCK, YFINANCE]);
                }
            }
        }
        table
    }

    /// Replace the preferred list for one market. Repeated ids keep their
    /// first position.
    pub fn with_preference(mut self, kind: OperationKind, market: Market, ids: &[&str]) -> Self {
        let mut list: Vec<ProviderId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !list.iter().any(|existing| existing == id) {
                list.push(Cow::Owned(id.to_string()));
            }
        }
        self.table_mut(kind).insert(market, list);
        self
    }

    pub fn preferred(&self, kind: OperationKind, market: Market) -> &[ProviderId] {
        let table = match kind {
            OperationKind::Daily => &self.daily,
            OperationKind::Realtime => &self.realtime,
        };
        table.get(&market).map(Vec::as_slice).unwrap_or(&[])
    }

    fn table_mut(&mut self, kind: OperationKind) -> &mut HashMap<Market, Vec<ProviderId>> {
        match kind {
            OperationKind::Daily => &mut self.daily,
            OperationKind::Realtime => &mut self.realtime,
        }
    }
}

/// Ordered provider ids for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingPlan {
    pub market: Market,
    pub kind: OperationKind,
    pub providers: Vec<ProviderId>,
}

impl RoutingPlan {
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.as_ref()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderId> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Computes routing plans against a fixed registry.
#[derive(Clone, Debug)]
pub struct RoutingPolicy {
    registry: Arc<ProviderRegistry>,
    preferences: PreferenceTable,
}

impl RoutingPolicy {
    pub fn new(registry: Arc<ProviderRegistry>, preferences: PreferenceTable) -> Self {
        Self {
            registry,
            preferences,
        }
    }

    /// Policy with the [`PreferenceTable::standard`] tables.
    pub fn standard(registry: Arc<ProviderRegistry>) -> Self {
        Self::new(registry, PreferenceTable::standard())
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn preferences(&self) -> &PreferenceTable {
        &self.preferences
    }

    /// Daily-history plan for `market`.
    pub fn plan(&self, market: Market) -> RoutingPlan {
        self.plan_for(OperationKind::Daily, market)
    }

    /// Plan for `kind` on `market`.
    pub fn plan_for(&self, kind: OperationKind, market: Market) -> RoutingPlan {
        let mut providers: Vec<ProviderId> = self
            .preferences
            .preferred(kind, market)
            .iter()
            .filter_map(|id| self.registry.get(id))
            .map(|p| Cow::Borrowed(p.id()))
            .collect();

        for provider in self.registry.all() {
            if !providers.iter().any(|id| id == provider.id()) {
                providers.push(Cow::Borrowed(provider.id()));
            }
        }

        debug!("Routing {} {} via {:?}", kind, market, providers);
        RoutingPlan {
            market,
            kind,
            providers,
        }
    }
}
