//! Provider registry.
//!
//! Holds every registered provider ordered by global priority. Built once at
//! startup, then shared read-only behind an `Arc`.

use std::sync::Arc;

use log::debug;

use crate::errors::MarketDataError;
use crate::provider::MarketDataProvider;

/// Registered providers, ordered by priority (lower first, ties in
/// registration order).
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of providers, rejecting duplicate ids.
    pub fn with_providers(
        providers: impl IntoIterator<Item = Arc<dyn MarketDataProvider>>,
    ) -> Result<Self, MarketDataError> {
        let mut registry = Self::new();
        for provider in providers {
            registry.register(provider)?;
        }
        Ok(registry)
    }

    /// Register a provider.
    ///
    /// Fails with [`MarketDataError::DuplicateProvider`] if the id is taken.
    pub fn register(&mut self, provider: Arc<dyn MarketDataProvider>) -> Result<(), MarketDataError> {
        if self.get(provider.id()).is_some() {
            return Err(MarketDataError::DuplicateProvider(provider.id().to_string()));
        }

        // Insert after every provider with priority <= ours, keeping ties stable
        let priority = provider.priority();
        let index = self
            .providers
            .iter()
            .position(|p| p.priority() > priority)
            .unwrap_or(self.providers.len());

        debug!(
            "Registered provider '{}' (priority {}) at position {}",
            provider.id(),
            priority,
            index
        );
        self.providers.insert(index, provider);
        Ok(())
    }

    /// All providers by priority ascending.
    pub fn all(&self) -> &[Arc<dyn MarketDataProvider>] {
        &self.providers
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn MarketDataProvider>> {
        self.providers.iter().find(|p| p.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Provider ids by priority ascending.
    pub fn ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
