//! Adapter selection.
//!
//! The registry holds a fixed priority list, most specific first, and always
//! resolves: a built-in [`DefaultAdapter`] answers for any URL nothing else
//! claims. Selection happens once, eagerly, at startup; single-page
//! navigation does not re-run it.

use std::sync::Arc;

use crate::{DefaultAdapter, SiteAdapter, WhatsAppAdapter};

/// An invalid adapter set is a programming error and the one condition that
/// halts startup. It is surfaced here, at registration time, never at call
/// time.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("adapter at position {0} has an empty name")]
    EmptyName(usize),
    #[error("duplicate adapter name: {0}")]
    DuplicateName(&'static str),
}

pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SiteAdapter>>,
    fallback: Arc<dyn SiteAdapter>,
}

impl AdapterRegistry {
    /// Registry with the built-in profiles: WhatsApp first, then the
    /// catch-all default.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(vec![Arc::new(WhatsAppAdapter)])
            .expect("built-in adapter set is valid")
    }

    /// Build a registry from a priority-ordered adapter list. The catch-all
    /// [`DefaultAdapter`] is appended implicitly, so `select` always
    /// resolves.
    pub fn new(adapters: Vec<Arc<dyn SiteAdapter>>) -> Result<Self, RegistryError> {
        let mut seen: Vec<&'static str> = Vec::with_capacity(adapters.len());
        for (position, adapter) in adapters.iter().enumerate() {
            let name = adapter.name();
            if name.is_empty() {
                return Err(RegistryError::EmptyName(position));
            }
            if seen.contains(&name) {
                return Err(RegistryError::DuplicateName(name));
            }
            seen.push(name);
        }
        Ok(Self {
            adapters,
            fallback: Arc::new(DefaultAdapter),
        })
    }

    /// The first adapter whose predicate accepts the URL, or the fallback.
    #[must_use]
    pub fn select(&self, url: &str) -> Arc<dyn SiteAdapter> {
        let selected = self
            .adapters
            .iter()
            .find(|adapter| adapter.matches(url))
            .unwrap_or(&self.fallback);
        tracing::debug!(adapter = selected.name(), url, "adapter selected");
        Arc::clone(selected)
    }
}
